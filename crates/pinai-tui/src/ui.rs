use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use pinai_core::lock::PIN_LENGTH;
use pinai_core::options::PlanKind;
use pinai_core::{ChatRole, GeneratedMedia, MediaKind};

use crate::app::{App, InputMode, Panel, View};
use crate::panels::{
    AutomateField, AutomatePanel, ChatPanel, FitnessField, NewsPanel, PlanPanel, RawField,
    RawPanel, StudioPanel, TextInput, QUICK_STARTS,
};

const ACCENT: Color = Color::Cyan;
const GOLD: Color = Color::Yellow;

/// Wrap text to fit within a given width, returning multiple lines
/// Uses word boundaries for wrapping (doesn't break mid-word)
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.chars().count() <= width {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len == 0 {
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current_line));
            current_line = word.to_string();
            current_len = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            let mut bold_text = String::new();
            let mut found_close = false;

            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// Render model text as wrapped lines, keeping headings and list markers readable.
fn markdown_lines(text: &str, width: usize, style: Style) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let heading = raw.trim_start().strip_prefix('#').map(|rest| rest.trim_start_matches('#').trim());
        for wrapped in wrap_text_to_width(raw, width) {
            let line = match heading {
                Some(title) if wrapped == raw => Line::from(Span::styled(
                    title.to_string(),
                    Style::default().fg(GOLD).add_modifier(Modifier::BOLD),
                )),
                _ => parse_markdown_line(&wrapped),
            };
            lines.push(line.patch_style(style));
        }
    }
    lines
}

/// Scroll offset that pins the view to the bottom, `back` lines up.
fn bottom_scroll(total_lines: usize, visible: u16, back: u16) -> u16 {
    let max = total_lines.saturating_sub(visible as usize);
    max.saturating_sub(back as usize).min(u16::MAX as usize) as u16
}

fn thinking_line(app: &App) -> Line<'static> {
    // Animated ellipsis: cycles through ".", "..", "..."
    let dots = ".".repeat((app.animation_frame as usize) + 1);
    Line::from(Span::styled(
        format!("Thinking{}", dots),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    ))
}

fn placeholder(text: &str) -> Text<'static> {
    Text::from(Span::styled(text.to_string(), Style::default().fg(Color::DarkGray)))
}

fn field_block(title: &str, focused: bool, editing: bool) -> Block<'static> {
    let color = match (focused, editing) {
        (true, true) => GOLD,
        (true, false) => ACCENT,
        _ => Color::DarkGray,
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(format!(" {} ", title))
}

/// Single-line input with horizontal scrolling; places the cursor while editing.
fn render_text_input(
    frame: &mut Frame,
    area: Rect,
    input: &TextInput,
    block: Block<'static>,
    hint: &str,
    show_cursor: bool,
) {
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = input.cursor();

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let paragraph = if input.value().is_empty() {
        Paragraph::new(Span::styled(hint.to_string(), Style::default().fg(Color::DarkGray)))
    } else {
        let visible_text: String = input
            .value()
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Paragraph::new(visible_text).style(Style::default().fg(ACCENT))
    };
    frame.render_widget(paragraph.block(block), area);

    if show_cursor {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

/// One-line selector rendered as `< value >`
fn selector_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::Black).bg(ACCENT)
    } else {
        Style::default().fg(Color::White)
    };
    Line::from(vec![
        Span::styled(format!("{:<10}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(format!(" < {} > ", value), style),
    ])
}

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    if app.is_locked() {
        render_lock_screen(app, frame, area);
        return;
    }

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let panel_area = if app.show_sidebar {
        let [sidebar_area, panel_area] =
            Layout::horizontal([Constraint::Length(18), Constraint::Min(0)]).areas(body_area);
        render_sidebar(app, frame, sidebar_area);
        panel_area
    } else {
        body_area
    };

    if !app.has_api_key {
        let [warning_area, rest] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(panel_area);
        let warning = Paragraph::new(Line::from(vec![
            Span::styled(" No API key. ", Style::default().fg(Color::Red).bold()),
            Span::styled(
                "Set GEMINI_API_KEY or add \"api_key\" to the config file.",
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        frame.render_widget(warning, warning_area);
        render_panel(app, frame, rest);
    } else {
        render_panel(app, frame, panel_area);
    }

    render_footer(app, frame, footer_area);
}

fn render_panel(app: &App, frame: &mut Frame, area: Rect) {
    match &app.panel {
        Panel::Chat(chat) => render_chat(app, chat, frame, area),
        Panel::Studio(studio) => render_studio(app, studio, frame, area),
        Panel::Automate(automate) => render_automate(app, automate, frame, area),
        Panel::Plan(plan) => render_plan(app, plan, frame, area),
        Panel::News(news) => render_news(app, news, frame, area),
        Panel::Raw(raw) => render_raw(app, raw, frame, area),
    }
}

fn render_lock_screen(app: &App, frame: &mut Frame, area: Rect) {
    let popup_width = 40.min(area.width);
    let popup_height = 11.min(area.height);
    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let dot_color = if app.lock.has_error() { Color::Red } else { GOLD };
    let mut dots = Vec::new();
    for i in 0..PIN_LENGTH {
        let (symbol, style) = if i < app.lock.entered_len() {
            ("●", Style::default().fg(dot_color))
        } else {
            ("○", Style::default().fg(Color::DarkGray))
        };
        dots.push(Span::styled(format!(" {} ", symbol), style));
    }

    let status = if app.lock.has_error() {
        Span::styled("Incorrect PIN", Style::default().fg(Color::Red))
    } else {
        Span::styled("Enter your PIN", Style::default().fg(Color::DarkGray))
    };

    let lines = vec![
        Line::default(),
        Line::from(Span::styled("PIN AI", Style::default().fg(ACCENT).bold())),
        Line::from(Span::styled(
            "IDENTITY VERIFICATION",
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
        Line::from(dots),
        Line::default(),
        Line::from(status),
        Line::default(),
        Line::from(Span::styled(
            "Default Security PIN: 1234",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(GOLD));
    let paragraph = Paragraph::new(lines)
        .alignment(ratatui::layout::Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, popup_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(" Pin Ai ", Style::default().fg(ACCENT).bold()),
        Span::styled(format!("| {} ", app.view.title()), Style::default().fg(Color::White)),
        Span::styled(format!("| {} ", app.model_label()), Style::default().fg(GOLD)),
        Span::styled(format!("| {} ", app.language.as_str()), Style::default().fg(Color::White)),
    ];
    if app.fast_mode {
        spans.push(Span::styled("| fast ", Style::default().fg(Color::Green)));
    }
    spans.push(Span::styled(
        format!("v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::Gray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_sidebar(app: &App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = View::all()
        .iter()
        .map(|view| ListItem::new(format!(" {} {}", view.hotkey(), view.title())))
        .collect();

    let selected = View::all().iter().position(|v| *v == app.view);
    let mut state = ListState::default().with_selected(selected);

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Views "),
        )
        .highlight_style(
            Style::default()
                .bg(ACCENT)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &str, label: &str| {
        vec![
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];

    if let Some(notice) = &app.notice {
        spans.push(Span::styled(notice.clone(), Style::default().fg(GOLD)));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
        return;
    }

    let hints: Vec<(&str, &str)> = match (app.input_mode, app.view) {
        (InputMode::Editing, _) => vec![("Enter", "submit"), ("Esc", "done")],
        (InputMode::Normal, View::Chat) => vec![
            ("i", "type"),
            ("a", "attach"),
            ("x", "clear imgs"),
            ("f", "fast"),
            ("F1-4", "quick start"),
        ],
        (InputMode::Normal, View::Coding) => vec![("i", "type"), ("j/k", "scroll")],
        (InputMode::Normal, View::Studio) => vec![
            ("i", "prompt"),
            ("Tab", "type"),
            ("r", "ratio"),
            ("g", "generate"),
            ("j/k", "gallery"),
            ("s", "save"),
            ("o", "open"),
        ],
        (InputMode::Normal, View::Automate) => {
            vec![("Tab", "field"), ("←/→", "choose"), ("i", "type"), ("g", "generate")]
        }
        (InputMode::Normal, View::Fitness) => {
            vec![("Tab", "field"), ("←/→", "choose"), ("i", "type"), ("g", "plan")]
        }
        (InputMode::Normal, View::Routine) => vec![("i", "type"), ("g", "plan")],
        (InputMode::Normal, View::News) => vec![("i", "topic"), ("r", "refresh")],
        (InputMode::Normal, View::Raw) => vec![("Tab", "field"), ("i", "type"), ("g", "run")],
    };

    for (key, label) in hints {
        spans.extend(hint(key, label));
    }
    if app.input_mode == InputMode::Normal {
        spans.extend(hint("c", "copy"));
        spans.extend(hint("L", "lang"));
        spans.extend(hint("1-8", "view"));
        spans.extend(hint("q", "quit"));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_chat(app: &App, chat: &ChatPanel, frame: &mut Frame, area: Rect) {
    let attach_height = if chat.attachments.is_empty() { 0 } else { 1 };
    let quick_height = if chat.shows_quick_starts() { 1 } else { 0 };
    let status_height = if chat.status.is_some() { 1 } else { 0 };
    let [history_area, quick_area, attach_area, status_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(quick_height),
        Constraint::Length(attach_height),
        Constraint::Length(status_height),
        Constraint::Length(3),
    ])
    .areas(area);

    let coding = chat.mode.is_coding();
    let inner_width = history_area.width.saturating_sub(2) as usize;
    let mut lines: Vec<Line> = Vec::new();

    for msg in chat.session.messages() {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
                )));
                for line in msg.text.lines() {
                    for wrapped in wrap_text_to_width(line, inner_width) {
                        lines.push(Line::from(wrapped));
                    }
                }
                if !msg.images.is_empty() {
                    lines.push(Line::from(Span::styled(
                        format!("[{} image(s) attached]", msg.images.len()),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
            ChatRole::Model => {
                lines.push(Line::from(Span::styled(
                    "Pin Ai:",
                    Style::default().fg(GOLD).add_modifier(Modifier::BOLD),
                )));
                let style = match (msg.is_error, coding) {
                    (true, _) => Style::default().fg(Color::Red),
                    (false, true) => Style::default().fg(Color::Green),
                    (false, false) => Style::default(),
                };
                if coding {
                    for line in msg.text.lines() {
                        lines.push(Line::from(Span::styled(line.to_string(), style)));
                    }
                } else {
                    lines.extend(markdown_lines(&msg.text, inner_width, style));
                }
            }
        }
        lines.push(Line::default());
    }

    // Reply placeholder stays empty until the first fragment lands
    let waiting = chat.loading
        && chat.session.messages().last().is_some_and(|m| m.text.is_empty());
    if waiting {
        lines.pop();
        lines.push(thinking_line(app));
    }

    let visible = history_area.height.saturating_sub(2);
    let scroll = bottom_scroll(lines.len(), visible, chat.scroll_back);

    let title = if coding { " Coding Assistant " } else { " Chat " };
    let history = Paragraph::new(Text::from(lines))
        .block(field_block(title, false, false))
        .scroll((scroll, 0));
    frame.render_widget(history, history_area);

    if quick_height > 0 {
        let mut spans = vec![Span::styled("Quick start: ", Style::default().fg(Color::DarkGray))];
        for (i, (language, _)) in QUICK_STARTS.iter().enumerate() {
            spans.push(Span::styled(
                format!(" F{} ", i + 1),
                Style::default().bg(Color::DarkGray).fg(Color::White),
            ));
            spans.push(Span::raw(format!(" {}  ", language)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), quick_area);
    }

    if attach_height > 0 {
        let names: Vec<String> = chat
            .attachments
            .iter()
            .map(|image| format!("{} ({} KB)", image.mime_type, image.decoded_len() / 1024))
            .collect();
        let line = Line::from(vec![
            Span::styled("Attached: ", Style::default().fg(GOLD)),
            Span::raw(names.join(", ")),
        ]);
        frame.render_widget(Paragraph::new(line), attach_area);
    }

    if let Some(status) = &chat.status {
        frame.render_widget(
            Paragraph::new(Span::styled(status.clone(), Style::default().fg(Color::Red))),
            status_area,
        );
    }

    let editing = app.input_mode == InputMode::Editing;
    match &chat.attach_path {
        Some(path) => render_text_input(
            frame,
            input_area,
            path,
            field_block("Image path (Enter to attach, Esc to cancel)", true, editing),
            "~/Pictures/photo.jpg",
            editing,
        ),
        None => {
            let (title, hint) = if coding {
                ("Code request", "Describe the code you need...")
            } else {
                ("Message", "Ask Pin Ai anything...")
            };
            render_text_input(
                frame,
                input_area,
                &chat.input,
                field_block(title, true, editing),
                hint,
                editing,
            );
        }
    }
}

fn media_location(media: &GeneratedMedia) -> String {
    if let Some(path) = media.url.strip_prefix("file://") {
        path.to_string()
    } else {
        let kb = media.url.len() * 3 / 4 / 1024;
        format!("in memory, {} KB", kb)
    }
}

fn render_studio(app: &App, studio: &StudioPanel, frame: &mut Frame, area: Rect) {
    let [tabs_area, prompt_area, status_area, gallery_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    let mut tabs = Vec::new();
    for kind in MediaKind::all() {
        let style = if kind == studio.tab {
            Style::default().bg(ACCENT).fg(Color::Black).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        tabs.push(Span::styled(format!(" {} ", kind.as_str().to_uppercase()), style));
        tabs.push(Span::raw(" "));
    }
    if studio.tab == MediaKind::Video {
        tabs.push(Span::styled(
            format!(" {} ", studio.aspect_ratio.display_name()),
            Style::default().fg(GOLD),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(tabs)), tabs_area);

    let editing = app.input_mode == InputMode::Editing;
    render_text_input(
        frame,
        prompt_area,
        &studio.prompt,
        field_block("Prompt", true, editing),
        studio.prompt_hint(),
        editing,
    );

    let status_line = if studio.loading {
        let label = match studio.tab {
            MediaKind::Video => "Generating video, this can take a few minutes",
            MediaKind::Image => "Generating image",
            MediaKind::Audio => "Generating speech",
        };
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        Line::from(Span::styled(format!("{}{}", label, dots), Style::default().fg(GOLD)))
    } else if let Some(status) = &studio.status {
        Line::from(Span::styled(status.clone(), Style::default().fg(Color::Red)))
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(status_line), status_area);

    let block = field_block(&format!("Gallery ({})", studio.gallery.len()), false, false);
    if studio.gallery.is_empty() {
        frame.render_widget(
            Paragraph::new(placeholder("Generated media will appear here.")).block(block),
            gallery_area,
        );
        return;
    }

    let items: Vec<ListItem> = studio
        .gallery
        .iter()
        .map(|media| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        format!("[{}] ", media.kind.as_str().to_uppercase()),
                        Style::default().fg(GOLD),
                    ),
                    Span::raw(media.prompt.clone()),
                ]),
                Line::from(Span::styled(
                    format!("      {}", media_location(media)),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(studio.selected));
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, gallery_area, &mut state);
}

fn render_automate(app: &App, automate: &AutomatePanel, frame: &mut Frame, area: Rect) {
    let [message_area, options_area, reply_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Min(0),
    ])
    .areas(area);

    let editing = app.input_mode == InputMode::Editing;
    let message_focused = automate.field == AutomateField::Message;
    render_text_input(
        frame,
        message_area,
        &automate.message,
        field_block("Incoming message", message_focused, editing),
        "Paste the message you received...",
        editing && message_focused,
    );

    let options = vec![
        selector_line(
            "Platform",
            automate.platform.as_str(),
            automate.field == AutomateField::Platform,
        ),
        selector_line("Tone", automate.tone.as_str(), automate.field == AutomateField::Tone),
    ];
    frame.render_widget(
        Paragraph::new(options).block(field_block("Options", !message_focused, false)),
        options_area,
    );

    let text = if automate.loading {
        Text::from(thinking_line(app))
    } else {
        match &automate.reply {
            Some(reply) => Text::from(parse_markdown_line(reply)),
            None => placeholder("Your suggested reply will appear here."),
        }
    };
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(field_block("Suggested reply", false, false)),
        reply_area,
    );
}

fn render_plan(app: &App, plan: &PlanPanel, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;

    let plan_area = match plan.kind {
        PlanKind::Fitness => {
            let [inputs_area, selectors_area, plan_area] = Layout::vertical([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(0),
            ])
            .areas(area);
            let [age_area, weight_area] =
                Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .areas(inputs_area);

            let age_focused = plan.field == FitnessField::Age;
            let weight_focused = plan.field == FitnessField::Weight;
            render_text_input(
                frame,
                age_area,
                &plan.age,
                field_block("Age", age_focused, editing),
                "25",
                editing && age_focused,
            );
            render_text_input(
                frame,
                weight_area,
                &plan.weight,
                field_block("Weight (kg)", weight_focused, editing),
                "70",
                editing && weight_focused,
            );

            let selectors = vec![
                selector_line(
                    "Goal",
                    plan.profile.goal.as_str(),
                    plan.field == FitnessField::Goal,
                ),
                selector_line(
                    "Diet",
                    plan.profile.diet.as_str(),
                    plan.field == FitnessField::Diet,
                ),
            ];
            let selector_focused = matches!(plan.field, FitnessField::Goal | FitnessField::Diet);
            frame.render_widget(
                Paragraph::new(selectors).block(field_block("Preferences", selector_focused, false)),
                selectors_area,
            );
            plan_area
        }
        PlanKind::Routine => {
            let [details_area, plan_area] =
                Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
            render_text_input(
                frame,
                details_area,
                &plan.details,
                field_block("About your day", true, editing),
                "Student, classes 9-3, gym in the evening...",
                editing,
            );
            plan_area
        }
    };

    let title = match plan.kind {
        PlanKind::Fitness => "Your fitness plan",
        PlanKind::Routine => "Your daily routine",
    };
    let width = plan_area.width.saturating_sub(2) as usize;
    let text = if plan.loading {
        Text::from(thinking_line(app))
    } else {
        match &plan.plan {
            Some(body) => Text::from(markdown_lines(body, width, Style::default())),
            None => placeholder("Fill in the details and press g to generate a plan."),
        }
    };
    frame.render_widget(
        Paragraph::new(text)
            .block(field_block(title, false, false))
            .scroll((plan.scroll, 0)),
        plan_area,
    );
}

fn render_news(app: &App, news: &NewsPanel, frame: &mut Frame, area: Rect) {
    let source_count = news.news.as_ref().map_or(0, |n| n.sources.len());
    let sources_height = if source_count == 0 { 0 } else { (source_count.min(6) + 2) as u16 };
    let [topic_area, body_area, sources_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(sources_height),
    ])
    .areas(area);

    let editing = app.input_mode == InputMode::Editing;
    render_text_input(
        frame,
        topic_area,
        &news.topic,
        field_block("Topic", true, editing),
        "Search a topic...",
        editing,
    );

    let width = body_area.width.saturating_sub(2) as usize;
    let text = if news.loading {
        Text::from(thinking_line(app))
    } else if let Some(error) = &news.error {
        Text::from(Span::styled(
            format!("Could not load news: {}", error),
            Style::default().fg(Color::Red),
        ))
    } else {
        match &news.news {
            Some(item) => Text::from(markdown_lines(&item.text, width, Style::default())),
            None => placeholder("No news loaded."),
        }
    };
    frame.render_widget(
        Paragraph::new(text)
            .block(field_block(&format!("News ({})", app.language.as_str()), false, false))
            .scroll((news.scroll, 0)),
        body_area,
    );

    if let Some(item) = news.news.as_ref().filter(|n| !n.sources.is_empty()) {
        let items: Vec<ListItem> = item
            .sources
            .iter()
            .map(|source| {
                ListItem::new(Line::from(vec![
                    Span::styled(source.title.clone(), Style::default().fg(ACCENT)),
                    Span::styled(format!("  {}", source.uri), Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect();
        frame.render_widget(
            List::new(items).block(field_block("Sources", false, false)),
            sources_area,
        );
    }
}

fn render_raw(app: &App, raw: &RawPanel, frame: &mut Frame, area: Rect) {
    let [system_area, prompt_area, response_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let editing = app.input_mode == InputMode::Editing;
    let system_focused = raw.field == RawField::System;
    render_text_input(
        frame,
        system_area,
        &raw.system,
        field_block("System instruction", system_focused, editing),
        "Optional system instruction",
        editing && system_focused,
    );
    render_text_input(
        frame,
        prompt_area,
        &raw.prompt,
        field_block("Prompt", !system_focused, editing),
        "Enter raw prompt...",
        editing && !system_focused,
    );

    let text = if raw.loading {
        Text::from(thinking_line(app))
    } else {
        match &raw.response {
            Some(response) => Text::from(
                response
                    .lines()
                    .map(|line| Line::from(line.to_string()))
                    .collect::<Vec<_>>(),
            ),
            None => placeholder("Response will appear here."),
        }
    };
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(field_block(&format!("Output: {}", app.model_label()), false, false))
            .scroll((raw.scroll, 0)),
        response_area,
    );
}
