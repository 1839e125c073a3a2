use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pinai_core::options::{cycle, DietPreference, FitnessGoal, ReplyTone, SocialPlatform, VideoAspectRatio};
use pinai_core::MediaKind;

use crate::app::{App, InputMode, Panel, View};
use crate::panels::{AutomateField, FitnessField, RawField, QUICK_STARTS};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(Instant::now()),
        AppEvent::Task(task) => app.apply_task(task),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.is_locked() {
        handle_lock_key(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_lock_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() => app.press_pin_digit(c),
        KeyCode::Backspace => app.lock.backspace(),
        KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            if let Some(view) = View::from_hotkey(c) {
                app.navigate(view);
            }
            return;
        }
        KeyCode::Char('b') => {
            app.show_sidebar = !app.show_sidebar;
            return;
        }
        KeyCode::Char('L') => {
            app.cycle_language(true);
            return;
        }
        KeyCode::Char('c') => {
            copy_output(app);
            return;
        }
        _ => {}
    }

    match app.view {
        View::Chat | View::Coding => handle_chat_normal(app, key),
        View::Studio => handle_studio_normal(app, key),
        View::Automate => handle_automate_normal(app, key),
        View::Fitness | View::Routine => handle_plan_normal(app, key),
        View::News => handle_news_normal(app, key),
        View::Raw => handle_raw_normal(app, key),
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('i') => app.input_mode = InputMode::Editing,
        KeyCode::Char('a') => app.begin_attach(),
        KeyCode::Char('f') if app.view == View::Chat => app.toggle_fast_mode(),
        KeyCode::F(n) if (1..=4).contains(&n) => {
            let show = matches!(&app.panel, Panel::Chat(chat) if chat.shows_quick_starts());
            if show {
                let (_, greeting) = QUICK_STARTS[(n - 1) as usize];
                app.send_chat(Some(greeting));
            }
        }
        _ => {
            if let Panel::Chat(chat) = &mut app.panel {
                match key.code {
                    KeyCode::Char('x') => chat.attachments.clear(),
                    KeyCode::Char('k') | KeyCode::Up => {
                        chat.scroll_back = chat.scroll_back.saturating_add(1)
                    }
                    KeyCode::Char('j') | KeyCode::Down => {
                        chat.scroll_back = chat.scroll_back.saturating_sub(1)
                    }
                    KeyCode::PageUp => chat.scroll_back = chat.scroll_back.saturating_add(10),
                    KeyCode::PageDown => chat.scroll_back = chat.scroll_back.saturating_sub(10),
                    KeyCode::Char('G') | KeyCode::End => chat.scroll_back = 0,
                    _ => {}
                }
            }
        }
    }
}

fn handle_studio_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('i') => app.input_mode = InputMode::Editing,
        KeyCode::Char('g') => app.generate_media(),
        KeyCode::Char('s') => app.save_selected_media(false),
        KeyCode::Char('o') => app.save_selected_media(true),
        _ => {
            let Panel::Studio(studio) = &mut app.panel else {
                return;
            };
            match key.code {
                KeyCode::Tab if !studio.loading => {
                    studio.tab = cycle(&MediaKind::all(), studio.tab, true);
                }
                KeyCode::BackTab if !studio.loading => {
                    studio.tab = cycle(&MediaKind::all(), studio.tab, false);
                }
                KeyCode::Char('r') if studio.tab == MediaKind::Video => {
                    studio.aspect_ratio =
                        cycle(&VideoAspectRatio::all(), studio.aspect_ratio, true);
                }
                KeyCode::Char('j') | KeyCode::Down => studio.select_next(),
                KeyCode::Char('k') | KeyCode::Up => studio.select_prev(),
                _ => {}
            }
        }
    }
}

fn handle_automate_normal(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('g') {
        app.generate_reply();
        return;
    }
    let Panel::Automate(automate) = &mut app.panel else {
        return;
    };
    let forward = matches!(key.code, KeyCode::Right | KeyCode::Char('l'));
    match (key.code, automate.field) {
        (KeyCode::Tab, _) => automate.next_field(),
        (KeyCode::Enter | KeyCode::Char('i'), AutomateField::Message) => {
            app.input_mode = InputMode::Editing
        }
        (KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l'), AutomateField::Platform) => {
            automate.platform = cycle(&SocialPlatform::all(), automate.platform, forward);
        }
        (KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l'), AutomateField::Tone) => {
            automate.tone = cycle(&ReplyTone::all(), automate.tone, forward);
        }
        _ => {}
    }
}

fn handle_plan_normal(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('g') {
        app.generate_plan();
        return;
    }
    let Panel::Plan(plan) = &mut app.panel else {
        return;
    };
    let forward = matches!(key.code, KeyCode::Right | KeyCode::Char('l'));
    let text_field = app.view == View::Routine
        || matches!(plan.field, FitnessField::Age | FitnessField::Weight);
    match key.code {
        KeyCode::Tab if app.view == View::Fitness => plan.next_field(),
        KeyCode::Enter | KeyCode::Char('i') if text_field => app.input_mode = InputMode::Editing,
        KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => {
            match plan.field {
                FitnessField::Goal => {
                    plan.profile.goal = cycle(&FitnessGoal::all(), plan.profile.goal, forward)
                }
                FitnessField::Diet => {
                    plan.profile.diet = cycle(&DietPreference::all(), plan.profile.diet, forward)
                }
                _ => {}
            }
        }
        KeyCode::Char('j') | KeyCode::Down => plan.scroll = plan.scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => plan.scroll = plan.scroll.saturating_sub(1),
        _ => {}
    }
}

fn handle_news_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('i') => app.input_mode = InputMode::Editing,
        KeyCode::Char('r') | KeyCode::Char('g') => app.fetch_news(),
        _ => {
            if let Panel::News(news) = &mut app.panel {
                match key.code {
                    KeyCode::Char('j') | KeyCode::Down => news.scroll = news.scroll.saturating_add(1),
                    KeyCode::Char('k') | KeyCode::Up => news.scroll = news.scroll.saturating_sub(1),
                    _ => {}
                }
            }
        }
    }
}

fn handle_raw_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('i') => app.input_mode = InputMode::Editing,
        KeyCode::Char('g') => app.run_raw(),
        _ => {
            if let Panel::Raw(raw) = &mut app.panel {
                match key.code {
                    KeyCode::Tab => {
                        raw.field = match raw.field {
                            RawField::System => RawField::Prompt,
                            RawField::Prompt => RawField::System,
                        }
                    }
                    KeyCode::Char('j') | KeyCode::Down => raw.scroll = raw.scroll.saturating_add(1),
                    KeyCode::Char('k') | KeyCode::Up => raw.scroll = raw.scroll.saturating_sub(1),
                    _ => {}
                }
            }
        }
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.cancel_attach();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => submit_field(app),
        _ => {
            let Some(input) = app.focused_input_mut() else {
                app.input_mode = InputMode::Normal;
                return;
            };
            match key.code {
                KeyCode::Backspace => input.backspace(),
                KeyCode::Delete => input.delete(),
                KeyCode::Left => input.left(),
                KeyCode::Right => input.right(),
                KeyCode::Home => input.home(),
                KeyCode::End => input.end(),
                KeyCode::Char(c) => input.insert(c),
                _ => {}
            }
        }
    }
}

/// Enter in a text field: submit where the field is the panel's trigger,
/// otherwise just stop editing.
fn submit_field(app: &mut App) {
    app.input_mode = InputMode::Normal;
    let attaching = matches!(&app.panel, Panel::Chat(chat) if chat.attach_path.is_some());
    let raw_prompt = matches!(&app.panel, Panel::Raw(raw) if raw.field == RawField::Prompt);
    match app.view {
        View::Chat | View::Coding if attaching => app.submit_attach(),
        View::Chat | View::Coding => app.send_chat(None),
        View::Studio => app.generate_media(),
        View::News => app.fetch_news(),
        View::Raw if raw_prompt => app.run_raw(),
        View::Routine => app.generate_plan(),
        _ => {}
    }
}

fn copy_output(app: &mut App) {
    let Some(text) = app.copyable_text() else {
        return;
    };
    app.notice = Some(match copy_to_clipboard(&text) {
        Ok(()) => "Copied to clipboard!".to_string(),
        Err(e) => {
            tracing::warn!("clipboard unavailable: {}", e);
            format!("Clipboard unavailable: {}", e)
        }
    });
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::AppEvent;
    use pinai_core::{Config, GeminiClient, Orchestrator};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let orchestrator = Orchestrator::new(Arc::new(GeminiClient::new(None)));
        (App::new(orchestrator, &Config::default(), None, tx), rx)
    }

    #[test]
    fn test_locked_app_only_takes_digits() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.view, View::Chat);
        assert!(app.is_locked());
        assert_eq!(app.lock.entered_len(), 1);

        press(&mut app, KeyCode::Backspace);
        type_str(&mut app, "1234");
        assert!(!app.is_locked());
    }

    #[test]
    fn test_ctrl_c_quits_even_when_locked() {
        let (mut app, _rx) = test_app();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_number_keys_route_views() {
        let (mut app, _rx) = test_app();
        type_str(&mut app, "1234");
        press(&mut app, KeyCode::Char('8'));
        assert_eq!(app.view, View::Raw);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.view, View::Studio);
    }

    #[tokio::test]
    async fn test_digits_type_while_editing() {
        let (mut app, _rx) = test_app();
        type_str(&mut app, "1234");
        press(&mut app, KeyCode::Char('5'));
        assert_eq!(app.view, View::Fitness);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Editing);
        type_str(&mut app, "42");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.view, View::Fitness);
        match &app.panel {
            Panel::Plan(plan) => assert_eq!(plan.age.value(), "42"),
            other => panic!("unexpected panel {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_automate_selectors_cycle() {
        let (mut app, _rx) = test_app();
        type_str(&mut app, "1234");
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Left);
        match &app.panel {
            Panel::Automate(automate) => {
                assert_eq!(automate.platform, SocialPlatform::Instagram);
                assert_eq!(automate.tone, ReplyTone::Empathetic);
            }
            other => panic!("unexpected panel {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_chat_input_does_not_send() {
        let (mut app, _rx) = test_app();
        type_str(&mut app, "1234");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        match &app.panel {
            Panel::Chat(chat) => {
                assert!(!chat.loading);
                assert_eq!(chat.session.messages().len(), 1);
            }
            other => panic!("unexpected panel {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_studio_tabs_and_aspect_ratio() {
        let (mut app, _rx) = test_app();
        type_str(&mut app, "1234");
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('r'));
        match &app.panel {
            Panel::Studio(studio) => {
                assert_eq!(studio.tab, MediaKind::Video);
                assert_eq!(studio.aspect_ratio, VideoAspectRatio::Portrait);
            }
            other => panic!("unexpected panel {:?}", other),
        }
    }
}
