use std::path::PathBuf;
use std::time::Instant;

use pinai_core::options::{cycle, Language, PlanKind};
use pinai_core::prompt::ChatMode;
use pinai_core::{
    select_chat_model, ChatRequest, Config, GeneratedMedia, MediaKind, Model, Orchestrator,
    SessionLock,
};
use tokio_util::sync::CancellationToken;

use crate::panels::{
    AutomateField, AutomatePanel, ChatPanel, FitnessField, NewsPanel, PlanPanel, RawField,
    RawPanel, StudioPanel, TextInput, EMPTY_REPLY_STATUS, PLAN_ERROR, REPLY_ERROR,
};
use crate::tasks::{self, TaskEvent, TaskKind, TaskTag};
use crate::tui::EventSender;

/// Every screen reachable from the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Chat,
    Coding,
    Studio,
    Automate,
    Fitness,
    Routine,
    News,
    Raw,
}

impl View {
    pub fn all() -> [View; 8] {
        [
            View::Chat,
            View::Coding,
            View::Studio,
            View::Automate,
            View::Fitness,
            View::Routine,
            View::News,
            View::Raw,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Chat => "Chat",
            View::Coding => "Coding",
            View::Studio => "Studio",
            View::Automate => "Automate",
            View::Fitness => "Fitness",
            View::Routine => "Routine",
            View::News => "News",
            View::Raw => "Raw Mode",
        }
    }

    /// Number key that routes to this view
    pub fn hotkey(&self) -> char {
        let idx = Self::all().iter().position(|v| v == self).unwrap_or(0);
        char::from(b'1' + idx as u8)
    }

    pub fn from_hotkey(c: char) -> Option<View> {
        let idx = c.to_digit(10)?.checked_sub(1)? as usize;
        Self::all().get(idx).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// State of the active view
#[derive(Debug, Clone)]
pub enum Panel {
    Chat(ChatPanel),
    Studio(StudioPanel),
    Automate(AutomatePanel),
    Plan(PlanPanel),
    News(NewsPanel),
    Raw(RawPanel),
}

impl Panel {
    pub fn for_view(view: View) -> Self {
        match view {
            View::Chat => Panel::Chat(ChatPanel::new(ChatMode::General)),
            View::Coding => Panel::Chat(ChatPanel::new(ChatMode::Coding)),
            View::Studio => Panel::Studio(StudioPanel::default()),
            View::Automate => Panel::Automate(AutomatePanel::default()),
            View::Fitness => Panel::Plan(PlanPanel::new(PlanKind::Fitness)),
            View::Routine => Panel::Plan(PlanPanel::new(PlanKind::Routine)),
            View::News => Panel::News(NewsPanel::default()),
            View::Raw => Panel::Raw(RawPanel::default()),
        }
    }

    pub fn is_loading(&self) -> bool {
        match self {
            Panel::Chat(p) => p.loading,
            Panel::Studio(p) => p.loading,
            Panel::Automate(p) => p.loading,
            Panel::Plan(p) => p.loading,
            Panel::News(p) => p.loading,
            Panel::Raw(p) => p.loading,
        }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub lock: SessionLock,
    pub view: View,
    pub panel: Panel,
    pub input_mode: InputMode,
    pub show_sidebar: bool,

    // Shared options
    pub language: Language,
    pub fast_mode: bool,

    // In-flight request bookkeeping
    ticket: u64,
    cancel: CancellationToken,

    // Animation state
    pub animation_frame: u8,

    /// One-line feedback shown in the footer (copy, save, config errors)
    pub notice: Option<String>,

    pub orchestrator: Orchestrator,
    pub has_api_key: bool,
    events: EventSender,
    config_path: Option<PathBuf>,
    media_dir: PathBuf,
}

impl App {
    pub fn new(
        orchestrator: Orchestrator,
        config: &Config,
        config_path: Option<PathBuf>,
        events: EventSender,
    ) -> Self {
        Self {
            should_quit: false,
            lock: SessionLock::new(),
            view: View::Chat,
            panel: Panel::for_view(View::Chat),
            input_mode: InputMode::Normal,
            show_sidebar: true,

            language: config.language(),
            fast_mode: config.fast_mode,

            ticket: 0,
            cancel: CancellationToken::new(),

            animation_frame: 0,
            notice: None,

            has_api_key: config.resolve_api_key().is_some(),
            media_dir: config.media_dir(),
            orchestrator,
            events,
            config_path,
        }
    }

    fn tag(&self) -> TaskTag {
        TaskTag {
            view: self.view,
            ticket: self.ticket,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    pub fn press_pin_digit(&mut self, digit: char) {
        if self.lock.press(digit, Instant::now()) {
            // The landing view's entry work waits for the unlock
            self.enter_view();
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.lock.tick(now);
        self.animation_frame = (self.animation_frame + 1) % 3;
    }

    /// Switch views. The old panel is dropped and its in-flight request
    /// cancelled; late results are ignored by ticket.
    pub fn navigate(&mut self, view: View) {
        if self.is_locked() || view == self.view {
            return;
        }
        tracing::debug!(from = ?self.view, to = ?view, "navigate");

        self.restart_requests();

        self.view = view;
        self.panel = Panel::for_view(view);
        self.input_mode = InputMode::Normal;
        self.notice = None;
        self.enter_view();
    }

    fn enter_view(&mut self) {
        if self.view == View::News {
            self.fetch_news();
        }
    }

    pub fn model_label(&self) -> &'static str {
        match &self.panel {
            Panel::Chat(chat) => select_chat_model(
                !chat.attachments.is_empty(),
                chat.mode.is_coding(),
                self.fast_mode,
            )
            .display_name(),
            Panel::Studio(studio) => match studio.tab {
                MediaKind::Image => Model::FlashImage.display_name(),
                MediaKind::Video => Model::VeoFast.display_name(),
                MediaKind::Audio => Model::FlashTts.display_name(),
            },
            _ => Model::Flash.display_name(),
        }
    }

    pub fn cycle_language(&mut self, forward: bool) {
        self.language = cycle(&Language::all(), self.language, forward);
        if let Some(path) = &self.config_path {
            if let Err(e) = Config::save_default_language(path, self.language) {
                tracing::warn!("could not save language: {}", e);
                self.notice = Some(format!("Could not save language: {}", e));
            }
        }
        if self.view == View::News {
            // The summary in flight is in the old language
            self.restart_requests();
            if let Panel::News(news) = &mut self.panel {
                news.loading = false;
            }
            self.fetch_news();
        }
    }

    /// Cancel whatever the current panel is waiting on and retire its ticket.
    fn restart_requests(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.ticket += 1;
    }

    pub fn toggle_fast_mode(&mut self) {
        self.fast_mode = !self.fast_mode;
    }

    /// Text field that typed characters go to, if any
    pub fn focused_input_mut(&mut self) -> Option<&mut TextInput> {
        match &mut self.panel {
            Panel::Chat(chat) => match chat.attach_path.as_mut() {
                Some(path) => Some(path),
                None => Some(&mut chat.input),
            },
            Panel::Studio(studio) => Some(&mut studio.prompt),
            Panel::Automate(automate) => {
                (automate.field == AutomateField::Message).then_some(&mut automate.message)
            }
            Panel::Plan(plan) => match plan.kind {
                PlanKind::Routine => Some(&mut plan.details),
                PlanKind::Fitness => match plan.field {
                    FitnessField::Age => Some(&mut plan.age),
                    FitnessField::Weight => Some(&mut plan.weight),
                    FitnessField::Goal | FitnessField::Diet => None,
                },
            },
            Panel::News(news) => Some(&mut news.topic),
            Panel::Raw(raw) => match raw.field {
                RawField::System => Some(&mut raw.system),
                RawField::Prompt => Some(&mut raw.prompt),
            },
        }
    }

    // Actions

    /// Send the chat input, or `text_override` when a quick-start is picked.
    pub fn send_chat(&mut self, text_override: Option<&str>) {
        let tag = self.tag();
        let cancel = self.cancel.clone();
        let tx = self.events.clone();
        let orchestrator = self.orchestrator.clone();
        let (language, fast_mode) = (self.language, self.fast_mode);

        let Panel::Chat(chat) = &mut self.panel else {
            return;
        };
        if chat.loading {
            return;
        }
        let text = match text_override {
            Some(text) => text.to_string(),
            None if chat.can_send() => chat.input.take(),
            None => return,
        };

        let images = std::mem::take(&mut chat.attachments);
        let turn = chat.session.send(text, images);
        chat.loading = true;
        chat.reply_id = Some(turn.reply_id.clone());
        chat.scroll_back = 0;
        chat.status = None;

        let request = ChatRequest {
            history: turn.history,
            message: turn.message,
            images: turn.images,
            mode: chat.mode,
            language,
            use_fast_model: fast_mode,
        };
        tasks::spawn_chat(orchestrator, request, turn.reply_id, tag, cancel, tx);
    }

    pub fn begin_attach(&mut self) {
        if let Panel::Chat(chat) = &mut self.panel {
            if chat.accepts_images() && !chat.loading {
                chat.attach_path = Some(TextInput::default());
                self.input_mode = InputMode::Editing;
            }
        }
    }

    pub fn cancel_attach(&mut self) {
        if let Panel::Chat(chat) = &mut self.panel {
            chat.attach_path = None;
        }
    }

    pub fn submit_attach(&mut self) {
        let tag = self.tag();
        let tx = self.events.clone();
        let Panel::Chat(chat) = &mut self.panel else {
            return;
        };
        let Some(mut path) = chat.attach_path.take() else {
            return;
        };
        if path.is_blank() {
            return;
        }
        let path = expand_home(path.take().trim());
        tasks::spawn_attach(path, tag, tx);
    }

    pub fn generate_media(&mut self) {
        let tag = self.tag();
        let cancel = self.cancel.clone();
        let tx = self.events.clone();
        let orchestrator = self.orchestrator.clone();

        let Panel::Studio(studio) = &mut self.panel else {
            return;
        };
        if studio.loading || studio.prompt.is_blank() {
            return;
        }
        studio.loading = true;
        studio.status = None;
        let prompt = studio.prompt.value().trim().to_string();
        tasks::spawn_media(
            orchestrator,
            studio.tab,
            prompt,
            studio.aspect_ratio,
            tag,
            cancel,
            tx,
        );
    }

    pub fn save_selected_media(&mut self, open_after: bool) {
        let tag = self.tag();
        let tx = self.events.clone();
        let dir = self.media_dir.clone();
        let Panel::Studio(studio) = &self.panel else {
            return;
        };
        if let Some(media) = studio.selected_media() {
            tasks::spawn_save(media.clone(), dir, open_after, tag, tx);
        }
    }

    pub fn generate_reply(&mut self) {
        let tag = self.tag();
        let cancel = self.cancel.clone();
        let tx = self.events.clone();
        let orchestrator = self.orchestrator.clone();
        let language = self.language;

        let Panel::Automate(automate) = &mut self.panel else {
            return;
        };
        if automate.loading || automate.message.is_blank() {
            return;
        }
        automate.loading = true;
        let message = automate.message.value().to_string();
        let (platform, tone) = (automate.platform, automate.tone);
        tasks::spawn_request(
            tag,
            cancel,
            tx,
            async move {
                orchestrator
                    .generate_automated_reply(&message, platform, tone, language)
                    .await
            },
            TaskKind::Text,
        );
    }

    pub fn generate_plan(&mut self) {
        let tag = self.tag();
        let cancel = self.cancel.clone();
        let tx = self.events.clone();
        let orchestrator = self.orchestrator.clone();
        let language = self.language;

        let Panel::Plan(plan) = &mut self.panel else {
            return;
        };
        if plan.loading {
            return;
        }
        let Some(details) = plan.request_details() else {
            return;
        };
        plan.loading = true;
        plan.scroll = 0;
        let kind = plan.kind;
        tasks::spawn_request(
            tag,
            cancel,
            tx,
            async move { orchestrator.generate_plan(kind, &details, language).await },
            TaskKind::Text,
        );
    }

    pub fn fetch_news(&mut self) {
        let tag = self.tag();
        let cancel = self.cancel.clone();
        let tx = self.events.clone();
        let orchestrator = self.orchestrator.clone();
        let language = self.language;

        let Panel::News(news) = &mut self.panel else {
            return;
        };
        if news.loading || news.topic.is_blank() {
            return;
        }
        news.loading = true;
        news.error = None;
        let topic = news.topic.value().to_string();
        tasks::spawn_request(
            tag,
            cancel,
            tx,
            async move { orchestrator.latest_news(&topic, language).await },
            TaskKind::News,
        );
    }

    pub fn run_raw(&mut self) {
        let tag = self.tag();
        let cancel = self.cancel.clone();
        let tx = self.events.clone();
        let orchestrator = self.orchestrator.clone();

        let Panel::Raw(raw) = &mut self.panel else {
            return;
        };
        if raw.loading || raw.prompt.is_blank() {
            return;
        }
        raw.loading = true;
        raw.scroll = 0;
        let system = raw.system.value().to_string();
        let prompt = raw.prompt.value().to_string();
        tasks::spawn_request(
            tag,
            cancel,
            tx,
            async move { orchestrator.generate_raw_response(&system, &prompt).await },
            TaskKind::Text,
        );
    }

    /// Text the copy key puts on the clipboard for the active view
    pub fn copyable_text(&self) -> Option<String> {
        match &self.panel {
            Panel::Chat(chat) => chat
                .session
                .messages()
                .iter()
                .rev()
                .find(|m| m.role == pinai_core::ChatRole::Model && !m.text.is_empty())
                .map(|m| m.text.clone()),
            Panel::Automate(automate) => automate.reply.clone(),
            Panel::Plan(plan) => plan.plan.clone(),
            Panel::News(news) => news.news.as_ref().map(|n| n.text.clone()),
            Panel::Raw(raw) => raw.response.clone(),
            Panel::Studio(studio) => studio.selected_media().map(|m| m.prompt.clone()),
        }
    }

    /// Apply a background result, dropping it if it belongs to a panel that
    /// no longer exists.
    pub fn apply_task(&mut self, event: TaskEvent) {
        if event.tag != self.tag() {
            tracing::debug!(?event.tag, current = ?self.tag(), "dropping stale task event");
            return;
        }

        match (&mut self.panel, event.kind) {
            (Panel::Chat(chat), TaskKind::ChatChunk { reply_id, text }) => {
                chat.session.append_chunk(&reply_id, &text);
            }
            (Panel::Chat(chat), TaskKind::ChatDone { reply_id }) => {
                let fallback = chat.error_reply();
                if !chat.session.finish(&reply_id, fallback) {
                    tracing::warn!("chat stream ended without any text");
                    chat.status = Some(EMPTY_REPLY_STATUS.to_string());
                }
                chat.loading = false;
                chat.reply_id = None;
            }
            (Panel::Chat(chat), TaskKind::ChatFailed { reply_id, message }) => {
                let fallback = chat.error_reply();
                chat.session.mark_error(&reply_id, fallback);
                chat.loading = false;
                chat.reply_id = None;
                chat.status = Some(message);
            }
            (Panel::Chat(chat), TaskKind::Attached(result)) => match result {
                Ok(image) => {
                    chat.attachments.push(image);
                    chat.status = None;
                }
                Err(e) => chat.status = Some(e),
            },
            (Panel::Automate(automate), TaskKind::Text(result)) => {
                automate.reply = Some(result.unwrap_or_else(|_| REPLY_ERROR.to_string()));
                automate.loading = false;
            }
            (Panel::Plan(plan), TaskKind::Text(result)) => {
                plan.plan = Some(result.unwrap_or_else(|_| PLAN_ERROR.to_string()));
                plan.loading = false;
            }
            (Panel::Raw(raw), TaskKind::Text(result)) => {
                raw.response = Some(result.unwrap_or_else(|e| format!("Error: {}", e)));
                raw.loading = false;
            }
            (Panel::News(news), TaskKind::News(result)) => {
                match result {
                    Ok(item) => {
                        news.news = Some(item);
                        news.error = None;
                    }
                    Err(e) => news.error = Some(e),
                }
                news.loading = false;
                news.scroll = 0;
            }
            (Panel::Studio(studio), TaskKind::Media { kind, prompt, result }) => {
                match result {
                    Ok(url) => studio.push_media(GeneratedMedia { kind, url, prompt }),
                    Err(e) => {
                        studio.status =
                            Some(format!("Failed to generate {}. Please try again. ({})", kind, e))
                    }
                }
                studio.loading = false;
            }
            (Panel::Studio(studio), TaskKind::Saved { result, opened }) => {
                studio.status = Some(match (result, opened) {
                    (Ok(path), true) => format!("Opened {}", path.display()),
                    (Ok(path), false) => format!("Saved to {}", path.display()),
                    (Err(e), _) => format!("Could not save: {}", e),
                });
            }
            (_, kind) => {
                tracing::warn!(view = ?self.view, ?kind, "task event does not match panel");
            }
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinai_core::provider::ResponseStream;
    use pinai_core::wire::{
        Candidate, Content, GenerateContentRequest, GenerateContentResponse, Part, VideoOperation,
        VideoRequest,
    };
    use pinai_core::{GeminiClient, GenerationBackend};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    use crate::tui::AppEvent;

    fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let orchestrator = Orchestrator::new(Arc::new(GeminiClient::new(None)));
        let app = App::new(orchestrator, &Config::default(), None, tx);
        (app, rx)
    }

    fn unlock(app: &mut App) {
        for d in "1234".chars() {
            app.press_pin_digit(d);
        }
    }

    #[test]
    fn test_hotkeys_round_trip() {
        for view in View::all() {
            assert_eq!(View::from_hotkey(view.hotkey()), Some(view));
        }
        assert_eq!(View::from_hotkey('0'), None);
        assert_eq!(View::from_hotkey('9'), None);
    }

    #[tokio::test]
    async fn test_navigation_is_gated_by_lock() {
        let (mut app, _rx) = test_app();
        app.navigate(View::Studio);
        assert_eq!(app.view, View::Chat);

        unlock(&mut app);
        app.navigate(View::Studio);
        assert_eq!(app.view, View::Studio);
        assert!(matches!(app.panel, Panel::Studio(_)));
    }

    #[tokio::test]
    async fn test_navigation_resets_panel_state() {
        let (mut app, _rx) = test_app();
        unlock(&mut app);
        if let Panel::Chat(chat) = &mut app.panel {
            chat.input.insert_str("draft");
        }
        app.navigate(View::Coding);
        app.navigate(View::Chat);
        match &app.panel {
            Panel::Chat(chat) => {
                assert!(chat.input.is_blank());
                assert_eq!(chat.session.messages().len(), 1);
            }
            other => panic!("unexpected panel {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stale_events_are_dropped() {
        let (mut app, _rx) = test_app();
        unlock(&mut app);
        app.navigate(View::Automate);
        let stale = app.tag();

        app.navigate(View::Raw);
        app.navigate(View::Automate);
        app.apply_task(TaskEvent {
            tag: stale,
            kind: TaskKind::Text(Ok("late reply".into())),
        });
        match &app.panel {
            Panel::Automate(automate) => assert_eq!(automate.reply, None),
            other => panic!("unexpected panel {:?}", other),
        }

        let current = app.tag();
        app.apply_task(TaskEvent {
            tag: current,
            kind: TaskKind::Text(Err("quota".into())),
        });
        match &app.panel {
            Panel::Automate(automate) => {
                assert_eq!(automate.reply.as_deref(), Some(REPLY_ERROR))
            }
            other => panic!("unexpected panel {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_navigation_cancels_in_flight_request() {
        let (mut app, _rx) = test_app();
        unlock(&mut app);
        let cancel = app.cancel.clone();
        app.navigate(View::Raw);
        assert!(cancel.is_cancelled());
        assert!(!app.cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_chat_stream_events_build_reply() {
        let (mut app, _rx) = test_app();
        unlock(&mut app);
        if let Panel::Chat(chat) = &mut app.panel {
            chat.input.insert_str("hi");
        }
        app.send_chat(None);

        let (reply_id, loading) = match &app.panel {
            Panel::Chat(chat) => (chat.reply_id.clone().unwrap(), chat.loading),
            other => panic!("unexpected panel {:?}", other),
        };
        assert!(loading);

        // A second send while loading is ignored
        app.send_chat(Some("again"));

        let tag = app.tag();
        for (text, shown) in [("Hel", "Hel"), ("lo", "Hello"), (" world", "Hello world")] {
            app.apply_task(TaskEvent {
                tag,
                kind: TaskKind::ChatChunk {
                    reply_id: reply_id.clone(),
                    text: text.into(),
                },
            });
            match &app.panel {
                Panel::Chat(chat) => {
                    assert_eq!(chat.session.messages().last().unwrap().text, shown);
                    assert!(chat.loading);
                }
                other => panic!("unexpected panel {:?}", other),
            }
        }
        app.apply_task(TaskEvent {
            tag,
            kind: TaskKind::ChatDone { reply_id },
        });

        match &app.panel {
            Panel::Chat(chat) => {
                assert!(!chat.loading);
                let texts: Vec<&str> =
                    chat.session.messages().iter().map(|m| m.text.as_str()).collect();
                assert_eq!(&texts[1..], ["hi", "Hello world"]);
            }
            other => panic!("unexpected panel {:?}", other),
        }
        assert_eq!(app.copyable_text().as_deref(), Some("Hello world"));
    }

    #[tokio::test]
    async fn test_empty_stream_leaves_error_reply() {
        let (mut app, _rx) = test_app();
        unlock(&mut app);
        app.send_chat(Some("hi"));
        let reply_id = match &app.panel {
            Panel::Chat(chat) => chat.reply_id.clone().unwrap(),
            other => panic!("unexpected panel {:?}", other),
        };

        let tag = app.tag();
        app.apply_task(TaskEvent {
            tag,
            kind: TaskKind::ChatDone {
                reply_id: reply_id.clone(),
            },
        });

        match &app.panel {
            Panel::Chat(chat) => {
                assert!(!chat.loading);
                let reply = chat.session.messages().last().unwrap();
                assert_eq!(reply.id, reply_id);
                assert_eq!(reply.text, pinai_core::chat::ERROR_REPLY);
                assert!(reply.is_error);
                assert_eq!(chat.status.as_deref(), Some(EMPTY_REPLY_STATUS));
            }
            other => panic!("unexpected panel {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_coding_reply_uses_coding_error_line() {
        let (mut app, _rx) = test_app();
        unlock(&mut app);
        app.navigate(View::Coding);
        app.send_chat(Some("fizzbuzz"));
        let reply_id = match &app.panel {
            Panel::Chat(chat) => chat.reply_id.clone().unwrap(),
            other => panic!("unexpected panel {:?}", other),
        };
        let tag = app.tag();
        app.apply_task(TaskEvent {
            tag,
            kind: TaskKind::ChatFailed {
                reply_id,
                message: "Gemini API key is not configured.".into(),
            },
        });
        match &app.panel {
            Panel::Chat(chat) => {
                let last = chat.session.messages().last().unwrap();
                assert!(last.is_error);
                assert_eq!(last.text, pinai_core::chat::CODING_ERROR_REPLY);
                assert!(chat.status.is_some());
            }
            other => panic!("unexpected panel {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_news_fetches_on_entry() {
        let (mut app, _rx) = test_app();
        unlock(&mut app);
        app.navigate(View::News);
        assert!(app.panel.is_loading());
    }

    /// Answers every prompt with the prompt itself
    #[derive(Default)]
    struct EchoBackend {
        prompts: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl GenerationBackend for EchoBackend {
        async fn generate(
            &self,
            _model: &str,
            request: &GenerateContentRequest,
        ) -> pinai_core::Result<GenerateContentResponse> {
            let prompt = request.contents[0].parts[0].text.clone().unwrap_or_default();
            self.prompts.lock().unwrap().push(prompt.clone());
            Ok(GenerateContentResponse {
                candidates: vec![Candidate {
                    content: Some(Content {
                        role: Some("model".into()),
                        parts: vec![Part::text(prompt)],
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            })
        }

        async fn stream_generate(
            &self,
            _model: &str,
            _request: &GenerateContentRequest,
        ) -> pinai_core::Result<ResponseStream> {
            Err(pinai_core::Error::Cancelled)
        }

        async fn start_video(
            &self,
            _model: &str,
            _request: &VideoRequest,
        ) -> pinai_core::Result<VideoOperation> {
            Err(pinai_core::Error::Cancelled)
        }

        async fn poll_video(
            &self,
            _operation: &VideoOperation,
        ) -> pinai_core::Result<VideoOperation> {
            Err(pinai_core::Error::Cancelled)
        }

        async fn download(&self, _uri: &str) -> pinai_core::Result<Vec<u8>> {
            Err(pinai_core::Error::Cancelled)
        }
    }

    #[tokio::test]
    async fn test_language_change_refetches_news() {
        let backend = Arc::new(EchoBackend::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(Orchestrator::new(backend.clone()), &Config::default(), None, tx);
        unlock(&mut app);

        app.navigate(View::News);
        let first = app.tag();
        assert!(app.panel.is_loading());

        app.cycle_language(true);
        assert_eq!(app.language, Language::Hindi);
        assert_ne!(app.tag(), first);
        assert!(app.panel.is_loading());

        // Whatever the English request delivers is stale by now
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while app.panel.is_loading() {
                match rx.recv().await {
                    Some(AppEvent::Task(event)) => app.apply_task(event),
                    Some(_) => {}
                    None => break,
                }
            }
        })
        .await
        .unwrap();

        match &app.panel {
            Panel::News(news) => {
                let text = &news.news.as_ref().unwrap().text;
                assert!(text.contains("strictly in Hindi"), "got {:?}", text);
            }
            other => panic!("unexpected panel {:?}", other),
        }
        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts.last().unwrap().contains("strictly in Hindi"));
    }

    #[test]
    fn test_model_label_follows_fast_mode() {
        let (mut app, _rx) = test_app();
        assert_eq!(app.model_label(), Model::Flash.display_name());
        app.toggle_fast_mode();
        assert_eq!(app.model_label(), Model::FlashLite.display_name());
    }

    #[test]
    fn test_focus_skips_selector_fields() {
        let (mut app, _rx) = test_app();
        app.panel = Panel::Automate(AutomatePanel::default());
        assert!(app.focused_input_mut().is_some());
        if let Panel::Automate(automate) = &mut app.panel {
            automate.next_field();
        }
        assert!(app.focused_input_mut().is_none());
    }

    #[test]
    fn test_language_choice_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let (tx, _rx) = mpsc::unbounded_channel();
        let orchestrator = Orchestrator::new(Arc::new(GeminiClient::new(None)));
        let mut app = App::new(orchestrator, &Config::default(), Some(path.clone()), tx);

        app.cycle_language(true);
        assert_eq!(app.language, Language::Hindi);
        assert!(app.notice.is_none());
        assert_eq!(Config::load_from(&path).unwrap().language(), Language::Hindi);
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/tmp/a.png"), PathBuf::from("/tmp/a.png"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/a.png"), home.join("a.png"));
        }
    }
}
