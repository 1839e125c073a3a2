//! Per-view state
//!
//! Every panel owns its values exclusively. Navigating away drops the panel
//! and a fresh one is built on return.

use pinai_core::chat::{ChatSession, CODING_ERROR_REPLY, ERROR_REPLY};
use pinai_core::options::{
    FitnessProfile, PlanKind, ReplyTone, SocialPlatform, VideoAspectRatio,
};
use pinai_core::prompt::ChatMode;
use pinai_core::{GeneratedMedia, ImageAttachment, MediaKind, NewsItem};

pub const CHAT_GREETING: &str = "Hello! I am Pin Ai. I can see images and speak Indian languages. \
                                 Try attaching a photo or asking me something!";
pub const CODING_GREETING: &str =
    "// Pin Ai Coding Assistant Initialized...\n// Ready to help you write code.";
pub const DEFAULT_NEWS_TOPIC: &str = "Top Headlines India";
pub const DEFAULT_RAW_SYSTEM: &str = "You are a helpful AI.";
pub const REPLY_ERROR: &str = "Error generating reply.";
pub const PLAN_ERROR: &str = "Error generating plan.";
/// Chat status when a stream closes without any text
pub const EMPTY_REPLY_STATUS: &str = "No response received.";

/// Greetings offered while a general chat is still fresh
pub const QUICK_STARTS: [(&str, &str); 4] = [
    ("Tamil", "வணக்கம்! எப்படி இருக்கிறீர்கள்?"),
    ("Telugu", "నమస్కారం! మీరు ఎలా ఉన్నారు?"),
    ("Malayalam", "നമസ്കാരം! സുഖമാണോ?"),
    ("Kannada", "ನಮಸ್ಕಾರ! ಹೇಗಿದ್ದೀರಾ?"),
];

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line text field with a character cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| !c.is_control()) {
            self.insert(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    /// Return the current value and clear the field.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }
}

/// General chat and coding assistant
#[derive(Debug, Clone)]
pub struct ChatPanel {
    pub mode: ChatMode,
    pub session: ChatSession,
    pub input: TextInput,
    pub attachments: Vec<ImageAttachment>,
    /// Path prompt shown while picking an image
    pub attach_path: Option<TextInput>,
    pub loading: bool,
    pub reply_id: Option<String>,
    pub status: Option<String>,
    /// Lines scrolled up from the bottom
    pub scroll_back: u16,
}

impl ChatPanel {
    pub fn new(mode: ChatMode) -> Self {
        let greeting = match mode {
            ChatMode::General => CHAT_GREETING,
            ChatMode::Coding => CODING_GREETING,
        };
        Self {
            mode,
            session: ChatSession::with_greeting(greeting),
            input: TextInput::default(),
            attachments: Vec::new(),
            attach_path: None,
            loading: false,
            reply_id: None,
            status: None,
            scroll_back: 0,
        }
    }

    pub fn error_reply(&self) -> &'static str {
        match self.mode {
            ChatMode::General => ERROR_REPLY,
            ChatMode::Coding => CODING_ERROR_REPLY,
        }
    }

    /// Images are only offered in general chat.
    pub fn accepts_images(&self) -> bool {
        self.mode == ChatMode::General
    }

    pub fn can_send(&self) -> bool {
        !self.loading && (!self.input.is_blank() || !self.attachments.is_empty())
    }

    pub fn shows_quick_starts(&self) -> bool {
        self.mode == ChatMode::General && self.session.is_fresh() && !self.loading
    }
}

#[derive(Debug, Clone)]
pub struct StudioPanel {
    pub tab: MediaKind,
    pub prompt: TextInput,
    pub aspect_ratio: VideoAspectRatio,
    /// Newest first
    pub gallery: Vec<GeneratedMedia>,
    pub selected: usize,
    pub loading: bool,
    pub status: Option<String>,
}

impl Default for StudioPanel {
    fn default() -> Self {
        Self {
            tab: MediaKind::Image,
            prompt: TextInput::default(),
            aspect_ratio: VideoAspectRatio::default(),
            gallery: Vec::new(),
            selected: 0,
            loading: false,
            status: None,
        }
    }
}

impl StudioPanel {
    pub fn selected_media(&self) -> Option<&GeneratedMedia> {
        self.gallery.get(self.selected)
    }

    pub fn push_media(&mut self, media: GeneratedMedia) {
        self.gallery.insert(0, media);
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        if !self.gallery.is_empty() {
            self.selected = (self.selected + 1).min(self.gallery.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn prompt_hint(&self) -> &'static str {
        match self.tab {
            MediaKind::Image => "A futuristic cyberpunk city...",
            MediaKind::Video => "A neon cat running...",
            MediaKind::Audio => "Write a poem about rain and read it...",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutomateField {
    #[default]
    Message,
    Platform,
    Tone,
}

#[derive(Debug, Clone, Default)]
pub struct AutomatePanel {
    pub field: AutomateField,
    pub message: TextInput,
    pub platform: SocialPlatform,
    pub tone: ReplyTone,
    pub reply: Option<String>,
    pub loading: bool,
}

impl AutomatePanel {
    pub fn next_field(&mut self) {
        self.field = match self.field {
            AutomateField::Message => AutomateField::Platform,
            AutomateField::Platform => AutomateField::Tone,
            AutomateField::Tone => AutomateField::Message,
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitnessField {
    #[default]
    Age,
    Weight,
    Goal,
    Diet,
}

/// Fitness and routine planners share one panel shape
#[derive(Debug, Clone)]
pub struct PlanPanel {
    pub kind: PlanKind,
    pub field: FitnessField,
    pub age: TextInput,
    pub weight: TextInput,
    pub profile: FitnessProfile,
    /// Free-text description for the routine planner
    pub details: TextInput,
    pub plan: Option<String>,
    pub loading: bool,
    pub scroll: u16,
}

impl PlanPanel {
    pub fn new(kind: PlanKind) -> Self {
        Self {
            kind,
            field: FitnessField::default(),
            age: TextInput::default(),
            weight: TextInput::default(),
            profile: FitnessProfile::default(),
            details: TextInput::default(),
            plan: None,
            loading: false,
            scroll: 0,
        }
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            FitnessField::Age => FitnessField::Weight,
            FitnessField::Weight => FitnessField::Goal,
            FitnessField::Goal => FitnessField::Diet,
            FitnessField::Diet => FitnessField::Age,
        };
    }

    /// Details line for the prompt, or `None` while required inputs are missing.
    pub fn request_details(&self) -> Option<String> {
        match self.kind {
            PlanKind::Fitness => {
                let profile = FitnessProfile {
                    age: self.age.value().to_string(),
                    weight: self.weight.value().to_string(),
                    ..self.profile.clone()
                };
                profile.is_complete().then(|| profile.details())
            }
            PlanKind::Routine => {
                (!self.details.is_blank()).then(|| self.details.value().trim().to_string())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewsPanel {
    pub topic: TextInput,
    pub news: Option<NewsItem>,
    pub loading: bool,
    pub error: Option<String>,
    pub scroll: u16,
}

impl Default for NewsPanel {
    fn default() -> Self {
        Self {
            topic: TextInput::with_value(DEFAULT_NEWS_TOPIC),
            news: None,
            loading: false,
            error: None,
            scroll: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawField {
    System,
    #[default]
    Prompt,
}

#[derive(Debug, Clone)]
pub struct RawPanel {
    pub field: RawField,
    pub system: TextInput,
    pub prompt: TextInput,
    pub response: Option<String>,
    pub loading: bool,
    pub scroll: u16,
}

impl Default for RawPanel {
    fn default() -> Self {
        Self {
            field: RawField::default(),
            system: TextInput::with_value(DEFAULT_RAW_SYSTEM),
            prompt: TextInput::default(),
            response: None,
            loading: false,
            scroll: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_input_multibyte_editing() {
        let mut input = TextInput::default();
        input.insert_str("வணக்கம்");
        assert_eq!(input.cursor(), "வணக்கம்".chars().count());
        input.home();
        input.insert('!');
        input.end();
        input.backspace();
        assert!(input.value().starts_with('!'));
        assert_eq!(input.value().chars().count(), "வணக்கம்".chars().count());
    }

    #[test]
    fn test_text_input_take_clears() {
        let mut input = TextInput::with_value("hello");
        input.left();
        input.delete();
        assert_eq!(input.value(), "hell");
        assert_eq!(input.take(), "hell");
        assert!(input.is_blank());
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_chat_can_send_with_only_attachments() {
        let mut panel = ChatPanel::new(ChatMode::General);
        assert!(!panel.can_send());
        panel.attachments.push(ImageAttachment::from_bytes("image/png", b"x"));
        assert!(panel.can_send());
        panel.loading = true;
        assert!(!panel.can_send());
    }

    #[test]
    fn test_quick_starts_only_in_fresh_general_chat() {
        let mut chat = ChatPanel::new(ChatMode::General);
        assert!(chat.shows_quick_starts());
        chat.session.send("hi", vec![]);
        assert!(!chat.shows_quick_starts());
        assert!(!ChatPanel::new(ChatMode::Coding).shows_quick_starts());
    }

    #[test]
    fn test_fitness_requires_age_and_weight() {
        let mut panel = PlanPanel::new(PlanKind::Fitness);
        panel.age.insert_str("31");
        assert_eq!(panel.request_details(), None);
        panel.weight.insert_str("70");
        assert_eq!(
            panel.request_details().as_deref(),
            Some("Age: 31, Weight: 70, Goal: Weight Loss, Diet: Vegetarian")
        );
    }

    #[test]
    fn test_routine_requires_details() {
        let mut panel = PlanPanel::new(PlanKind::Routine);
        panel.details.insert_str("   ");
        assert_eq!(panel.request_details(), None);
        panel.details.insert_str("student, gym at 6pm");
        assert_eq!(panel.request_details().as_deref(), Some("student, gym at 6pm"));
    }

    #[test]
    fn test_gallery_newest_first() {
        let mut studio = StudioPanel::default();
        for prompt in ["first", "second"] {
            studio.push_media(GeneratedMedia {
                kind: MediaKind::Image,
                url: "data:image/png;base64,AA==".into(),
                prompt: prompt.into(),
            });
        }
        assert_eq!(studio.selected_media().map(|m| m.prompt.as_str()), Some("second"));
        studio.select_next();
        studio.select_next();
        assert_eq!(studio.selected, 1);
    }
}
