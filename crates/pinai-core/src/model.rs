/// Model identifiers used by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    /// Higher-capability multimodal model (vision and coding)
    Pro,
    /// Default balanced text model
    Flash,
    /// Low-latency text model for fast mode
    FlashLite,
    FlashImage,
    FlashTts,
    VeoFast,
}

impl Model {
    pub fn id(&self) -> &'static str {
        match self {
            Model::Pro => "gemini-3-pro-preview",
            Model::Flash => "gemini-2.5-flash",
            Model::FlashLite => "gemini-flash-lite-latest",
            Model::FlashImage => "gemini-2.5-flash-image",
            Model::FlashTts => "gemini-2.5-flash-preview-tts",
            Model::VeoFast => "veo-3.1-fast-generate-preview",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Model::Pro => "Gemini 3 Pro",
            Model::Flash => "Gemini Flash 2.5",
            Model::FlashLite => "Gemini Flash Lite",
            Model::FlashImage => "Gemini Flash Image",
            Model::FlashTts => "Gemini TTS",
            Model::VeoFast => "Veo 3.1 Fast",
        }
    }
}

/// Pick the chat model for a turn.
///
/// First match wins: images, then coding mode, then fast mode. Images and
/// coding share the Pro model, so an image sent from the coding panel still
/// lands on the vision path.
pub fn select_chat_model(has_images: bool, is_coding_mode: bool, use_fast_model: bool) -> Model {
    if has_images || is_coding_mode {
        Model::Pro
    } else if use_fast_model {
        Model::FlashLite
    } else {
        Model::Flash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_table_all_combinations() {
        // (has_images, is_coding_mode, use_fast_model) -> expected
        let table = [
            ((false, false, false), Model::Flash),
            ((false, false, true), Model::FlashLite),
            ((false, true, false), Model::Pro),
            ((false, true, true), Model::Pro),
            ((true, false, false), Model::Pro),
            ((true, false, true), Model::Pro),
            ((true, true, false), Model::Pro),
            ((true, true, true), Model::Pro),
        ];

        for ((images, coding, fast), expected) in table {
            assert_eq!(
                select_chat_model(images, coding, fast),
                expected,
                "images={} coding={} fast={}",
                images,
                coding,
                fast
            );
        }
    }

    #[test]
    fn test_images_beat_fast_mode() {
        assert_eq!(select_chat_model(true, false, true).id(), "gemini-3-pro-preview");
    }
}
