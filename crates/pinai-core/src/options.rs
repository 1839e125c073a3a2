//! Closed option sets offered by the panels
//!
//! Every selector in the UI cycles through one of these enums, so adding a
//! variant forces every prompt template and renderer to handle it.

/// Languages the assistant can be asked to answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Tamil,
    Telugu,
    Malayalam,
    Kannada,
    Bengali,
    Marathi,
    Gujarati,
    Punjabi,
    Odia,
    Urdu,
}

impl Language {
    pub fn all() -> Vec<Language> {
        vec![
            Language::English,
            Language::Hindi,
            Language::Tamil,
            Language::Telugu,
            Language::Malayalam,
            Language::Kannada,
            Language::Bengali,
            Language::Marathi,
            Language::Gujarati,
            Language::Punjabi,
            Language::Odia,
            Language::Urdu,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Tamil => "Tamil",
            Language::Telugu => "Telugu",
            Language::Malayalam => "Malayalam",
            Language::Kannada => "Kannada",
            Language::Bengali => "Bengali",
            Language::Marathi => "Marathi",
            Language::Gujarati => "Gujarati",
            Language::Punjabi => "Punjabi",
            Language::Odia => "Odia",
            Language::Urdu => "Urdu",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|l| l.as_str().to_lowercase() == wanted)
    }

    pub fn is_english(&self) -> bool {
        *self == Language::English
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SocialPlatform {
    #[default]
    WhatsApp,
    Instagram,
    LinkedIn,
    Twitter,
    Facebook,
    Email,
}

impl SocialPlatform {
    pub fn all() -> Vec<SocialPlatform> {
        vec![
            SocialPlatform::WhatsApp,
            SocialPlatform::Instagram,
            SocialPlatform::LinkedIn,
            SocialPlatform::Twitter,
            SocialPlatform::Facebook,
            SocialPlatform::Email,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SocialPlatform::WhatsApp => "WhatsApp",
            SocialPlatform::Instagram => "Instagram",
            SocialPlatform::LinkedIn => "LinkedIn",
            SocialPlatform::Twitter => "Twitter (X)",
            SocialPlatform::Facebook => "Facebook",
            SocialPlatform::Email => "Email",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyTone {
    #[default]
    Casual,
    Professional,
    Friendly,
    Witty,
    Formal,
    Empathetic,
}

impl ReplyTone {
    pub fn all() -> Vec<ReplyTone> {
        vec![
            ReplyTone::Casual,
            ReplyTone::Professional,
            ReplyTone::Friendly,
            ReplyTone::Witty,
            ReplyTone::Formal,
            ReplyTone::Empathetic,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyTone::Casual => "Casual",
            ReplyTone::Professional => "Professional",
            ReplyTone::Friendly => "Friendly",
            ReplyTone::Witty => "Witty",
            ReplyTone::Formal => "Formal",
            ReplyTone::Empathetic => "Empathetic",
        }
    }
}

/// The only two aspect ratios the video model accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoAspectRatio {
    #[default]
    Landscape,
    Portrait,
}

impl VideoAspectRatio {
    pub fn all() -> Vec<VideoAspectRatio> {
        vec![VideoAspectRatio::Landscape, VideoAspectRatio::Portrait]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoAspectRatio::Landscape => "16:9",
            VideoAspectRatio::Portrait => "9:16",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            VideoAspectRatio::Landscape => "Landscape (16:9)",
            VideoAspectRatio::Portrait => "Portrait (9:16)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    Fitness,
    Routine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitnessGoal {
    #[default]
    WeightLoss,
    MuscleGain,
    Endurance,
    Flexibility,
}

impl FitnessGoal {
    pub fn all() -> Vec<FitnessGoal> {
        vec![
            FitnessGoal::WeightLoss,
            FitnessGoal::MuscleGain,
            FitnessGoal::Endurance,
            FitnessGoal::Flexibility,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessGoal::WeightLoss => "Weight Loss",
            FitnessGoal::MuscleGain => "Muscle Gain",
            FitnessGoal::Endurance => "Endurance",
            FitnessGoal::Flexibility => "Flexibility",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DietPreference {
    #[default]
    Vegetarian,
    NonVegetarian,
    Vegan,
    Eggetarian,
}

impl DietPreference {
    pub fn all() -> Vec<DietPreference> {
        vec![
            DietPreference::Vegetarian,
            DietPreference::NonVegetarian,
            DietPreference::Vegan,
            DietPreference::Eggetarian,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DietPreference::Vegetarian => "Vegetarian",
            DietPreference::NonVegetarian => "Non-Vegetarian",
            DietPreference::Vegan => "Vegan",
            DietPreference::Eggetarian => "Eggetarian",
        }
    }
}

/// Form values collected by the fitness planner
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FitnessProfile {
    pub age: String,
    pub weight: String,
    pub goal: FitnessGoal,
    pub diet: DietPreference,
}

impl FitnessProfile {
    /// Age and weight are required; goal and diet always have a value.
    pub fn is_complete(&self) -> bool {
        !self.age.trim().is_empty() && !self.weight.trim().is_empty()
    }

    pub fn details(&self) -> String {
        format!(
            "Age: {}, Weight: {}, Goal: {}, Diet: {}",
            self.age.trim(),
            self.weight.trim(),
            self.goal.as_str(),
            self.diet.as_str()
        )
    }
}

/// Step to the next (or previous) entry of an option list, wrapping around.
pub fn cycle<T: Copy + PartialEq>(options: &[T], current: T, forward: bool) -> T {
    let Some(idx) = options.iter().position(|o| *o == current) else {
        return current;
    };
    let len = options.len();
    let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
    options[next]
}
