//! Request orchestration
//!
//! Every panel operation is a method here. Each one assembles a provider
//! payload from the prompt builder and model selector, issues it through a
//! [`GenerationBackend`], and shapes the answer into something a panel can
//! show directly.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::media;
use crate::model::{select_chat_model, Model};
use crate::options::{Language, PlanKind, ReplyTone, SocialPlatform, VideoAspectRatio};
use crate::prompt::{self, ChatMode};
use crate::provider::GenerationBackend;
use crate::state::{ChatMessage, ImageAttachment, MediaKind, NewsItem, NewsSource};
use crate::wire::{
    Content, GenerateContentRequest, GenerationConfig, ImageConfig, Part, SpeechConfig, Tool,
    VideoInstance, VideoParameters, VideoRequest,
};

pub const REPLY_FALLBACK: &str = "Could not generate reply.";
pub const NEWS_FALLBACK: &str = "No news found.";
pub const PLAN_FALLBACK: &str = "Could not generate plan.";
pub const RAW_FALLBACK: &str = "No response generated.";

const SPEECH_VOICE: &str = "Kore";
const IMAGE_ASPECT_RATIO: &str = "1:1";
const VIDEO_RESOLUTION: &str = "720p";

/// Text fragments of one streamed chat reply, in arrival order
pub type ChatStream = BoxStream<'static, Result<String>>;

/// How long-running video jobs are waited on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_polls: 120,
        }
    }
}

/// One chat turn as the panel hands it over
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// Prior turns, oldest first
    pub history: Vec<ChatMessage>,
    pub message: String,
    pub images: Vec<ImageAttachment>,
    pub mode: ChatMode,
    pub language: Language,
    pub use_fast_model: bool,
}

impl ChatRequest {
    pub fn model(&self) -> Model {
        select_chat_model(
            !self.images.is_empty(),
            self.mode.is_coding(),
            self.use_fast_model,
        )
    }

    fn to_payload(&self) -> GenerateContentRequest {
        let mut contents: Vec<Content> = self.history.iter().map(Content::from_message).collect();

        let mut parts = vec![Part::text(self.message.clone())];
        parts.extend(self.images.iter().map(Part::inline));
        contents.push(Content::user(parts));

        GenerateContentRequest {
            contents,
            ..Default::default()
        }
        .with_system_instruction(prompt::system_instruction(self.mode, self.language))
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    backend: Arc<dyn GenerationBackend>,
    media_dir: PathBuf,
    poll: PollPolicy,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            media_dir: media::default_media_dir(),
            poll: PollPolicy::default(),
        }
    }

    pub fn with_media_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.media_dir = dir.into();
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn media_dir(&self) -> &std::path::Path {
        &self.media_dir
    }

    /// Start a streamed chat reply.
    ///
    /// Empty fragments are skipped. The first provider error is yielded and
    /// ends the stream. A response carrying only a block reason is yielded as
    /// `Error::Blocked`. Dropping the stream abandons the request.
    pub async fn stream_chat(&self, request: ChatRequest) -> Result<ChatStream> {
        let model = request.model();
        tracing::info!(
            model = model.id(),
            history = request.history.len(),
            images = request.images.len(),
            language = request.language.as_str(),
            "starting chat stream"
        );

        let responses = self
            .backend
            .stream_generate(model.id(), &request.to_payload())
            .await?;

        let fragments = responses
            .scan(false, |failed, item| {
                if *failed {
                    return futures_util::future::ready(None);
                }
                let next = match item {
                    Ok(response) => match (response.text(), response.block_reason()) {
                        (Some(text), _) => Ok(text),
                        (None, Some(reason)) => {
                            tracing::warn!(reason, "chat prompt blocked");
                            *failed = true;
                            Err(Error::Blocked {
                                reason: reason.to_string(),
                            })
                        }
                        (None, None) => Ok(String::new()),
                    },
                    Err(e) => {
                        *failed = true;
                        Err(e)
                    }
                };
                futures_util::future::ready(Some(next))
            })
            .filter(|item| {
                let keep = !matches!(item, Ok(text) if text.is_empty());
                futures_util::future::ready(keep)
            });

        Ok(fragments.boxed())
    }

    /// Callback form of [`Orchestrator::stream_chat`]: `on_chunk` runs once
    /// per fragment, in order, before the next one is awaited.
    pub async fn stream_chat_response<F>(&self, request: ChatRequest, mut on_chunk: F) -> Result<()>
    where
        F: FnMut(&str),
    {
        let mut stream = self.stream_chat(request).await?;
        while let Some(fragment) = stream.next().await {
            on_chunk(&fragment?);
        }
        Ok(())
    }

    pub async fn generate_automated_reply(
        &self,
        message: &str,
        platform: SocialPlatform,
        tone: ReplyTone,
        language: Language,
    ) -> Result<String> {
        let request =
            GenerateContentRequest::prompt(prompt::reply_prompt(message, platform, tone, language));
        let response = self.backend.generate(Model::Flash.id(), &request).await?;
        Ok(response.text().unwrap_or_else(|| REPLY_FALLBACK.to_string()))
    }

    /// Generate one square image and return it as a data URL.
    pub async fn generate_image(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            generation_config: Some(GenerationConfig {
                image_config: Some(ImageConfig {
                    aspect_ratio: IMAGE_ASPECT_RATIO.to_string(),
                }),
                ..Default::default()
            }),
            ..GenerateContentRequest::prompt(prompt)
        };

        let response = self.backend.generate(Model::FlashImage.id(), &request).await?;
        let blob = response
            .first_inline_data()
            .ok_or(Error::NoData(MediaKind::Image))?;
        Ok(media::data_url(&blob.mime_type, &blob.data))
    }

    /// Run a video job to completion and return a `file://` URL to the download.
    pub async fn generate_video(
        &self,
        prompt: &str,
        aspect_ratio: VideoAspectRatio,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let request = VideoRequest {
            instances: vec![VideoInstance {
                prompt: prompt.to_string(),
            }],
            parameters: VideoParameters {
                aspect_ratio: aspect_ratio.as_str().to_string(),
                resolution: VIDEO_RESOLUTION.to_string(),
                sample_count: 1,
            },
        };

        let mut operation = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            op = self.backend.start_video(Model::VeoFast.id(), &request) => op?,
        };
        tracing::info!(operation = %operation.name, "video job submitted");

        let mut polls = 0;
        while !operation.done {
            if polls >= self.poll.max_polls {
                tracing::warn!(operation = %operation.name, polls, "video job timed out");
                return Err(Error::PollTimeout { attempts: polls });
            }
            tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(self.poll.interval) => {}
            }
            operation = tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                op = self.backend.poll_video(&operation) => op?,
            };
            polls += 1;
            tracing::debug!(operation = %operation.name, polls, done = operation.done, "polled video job");
        }

        if let Some(error) = &operation.error {
            return Err(Error::video_failed(error.message.clone()));
        }
        let uri = operation
            .video_uri()
            .ok_or_else(|| Error::video_failed("no video URI in the finished job"))?;

        let bytes = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            bytes = self.backend.download(uri) => bytes?,
        };
        let path = media::save_video(&self.media_dir, &bytes).await?;
        media::file_url(&path)
    }

    /// Synthesize speech and return a playable audio data URL.
    pub async fn generate_speech(&self, text: &str) -> Result<String> {
        let request = GenerateContentRequest {
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig::prebuilt(SPEECH_VOICE)),
                ..Default::default()
            }),
            ..GenerateContentRequest::prompt(text)
        };

        let response = self.backend.generate(Model::FlashTts.id(), &request).await?;
        let blob = response
            .first_inline_data()
            .ok_or(Error::NoData(MediaKind::Audio))?;
        media::speech_data_url(&blob.mime_type, &blob.data)
    }

    /// Search-grounded news digest. Sources without a web reference are dropped.
    pub async fn latest_news(&self, topic: &str, language: Language) -> Result<NewsItem> {
        let request = GenerateContentRequest {
            tools: vec![Tool::google_search()],
            ..GenerateContentRequest::prompt(prompt::news_prompt(topic, language))
        };

        let response = self.backend.generate(Model::Flash.id(), &request).await?;
        let sources = response
            .grounding_chunks()
            .iter()
            .filter_map(|chunk| chunk.web.as_ref())
            .filter_map(|web| {
                let uri = web.uri.clone()?;
                let title = web.title.clone().unwrap_or_else(|| uri.clone());
                Some(NewsSource { uri, title })
            })
            .collect();

        Ok(NewsItem {
            text: response.text().unwrap_or_else(|| NEWS_FALLBACK.to_string()),
            sources,
        })
    }

    pub async fn generate_plan(
        &self,
        kind: PlanKind,
        details: &str,
        language: Language,
    ) -> Result<String> {
        let request = GenerateContentRequest::prompt(prompt::plan_prompt(kind, details, language));
        let response = self.backend.generate(Model::Flash.id(), &request).await?;
        Ok(response.text().unwrap_or_else(|| PLAN_FALLBACK.to_string()))
    }

    /// Send a prompt under a caller-chosen system instruction.
    pub async fn generate_raw_response(
        &self,
        system_instruction: &str,
        prompt: &str,
    ) -> Result<String> {
        let mut request = GenerateContentRequest::prompt(prompt);
        if !system_instruction.trim().is_empty() {
            request = request.with_system_instruction(system_instruction);
        }
        let response = self.backend.generate(Model::Flash.id(), &request).await?;
        Ok(response.text().unwrap_or_else(|| RAW_FALLBACK.to_string()))
    }
}
