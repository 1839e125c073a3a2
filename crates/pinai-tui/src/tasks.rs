//! Background request tasks
//!
//! Each task owns a clone of the orchestrator and reports back through the
//! event channel. Events carry the view and ticket they were started under so
//! the app can drop results that arrive after the user navigated away.

use std::future::Future;
use std::path::PathBuf;

use futures_util::StreamExt;
use pinai_core::{ChatRequest, GeneratedMedia, ImageAttachment, MediaKind, NewsItem, Orchestrator};
use tokio_util::sync::CancellationToken;

use crate::app::View;
use crate::tui::{AppEvent, EventSender};

/// Identifies the panel instance a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTag {
    pub view: View,
    pub ticket: u64,
}

#[derive(Debug)]
pub struct TaskEvent {
    pub tag: TaskTag,
    pub kind: TaskKind,
}

#[derive(Debug)]
pub enum TaskKind {
    ChatChunk { reply_id: String, text: String },
    ChatDone { reply_id: String },
    ChatFailed { reply_id: String, message: String },
    /// Automate, planner and raw console results
    Text(Result<String, String>),
    News(Result<NewsItem, String>),
    Media {
        kind: MediaKind,
        prompt: String,
        result: Result<String, String>,
    },
    Attached(Result<ImageAttachment, String>),
    Saved {
        result: Result<PathBuf, String>,
        opened: bool,
    },
}

fn send(tx: &EventSender, tag: TaskTag, kind: TaskKind) -> bool {
    tx.send(AppEvent::Task(TaskEvent { tag, kind })).is_ok()
}

/// Stream a chat reply, forwarding each fragment as it arrives.
pub fn spawn_chat(
    orchestrator: Orchestrator,
    request: ChatRequest,
    reply_id: String,
    tag: TaskTag,
    cancel: CancellationToken,
    tx: EventSender,
) {
    tokio::spawn(async move {
        let opened = tokio::select! {
            _ = cancel.cancelled() => return,
            stream = orchestrator.stream_chat(request) => stream,
        };

        let mut stream = match opened {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("chat request failed: {}", e);
                send(&tx, tag, TaskKind::ChatFailed { reply_id, message: e.to_string() });
                return;
            }
        };

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("chat stream abandoned");
                    return;
                }
                next = stream.next() => next,
            };

            match next {
                Some(Ok(text)) => {
                    let chunk = TaskKind::ChatChunk {
                        reply_id: reply_id.clone(),
                        text,
                    };
                    if !send(&tx, tag, chunk) {
                        return;
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!("chat stream failed: {}", e);
                    send(&tx, tag, TaskKind::ChatFailed { reply_id, message: e.to_string() });
                    return;
                }
                None => break,
            }
        }

        send(&tx, tag, TaskKind::ChatDone { reply_id });
    });
}

/// Run a single-shot request and deliver its result.
pub fn spawn_request<T, F>(
    tag: TaskTag,
    cancel: CancellationToken,
    tx: EventSender,
    request: F,
    wrap: fn(Result<T, String>) -> TaskKind,
) where
    T: Send + 'static,
    F: Future<Output = pinai_core::Result<T>> + Send + 'static,
{
    tokio::spawn(async move {
        let result = tokio::select! {
            _ = cancel.cancelled() => return,
            result = request => result,
        };
        if let Err(e) = &result {
            tracing::warn!(view = ?tag.view, "request failed: {}", e);
        }
        send(&tx, tag, wrap(result.map_err(|e| e.to_string())));
    });
}

pub fn spawn_media(
    orchestrator: Orchestrator,
    kind: MediaKind,
    prompt: String,
    aspect_ratio: pinai_core::options::VideoAspectRatio,
    tag: TaskTag,
    cancel: CancellationToken,
    tx: EventSender,
) {
    tokio::spawn(async move {
        let result = match kind {
            MediaKind::Image => orchestrator.generate_image(&prompt).await,
            MediaKind::Video => orchestrator.generate_video(&prompt, aspect_ratio, &cancel).await,
            MediaKind::Audio => orchestrator.generate_speech(&prompt).await,
        };
        if cancel.is_cancelled() {
            return;
        }
        if let Err(e) = &result {
            tracing::warn!(%kind, "media generation failed: {}", e);
        }
        let result = result.map_err(|e| e.to_string());
        send(&tx, tag, TaskKind::Media { kind, prompt, result });
    });
}

pub fn spawn_attach(path: PathBuf, tag: TaskTag, tx: EventSender) {
    tokio::spawn(async move {
        let result = pinai_core::attachment::encode_file(&path)
            .await
            .map_err(|e| e.to_string());
        send(&tx, tag, TaskKind::Attached(result));
    });
}

/// Write a gallery item to disk, optionally handing it to the system viewer.
pub fn spawn_save(
    media: GeneratedMedia,
    dir: PathBuf,
    open_after: bool,
    tag: TaskTag,
    tx: EventSender,
) {
    tokio::spawn(async move {
        let mut result = pinai_core::media::save_media(&media, &dir)
            .await
            .map_err(|e| e.to_string());
        let open_error = match &result {
            Ok(path) if open_after => open::that_detached(path).err().map(|e| {
                tracing::warn!(path = %path.display(), "could not open media: {}", e);
                format!("could not open {}: {}", path.display(), e)
            }),
            _ => None,
        };
        if let Some(e) = open_error {
            result = Err(e);
        }
        send(&tx, tag, TaskKind::Saved { result, opened: open_after });
    });
}
