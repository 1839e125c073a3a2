use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::Result;
use crate::wire::{GenerateContentRequest, GenerateContentResponse, VideoOperation, VideoRequest};

/// Stream of partial responses from a streaming call
pub type ResponseStream = BoxStream<'static, Result<GenerateContentResponse>>;

/// Calls the orchestrator needs from a hosted model provider.
///
/// The Gemini REST client is the production implementation; tests plug in
/// scripted backends.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;

    async fn stream_generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<ResponseStream>;

    /// Submit a long-running video job.
    async fn start_video(&self, model: &str, request: &VideoRequest) -> Result<VideoOperation>;

    /// Fetch the current state of a video job.
    async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoOperation>;

    /// Download a generated file by URI.
    async fn download(&self, uri: &str) -> Result<Vec<u8>>;
}
