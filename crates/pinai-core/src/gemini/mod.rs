//! Gemini REST client

pub mod sse;

use std::collections::VecDeque;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::provider::{GenerationBackend, ResponseStream};
use crate::wire::{GenerateContentRequest, GenerateContentResponse, VideoOperation, VideoRequest};

use sse::{SseEvent, SseParser};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    /// A client without a key is valid; every call then fails with
    /// `Error::MissingApiKey`.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let key = self.api_key.as_deref().ok_or(Error::MissingApiKey)?;
        Ok(builder.header("x-goog-api-key", key))
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a non-success response into `Error::Api`, preferring the message
/// from Google's error envelope over the raw body.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&text)
        .map(|e| e.error.message)
        .unwrap_or(text);
    tracing::warn!(status = status.as_u16(), %message, "Gemini request failed");
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

fn summarize(model: &str, request: &GenerateContentRequest, method: &str) {
    let parts: usize = request.contents.iter().map(|c| c.parts.len()).sum();
    let inline = request
        .contents
        .iter()
        .flat_map(|c| c.parts.iter())
        .filter(|p| p.inline_data.is_some())
        .count();
    tracing::debug!(
        model,
        method,
        turns = request.contents.len(),
        parts,
        inline,
        system = request.system_instruction.is_some(),
        tools = request.tools.len(),
        "sending request"
    );
}

/// An error that surfaces after the stream opened arrives as an event
/// holding Google's error envelope instead of a response.
fn parse_event(event: &SseEvent) -> Result<GenerateContentResponse> {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&event.data) {
        tracing::warn!(message = %envelope.error.message, "Gemini stream reported an error");
        return Err(Error::Stream(envelope.error.message));
    }
    Ok(serde_json::from_str(&event.data)?)
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        summarize(model, request, "generateContent");
        let builder = self.client.post(self.model_url(model, "generateContent"));
        let response = self.authorized(builder)?.json(request).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn stream_generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<ResponseStream> {
        summarize(model, request, "streamGenerateContent");
        let url = format!("{}?alt=sse", self.model_url(model, "streamGenerateContent"));
        let builder = self.client.post(url);
        let response = self.authorized(builder)?.json(request).send().await?;
        let response = check_status(response).await?;

        let bytes = Box::pin(response.bytes_stream());
        let state = (bytes, SseParser::new(), VecDeque::new(), false);
        let stream = futures_util::stream::unfold(
            state,
            |(mut bytes, mut parser, mut pending, mut done)| async move {
                loop {
                    if let Some(item) = pending.pop_front() {
                        return Some((item, (bytes, parser, pending, done)));
                    }
                    if done {
                        return None;
                    }
                    match bytes.next().await {
                        Some(Ok(chunk)) => {
                            pending.extend(parser.feed(&chunk).iter().map(parse_event));
                        }
                        Some(Err(e)) => {
                            pending.push_back(Err(Error::Http(e)));
                            done = true;
                        }
                        None => {
                            pending.extend(parser.finish().as_ref().map(parse_event));
                            done = true;
                        }
                    }
                }
            },
        );

        Ok(stream.boxed())
    }

    async fn start_video(&self, model: &str, request: &VideoRequest) -> Result<VideoOperation> {
        tracing::debug!(
            model,
            aspect_ratio = %request.parameters.aspect_ratio,
            resolution = %request.parameters.resolution,
            "starting video job"
        );
        let builder = self.client.post(self.model_url(model, "predictLongRunning"));
        let response = self.authorized(builder)?.json(request).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoOperation> {
        let url = format!("{}/{}", self.base_url, operation.name);
        let response = self.authorized(self.client.get(url))?.send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn download(&self, uri: &str) -> Result<Vec<u8>> {
        let response = self.authorized(self.client.get(uri))?.send().await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        tracing::debug!(bytes = bytes.len(), "downloaded generated file");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_treated_as_missing() {
        assert!(!GeminiClient::new(Some("   ".into())).has_api_key());
        assert!(!GeminiClient::new(None).has_api_key());
        assert!(GeminiClient::new(Some("abc".into())).has_api_key());
    }

    #[test]
    fn test_model_url() {
        let client = GeminiClient::with_base_url(None, "http://localhost:9000/v1beta/");
        assert_eq!(
            client.model_url("gemini-2.5-flash", "generateContent"),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        // Unroutable base URL: reaching the network would produce an Http error instead
        let client = GeminiClient::with_base_url(None, "http://127.0.0.1:1");
        let err = client
            .generate("gemini-2.5-flash", &GenerateContentRequest::prompt("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingApiKey));
    }

    #[test]
    fn test_parse_event_reads_response_json() {
        let event = SseEvent {
            event: None,
            data: r#"{"candidates":[{"content":{"parts":[{"text":"Hi"}]}}]}"#.into(),
        };
        let response = parse_event(&event).unwrap();
        assert_eq!(response.text().as_deref(), Some("Hi"));

        let bad = SseEvent {
            event: None,
            data: "not json".into(),
        };
        assert!(matches!(parse_event(&bad), Err(Error::Json(_))));
    }

    #[test]
    fn test_error_event_mid_stream() {
        let event = SseEvent {
            event: None,
            data: r#"{"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#
                .into(),
        };
        match parse_event(&event) {
            Err(Error::Stream(message)) => assert_eq!(message, "The model is overloaded."),
            other => panic!("expected a stream error, got {:?}", other),
        }
    }
}
