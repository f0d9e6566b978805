//! Capability contracts — the narrow interfaces a backend may satisfy.
//!
//! A backend implements whichever of these it supports. The registry binds
//! model ids to trait objects, so request handling never knows which vendor
//! sits behind a model. `HttpProvider` in `http_provider.rs` implements all of
//! them for OpenAI-compatible APIs.

use async_trait::async_trait;
use tokio::sync::mpsc;

use oxigate_core::types::{CompleteOptions, Delta, Image, Message, Model, Speech};
use oxigate_core::Result;

/// Lists the models a backend serves.
#[async_trait]
pub trait ModelLister: Send + Sync {
    async fn list_models(&self) -> Result<Vec<Model>>;
}

/// Chat completion.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Run a unary completion and return the assistant's reply.
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        options: &CompleteOptions,
    ) -> Result<Message>;

    /// Run a streamed completion, sending deltas to `tx` in emission order.
    ///
    /// Returns once the backend signals the end of the stream, a delta with a
    /// finish reason was sent, or the receiving side hung up.
    async fn complete_stream(
        &self,
        model: &str,
        messages: &[Message],
        options: &CompleteOptions,
        tx: mpsc::Sender<Delta>,
    ) -> Result<()>;
}

/// Text embedding.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>>;
}

/// Image generation.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, model: &str, prompt: &str) -> Result<Image>;
}

/// Text to speech.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, model: &str, input: &str, voice: Option<&str>) -> Result<Speech>;
}

/// Speech to text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, model: &str, audio: Vec<u8>, file_name: &str) -> Result<String>;
}
