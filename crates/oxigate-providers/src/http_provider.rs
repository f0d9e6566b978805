//! Generic HTTP backend for OpenAI-compatible APIs.
//!
//! Every preset (OpenAI, Azure, Ollama, llama.cpp, Groq, Mistral) reduces to
//! this adapter with a different base URL. It translates canonical requests to
//! the wire format, decodes unary and streamed responses, and applies the
//! optional model-id mapping in both directions.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use oxigate_core::config::ProviderConfig;
use oxigate_core::types::{CompleteOptions, Delta, Image, Message, Model, Speech};
use oxigate_core::{GatewayError, Result};

use crate::mapper::{ModelMapper, StaticModelMapper};
use crate::presets::find_preset;
use crate::stream::{SseDecoder, SseEvent};
use crate::traits::{Completer, Embedder, ModelLister, Renderer, Synthesizer};
use crate::wire::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, EmbeddingRequest,
    EmbeddingResponse, ImageRequest, ImageResponse, ModelListResponse, SpeechRequest,
};

/// Total timeout for unary calls. Streams are bounded by the caller instead.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub const AZURE_API_VERSION: &str = "2024-02-01";
const DEFAULT_VOICE: &str = "alloy";

// ─────────────────────────────────────────────
// Auth style
// ─────────────────────────────────────────────

/// How requests are authenticated and how endpoint URLs are laid out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <token>`, endpoints at `{base}/{op}`.
    Bearer,
    /// `api-key: <token>`, endpoints at
    /// `{base}/openai/deployments/{model}/{op}?api-version=...`.
    Azure { api_version: String },
}

impl AuthStyle {
    pub fn azure() -> Self {
        AuthStyle::Azure {
            api_version: AZURE_API_VERSION.to_string(),
        }
    }

    /// Pick the style from the base URL host.
    pub fn detect(base_url: &str) -> Self {
        let host = reqwest::Url::parse(base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .unwrap_or_default();

        if host.contains("openai.azure.com") {
            AuthStyle::azure()
        } else {
            AuthStyle::Bearer
        }
    }
}

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A backend reached over an OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// Shared, connection-pooled client.
    client: reqwest::Client,
    base_url: String,
    token: String,
    auth: AuthStyle,
    mapper: Option<Arc<dyn ModelMapper>>,
    name: String,
}

impl fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpProvider")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .field("mapper", &self.mapper)
            .finish()
    }
}

impl HttpProvider {
    /// Create a provider for `base_url`. The auth style is detected from the URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();

        HttpProvider {
            client,
            auth: AuthStyle::detect(&base_url),
            base_url,
            token: String::new(),
            mapper: None,
            name: "openai".to_string(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_mapper(mut self, mapper: Arc<dyn ModelMapper>) -> Self {
        self.mapper = Some(mapper);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Force an auth style, e.g. Azure behind a custom domain.
    pub fn with_auth(mut self, auth: AuthStyle) -> Self {
        self.auth = auth;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_style(&self) -> &AuthStyle {
        &self.auth
    }

    /// URL of operation `op` (e.g. `"chat/completions"`) for a backend model.
    pub(crate) fn endpoint(&self, op: &str, backend_model: &str) -> String {
        match &self.auth {
            AuthStyle::Bearer => format!("{}/{}", self.base_url, op),
            AuthStyle::Azure { api_version } => format!(
                "{}/openai/deployments/{}/{}?api-version={}",
                self.base_url, backend_model, op, api_version
            ),
        }
    }

    fn models_url(&self) -> String {
        match &self.auth {
            AuthStyle::Bearer => format!("{}/models", self.base_url),
            AuthStyle::Azure { api_version } => {
                format!("{}/openai/models?api-version={}", self.base_url, api_version)
            }
        }
    }

    pub(crate) fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.post(url))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.token.is_empty() {
            return builder;
        }
        match self.auth {
            AuthStyle::Bearer => builder.bearer_auth(&self.token),
            AuthStyle::Azure { .. } => builder.header("api-key", &self.token),
        }
    }

    /// Public model id → backend id.
    pub(crate) fn map_model(&self, model: &str) -> Result<String> {
        let Some(mapper) = &self.mapper else {
            return Ok(model.to_string());
        };
        let backend = mapper.to_backend(model);
        if backend.is_empty() {
            warn!(provider = %self.name, model = model, "No backend model for id");
            return Err(GatewayError::InvalidModelMapping {
                model: model.to_string(),
            });
        }
        Ok(backend)
    }

    /// Send a unary request and decode its JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = builder.timeout(REQUEST_TIMEOUT).send().await.map_err(|e| {
            error!(provider = %self.name, error = %e, "HTTP request failed");
            GatewayError::Transport(e)
        })?;
        let response = self.check_status(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            error!(provider = %self.name, error = %e, "Failed to parse backend response");
            GatewayError::Decode(e.to_string())
        })
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error body".to_string());
        error!(provider = %self.name, status = %status, body = %body, "Backend error");
        Err(GatewayError::Backend {
            status: status.as_u16(),
            body,
        })
    }

    /// Forward one decoded SSE event. Returns `false` once the stream is over.
    async fn forward_event(&self, event: SseEvent, tx: &mpsc::Sender<Delta>) -> Result<bool> {
        let payload = match event {
            SseEvent::Done => return Ok(false),
            SseEvent::Data(payload) => payload,
        };

        let chunk: ChatCompletionChunk = serde_json::from_str(&payload)
            .map_err(|e| GatewayError::Decode(format!("stream chunk: {e}")))?;
        let Some(choice) = chunk.choices.into_iter().next() else {
            return Ok(true);
        };

        let delta = Delta::from(choice);
        let last = delta.is_final();
        if tx.send(delta).await.is_err() {
            debug!(provider = %self.name, "Stream receiver dropped");
            return Ok(false);
        }
        Ok(!last)
    }
}

// ─────────────────────────────────────────────
// Capabilities
// ─────────────────────────────────────────────

#[async_trait]
impl ModelLister for HttpProvider {
    async fn list_models(&self) -> Result<Vec<Model>> {
        let url = self.models_url();
        debug!(provider = %self.name, url = %url, "Listing models");

        let list: ModelListResponse = self
            .send_json(self.authorize(self.client.get(&url)))
            .await?;

        let models = list
            .data
            .into_iter()
            .filter_map(|entry| match &self.mapper {
                Some(mapper) => {
                    let public = mapper.from_backend(&entry.id);
                    (!public.is_empty()).then_some(public)
                }
                None => Some(entry.id),
            })
            .map(Model::new)
            .collect();
        Ok(models)
    }
}

#[async_trait]
impl Completer for HttpProvider {
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        options: &CompleteOptions,
    ) -> Result<Message> {
        let backend_model = self.map_model(model)?;
        debug!(
            provider = %self.name,
            model = %backend_model,
            messages = messages.len(),
            tools = options.tools.len(),
            "Calling completer"
        );

        let body = ChatCompletionRequest::new(backend_model.clone(), messages, options);
        let url = self.endpoint("chat/completions", &backend_model);
        let response: ChatCompletionResponse = self.send_json(self.post(&url).json(&body)).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(GatewayError::EmptyResponse("completion choices"))?;

        debug!(
            provider = %self.name,
            finish_reason = choice.finish_reason.as_deref().unwrap_or("?"),
            "Completion received"
        );
        Ok(choice.message.into())
    }

    async fn complete_stream(
        &self,
        model: &str,
        messages: &[Message],
        options: &CompleteOptions,
        tx: mpsc::Sender<Delta>,
    ) -> Result<()> {
        let backend_model = self.map_model(model)?;
        debug!(provider = %self.name, model = %backend_model, "Streaming completion");

        let mut body = ChatCompletionRequest::new(backend_model.clone(), messages, options);
        body.stream = true;
        let url = self.endpoint("chat/completions", &backend_model);

        let response = self.post(&url).json(&body).send().await?;
        let response = self.check_status(response).await?;

        let mut bytes = response.bytes_stream();
        let mut decoder = SseDecoder::new();

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk?;
            for event in decoder.push(&chunk)? {
                if !self.forward_event(event, &tx).await? {
                    return Ok(());
                }
            }
        }

        if let Some(event) = decoder.finish() {
            self.forward_event(event, &tx).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Embedder for HttpProvider {
    async fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>> {
        let backend_model = self.map_model(model)?;
        debug!(provider = %self.name, model = %backend_model, chars = input.len(), "Embedding");

        let body = EmbeddingRequest {
            model: &backend_model,
            input,
        };
        let url = self.endpoint("embeddings", &backend_model);
        let response: EmbeddingResponse = self.send_json(self.post(&url).json(&body)).await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(GatewayError::EmptyResponse("embedding"))
    }
}

#[async_trait]
impl Renderer for HttpProvider {
    async fn render(&self, model: &str, prompt: &str) -> Result<Image> {
        let backend_model = self.map_model(model)?;
        debug!(provider = %self.name, model = %backend_model, "Rendering image");

        let body = ImageRequest {
            model: &backend_model,
            prompt,
            n: 1,
        };
        let url = self.endpoint("images/generations", &backend_model);
        let response: ImageResponse = self.send_json(self.post(&url).json(&body)).await?;

        let item = response
            .data
            .into_iter()
            .next()
            .ok_or(GatewayError::EmptyResponse("image"))?;

        match (item.url, item.b64_json) {
            (Some(url), _) if !url.is_empty() => Ok(Image::Url(url)),
            (_, Some(b64)) if !b64.is_empty() => Ok(Image::B64Json(b64)),
            _ => Err(GatewayError::EmptyResponse("image")),
        }
    }
}

#[async_trait]
impl Synthesizer for HttpProvider {
    async fn synthesize(&self, model: &str, input: &str, voice: Option<&str>) -> Result<Speech> {
        let backend_model = self.map_model(model)?;
        debug!(provider = %self.name, model = %backend_model, "Synthesizing speech");

        let body = SpeechRequest {
            model: &backend_model,
            input,
            voice: voice.unwrap_or(DEFAULT_VOICE),
        };
        let url = self.endpoint("audio/speech", &backend_model);
        let response = self
            .post(&url)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        let response = self.check_status(response).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/mpeg")
            .to_string();
        let audio = response.bytes().await?.to_vec();
        if audio.is_empty() {
            return Err(GatewayError::EmptyResponse("audio"));
        }

        Ok(Speech {
            content_type,
            audio,
        })
    }
}

// ─────────────────────────────────────────────
// Builder from config
// ─────────────────────────────────────────────

/// Build an HttpProvider from a provider config entry.
///
/// The preset supplies the default URL and normalisation; the entry's models
/// become a mapper (public id → backend id, backend id defaulting to the
/// public one).
pub fn create_provider(config: &ProviderConfig, entry: &str) -> Result<HttpProvider> {
    let preset = find_preset(&config.provider_type).ok_or_else(|| {
        GatewayError::config(
            entry,
            format!("unknown provider type '{}'", config.provider_type),
        )
    })?;
    let base_url = preset
        .resolve_url(config.url.as_deref())
        .map_err(|_| GatewayError::config(entry, format!("{} requires a url", preset.name)))?;

    debug!(
        provider = preset.display_name,
        url = %base_url,
        models = config.models.len(),
        "Creating provider"
    );

    let mut provider = HttpProvider::new(base_url)
        .with_token(&config.token)
        .with_name(preset.name);

    if preset.name == "azure" {
        provider = provider.with_auth(AuthStyle::azure());
    }

    if !config.models.is_empty() {
        let mapper = StaticModelMapper::new(config.models.iter().map(|(public, model)| {
            let backend = model.id.clone().unwrap_or_else(|| public.clone());
            (public.clone(), backend)
        }));
        provider = provider.with_mapper(Arc::new(mapper));
    }

    Ok(provider)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
