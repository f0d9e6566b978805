//! Backend layer for Oxigate.
//!
//! # Architecture
//!
//! - [`traits`] — capability contracts (`Completer`, `Embedder`, …)
//! - [`model_type`] — keyword-based model type inference
//! - [`http_provider::HttpProvider`] — the OpenAI-compatible wire adapter
//! - [`presets`] — static table of supported backends
//! - [`mapper`] — public ↔ backend model-id mapping
//! - [`stream`] — incremental SSE decoding

pub mod http_provider;
pub mod mapper;
pub mod model_type;
pub mod presets;
pub mod stream;
pub mod traits;
pub mod transcription;
pub mod wire;

pub use http_provider::{create_provider, AuthStyle, HttpProvider};
pub use mapper::{ModelMapper, StaticModelMapper};
pub use model_type::{detect_model_type, resolve_model_type, ModelType};
pub use presets::{find_preset, Preset, PRESETS};
pub use traits::{Completer, Embedder, ModelLister, Renderer, Synthesizer, Transcriber};
