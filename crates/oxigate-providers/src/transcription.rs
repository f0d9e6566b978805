//! Speech-to-text over `POST /audio/transcriptions` (Whisper-style APIs).
//!
//! Any OpenAI-compatible transcription endpoint works, Groq and OpenAI
//! included.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use oxigate_core::Result;

use crate::http_provider::HttpProvider;
use crate::traits::Transcriber;

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl Transcriber for HttpProvider {
    async fn transcribe(&self, model: &str, audio: Vec<u8>, file_name: &str) -> Result<String> {
        let backend_model = self.map_model(model)?;
        debug!(
            provider = %self.name(),
            model = %backend_model,
            bytes = audio.len(),
            file = file_name,
            "Transcribing audio"
        );

        let part = reqwest::multipart::Part::bytes(audio).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", backend_model.clone());

        let url = self.endpoint("audio/transcriptions", &backend_model);
        let response: TranscriptionResponse = self.send_json(self.post(&url).multipart(form)).await?;

        debug!(chars = response.text.len(), "Transcription complete");
        Ok(response.text)
    }
}
