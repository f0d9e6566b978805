//! Draw tool — lets a chat model generate images through a configured renderer.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use oxigate_core::types::Image;
use oxigate_providers::Renderer;

use super::base::{require_string, Tool, ToolError};

/// Generates an image from a prompt.
///
/// The renderer is resolved from the registry when the tool is configured;
/// without one the tool stays registered but reports itself unavailable.
pub struct DrawTool {
    renderer: Option<Arc<dyn Renderer>>,
    model: String,
}

impl DrawTool {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            renderer: None,
            model: model.into(),
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }
}

#[async_trait]
impl Tool for DrawTool {
    fn name(&self) -> &str {
        "draw"
    }

    fn description(&self) -> &str {
        "Draw an image based on a detailed description. Returns a link to the generated image."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "detailed description of the image to draw, in English"
                }
            },
            "required": ["prompt"]
        })
    }

    async fn execute(&self, params: &HashMap<String, Value>) -> Result<Value, ToolError> {
        let prompt = require_string(params, "prompt")?;
        let renderer = self
            .renderer
            .as_ref()
            .ok_or_else(|| ToolError::Unavailable("no renderer configured".to_string()))?;

        debug!(model = %self.model, prompt_len = prompt.len(), "drawing image");

        let image = renderer.render(&self.model, &prompt).await?;
        Ok(match image {
            Image::Url(url) => json!({ "url": url }),
            Image::B64Json(data) => json!({ "b64_json": data }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigate_core::{GatewayError, Result};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockRenderer {
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Renderer for MockRenderer {
        async fn render(&self, model: &str, prompt: &str) -> Result<Image> {
            self.seen
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            Ok(Image::Url("https://img.example/1.png".into()))
        }
    }

    struct FailingRenderer;

    #[async_trait]
    impl Renderer for FailingRenderer {
        async fn render(&self, _model: &str, _prompt: &str) -> Result<Image> {
            Err(GatewayError::Backend {
                status: 500,
                body: "gpu on fire".into(),
            })
        }
    }

    fn prompt(text: &str) -> HashMap<String, Value> {
        let mut params = HashMap::new();
        params.insert("prompt".to_string(), json!(text));
        params
    }

    #[tokio::test]
    async fn test_draw_uses_renderer() {
        let renderer = Arc::new(MockRenderer::default());
        let tool = DrawTool::new("dall-e-3").with_renderer(renderer.clone());

        let out = tool.execute(&prompt("a red fox")).await.unwrap();
        assert_eq!(out, json!({"url": "https://img.example/1.png"}));
        assert_eq!(
            renderer.seen.lock().unwrap().as_slice(),
            &[("dall-e-3".to_string(), "a red fox".to_string())]
        );
    }

    #[tokio::test]
    async fn test_draw_without_renderer() {
        let tool = DrawTool::new("dall-e-3");
        assert!(!tool.has_renderer());
        let err = tool.execute(&prompt("a red fox")).await.unwrap_err();
        assert!(matches!(err, ToolError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_draw_missing_prompt() {
        let tool = DrawTool::new("m").with_renderer(Arc::new(MockRenderer::default()));
        assert!(matches!(
            tool.execute(&HashMap::new()).await,
            Err(ToolError::MissingParameter(_))
        ));
    }

    #[tokio::test]
    async fn test_draw_renderer_error_propagates() {
        let tool = DrawTool::new("m").with_renderer(Arc::new(FailingRenderer));
        let err = tool.execute(&prompt("x")).await.unwrap_err();
        assert!(matches!(err, ToolError::Provider(GatewayError::Backend { status: 500, .. })));
    }
}
