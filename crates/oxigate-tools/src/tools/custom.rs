//! Custom tool — exposes any HTTP endpoint as a tool.
//!
//! Name, description and parameter schema come from the config entry. A call
//! POSTs the model's arguments as a JSON object and returns the JSON reply.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::base::{Tool, ToolError};

const CUSTOM_TIMEOUT: Duration = Duration::from_secs(60);

pub struct CustomTool {
    url: String,
    token: String,
    name: String,
    description: String,
    parameters: Value,
    client: Client,
}

impl CustomTool {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: String::new(),
            name: "custom".to_string(),
            description: String::new(),
            parameters: json!({"type": "object", "properties": {}}),
            client: Client::builder()
                .timeout(CUSTOM_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Bearer token sent with every call (omitted when empty).
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }
}

#[async_trait]
impl Tool for CustomTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        self.parameters.clone()
    }

    async fn execute(&self, params: &HashMap<String, Value>) -> Result<Value, ToolError> {
        debug!(tool = %self.name, url = %self.url, "calling custom tool");

        let mut req = self.client.post(&self.url).json(params);
        if !self.token.is_empty() {
            req = req.bearer_auth(&self.token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ToolError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        // non-JSON replies are passed through as text
        Ok(serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())))
    }
}
