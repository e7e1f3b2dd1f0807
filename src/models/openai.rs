use serde::{Deserialize, Serialize};

/// OpenAI Responses API request (`POST /responses`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsesRequest {
    /// Model to use
    pub model: String,
    /// Input messages
    pub input: Vec<InputMessage>,
    /// Hosted tools available to the model
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    /// Output text configuration (structured outputs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextConfig>,
}

impl ResponsesRequest {
    /// Single user turn built from `content`
    pub fn user(model: impl Into<String>, content: Vec<InputContent>) -> Self {
        Self {
            model: model.into(),
            input: vec![InputMessage {
                role: "user".to_string(),
                content,
            }],
            tools: Vec::new(),
            text: None,
        }
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.text = Some(TextConfig { format });
        self
    }
}

/// Role-tagged input message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    /// Role: user, system, or developer
    pub role: String,
    pub content: Vec<InputContent>,
}

/// Content block for multimodal input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputContent {
    /// Text content block
    InputText { text: String },
    /// Image content block; `image_url` may be an http(s) or data: URL
    InputImage { image_url: String },
}

impl InputContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::InputText { text: text.into() }
    }

    pub fn image(image_url: impl Into<String>) -> Self {
        Self::InputImage {
            image_url: image_url.into(),
        }
    }
}

/// Hosted tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    WebSearch,
}

/// `text` field of a Responses request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    pub format: ResponseFormat,
}

/// Response format for controlling output structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Structured JSON response with schema
    JsonSchema(JsonSchemaSpec),
}

/// JSON Schema specification for structured outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaSpec {
    /// Schema name
    pub name: String,
    /// Whether to enforce strict schema adherence
    pub strict: bool,
    /// JSON Schema definition
    pub schema: serde_json::Value,
}

/// OpenAI Responses API response (non-streaming)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsesResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ResponsesResponse {
    /// Concatenated `output_text` parts of all message items
    pub fn output_text(&self) -> String {
        self.message_parts()
            .filter_map(|part| match part {
                OutputContent::OutputText { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// First refusal message, if the model declined
    pub fn refusal(&self) -> Option<&str> {
        self.message_parts().find_map(|part| match part {
            OutputContent::Refusal { refusal } => Some(refusal.as_str()),
            _ => None,
        })
    }

    fn message_parts(&self) -> impl Iterator<Item = &OutputContent> {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Message { content } => Some(content.iter()),
                OutputItem::Other => None,
            })
            .flatten()
    }
}

/// Item in the `output` array. Tool call items are not inspected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<OutputContent>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputContent {
    OutputText { text: String },
    Refusal { refusal: String },
    #[serde(other)]
    Other,
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}
