//! Wire types for the Gemini `generateContent` REST API
//!
//! Only the subset the chat loop needs: text and function-calling parts,
//! function declarations and generation config.

use mcpbot_domain::{Message, Role, ToolSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Request ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest<'a> {
    pub system_instruction: Content,
    pub contents: &'a [Content],
    #[serde(skip_serializing_if = "<[Tool]>::is_empty")]
    pub tools: &'a [Tool],
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub candidate_count: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

// ─── Shared ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }

    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Some("model".to_string()),
            parts,
        }
    }

    /// Role-less content, as used for the system instruction
    pub fn instruction(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
    /// Opaque token newer models attach to function calls; must be echoed back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub thought: bool,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn function_response(name: impl Into<String>, response: Value) -> Self {
        Self {
            function_response: Some(FunctionResponse {
                name: name.into(),
                response,
            }),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

// ─── Response ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// What one model turn asked for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelTurn {
    pub text: String,
    pub calls: Vec<FunctionCall>,
}

impl GenerateContentResponse {
    /// First candidate's content, or a description of why there is none.
    pub fn into_content(self) -> Result<Content, String> {
        let block_reason = self
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(match block_reason {
                Some(reason) => format!("prompt blocked: {}", reason),
                None => "no candidates in response".to_string(),
            });
        };
        match candidate.content {
            Some(content) if !content.parts.is_empty() => Ok(content),
            _ => Err(format!(
                "empty candidate (finishReason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )),
        }
    }
}

impl ModelTurn {
    /// Split model parts into visible text and function calls; thoughts are dropped.
    pub fn from_content(content: &Content) -> Self {
        let mut turn = ModelTurn::default();
        for part in &content.parts {
            if part.thought {
                continue;
            }
            if let Some(text) = &part.text {
                turn.text.push_str(text);
            }
            if let Some(call) = &part.function_call {
                turn.calls.push(call.clone());
            }
        }
        turn
    }
}

// ─── Domain → Gemini ─────────────────────────────────────────────

/// Map conversation history onto `user`/`model` contents.
pub fn history_to_contents(history: &[Message]) -> Vec<Content> {
    history
        .iter()
        .map(|message| {
            let part = Part::text(message.content.clone());
            match message.role {
                Role::User => Content::user(vec![part]),
                Role::Assistant => Content::model(vec![part]),
            }
        })
        .collect()
}

/// Function declarations for every registered tool, sorted by name.
pub fn function_declarations(spec: &ToolSpec) -> Vec<FunctionDeclaration> {
    spec.all()
        .map(|tool| FunctionDeclaration {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: (!tool.parameters.is_empty()).then(|| tool.input_schema()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpbot_domain::{ToolDefinition, ToolParameter};
    use serde_json::json;

    #[test]
    fn test_request_uses_camel_case() {
        let contents = history_to_contents(&[Message::user("hi"), Message::assistant("hello")]);
        let request = GenerateContentRequest {
            system_instruction: Content::instruction("be nice"),
            contents: &contents,
            tools: &[],
            generation_config: GenerationConfig {
                temperature: 0.0,
                candidate_count: 1,
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be nice");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(value["generationConfig"]["candidateCount"], 1);
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_function_declarations_from_spec() {
        let spec = ToolSpec::new()
            .register(
                ToolDefinition::new("roll_dice", "Throw dice").with_parameter(
                    ToolParameter::new("n_dice", "How many", true).with_type("integer"),
                ),
            )
            .register(ToolDefinition::new("ping", "No arguments"));

        let declarations = function_declarations(&spec);
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0].name, "ping");
        assert!(declarations[0].parameters.is_none());
        let params = declarations[1].parameters.as_ref().unwrap();
        assert_eq!(params["properties"]["n_dice"]["type"], "integer");

        let tool = serde_json::to_value(Tool {
            function_declarations: declarations,
        })
        .unwrap();
        assert_eq!(tool["functionDeclarations"][1]["name"], "roll_dice");
    }

    #[test]
    fn test_parse_function_call_response() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "thinking out loud", "thought": true},
                        {"functionCall": {"name": "roll_dice", "args": {"n_dice": 3}},
                         "thoughtSignature": "sig-1"}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"totalTokenCount": 12}
        }))
        .unwrap();

        let content = response.into_content().unwrap();
        let turn = ModelTurn::from_content(&content);
        assert!(turn.text.is_empty());
        assert_eq!(turn.calls.len(), 1);
        assert_eq!(turn.calls[0].args["n_dice"], 3);

        // Signature survives the round trip back to the API
        let echoed = serde_json::to_value(&content).unwrap();
        assert_eq!(echoed["parts"][1]["thoughtSignature"], "sig-1");
    }

    #[test]
    fn test_parse_text_response() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "there"}]}
            }]
        }))
        .unwrap();

        let turn = ModelTurn::from_content(&response.into_content().unwrap());
        assert_eq!(turn.text, "Hello there");
        assert!(turn.calls.is_empty());
    }

    #[test]
    fn test_blocked_prompt() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();

        assert_eq!(response.into_content().unwrap_err(), "prompt blocked: SAFETY");
    }

    #[test]
    fn test_empty_candidate_reports_finish_reason() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "MAX_TOKENS"}]
        }))
        .unwrap();

        let err = response.into_content().unwrap_err();
        assert!(err.contains("MAX_TOKENS"));
    }
}
