//! Gemini generation gateway
//!
//! Implements [`GenerationGateway`] over the stateless `generateContent`
//! endpoint. The full history is sent on every call; when the model answers
//! with function calls, each is executed through the request's tool executor
//! (which may suspend on an elicitation) and the results are sent back as
//! `functionResponse` parts until the model produces plain text.

use super::types::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    ModelTurn, Part, Tool, function_declarations, history_to_contents,
};
use crate::config::{ConfigValidationError, FileGeminiConfig};
use async_trait::async_trait;
use mcpbot_application::ports::generation_gateway::{
    GatewayError, GenerationGateway, GenerationReply, GenerationRequest,
};
use mcpbot_domain::ToolCall;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connection and sampling settings for [`GeminiGateway`].
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tool_rounds: usize,
    pub request_timeout: Duration,
}

impl GeminiSettings {
    /// Settings from the `[gemini]` section; the API key is mandatory here.
    pub fn from_config(config: &FileGeminiConfig) -> Result<Self, ConfigValidationError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigValidationError::MissingApiKey)?;

        Ok(Self {
            model: config.model.clone(),
            api_key: api_key.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_tool_rounds: config.max_tool_rounds,
            request_timeout: Duration::from_secs(config.request_timeout_seconds),
        })
    }
}

/// LLM gateway for the Gemini REST API
pub struct GeminiGateway {
    client: reqwest::Client,
    settings: GeminiSettings,
    endpoint: String,
}

impl GeminiGateway {
    pub fn new(settings: GeminiSettings) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;
        let endpoint = format!(
            "{}/models/{}:generateContent",
            settings.base_url, settings.model
        );

        info!(model = %settings.model, "GeminiGateway initialized");

        Ok(Self {
            client,
            settings,
            endpoint,
        })
    }

    pub fn settings(&self) -> &GeminiSettings {
        &self.settings
    }

    /// One `generateContent` round trip, returning the first candidate's content.
    async fn call(&self, body: &GenerateContentRequest<'_>) -> Result<Content, GatewayError> {
        debug!(
            model = %self.settings.model,
            contents = body.contents.len(),
            "Calling generateContent"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.settings.api_key)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => match envelope.error.status {
                    Some(kind) => format!("{} {}: {}", status.as_u16(), kind, envelope.error.message),
                    None => format!("{}: {}", status.as_u16(), envelope.error.message),
                },
                Err(_) => format!("{}: {}", status.as_u16(), text.trim()),
            };
            return Err(GatewayError::RequestFailed(message));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        parsed.into_content().map_err(GatewayError::InvalidResponse)
    }
}

fn map_transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

#[async_trait]
impl GenerationGateway for GeminiGateway {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationReply, GatewayError> {
        let max_rounds = self.settings.max_tool_rounds;
        let declarations = function_declarations(request.tools.tool_spec());
        let tools = if declarations.is_empty() {
            Vec::new()
        } else {
            vec![Tool {
                function_declarations: declarations,
            }]
        };
        let mut contents = history_to_contents(&request.history);

        for round in 0..=max_rounds {
            let body = GenerateContentRequest {
                system_instruction: Content::instruction(&request.system_instruction),
                contents: &contents,
                tools: &tools,
                generation_config: GenerationConfig {
                    temperature: self.settings.temperature,
                    candidate_count: 1,
                },
            };
            let content = self.call(&body).await?;
            let turn = ModelTurn::from_content(&content);

            if turn.calls.is_empty() {
                if turn.text.trim().is_empty() {
                    return Err(GatewayError::InvalidResponse(
                        "model returned neither text nor function calls".to_string(),
                    ));
                }
                return Ok(GenerationReply::new(turn.text));
            }
            if round == max_rounds {
                break;
            }

            contents.push(Content::model(content.parts));

            let mut responses = Vec::with_capacity(turn.calls.len());
            for call in &turn.calls {
                info!(tool = %call.name, round, "Executing tool call");
                let tool_call = ToolCall::from_json(&call.name, &call.args);
                let result = request
                    .tools
                    .execute(&tool_call, &request.tool_context)
                    .await;
                if let Some(error) = result.error() {
                    warn!(tool = %call.name, error = %error, "Tool call failed");
                }
                responses.push(Part::function_response(
                    &call.name,
                    result.to_response_json(),
                ));
            }
            contents.push(Content::user(responses));
        }

        Err(GatewayError::ToolRoundsExceeded(max_rounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{BuiltinProvider, ToolRegistry};
    use axum::{
        Json, Router,
        extract::State,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::post,
    };
    use mcpbot_application::ports::tool_executor::ToolExecutorPort;
    use mcpbot_domain::{Message, ToolContext};
    use serde_json::{Value, json};
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Copy)]
    enum Script {
        /// Ask for `addition` once, then answer with the tool's output
        AddThenAnswer,
        /// Keep asking for `addition` forever
        AlwaysCall,
        /// Reject every request
        Unauthorized,
    }

    #[derive(Clone)]
    struct MockState {
        script: Script,
        requests: Arc<Mutex<Vec<Value>>>,
        keys: Arc<Mutex<Vec<String>>>,
    }

    fn call_addition() -> Value {
        json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"functionCall": {"name": "addition", "args": {"a": 2, "b": 3}}}]
                },
                "finishReason": "STOP"
            }]
        })
    }

    async fn generate_content(
        State(state): State<MockState>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> axum::response::Response {
        state.requests.lock().unwrap().push(body.clone());
        if let Some(key) = headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) {
            state.keys.lock().unwrap().push(key.to_string());
        }

        match state.script {
            Script::Unauthorized => (
                StatusCode::FORBIDDEN,
                Json(json!({"error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}})),
            )
                .into_response(),
            Script::AlwaysCall => Json(call_addition()).into_response(),
            Script::AddThenAnswer => {
                let last = body["contents"].as_array().and_then(|c| c.last()).cloned();
                let tool_output = last
                    .as_ref()
                    .and_then(|c| c["parts"][0].get("functionResponse"))
                    .map(|r| r["response"]["result"].clone());
                match tool_output {
                    Some(output) => Json(json!({
                        "candidates": [{
                            "content": {"role": "model", "parts": [{"text": format!("Tool says: {}", output.as_str().unwrap_or_default())}]}
                        }]
                    }))
                    .into_response(),
                    None => Json(call_addition()).into_response(),
                }
            }
        }
    }

    async fn spawn_mock(script: Script) -> (SocketAddr, MockState) {
        let state = MockState {
            script,
            requests: Arc::new(Mutex::new(Vec::new())),
            keys: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/v1beta/models/{call}", post(generate_content))
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, state)
    }

    fn gateway(addr: SocketAddr, max_tool_rounds: usize) -> GeminiGateway {
        GeminiGateway::new(GeminiSettings {
            model: "test-model".to_string(),
            api_key: "test-key".to_string(),
            base_url: format!("http://{}/v1beta", addr),
            temperature: 0.0,
            max_tool_rounds,
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    async fn request(text: &str) -> GenerationRequest {
        let mut registry = ToolRegistry::new().register(BuiltinProvider::new());
        registry.discover().await;
        let tools: Arc<dyn ToolExecutorPort> = Arc::new(registry);
        GenerationRequest {
            history: vec![Message::user(text)],
            system_instruction: Arc::from("You are a test."),
            tools,
            tool_context: ToolContext::detached(),
        }
    }

    #[tokio::test]
    async fn test_function_call_loop_returns_final_text() {
        let (addr, state) = spawn_mock(Script::AddThenAnswer).await;
        let gateway = gateway(addr, 4);

        let reply = gateway.generate(request("add 2 and 3").await).await.unwrap();
        assert_eq!(reply.text, "Tool says: The sum of 2 and 3 is 5");

        let requests = state.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0]["systemInstruction"]["parts"][0]["text"],
            "You are a test."
        );
        let names: Vec<&str> = requests[0]["tools"][0]["functionDeclarations"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|d| d["name"].as_str())
            .collect();
        assert!(names.contains(&"roll_dice"));
        assert!(names.contains(&"addition"));

        // user, model functionCall, user functionResponse
        let contents = requests[1]["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["functionResponse"]["name"], "addition");
        assert!(state.keys.lock().unwrap().iter().all(|k| k == "test-key"));
    }

    #[tokio::test]
    async fn test_tool_rounds_exceeded() {
        let (addr, state) = spawn_mock(Script::AlwaysCall).await;
        let gateway = gateway(addr, 2);

        let err = gateway.generate(request("loop").await).await.unwrap_err();
        assert!(matches!(err, GatewayError::ToolRoundsExceeded(2)));
        assert_eq!(state.requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_http_error_is_request_failed() {
        let (addr, _state) = spawn_mock(Script::Unauthorized).await;
        let gateway = gateway(addr, 2);

        let err = gateway.generate(request("hi").await).await.unwrap_err();
        match err {
            GatewayError::RequestFailed(message) => {
                assert!(message.contains("403"));
                assert!(message.contains("API key not valid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_settings_require_api_key() {
        let config = FileGeminiConfig::default();
        assert!(matches!(
            GeminiSettings::from_config(&config),
            Err(ConfigValidationError::MissingApiKey)
        ));

        let config = FileGeminiConfig {
            api_key: Some(" key ".to_string()),
            base_url: "https://example.test/v1beta/".to_string(),
            ..Default::default()
        };
        let settings = GeminiSettings::from_config(&config).unwrap();
        assert_eq!(settings.api_key, "key");
        assert_eq!(settings.base_url, "https://example.test/v1beta");
    }
}
