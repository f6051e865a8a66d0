//! Tool domain entities

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};

/// Behavioural hints advertised alongside a tool, as in MCP tool annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolAnnotations {
    /// Display title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// The tool does not modify its environment
    pub read_only: bool,
    /// The tool may perform destructive updates
    pub destructive: bool,
    /// Repeated calls with the same arguments have no additional effect
    pub idempotent: bool,
    /// The tool talks to external systems
    pub open_world: bool,
}

impl ToolAnnotations {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn idempotent(mut self) -> Self {
        self.idempotent = true;
        self
    }

    pub fn open_world(mut self) -> Self {
        self.open_world = true;
        self
    }
}

/// Definition of a tool that the model can call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "roll_dice")
    pub name: String,
    /// Human-readable description, shown to the model
    pub description: String,
    /// Behavioural hints
    #[serde(default)]
    pub annotations: ToolAnnotations,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// JSON schema type ("string", "integer", "number", "boolean", "array")
    pub param_type: String,
    /// Element type when `param_type` is "array"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            annotations: ToolAnnotations::default(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn with_annotations(mut self, annotations: ToolAnnotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// JSON schema object describing the parameters.
    pub fn input_schema(&self) -> Value {
        let mut properties = BTreeMap::new();
        for param in &self.parameters {
            let mut schema = json!({
                "type": param.param_type,
                "description": param.description,
            });
            if let Some(item_type) = &param.item_type {
                schema["items"] = json!({ "type": item_type });
            }
            properties.insert(param.name.clone(), schema);
        }
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
            item_type: None,
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }

    pub fn array_of(mut self, item_type: impl Into<String>) -> Self {
        self.param_type = "array".to_string();
        self.item_type = Some(item_type.into());
        self
    }
}

/// Specification of available tools
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    tools: BTreeMap<String, ToolDefinition>,
}

impl ToolSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, tool: ToolDefinition) -> Self {
        self.tools.insert(tool.name.clone(), tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// A call to a tool with arguments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool
    pub arguments: HashMap<String, Value>,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
        }
    }

    /// Build a call from a JSON object of arguments; non-objects give no arguments.
    pub fn from_json(tool_name: impl Into<String>, args: &Value) -> Self {
        let arguments = args
            .as_object()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get an integer argument, accepting integral floats from models that emit `3.0`
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        let value = self.arguments.get(key)?;
        value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| f as i64)
        })
    }

    /// Get a numeric argument
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.arguments.get(key).and_then(|v| v.as_f64())
    }

    /// Get a required string argument
    pub fn require_string(&self, key: &str) -> Result<&str, String> {
        self.get_string(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }

    /// Get a required integer argument
    pub fn require_i64(&self, key: &str) -> Result<i64, String> {
        self.get_i64(key)
            .ok_or_else(|| format!("Missing or non-integer argument: {}", key))
    }

    /// Get a required numeric argument
    pub fn require_f64(&self, key: &str) -> Result<f64, String> {
        self.get_f64(key)
            .ok_or_else(|| format!("Missing or non-numeric argument: {}", key))
    }

    /// Get an array-of-strings argument
    pub fn get_string_list(&self, key: &str) -> Option<Vec<String>> {
        self.arguments.get(key)?.as_array().map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definition() {
        let tool = ToolDefinition::new("roll_dice", "Throw dice")
            .with_annotations(ToolAnnotations::titled("The Dice Roller").read_only())
            .with_parameter(
                ToolParameter::new("n_dice", "Number of dice", true).with_type("integer"),
            );

        assert_eq!(tool.name, "roll_dice");
        assert!(tool.annotations.read_only);
        assert_eq!(tool.parameters.len(), 1);
    }

    #[test]
    fn test_input_schema() {
        let tool = ToolDefinition::new("get_weather", "Weather")
            .with_parameter(ToolParameter::new("cities", "City names", true).array_of("string"))
            .with_parameter(ToolParameter::new("units", "Units", false));

        let schema = tool.input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["cities"]["type"], "array");
        assert_eq!(schema["properties"]["cities"]["items"]["type"], "string");
        assert_eq!(schema["required"], json!(["cities"]));
    }

    #[test]
    fn test_tool_spec() {
        let spec = ToolSpec::new()
            .register(ToolDefinition::new("addition", "Add"))
            .register(ToolDefinition::new("roll_dice", "Dice"));

        assert_eq!(spec.len(), 2);
        assert!(spec.get("addition").is_some());
        assert!(spec.get("subtraction").is_none());
        assert_eq!(spec.names().collect::<Vec<_>>(), vec!["addition", "roll_dice"]);
    }

    #[test]
    fn test_tool_call_accessors() {
        let call = ToolCall::from_json(
            "get_weather",
            &json!({"cities": ["Paris", "London"], "n": 3.0, "x": 1.5}),
        );

        assert_eq!(
            call.get_string_list("cities"),
            Some(vec!["Paris".to_string(), "London".to_string()])
        );
        assert_eq!(call.get_i64("n"), Some(3));
        assert_eq!(call.get_i64("x"), None);
        assert_eq!(call.get_f64("x"), Some(1.5));
        assert!(call.get_string("missing").is_none());
    }

    #[test]
    fn test_from_json_ignores_non_objects() {
        let call = ToolCall::from_json("addition", &json!([1, 2]));
        assert!(call.arguments.is_empty());
    }
}
