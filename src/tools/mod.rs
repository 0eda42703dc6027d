//! Auxiliary tools the tool-augmented agent can call
//!
//! The set is closed: each [`ToolKind`] maps to one handler function. Tool calls
//! coming back from the model are resolved into a [`ToolInvocation`]; unknown names
//! and missing arguments turn into error results for the model rather than failures.

mod calculator;
mod clock;
mod weather;

pub use calculator::{calculate, evaluate, CalcError};
pub use clock::current_time;
pub use weather::search_weather;

use crate::llm::{ToolCall, ToolDefinition};
use serde_json::{json, Value};
use thiserror::Error;

/// Result of executing a tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Missing required parameter '{param}' for {tool}")]
    MissingArgument { tool: &'static str, param: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    CurrentTime,
    Calculate,
    SearchWeather,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [
        ToolKind::CurrentTime,
        ToolKind::Calculate,
        ToolKind::SearchWeather,
    ];

    /// Name exposed to the model
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::CurrentTime => "get_current_time",
            ToolKind::Calculate => "calculate",
            ToolKind::SearchWeather => "search_weather",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::CurrentTime => "Get the current local date and time.",
            ToolKind::Calculate => {
                "Evaluate a basic arithmetic expression using + - * / // ** and parentheses."
            }
            ToolKind::SearchWeather => "Look up the current weather for a city by name.",
        }
    }

    /// The single string argument each tool takes, and whether it is required
    fn argument(&self) -> (&'static str, bool) {
        match self {
            ToolKind::CurrentTime => ("query", false),
            ToolKind::Calculate => ("expression", true),
            ToolKind::SearchWeather => ("city", true),
        }
    }

    /// JSON schema for the tool parameters
    pub fn parameters(&self) -> Value {
        let (param, required) = self.argument();
        let description = match self {
            ToolKind::CurrentTime => "Optional free-form question about the time",
            ToolKind::Calculate => "Arithmetic expression, e.g. (3 + 4) * 2",
            ToolKind::SearchWeather => "City name, e.g. Beijing",
        };
        let required: Vec<&str> = if required { vec![param] } else { vec![] };
        let mut properties = serde_json::Map::new();
        properties.insert(
            param.to_string(),
            json!({ "type": "string", "description": description }),
        );
        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Definitions for every tool, in a stable order
pub fn definitions() -> Vec<ToolDefinition> {
    ToolKind::ALL.iter().map(ToolKind::definition).collect()
}

/// A resolved tool call ready to run
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub kind: ToolKind,
    pub args: Value,
}

impl ToolInvocation {
    pub fn parse(name: &str, args: Value) -> Result<Self, ToolError> {
        let kind =
            ToolKind::from_name(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        Ok(Self { kind, args })
    }

    pub fn from_call(call: &ToolCall) -> Result<Self, ToolError> {
        Self::parse(&call.name, call.arguments.clone())
    }

    /// Extract the tool's string argument
    ///
    /// Models sometimes send the bare string instead of an object; both are accepted.
    fn argument(&self) -> Result<Option<String>, ToolError> {
        let (param, required) = self.kind.argument();
        let value = match &self.args {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map.get(param).and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            }),
            _ => None,
        };

        match value {
            None if required => Err(ToolError::MissingArgument {
                tool: self.kind.name(),
                param,
            }),
            value => Ok(value),
        }
    }

    pub fn execute(&self) -> ToolResult {
        let arg = match self.argument() {
            Ok(arg) => arg,
            Err(e) => return ToolResult::error(e.to_string()),
        };

        match self.kind {
            ToolKind::CurrentTime => current_time(arg.as_deref()),
            ToolKind::Calculate => calculate(arg.as_deref().unwrap_or_default()),
            ToolKind::SearchWeather => search_weather(arg.as_deref().unwrap_or_default()),
        }
    }
}

/// Resolve and run a model tool call; never fails
pub fn execute_call(call: &ToolCall) -> ToolResult {
    match ToolInvocation::from_call(call) {
        Ok(invocation) => invocation.execute(),
        Err(e) => ToolResult::error(e.to_string()),
    }
}
