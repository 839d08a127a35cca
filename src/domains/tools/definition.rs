//! Tool definitions and the typed argument values bound into their processes.

use rmcp::model::Tool;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{ToolError, ToolResult};
use super::params::ParameterSpec;

// ============================================================================
// Tool Definition
// ============================================================================

/// What a tool runs when called. Exactly one source per tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolSource {
    /// An executable spawned directly, with no arguments.
    Script(PathBuf),
    /// An inline command body handed to the shell.
    Command(String),
}

/// A registered tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSpec,
    pub source: ToolSource,
}

impl ToolDefinition {
    /// Build a definition from raw registration input.
    ///
    /// Empty strings count as absent. When both a script path and a command
    /// are given the script path wins.
    pub fn new(
        name: &str,
        description: &str,
        signature: &str,
        script_path: Option<&str>,
        command: Option<&str>,
    ) -> ToolResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ToolError::validation("tool name is required"));
        }

        let script_path = script_path.map(str::trim).filter(|s| !s.is_empty());
        let command = command.filter(|c| !c.trim().is_empty());

        let source = match (script_path, command) {
            (Some(path), _) => ToolSource::Script(PathBuf::from(path)),
            (None, Some(command)) => ToolSource::Command(command.to_string()),
            (None, None) => {
                return Err(ToolError::validation(format!(
                    "tool '{name}' needs either a script path or a command"
                )));
            }
        };

        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: ParameterSpec::parse(signature),
            source,
        })
    }

    pub fn script_path(&self) -> Option<&Path> {
        match &self.source {
            ToolSource::Script(path) => Some(path),
            ToolSource::Command(_) => None,
        }
    }

    pub fn command(&self) -> Option<&str> {
        match &self.source {
            ToolSource::Command(command) => Some(command),
            ToolSource::Script(_) => None,
        }
    }

    /// Protocol descriptor advertised in `tools/list`.
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.clone().into(),
            description: Some(self.description.clone().into()),
            input_schema: Arc::new(self.parameters.to_input_schema()),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

// ============================================================================
// On-disk form
// ============================================================================

/// A registry entry as stored in the registry file, keyed by tool name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTool {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub parameters: ParameterSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl From<&ToolDefinition> for StoredTool {
    fn from(def: &ToolDefinition) -> Self {
        let (script_path, command) = match &def.source {
            ToolSource::Script(path) => (Some(path.to_string_lossy().into_owned()), None),
            ToolSource::Command(command) => (None, Some(command.clone())),
        };
        Self {
            description: def.description.clone(),
            parameters: def.parameters.clone(),
            script_path,
            command,
        }
    }
}

impl StoredTool {
    /// Rebuild the in-memory definition, enforcing the execution-source rule.
    pub fn into_definition(self, name: &str) -> ToolResult<ToolDefinition> {
        let mut def = ToolDefinition::new(
            name,
            &self.description,
            "",
            self.script_path.as_deref(),
            self.command.as_deref(),
        )?;
        def.parameters = self.parameters;
        Ok(def)
    }
}

// ============================================================================
// Arguments
// ============================================================================

/// A call argument, reduced to the four shapes a process environment can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl From<&Value> for ArgValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Self::Int(i),
                // u64 beyond i64::MAX keeps its exact digits
                _ if n.is_u64() => Self::Str(n.to_string()),
                (None, Some(f)) => Self::Float(f),
                (None, None) => Self::Str(n.to_string()),
            },
            Value::String(s) => Self::Str(s.clone()),
            Value::Null => Self::Str(String::new()),
            Value::Array(_) | Value::Object(_) => Self::Str(value.to_string()),
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Arguments of one tool call, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs(BTreeMap<String, ArgValue>);

impl ToolArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ArgValue)> {
        self.0.iter()
    }

    /// Convert a decoded JSON object into typed arguments.
    pub fn from_json_object(object: &serde_json::Map<String, Value>) -> Self {
        Self(
            object
                .iter()
                .map(|(k, v)| (k.clone(), ArgValue::from(v)))
                .collect(),
        )
    }

    /// Convert an arbitrary JSON value; `null` means no arguments.
    pub fn from_json(value: &Value) -> ToolResult<Self> {
        match value {
            Value::Object(object) => Ok(Self::from_json_object(object)),
            Value::Null => Ok(Self::new()),
            other => Err(ToolError::validation(format!(
                "tool arguments must be a JSON object, got {other}"
            ))),
        }
    }

    /// Reject names that cannot be used as environment variable names.
    pub fn validate(&self) -> ToolResult<()> {
        for name in self.0.keys() {
            if name.is_empty() || name.contains('=') || name.contains('\0') {
                return Err(ToolError::validation(format!(
                    "invalid argument name {name:?}"
                )));
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, ArgValue)> for ToolArgs {
    fn from_iter<I: IntoIterator<Item = (String, ArgValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
