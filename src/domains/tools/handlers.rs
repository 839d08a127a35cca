//! Request parameters for the proxy's management methods.
//!
//! `tools/list` and `tools/call` use the protocol's own shapes. Adding and
//! removing tools are proxy-specific, and their parameters are defined here.

use serde::{Deserialize, Serialize};

/// Parameters of a `tools/add` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToolParams {
    /// Unique tool name.
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Parameter signature, e.g. `a:int,b:int`.
    #[serde(default)]
    pub parameters: String,

    /// Executable to spawn. Takes precedence over `command`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_path: Option<String>,

    /// Inline shell command body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Parameters of a `tools/remove` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveToolParams {
    /// Name of the tool to remove.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_params_from_json() {
        let params: AddToolParams = serde_json::from_value(json!({
            "name": "add",
            "description": "Adds",
            "parameters": "a:int,b:int",
            "scriptPath": "/tmp/add.sh"
        }))
        .unwrap();
        assert_eq!(params.name, "add");
        assert_eq!(params.script_path.as_deref(), Some("/tmp/add.sh"));
        assert!(params.command.is_none());
    }

    #[test]
    fn test_add_params_defaults() {
        let params: AddToolParams =
            serde_json::from_value(json!({ "name": "t", "command": "echo" })).unwrap();
        assert!(params.description.is_empty());
        assert!(params.parameters.is_empty());
    }
}
