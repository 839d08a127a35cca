//! Parameter signatures.
//!
//! A tool's parameters are declared with a compact signature string such as
//! `a:int,b:int`. The signature is documentation metadata: parsing never
//! fails, and unknown types fall back to [`ParamType::String`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};
use std::fmt;

/// Declared type of a single tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Int,
    Float,
    String,
    Bool,
}

impl ParamType {
    /// Parse a type token, defaulting to `String` for anything unrecognised.
    pub fn parse(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Self::Int,
            "float" | "number" => Self::Float,
            "bool" | "boolean" => Self::Bool,
            _ => Self::String,
        }
    }

    /// Canonical token used in signatures.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bool => "bool",
        }
    }

    /// JSON Schema type name.
    pub fn json_type(&self) -> &'static str {
        match self {
            Self::Int => "integer",
            Self::Float => "number",
            Self::String => "string",
            Self::Bool => "boolean",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: ParamType,
}

/// Ordered list of parameters with unique, non-empty names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSpec {
    params: Vec<Param>,
}

impl ParameterSpec {
    /// Parse a `name:type,...` signature.
    ///
    /// Tokens are split on the first `:`; a token without a colon is a
    /// string parameter. Blank names are skipped, and a repeated name keeps
    /// its original position but takes the later type.
    pub fn parse(signature: &str) -> Self {
        let mut spec = Self::default();

        for token in signature.split(',') {
            let (name, ty) = match token.split_once(':') {
                Some((name, ty)) => (name.trim(), ParamType::parse(ty)),
                None => (token.trim(), ParamType::String),
            };

            if name.is_empty() {
                continue;
            }

            match spec.params.iter_mut().find(|p| p.name == name) {
                Some(existing) => existing.ty = ty,
                None => spec.params.push(Param {
                    name: name.to_string(),
                    ty,
                }),
            }
        }

        spec
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Build the JSON Schema object advertised as the tool's input schema.
    ///
    /// Every declared parameter is listed but none is marked required, since
    /// absent arguments are simply left unset for the tool to handle.
    pub fn to_input_schema(&self) -> Map<String, Value> {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.clone(), json!({ "type": p.ty.json_type() })))
            .collect();

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema
    }
}

impl fmt::Display for ParameterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", p.name, p.ty)?;
        }
        Ok(())
    }
}

// Persisted as the canonical signature string.
impl Serialize for ParameterSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ParameterSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let signature = String::deserialize(deserializer)?;
        Ok(Self::parse(&signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typed_signature() {
        let spec = ParameterSpec::parse("a:int,b:int");
        assert_eq!(spec.len(), 2);
        assert_eq!(spec.params()[0].name, "a");
        assert_eq!(spec.params()[0].ty, ParamType::Int);
        assert_eq!(spec.params()[1].name, "b");
    }

    #[test]
    fn test_parse_empty_signature() {
        assert!(ParameterSpec::parse("").is_empty());
    }

    #[test]
    fn test_token_count_matches() {
        for sig in ["x", "x:int", "a:int,b:float,c:bool,d:string", "p,q,r"] {
            let tokens = sig.split(',').count();
            assert_eq!(ParameterSpec::parse(sig).len(), tokens, "signature {sig}");
        }
    }

    #[test]
    fn test_missing_type_defaults_to_string() {
        let spec = ParameterSpec::parse("path");
        assert_eq!(spec.get("path").unwrap().ty, ParamType::String);
    }

    #[test]
    fn test_unknown_type_defaults_to_string() {
        let spec = ParameterSpec::parse("a:integr");
        assert_eq!(spec.get("a").unwrap().ty, ParamType::String);
    }

    #[test]
    fn test_splits_on_first_colon_only() {
        let spec = ParameterSpec::parse("url:string:extra");
        assert_eq!(spec.get("url").unwrap().ty, ParamType::String);
    }

    #[test]
    fn test_malformed_input_does_not_fail() {
        let spec = ParameterSpec::parse(" , :int,, a : Float ,");
        assert_eq!(spec.len(), 1);
        assert_eq!(spec.get("a").unwrap().ty, ParamType::Float);
    }

    #[test]
    fn test_duplicate_names_collapse() {
        let spec = ParameterSpec::parse("a:int,b:bool,a:float");
        assert_eq!(spec.len(), 2);
        assert_eq!(spec.params()[0].name, "a");
        assert_eq!(spec.params()[0].ty, ParamType::Float);
    }

    #[test]
    fn test_display_is_canonical() {
        let spec = ParameterSpec::parse("a:INTEGER, b, c:boolean");
        assert_eq!(spec.to_string(), "a:int,b:string,c:bool");
    }

    #[test]
    fn test_input_schema() {
        let schema = ParameterSpec::parse("a:int,ok:bool").to_input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["a"]["type"], "integer");
        assert_eq!(schema["properties"]["ok"]["type"], "boolean");
        assert!(schema.get("required").is_none());
    }

    #[test]
    fn test_serde_as_signature_string() {
        let spec = ParameterSpec::parse("a:int,b:float");
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value, json!("a:int,b:float"));

        let back: ParameterSpec = serde_json::from_value(value).unwrap();
        assert_eq!(back, spec);
    }
}
