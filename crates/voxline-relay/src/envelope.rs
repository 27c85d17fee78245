//! Inbound webhook envelope model.
//!
//! The voice platform has shipped several payload shapes over time: the
//! `call` object appears message-scoped or envelope-scoped, variables arrive
//! under `variableValues` or `variables`, and tool arguments arrive as
//! structured objects or JSON-encoded strings. All of that shape
//! compatibility lives here, behind one typed model, so the classifier and
//! gate only ever see one representation.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One inbound webhook JSON message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub call: Option<CallInfo>,
}

/// The message portion of an envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub call: Option<CallInfo>,
    #[serde(default)]
    pub function_call: Option<FunctionCall>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallEntry>>,
}

/// Call-scoped data. Either variables key may be present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub variable_values: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub variables: Option<BTreeMap<String, Value>>,
}

/// Legacy single-function invocation shape (no tool-call id).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionCall {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parameters: Option<Value>,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// One entry of the modern `toolCalls` batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolCallEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub function: Option<ToolFunction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolFunction {
    #[serde(default)]
    pub name: Option<String>,
    /// Structured object, or a JSON-encoded string.
    #[serde(default)]
    pub arguments: Option<Value>,
}

impl Envelope {
    /// The message kind tag, if readable.
    pub fn kind(&self) -> Option<&str> {
        self.message.as_ref()?.kind.as_deref()
    }

    /// The call object, wherever it was placed. Message-scoped wins when
    /// both are present (it is the newer shape).
    pub fn call(&self) -> Option<&CallInfo> {
        self.message
            .as_ref()
            .and_then(|m| m.call.as_ref())
            .or(self.call.as_ref())
    }

    /// The call id, if any.
    pub fn call_id(&self) -> Option<&str> {
        self.call().and_then(|c| c.id.as_deref())
    }

    /// Call variables normalized to string values, merging both historical
    /// key names (`variables` first, `variableValues` overriding).
    pub fn variables(&self) -> BTreeMap<String, String> {
        let mut merged = BTreeMap::new();
        if let Some(call) = self.call() {
            if let Some(vars) = &call.variables {
                extend_stringified(&mut merged, vars);
            }
            if let Some(vars) = &call.variable_values {
                extend_stringified(&mut merged, vars);
            }
        }
        merged
    }
}

/// Copy entries into `target`, rendering non-string JSON values to their
/// JSON text. Nulls carry no information and are skipped.
pub(crate) fn extend_stringified(
    target: &mut BTreeMap<String, String>,
    source: &BTreeMap<String, Value>,
) {
    for (key, value) in source {
        match value {
            Value::Null => {}
            Value::String(s) => {
                target.insert(key.clone(), s.clone());
            }
            other => {
                target.insert(key.clone(), other.to_string());
            }
        }
    }
}
