//! Event classifier — pure kind dispatch over one inbound envelope.

use crate::envelope::{extend_stringified, Envelope};
use serde_json::Value;
use std::collections::BTreeMap;

/// Session key used when an envelope carries no call id. The original
/// deployment kept a single implicit session, so unidentified traffic
/// collapses onto one key instead of being rejected.
pub const FALLBACK_CALL_ID: &str = "call-unidentified";

/// Call-event kinds that terminate a call.
pub const TERMINAL_KINDS: &[&str] = &["hang", "end-of-call-report"];

/// What one envelope means for the scheduling gate.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Requires no action, but must still be acknowledged. Covers both
    /// recognized chatter (transcripts, status updates) and any kind this
    /// relay has never seen — the upstream vocabulary keeps growing.
    Ignorable { kind: String, call_id: Option<String> },
    /// May carry newly-available call variables.
    CallUpdate {
        kind: String,
        call_id: String,
        variables: BTreeMap<String, String>,
    },
    /// Explicit synchronous tool invocation(s); the caller expects a
    /// per-toolCallId result, not a state update.
    ToolInvocation {
        call_id: String,
        calls: Vec<ToolCallRequest>,
    },
}

/// One tool call extracted from a `tool-calls` batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub tool_call_id: String,
    pub name: String,
    pub arguments: ArgumentPayload,
}

/// Tool arguments, already normalized. A string payload that fails to
/// parse as JSON becomes `Malformed` here instead of an error — the batch
/// as a whole still gets handled.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentPayload {
    Parsed(BTreeMap<String, String>),
    Malformed { reason: String },
}

/// Classify one envelope. Pure function of its input; no structural
/// validation beyond a readable kind field.
pub fn classify(envelope: &Envelope) -> Classification {
    let Some(kind) = envelope.kind() else {
        return Classification::Ignorable {
            kind: "unknown".into(),
            call_id: envelope.call_id().map(str::to_owned),
        };
    };

    match kind {
        "conversation-update" | "tool.completed" => Classification::CallUpdate {
            kind: kind.to_owned(),
            call_id: session_key(envelope),
            variables: envelope.variables(),
        },
        // Legacy shape: the function arguments embed the meeting fields
        // directly and there is no tool-call id to answer, so it feeds the
        // incremental path as a variables update.
        "function-call" => {
            let mut variables = envelope.variables();
            if let Some(function_call) = envelope
                .message
                .as_ref()
                .and_then(|m| m.function_call.as_ref())
            {
                let arguments = function_call
                    .arguments
                    .as_ref()
                    .or(function_call.parameters.as_ref());
                if let Some(value) = arguments {
                    if let ArgumentPayload::Parsed(parsed) = normalize_arguments(value) {
                        variables.extend(parsed);
                    }
                }
            }
            Classification::CallUpdate {
                kind: kind.to_owned(),
                call_id: session_key(envelope),
                variables,
            }
        }
        "tool-calls" => {
            let calls = envelope
                .message
                .as_ref()
                .and_then(|m| m.tool_calls.as_deref())
                .unwrap_or_default()
                .iter()
                .map(|entry| {
                    let function = entry.function.as_ref();
                    ToolCallRequest {
                        tool_call_id: entry.id.clone().unwrap_or_else(|| "unknown".into()),
                        name: function
                            .and_then(|f| f.name.clone())
                            .unwrap_or_default(),
                        arguments: function
                            .and_then(|f| f.arguments.as_ref())
                            .map(normalize_arguments)
                            .unwrap_or_else(|| ArgumentPayload::Parsed(BTreeMap::new())),
                    }
                })
                .collect();
            Classification::ToolInvocation {
                call_id: session_key(envelope),
                calls,
            }
        }
        // Terminal kinds key through session_key like updates do, so an
        // id-less hang still ends the fallback session it was merged into.
        terminal if TERMINAL_KINDS.contains(&terminal) => Classification::Ignorable {
            kind: terminal.to_owned(),
            call_id: Some(session_key(envelope)),
        },
        other => Classification::Ignorable {
            kind: other.to_owned(),
            call_id: envelope.call_id().map(str::to_owned),
        },
    }
}

fn session_key(envelope: &Envelope) -> String {
    envelope
        .call_id()
        .map(str::to_owned)
        .unwrap_or_else(|| FALLBACK_CALL_ID.into())
}

/// Normalize a tool-argument payload: structured objects pass through,
/// string payloads get a JSON parse attempt.
fn normalize_arguments(value: &Value) -> ArgumentPayload {
    match value {
        Value::Object(map) => {
            let mut parsed = BTreeMap::new();
            let entries: BTreeMap<String, Value> =
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            extend_stringified(&mut parsed, &entries);
            ArgumentPayload::Parsed(parsed)
        }
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed @ Value::Object(_)) => normalize_arguments(&parsed),
            Ok(other) => ArgumentPayload::Malformed {
                reason: format!("expected a JSON object, got {other}"),
            },
            Err(e) => ArgumentPayload::Malformed {
                reason: format!("invalid JSON arguments: {e}"),
            },
        },
        other => ArgumentPayload::Malformed {
            reason: format!("unsupported argument payload: {other}"),
        },
    }
}
