//! Scheduling gate — decides when one call's events fire the one dispatch.
//!
//! Two paths reach the collaborator:
//! - the incremental path: call updates merge variables into the session
//!   until the required field set completes, then claim-and-dispatch once;
//! - the tool path: explicit tool invocations validate their own arguments
//!   and dispatch immediately, answering per tool-call id.
//!
//! When both could fire for the same call, the tool path wins: it never
//! consults or mutates session state, so the session gate stays closed to
//! everything except the incremental path.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{error, info, warn};
use voxline_core::GateConfig;

use crate::classifier::{ArgumentPayload, Classification, TERMINAL_KINDS};
use crate::scheduler::{CreatedEvent, MeetingScheduler, SchedulingRequest};
use crate::session::{ClaimOutcome, SessionStore};

/// Variables the incremental path needs before it may dispatch.
pub const UPDATE_REQUIRED_FIELDS: &[&str] = &["userName", "meetingDate", "meetingTime"];
/// The tool path additionally requires an explicit title.
pub const TOOL_REQUIRED_FIELDS: &[&str] =
    &["userName", "meetingDate", "meetingTime", "meetingTitle"];

const DEFAULT_TITLE: &str = "Meeting";

/// What the gate decided for one envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    /// Nothing to do (or nothing to do *yet*). Also returned after a
    /// failed session-path dispatch: the transport must stay green.
    Acknowledge,
    /// The incremental path fired and the collaborator succeeded.
    Dispatched(CreatedEvent),
    /// The incremental path fired and the collaborator failed. The session
    /// stays dispatched: at-most-once is prioritized over retry.
    DispatchFailed(String),
    /// Per-toolCallId results for a tool invocation batch.
    ToolResults(Vec<ToolCallResult>),
}

/// One entry of a tool invocation response.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallResult {
    pub tool_call_id: String,
    pub result: String,
}

/// The gate itself: session store plus the collaborator seam.
pub struct SchedulingGate {
    sessions: Arc<SessionStore>,
    scheduler: Arc<dyn MeetingScheduler>,
    update_triggers: Vec<String>,
    scheduling_function: String,
}

impl SchedulingGate {
    pub fn new(
        config: &GateConfig,
        sessions: Arc<SessionStore>,
        scheduler: Arc<dyn MeetingScheduler>,
    ) -> Self {
        Self {
            sessions,
            scheduler,
            update_triggers: config.update_triggers.clone(),
            scheduling_function: config.scheduling_function.clone(),
        }
    }

    /// Handle one classified envelope.
    pub async fn handle(&self, classification: Classification) -> GateOutcome {
        match classification {
            Classification::Ignorable { kind, call_id } => {
                if TERMINAL_KINDS.contains(&kind.as_str()) {
                    if let Some(call_id) = call_id {
                        if self.sessions.end_session(&call_id) {
                            info!(%call_id, %kind, "call ended, session dropped");
                        }
                    }
                }
                GateOutcome::Acknowledge
            }
            Classification::CallUpdate {
                kind,
                call_id,
                variables,
            } => self.handle_update(&kind, &call_id, &variables).await,
            Classification::ToolInvocation { call_id, calls } => {
                let mut results = Vec::with_capacity(calls.len());
                for call in calls {
                    let result = self.handle_tool_call(&call_id, &call).await;
                    results.push(ToolCallResult {
                        tool_call_id: call.tool_call_id,
                        result,
                    });
                }
                GateOutcome::ToolResults(results)
            }
        }
    }

    async fn handle_update(
        &self,
        kind: &str,
        call_id: &str,
        variables: &BTreeMap<String, String>,
    ) -> GateOutcome {
        // Non-trigger kinds still contribute variables; they just cannot
        // claim the dispatch.
        if !self.update_triggers.iter().any(|t| t == kind) {
            self.sessions.merge(call_id, variables);
            return GateOutcome::Acknowledge;
        }

        match self
            .sessions
            .merge_and_claim(call_id, variables, UPDATE_REQUIRED_FIELDS)
        {
            ClaimOutcome::AlreadyDispatched => GateOutcome::Acknowledge,
            ClaimOutcome::Incomplete { missing } => {
                info!(%call_id, ?missing, "waiting for remaining meeting fields");
                GateOutcome::Acknowledge
            }
            ClaimOutcome::Claimed(merged) => {
                let request = build_request(&merged);
                info!(%call_id, title = %request.title, date = %request.date, "meeting fields complete, dispatching");
                match self.scheduler.create_event(&request).await {
                    Ok(event) => {
                        info!(%call_id, event_id = %event.id, "meeting created");
                        GateOutcome::Dispatched(event)
                    }
                    Err(e) => {
                        // The claim stands: a retry storm from the upstream
                        // platform must not create duplicate events.
                        error!(%call_id, error = %e, "dispatch failed");
                        GateOutcome::DispatchFailed(e.to_string())
                    }
                }
            }
        }
    }

    async fn handle_tool_call(
        &self,
        call_id: &str,
        call: &crate::classifier::ToolCallRequest,
    ) -> String {
        if call.name != self.scheduling_function {
            warn!(%call_id, tool = %call.name, "unknown tool requested");
            return format!("Unknown tool: {}", call.name);
        }

        let arguments = match &call.arguments {
            ArgumentPayload::Parsed(args) => args,
            ArgumentPayload::Malformed { reason } => {
                warn!(%call_id, tool_call_id = %call.tool_call_id, %reason, "malformed tool arguments");
                return format!("Could not parse arguments: {reason}");
            }
        };

        let missing: Vec<&str> = TOOL_REQUIRED_FIELDS
            .iter()
            .filter(|field| {
                arguments
                    .get(**field)
                    .is_none_or(|value| value.trim().is_empty())
            })
            .copied()
            .collect();
        if !missing.is_empty() {
            return format!("Missing required fields: {}", missing.join(", "));
        }

        // This path is a one-shot synchronous contract; each invocation
        // carries a unique toolCallId, so session state is neither checked
        // nor mutated.
        let request = build_request(arguments);
        match self.scheduler.create_event(&request).await {
            Ok(event) => {
                info!(%call_id, event_id = %event.id, "meeting created via tool call");
                format!(
                    "Meeting '{}' scheduled for {} at {}. Link: {}",
                    request.title, request.date, request.time, event.link
                )
            }
            Err(e) => {
                error!(%call_id, error = %e, "tool dispatch failed");
                format!("Failed to schedule meeting: {e}")
            }
        }
    }
}

fn build_request(variables: &BTreeMap<String, String>) -> SchedulingRequest {
    SchedulingRequest {
        requester_name: variables.get("userName").cloned().unwrap_or_default(),
        date: variables.get("meetingDate").cloned().unwrap_or_default(),
        time: variables.get("meetingTime").cloned().unwrap_or_default(),
        title: variables
            .get("meetingTitle")
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_TITLE.into()),
    }
}
