//! Google Calendar REST client.
//!
//! Talks to the Calendar v3 events endpoint with a bearer token. The token
//! comes from an OAuth refresh-token exchange when refresh credentials are
//! configured, otherwise from a static access token. All network and API
//! failures surface as `VoxlineError::Collaborator`.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use voxline_core::{CalendarConfig, Result, VoxlineError};
use voxline_relay::{CreatedEvent, MeetingScheduler, SchedulingRequest};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Google Calendar client. One instance is shared across the server; the
/// inner reqwest client pools connections.
pub struct CalendarClient {
    config: CalendarConfig,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventBody {
    summary: String,
    description: String,
    start: EventTime,
    end: EventTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: String,
    time_zone: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl CalendarClient {
    pub fn new(config: CalendarConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VoxlineError::Collaborator(format!("HTTP client init failed: {e}")))?;
        Ok(Self { config, http })
    }

    /// Resolve a bearer token. Refresh credentials take precedence over a
    /// static token so a stale static value cannot shadow a working refresh
    /// setup.
    async fn access_token(&self) -> Result<String> {
        if !self.config.refresh_token.is_empty() && !self.config.client_id.is_empty() {
            return self.refresh_access_token().await;
        }
        if !self.config.access_token.is_empty() {
            return Ok(self.config.access_token.clone());
        }
        Err(VoxlineError::Collaborator(
            "no calendar credentials configured".into(),
        ))
    }

    async fn refresh_access_token(&self) -> Result<String> {
        debug!("exchanging refresh token for access token");
        let params = [
            ("refresh_token", self.config.refresh_token.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| VoxlineError::Collaborator(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoxlineError::Collaborator(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| VoxlineError::Collaborator(format!("bad token response: {e}")))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl MeetingScheduler for CalendarClient {
    async fn create_event(&self, request: &SchedulingRequest) -> Result<CreatedEvent> {
        let body = event_body(request, &self.config.timezone)?;
        let token = self.access_token().await?;

        let url = format!(
            "{}/calendars/{}/events",
            self.config.api_base, self.config.calendar_id
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| VoxlineError::Collaborator(format!("calendar request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoxlineError::Collaborator(format!(
                "calendar API returned {status}: {body}"
            )));
        }

        let created: Value = response
            .json()
            .await
            .map_err(|e| VoxlineError::Collaborator(format!("bad calendar response: {e}")))?;

        let event = CreatedEvent {
            id: string_field(&created, &["id"]),
            link: string_field(&created, &["htmlLink"]),
            summary: string_field(&created, &["summary"]),
            start: string_field(&created, &["start", "dateTime"]),
        };
        info!(event_id = %event.id, summary = %event.summary, "calendar event created");
        Ok(event)
    }
}

fn string_field(value: &Value, path: &[&str]) -> String {
    let mut current = value;
    for key in path {
        match current.get(key) {
            Some(next) => current = next,
            None => return String::new(),
        }
    }
    current.as_str().unwrap_or_default().to_owned()
}

/// Build the Calendar API event payload. One hour long, starting at the
/// requested local date and time.
fn event_body(request: &SchedulingRequest, timezone: &str) -> Result<EventBody> {
    let date = NaiveDate::parse_from_str(&request.date, "%Y-%m-%d")
        .map_err(|e| VoxlineError::Validation(format!("bad meeting date '{}': {e}", request.date)))?;
    let time = parse_time(&request.time)?;
    let start = NaiveDateTime::new(date, time);
    let end = start + ChronoDuration::hours(1);

    Ok(EventBody {
        summary: request.title.clone(),
        description: format!("Scheduled with {}", request.requester_name),
        start: EventTime {
            date_time: start.format(TIMESTAMP_FORMAT).to_string(),
            time_zone: timezone.to_owned(),
        },
        end: EventTime {
            date_time: end.format(TIMESTAMP_FORMAT).to_string(),
            time_zone: timezone.to_owned(),
        },
    })
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|e| VoxlineError::Validation(format!("bad meeting time '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SchedulingRequest {
        SchedulingRequest {
            requester_name: "Alice".into(),
            date: "2025-01-10".into(),
            time: "10:00".into(),
            title: "Planning".into(),
        }
    }

    #[test]
    fn event_spans_one_hour() {
        let body = event_body(&request(), "Asia/Kolkata").unwrap();
        assert_eq!(body.start.date_time, "2025-01-10T10:00:00");
        assert_eq!(body.end.date_time, "2025-01-10T11:00:00");
        assert_eq!(body.start.time_zone, "Asia/Kolkata");
        assert_eq!(body.summary, "Planning");
        assert_eq!(body.description, "Scheduled with Alice");
    }

    #[test]
    fn hour_rollover_crosses_midnight() {
        let mut req = request();
        req.date = "2025-01-31".into();
        req.time = "23:30".into();
        let body = event_body(&req, "UTC").unwrap();
        assert_eq!(body.start.date_time, "2025-01-31T23:30:00");
        assert_eq!(body.end.date_time, "2025-02-01T00:30:00");
    }

    #[test]
    fn time_with_seconds_is_accepted() {
        let mut req = request();
        req.time = "09:15:30".into();
        let body = event_body(&req, "UTC").unwrap();
        assert_eq!(body.start.date_time, "2025-01-10T09:15:30");
    }

    #[test]
    fn bad_date_is_a_validation_error() {
        let mut req = request();
        req.date = "January 10th".into();
        match event_body(&req, "UTC") {
            Err(VoxlineError::Validation(message)) => {
                assert!(message.contains("January 10th"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn bad_time_is_a_validation_error() {
        let mut req = request();
        req.time = "ten o'clock".into();
        assert!(matches!(
            event_body(&req, "UTC"),
            Err(VoxlineError::Validation(_))
        ));
    }

    #[test]
    fn event_body_serializes_with_camel_case_keys() {
        let body = event_body(&request(), "Asia/Kolkata").unwrap();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["start"]["dateTime"], "2025-01-10T10:00:00");
        assert_eq!(json["start"]["timeZone"], "Asia/Kolkata");
        assert!(json.get("start").unwrap().get("date_time").is_none());
    }

    #[test]
    fn response_fields_are_extracted_with_nested_paths() {
        let created: Value = serde_json::from_str(
            r#"{"id": "e1", "htmlLink": "https://cal/e1", "summary": "Planning",
                "start": {"dateTime": "2025-01-10T10:00:00"}}"#,
        )
        .unwrap();
        assert_eq!(string_field(&created, &["id"]), "e1");
        assert_eq!(
            string_field(&created, &["start", "dateTime"]),
            "2025-01-10T10:00:00"
        );
        assert_eq!(string_field(&created, &["missing"]), "");
    }
}
