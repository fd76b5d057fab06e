//! Slack Events API receiver.
//!
//! Verifies the request signature, answers `url_verification` challenges,
//! and hands direct-message events to the dispatcher in a background task.
//! The HTTP response is returned before any conversation work starts so
//! Slack's acknowledgement deadline is always met.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use secrecy::ExposeSecret;
use serde::Deserialize;

use slackgpt_infra::slack::signature::verify_slack_signature;
use slackgpt_types::chat::InboundEvent;

use crate::http::error::AppError;
use crate::state::AppState;

const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
const SIGNATURE_HEADER: &str = "x-slack-signature";
const RETRY_NUM_HEADER: &str = "x-slack-retry-num";

/// Message subtypes that never carry a fresh user prompt.
const IGNORED_SUBTYPES: &[&str] = &["bot_message", "message_changed", "message_deleted"];

/// Outer Events API payload.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEnvelope {
    UrlVerification { challenge: String },
    EventCallback { event: SlackEvent },
    #[serde(other)]
    Other,
}

/// The `event` object of an `event_callback` payload.
#[derive(Debug, Default, Deserialize)]
pub struct SlackEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub user: Option<String>,
    pub channel: Option<String>,
    pub channel_type: Option<String>,
    pub text: Option<String>,
    pub bot_id: Option<String>,
    pub subtype: Option<String>,
}

impl SlackEvent {
    /// Convert a user-authored message event into an [`InboundEvent`].
    ///
    /// Bot posts (including this app's own replies), edits and deletions
    /// yield `None`. Other user-authored subtypes such as `file_share` pass.
    pub fn into_inbound(self) -> Option<InboundEvent> {
        let ignored_subtype = self
            .subtype
            .as_deref()
            .is_some_and(|s| IGNORED_SUBTYPES.contains(&s));
        if self.kind != "message" || self.bot_id.is_some() || ignored_subtype {
            return None;
        }
        Some(InboundEvent::new(
            self.user?,
            self.channel?,
            self.channel_type.unwrap_or_default(),
            self.text.unwrap_or_default(),
        ))
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, AppError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("missing {name} header")))
}

/// Check the Slack signature headers against the raw body.
pub fn verify_request(
    headers: &HeaderMap,
    body: &[u8],
    signing_secret: &[u8],
    now: i64,
) -> Result<(), AppError> {
    let timestamp = header(headers, TIMESTAMP_HEADER)?;
    let signature = header(headers, SIGNATURE_HEADER)?;
    verify_slack_signature(signing_secret, timestamp, body, signature, now)?;
    Ok(())
}

/// POST /slack/events - Receive an Events API request.
pub async fn slack_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    verify_request(
        &headers,
        &body,
        state.signing_secret.expose_secret().as_bytes(),
        chrono::Utc::now().timestamp(),
    )?;

    let envelope: SlackEnvelope = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid event payload: {e}")))?;

    match envelope {
        SlackEnvelope::UrlVerification { challenge } => {
            tracing::info!("answering url_verification challenge");
            Ok(Json(serde_json::json!({ "challenge": challenge })).into_response())
        }
        SlackEnvelope::EventCallback { event } => {
            if let Some(retry) = headers.get(RETRY_NUM_HEADER).and_then(|v| v.to_str().ok()) {
                tracing::debug!(retry, "slack redelivery");
            }

            match event.into_inbound() {
                Some(inbound) => {
                    let dispatcher = state.dispatcher.clone();
                    tokio::spawn(async move {
                        dispatcher.handle(inbound).await;
                    });
                }
                None => tracing::trace!("ignoring non-user message event"),
            }
            Ok(StatusCode::OK.into_response())
        }
        SlackEnvelope::Other => Ok(StatusCode::OK.into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use slackgpt_infra::slack::signature::compute_slack_signature;

    const SECRET: &[u8] = b"signing-secret";
    const NOW: i64 = 1_700_000_000;

    fn signed_headers(body: &[u8], timestamp: i64) -> HeaderMap {
        let ts = timestamp.to_string();
        let sig = compute_slack_signature(SECRET, &ts, body).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_str(&ts).unwrap());
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_str(&sig).unwrap());
        headers
    }

    fn parse(json: &str) -> SlackEnvelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_verify_request_accepts_signed_body() {
        let body = br#"{"type":"url_verification","challenge":"abc"}"#;
        let headers = signed_headers(body, NOW);
        assert!(verify_request(&headers, body, SECRET, NOW).is_ok());
    }

    #[test]
    fn test_verify_request_rejects_tampered_body() {
        let headers = signed_headers(b"original", NOW);
        let err = verify_request(&headers, b"tampered", SECRET, NOW).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_verify_request_rejects_replay() {
        let headers = signed_headers(b"body", NOW - 600);
        let err = verify_request(&headers, b"body", SECRET, NOW).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_verify_request_requires_headers() {
        let err = verify_request(&HeaderMap::new(), b"body", SECRET, NOW).unwrap_err();
        match err {
            AppError::Unauthorized(msg) => assert!(msg.contains(TIMESTAMP_HEADER)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_url_verification() {
        let envelope = parse(r#"{"token":"t","challenge":"3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P","type":"url_verification"}"#);
        assert!(matches!(
            envelope,
            SlackEnvelope::UrlVerification { challenge } if challenge.starts_with("3eZbrw")
        ));
    }

    #[test]
    fn test_parse_direct_message() {
        let envelope = parse(
            r#"{
                "type": "event_callback",
                "team_id": "T1",
                "event": {
                    "type": "message",
                    "user": "U123",
                    "text": "\\sys_role be concise",
                    "channel": "D456",
                    "channel_type": "im",
                    "ts": "1700000000.000200"
                }
            }"#,
        );
        let SlackEnvelope::EventCallback { event } = envelope else {
            panic!("expected event_callback");
        };
        assert_eq!(
            event.into_inbound(),
            Some(InboundEvent::new("U123", "D456", "im", "\\sys_role be concise"))
        );
    }

    #[test]
    fn test_bot_messages_ignored() {
        let event = SlackEvent {
            kind: "message".into(),
            user: Some("U123".into()),
            channel: Some("D456".into()),
            channel_type: Some("im".into()),
            text: Some("> New Conversation Started".into()),
            bot_id: Some("B1".into()),
            subtype: None,
        };
        assert_eq!(event.into_inbound(), None);
    }

    #[test]
    fn test_subtyped_messages_ignored() {
        let event = SlackEvent {
            kind: "message".into(),
            channel: Some("D456".into()),
            subtype: Some("message_changed".into()),
            ..SlackEvent::default()
        };
        assert_eq!(event.into_inbound(), None);
    }

    #[test]
    fn test_user_authored_subtypes_converted() {
        for subtype in ["file_share", "thread_broadcast"] {
            let event = SlackEvent {
                kind: "message".into(),
                user: Some("U123".into()),
                channel: Some("D456".into()),
                channel_type: Some("im".into()),
                text: Some("see attached".into()),
                subtype: Some(subtype.into()),
                ..SlackEvent::default()
            };
            assert_eq!(
                event.into_inbound(),
                Some(InboundEvent::new("U123", "D456", "im", "see attached"))
            );
        }
    }

    #[test]
    fn test_bot_message_subtype_ignored() {
        let event = SlackEvent {
            kind: "message".into(),
            user: Some("U123".into()),
            channel: Some("D456".into()),
            channel_type: Some("im".into()),
            text: Some("posted by an integration".into()),
            subtype: Some("bot_message".into()),
            ..SlackEvent::default()
        };
        assert_eq!(event.into_inbound(), None);
    }

    #[test]
    fn test_message_without_user_ignored() {
        let event = SlackEvent {
            kind: "message".into(),
            channel: Some("D456".into()),
            channel_type: Some("im".into()),
            text: Some("hi".into()),
            ..SlackEvent::default()
        };
        assert_eq!(event.into_inbound(), None);
    }

    #[test]
    fn test_non_message_events_ignored() {
        let event = SlackEvent {
            kind: "app_mention".into(),
            user: Some("U1".into()),
            channel: Some("C1".into()),
            ..SlackEvent::default()
        };
        assert_eq!(event.into_inbound(), None);
    }

    #[test]
    fn test_unknown_envelope_type() {
        assert!(matches!(
            parse(r#"{"type":"app_rate_limited","minute_rate_limited":1518467820}"#),
            SlackEnvelope::Other
        ));
    }

    #[test]
    fn test_channel_messages_still_converted() {
        // Channel filtering happens in the dispatcher, not here.
        let event = SlackEvent {
            kind: "message".into(),
            user: Some("U1".into()),
            channel: Some("C1".into()),
            channel_type: Some("channel".into()),
            text: Some("hello".into()),
            ..SlackEvent::default()
        };
        let inbound = event.into_inbound().unwrap();
        assert!(!inbound.is_direct_message());
    }
}
