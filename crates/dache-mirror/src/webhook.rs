//! [`WebhookMirror`] — one JSON POST per inquiry, no retries.

use std::time::Duration;

use dache_core::mirror::{Mirror, MirrorError, MirrorPayload, MirrorResult};
use reqwest::{Client, Url};

use crate::{Error, Result};

/// Mirror settings as they come out of server configuration.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
  pub enabled: bool,
  pub url:     Option<String>,
  /// Upper bound on the whole exchange, connect through body.
  pub timeout: Duration,
}

/// Async webhook client for the spreadsheet mirror.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct WebhookMirror {
  client:   Client,
  endpoint: Option<Url>,
}

impl WebhookMirror {
  /// Build a mirror from `config`. A disabled mirror, or one without a URL,
  /// is valid and reports [`MirrorError::NotConfigured`] on every call.
  pub fn new(config: &MirrorConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;

    let url = config.url.as_deref().map(str::trim).unwrap_or_default();
    let endpoint = if config.enabled && !url.is_empty() {
      Some(Url::parse(url).map_err(|e| Error::InvalidUrl {
        url:    url.to_owned(),
        reason: e.to_string(),
      })?)
    } else {
      None
    };

    Ok(Self { client, endpoint })
  }

  pub fn is_configured(&self) -> bool { self.endpoint.is_some() }
}

fn transport(e: reqwest::Error) -> MirrorError {
  if e.is_timeout() {
    MirrorError::Timeout
  } else {
    MirrorError::Network(e.to_string())
  }
}

impl Mirror for WebhookMirror {
  async fn forward(&self, payload: &MirrorPayload) -> Result<MirrorResult, MirrorError> {
    let Some(endpoint) = &self.endpoint else {
      return Err(MirrorError::NotConfigured);
    };

    let resp = self
      .client
      .post(endpoint.clone())
      .json(payload)
      .send()
      .await
      .map_err(transport)?;

    let status = resp.status();
    if !status.is_success() {
      return Err(MirrorError::Status(status.as_u16()));
    }

    let body = resp.text().await.map_err(transport)?;
    let ack: MirrorResult = serde_json::from_str(&body)
      .map_err(|e| MirrorError::InvalidResponse(e.to_string()))?;

    if !ack.success {
      return Err(MirrorError::Rejected(ack.message));
    }
    Ok(ack)
  }
}

#[cfg(test)]
mod tests {
  use dache_core::inquiry::NewInquiry;
  use serde_json::json;
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
  };

  use super::*;

  fn payload() -> MirrorPayload {
    MirrorPayload {
      submission: NewInquiry {
        name:              "Test User".into(),
        birthdate:         "1990-01-01".into(),
        phone:             "010-1234-5678".into(),
        email:             "test@example.com".into(),
        gender:            "male".into(),
        education:         "bachelor".into(),
        region:            "seoul".into(),
        occupation:        "Software Engineer".into(),
        income:            "50-70".into(),
        primary_meeting:   "2025-01-15T14:00".into(),
        secondary_meeting: Some("2025-01-16T15:00".into()),
      },
      ip_address: Some("127.0.0.1".into()),
      user_agent: Some("Test Script".into()),
    }
  }

  fn mirror_for(server: &MockServer, timeout: Duration) -> WebhookMirror {
    WebhookMirror::new(&MirrorConfig {
      enabled: true,
      url: Some(format!("{}/exec", server.uri())),
      timeout,
    })
    .unwrap()
  }

  #[tokio::test]
  async fn posts_payload_and_returns_ack() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/exec"))
      .and(header("content-type", "application/json"))
      .and(body_partial_json(json!({
        "name": "Test User",
        "meeting1": "2025-01-15T14:00",
        "meeting2": "2025-01-16T15:00",
        "ip_address": "127.0.0.1",
        "user_agent": "Test Script",
      })))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "message": "Data successfully added to Google Sheets",
      })))
      .expect(1)
      .mount(&server)
      .await;

    let ack = mirror_for(&server, Duration::from_secs(5))
      .forward(&payload())
      .await
      .unwrap();
    assert!(ack.success);
    assert_eq!(ack.message, "Data successfully added to Google Sheets");
  }

  #[tokio::test]
  async fn reported_failure_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "success": false,
        "message": "sheet missing",
      })))
      .mount(&server)
      .await;

    let err = mirror_for(&server, Duration::from_secs(5))
      .forward(&payload())
      .await
      .unwrap_err();
    assert_eq!(err, MirrorError::Rejected("sheet missing".into()));
  }

  #[tokio::test]
  async fn non_json_body_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_string("<html>moved</html>"))
      .mount(&server)
      .await;

    let err = mirror_for(&server, Duration::from_secs(5))
      .forward(&payload())
      .await
      .unwrap_err();
    assert!(matches!(err, MirrorError::InvalidResponse(_)), "{err:?}");
  }

  #[tokio::test]
  async fn error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(500))
      .mount(&server)
      .await;

    let err = mirror_for(&server, Duration::from_secs(5))
      .forward(&payload())
      .await
      .unwrap_err();
    assert_eq!(err, MirrorError::Status(500));
  }

  #[tokio::test]
  async fn slow_mirror_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(json!({ "success": true, "message": "late" }))
          .set_delay(Duration::from_secs(2)),
      )
      .mount(&server)
      .await;

    let err = mirror_for(&server, Duration::from_millis(100))
      .forward(&payload())
      .await
      .unwrap_err();
    assert_eq!(err, MirrorError::Timeout);
  }

  #[tokio::test]
  async fn unreachable_mirror_is_a_network_error() {
    let mirror = WebhookMirror::new(&MirrorConfig {
      enabled: true,
      url:     Some("http://127.0.0.1:1/exec".into()),
      timeout: Duration::from_secs(5),
    })
    .unwrap();

    let err = mirror.forward(&payload()).await.unwrap_err();
    assert!(matches!(err, MirrorError::Network(_)), "{err:?}");
  }

  #[tokio::test]
  async fn disabled_or_blank_is_not_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200))
      .expect(0)
      .mount(&server)
      .await;

    for (enabled, url) in [
      (false, Some(format!("{}/exec", server.uri()))),
      (true, None),
      (true, Some("   ".to_string())),
    ] {
      let mirror = WebhookMirror::new(&MirrorConfig {
        enabled,
        url,
        timeout: Duration::from_secs(5),
      })
      .unwrap();
      assert!(!mirror.is_configured());
      assert_eq!(
        mirror.forward(&payload()).await.unwrap_err(),
        MirrorError::NotConfigured
      );
    }
  }

  #[test]
  fn malformed_url_is_rejected_up_front() {
    let result = WebhookMirror::new(&MirrorConfig {
      enabled: true,
      url:     Some("not a url".into()),
      timeout: Duration::from_secs(5),
    });
    assert!(matches!(result, Err(Error::InvalidUrl { .. })));
  }
}
