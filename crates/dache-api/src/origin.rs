//! Who sent a submission: client address and user agent.

use std::{convert::Infallible, net::SocketAddr};

use axum::{
  extract::{ConnectInfo, FromRequestParts},
  http::{HeaderMap, header, request::Parts},
};
use dache_core::inquiry::RequestOrigin;

use crate::AppState;

/// Extractor wrapping [`RequestOrigin`]. Never rejects.
///
/// The address is the peer from [`ConnectInfo`], present when the server was
/// started with connect info. Behind a reverse proxy, with
/// [`AppState::trust_proxy`] set, the first `X-Forwarded-For` hop is used
/// instead.
pub struct ClientOrigin(pub RequestOrigin);

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
  let raw = headers.get("x-forwarded-for")?.to_str().ok()?;
  let first = raw.split(',').next()?.trim();
  (!first.is_empty()).then(|| first.to_owned())
}

fn peer(parts: &Parts) -> Option<String> {
  parts
    .extensions
    .get::<ConnectInfo<SocketAddr>>()
    .map(|ConnectInfo(addr)| addr.ip().to_string())
}

/// Read the origin of a request. `X-Forwarded-For` is consulted only when
/// `trust_proxy` is set.
pub fn request_origin(parts: &Parts, trust_proxy: bool) -> RequestOrigin {
  let ip_address = if trust_proxy {
    forwarded_for(&parts.headers).or_else(|| peer(parts))
  } else {
    peer(parts)
  };

  let user_agent = parts
    .headers
    .get(header::USER_AGENT)
    .and_then(|v| v.to_str().ok())
    .map(str::to_owned);

  RequestOrigin { ip_address, user_agent }
}

impl<S, M> FromRequestParts<AppState<S, M>> for ClientOrigin
where
  S: Send + Sync,
  M: Send + Sync,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, M>,
  ) -> Result<Self, Self::Rejection> {
    Ok(ClientOrigin(request_origin(parts, state.trust_proxy)))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::Request;

  use super::*;

  fn parts(forwarded: Option<&str>, peer: Option<[u8; 4]>) -> Parts {
    let mut builder = Request::builder().header(header::USER_AGENT, "Test Script");
    if let Some(forwarded) = forwarded {
      builder = builder.header("x-forwarded-for", forwarded);
    }
    let mut req = builder.body(()).unwrap();
    if let Some(ip) = peer {
      req
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((ip, 51000))));
    }
    req.into_parts().0
  }

  #[test]
  fn reads_peer_address_and_user_agent() {
    let origin = request_origin(&parts(None, Some([203, 0, 113, 9])), false);
    assert_eq!(origin.ip_address.as_deref(), Some("203.0.113.9"));
    assert_eq!(origin.user_agent.as_deref(), Some("Test Script"));
  }

  #[test]
  fn forwarded_header_ignored_without_trust() {
    let parts = parts(Some("6.6.6.6"), Some([10, 0, 0, 5]));
    let origin = request_origin(&parts, false);
    assert_eq!(origin.ip_address.as_deref(), Some("10.0.0.5"));
  }

  #[test]
  fn forwarded_header_wins_behind_trusted_proxy() {
    let parts = parts(Some("198.51.100.7, 10.0.0.1"), Some([10, 0, 0, 1]));
    let origin = request_origin(&parts, true);
    assert_eq!(origin.ip_address.as_deref(), Some("198.51.100.7"));
  }

  #[test]
  fn trusted_proxy_without_header_falls_back_to_peer() {
    let origin = request_origin(&parts(None, Some([10, 0, 0, 1])), true);
    assert_eq!(origin.ip_address.as_deref(), Some("10.0.0.1"));
  }

  #[test]
  fn missing_everything_is_none() {
    let (parts, ()) = Request::builder().body(()).unwrap().into_parts();
    assert_eq!(request_origin(&parts, true), RequestOrigin::default());
  }
}
