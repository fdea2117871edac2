//! HTTP Basic-auth middleware wrapped around the API router.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Marker error: the request carried no valid credentials.
#[derive(Debug, PartialEq)]
pub struct Unauthorized;

/// Verify credentials directly from headers.
pub fn verify_auth(
  headers: &HeaderMap,
  config: &AuthConfig,
) -> Result<(), Unauthorized> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Unauthorized)?;

  let encoded = header_val.strip_prefix("Basic ").ok_or(Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Unauthorized)?;

  if username != config.username {
    return Err(Unauthorized);
  }

  let parsed_hash =
    PasswordHash::new(&config.password_hash).map_err(|_| Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Unauthorized)?;

  Ok(())
}

/// Middleware guarding every route except the liveness probe.
pub async fn require_auth(
  State(auth): State<Arc<AuthConfig>>,
  req: Request,
  next: Next,
) -> Response {
  // Monitors poll /health without credentials.
  if req.uri().path() == "/health" {
    return next.run(req).await;
  }

  match verify_auth(req.headers(), &auth) {
    Ok(()) => next.run(req).await,
    Err(Unauthorized) => {
      let mut res = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"leadbook\""),
      );
      res
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{Router, body::Body, http::Request, routing::get};
  use tower::ServiceExt as _;

  fn make_config(password: &str) -> AuthConfig {
    use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
    use rand_core::OsRng;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    AuthConfig { username: "operator".to_string(), password_hash: hash }
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  fn headers_with(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, value.parse().unwrap());
    headers
  }

  #[test]
  fn correct_credentials() {
    let config = make_config("secret");
    let headers = headers_with(&basic("operator", "secret"));
    assert_eq!(verify_auth(&headers, &config), Ok(()));
  }

  #[test]
  fn wrong_password() {
    let config = make_config("secret");
    let headers = headers_with(&basic("operator", "wrong"));
    assert_eq!(verify_auth(&headers, &config), Err(Unauthorized));
  }

  #[test]
  fn wrong_username() {
    let config = make_config("secret");
    let headers = headers_with(&basic("intruder", "secret"));
    assert_eq!(verify_auth(&headers, &config), Err(Unauthorized));
  }

  #[test]
  fn missing_header() {
    let config = make_config("secret");
    assert_eq!(verify_auth(&HeaderMap::new(), &config), Err(Unauthorized));
  }

  #[test]
  fn invalid_base64() {
    let config = make_config("secret");
    let headers = headers_with("Basic !!!not-base64!!!");
    assert_eq!(verify_auth(&headers, &config), Err(Unauthorized));
  }

  #[tokio::test]
  async fn health_skips_auth() {
    let config = Arc::new(make_config("secret"));
    let app = Router::new()
      .route("/health", get(|| async { "OK" }))
      .layer(axum::middleware::from_fn_with_state(config, require_auth));

    let res = app
      .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn other_routes_challenge_without_credentials() {
    let config = Arc::new(make_config("secret"));
    let app = Router::new()
      .route("/leads", get(|| async { "[]" }))
      .layer(axum::middleware::from_fn_with_state(
        Arc::clone(&config),
        require_auth,
      ));

    let denied = app
      .clone()
      .oneshot(Request::builder().uri("/leads").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
      denied.headers()[header::WWW_AUTHENTICATE],
      "Basic realm=\"leadbook\""
    );

    let allowed = app
      .oneshot(
        Request::builder()
          .uri("/leads")
          .header(header::AUTHORIZATION, basic("operator", "secret"))
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
  }
}
