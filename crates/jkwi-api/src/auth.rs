//! # Authentication & Authorization Middleware
//!
//! Bearer token middleware with role-based access control.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {role}:{actor}:{secret}   # role-scoped token
//! Bearer {secret}                  # legacy shared secret (treated as admin)
//! ```
//!
//! The actor segment is what lands in `created_by` / `updated_by` /
//! `deleted_by`. An empty actor segment records `system`.
//!
//! ## CallerIdentity
//!
//! Every authenticated request gets a [`CallerIdentity`] injected into the
//! request extensions. Handlers extract it via the `FromRequestParts` impl.

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jkwi_core::Actor;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── Role ────────────────────────────────────────────────────────────────────

/// Roles ordered by privilege level.
///
/// The `Ord` derivation respects variant declaration order:
/// `Member < Director < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Read access to records, listings, statistics and search.
    Member,
    /// Can create records, update them, change status and export.
    Director,
    /// Full access: partitions, deletes and imports.
    Admin,
}

impl Role {
    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Director => "director",
            Self::Admin => "admin",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(Self::Member),
            "director" => Some(Self::Director),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Identity of the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The caller's role.
    pub role: Role,
    /// Recorded in the audit fields of every mutation the caller makes.
    pub actor: Actor,
}

impl CallerIdentity {
    /// Full access under the `system` actor.
    pub fn system_admin() -> Self {
        Self {
            role: Role::Admin,
            actor: Actor::system(),
        }
    }

    /// Check if the caller has at least the given minimum role.
    pub fn has_role(&self, minimum: Role) -> bool {
        self.role >= minimum
    }
}

/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if no identity is present.
impl<S: Send + Sync> FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Check that the caller has at least the required role.
/// Returns 403 Forbidden if the caller's role is insufficient.
pub fn require_role(caller: &CallerIdentity, minimum: Role) -> Result<(), AppError> {
    if caller.has_role(minimum) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "role '{}' required, caller has '{}'",
            minimum.as_str(),
            caller.role.as_str()
        )))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────────────

/// Constant-time comparison of bearer secrets.
///
/// When lengths differ, performs a dummy comparison so the mismatch path
/// takes comparable time.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token in format `{role}:{actor}:{secret}` or `{secret}`.
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();

    match parts.as_slice() {
        [secret] => {
            if constant_time_token_eq(secret, expected_secret) {
                Ok(CallerIdentity::system_admin())
            } else {
                Err("invalid bearer token".into())
            }
        }
        [role, actor, secret] => {
            if !constant_time_token_eq(secret, expected_secret) {
                return Err("invalid bearer token".into());
            }
            let role = Role::parse(role).ok_or_else(|| format!("unknown role: {role}"))?;
            let actor = if actor.is_empty() {
                Actor::system()
            } else {
                Actor::new(*actor).map_err(|e| e.to_string())?
            };
            Ok(CallerIdentity { role, actor })
        }
        _ => Err("invalid token format, expected {role}:{actor}:{secret} or {secret}".into()),
    }
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Validate the Bearer token and inject the [`CallerIdentity`].
///
/// When `AuthConfig.token` is `None`, every request runs as admin/`system`.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected_token = request.extensions().get::<AuthConfig>().cloned();

    match expected_token {
        Some(AuthConfig {
            token: Some(ref expected),
        }) => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            match auth_header {
                Some(header_value) => match header_value.strip_prefix("Bearer ") {
                    Some(provided) => match parse_bearer_token(provided, expected) {
                        Ok(identity) => {
                            request.extensions_mut().insert(identity);
                            next.run(request).await
                        }
                        Err(msg) => {
                            tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                            unauthorized_response(&msg)
                        }
                    },
                    None => {
                        tracing::warn!("authentication failed: non-Bearer authorization scheme");
                        unauthorized_response("authorization header must use Bearer scheme")
                    }
                },
                None => {
                    tracing::warn!("authentication failed: missing authorization header");
                    unauthorized_response("missing authorization header")
                }
            }
        }
        _ => {
            request.extensions_mut().insert(CallerIdentity::system_admin());
            next.run(request).await
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// Router whose handler echoes `{role}/{actor}` of the caller.
    fn test_app(token: Option<String>) -> Router {
        let auth_config = AuthConfig { token };
        Router::new()
            .route(
                "/test",
                get(|caller: CallerIdentity| async move {
                    format!("{}/{}", caller.role.as_str(), caller.actor)
                }),
            )
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(auth_config))
    }

    async fn send(app: Router, auth: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn legacy_secret_is_admin_system() {
        let app = test_app(Some("my-secret".to_string()));
        let (status, body) = send(app, Some("Bearer my-secret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "admin/system");
    }

    #[tokio::test]
    async fn role_token_carries_actor() {
        let app = test_app(Some("my-secret".to_string()));
        let (status, body) = send(app, Some("Bearer director:jkwi-sec:my-secret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "director/jkwi-sec");
    }

    #[tokio::test]
    async fn missing_authorization_header_rejected() {
        let app = test_app(Some("my-secret".to_string()));
        let (status, body) = send(app, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let err: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(err["error"]["code"], "UNAUTHORIZED");
        assert!(err["error"]["message"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn invalid_token_rejected() {
        let app = test_app(Some("my-secret".to_string()));
        let (status, body) = send(app, Some("Bearer wrong-token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("invalid"));
    }

    #[tokio::test]
    async fn non_bearer_scheme_rejected() {
        let app = test_app(Some("my-secret".to_string()));
        let (status, body) = send(app, Some("Basic dXNlcjpwYXNz")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Bearer scheme"));
    }

    #[tokio::test]
    async fn auth_disabled_allows_all_requests() {
        let app = test_app(None);
        let (status, body) = send(app, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "admin/system");
    }

    #[tokio::test]
    async fn auth_disabled_ignores_provided_token() {
        let app = test_app(None);
        let (status, body) = send(app, Some("Bearer member:someone:whatever")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "admin/system");
    }

    #[test]
    fn role_ordering() {
        assert!(Role::Member < Role::Director);
        assert!(Role::Director < Role::Admin);
    }

    #[test]
    fn parse_role_token_with_empty_actor() {
        let identity = parse_bearer_token("member::s3cret", "s3cret").unwrap();
        assert_eq!(identity.role, Role::Member);
        assert_eq!(identity.actor, Actor::system());
    }

    #[test]
    fn parse_rejects_unknown_role() {
        let err = parse_bearer_token("superuser:x:s3cret", "s3cret").unwrap_err();
        assert!(err.contains("unknown role"));
    }

    #[test]
    fn parse_checks_secret_before_role() {
        let err = parse_bearer_token("superuser:x:wrong", "s3cret").unwrap_err();
        assert_eq!(err, "invalid bearer token");
    }

    #[test]
    fn parse_rejects_two_segment_token() {
        assert!(parse_bearer_token("admin:s3cret", "s3cret").is_err());
    }

    #[test]
    fn require_role_enforces_minimum() {
        let member = CallerIdentity {
            role: Role::Member,
            actor: Actor::system(),
        };
        assert!(require_role(&member, Role::Member).is_ok());
        assert!(matches!(
            require_role(&member, Role::Director),
            Err(AppError::Forbidden(_))
        ));
        assert!(require_role(&CallerIdentity::system_admin(), Role::Admin).is_ok());
    }

    #[test]
    fn constant_time_eq_handles_length_mismatch() {
        assert!(constant_time_token_eq("abc", "abc"));
        assert!(!constant_time_token_eq("abc", "abcd"));
        assert!(!constant_time_token_eq("abd", "abc"));
    }

    #[test]
    fn auth_config_debug_redacts_token() {
        let config = AuthConfig {
            token: Some("super-secret".into()),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }
}
