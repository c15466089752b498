use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::any;
use axum::Router;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::session::{ResolverRegistry, SessionError};

/// Router answering every path with the canonical session for the request's
/// `Authorization: Bearer <provider> <token>` header.
pub fn router(registry: ResolverRegistry) -> Router {
    Router::new()
        .route("/", any(resolve_session))
        .fallback(resolve_session)
        .with_state(registry)
        .layer(TraceLayer::new_for_http())
}

async fn resolve_session(
    State(registry): State<ResolverRegistry>,
    headers: HeaderMap,
) -> Result<Response, SessionRejection> {
    let header = match headers.get(AUTHORIZATION) {
        Some(value) => value.to_str().map_err(|_| {
            SessionError::MalformedHeader("authorization header is not visible ASCII".to_string())
        })?,
        None => {
            return Err(SessionError::MalformedHeader("missing authorization header".to_string()).into())
        }
    };
    let session = registry.resolve_header(header).await?;
    tracing::info!(
        sub = %session.sub,
        provider = %session.extra.provider,
        username = %session.extra.username,
        "authenticated"
    );
    Ok(Json(session).into_response())
}

/// HTTP rendering of a failed resolution.
#[derive(Debug)]
pub struct SessionRejection(pub SessionError);

impl From<SessionError> for SessionRejection {
    fn from(error: SessionError) -> Self {
        Self(error)
    }
}

impl SessionRejection {
    fn status(&self) -> StatusCode {
        match &self.0 {
            SessionError::MalformedHeader(_) => StatusCode::BAD_REQUEST,
            SessionError::UnknownProvider(_) => StatusCode::UNAUTHORIZED,
            err if err.is_rejected_token() => StatusCode::UNAUTHORIZED,
            SessionError::DuplicateProvider(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SessionError::Resolution { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    fn code(&self) -> &'static str {
        match &self.0 {
            SessionError::MalformedHeader(_) => "malformed_authorization",
            SessionError::UnknownProvider(_) => "unknown_provider",
            SessionError::DuplicateProvider(_) => "misconfigured",
            err if err.is_rejected_token() => "invalid_token",
            SessionError::Resolution { .. } => "resolution_failed",
        }
    }
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self.0 {
            SessionError::Resolution { provider, .. } => tracing::warn!(
                provider = %provider,
                status = status.as_u16(),
                error = %self.0,
                "failed to resolve session"
            ),
            other => tracing::warn!(status = status.as_u16(), error = %other, "rejected session request"),
        }
        let body = json!({
            "error": self.code(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
