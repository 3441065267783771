//! Authentication middleware for Axum

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::application::UserService;
use crate::domain::{authorize, Caller, DomainError, Operation};
use crate::interfaces::http::common::ApiError;

/// State for [`auth_middleware`]
#[derive(Clone)]
pub struct AuthState {
    pub user_service: Arc<UserService>,
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Bearer-token authentication.
///
/// On success the resolved [`Caller`](crate::domain::Caller) is stored in the
/// request extensions; otherwise the request ends with 401 before reaching
/// the handler.
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let caller = {
        let token = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(extract_token);

        match token {
            Some(token) => auth_state.user_service.authenticate(token).await,
            None => Err(DomainError::Unauthenticated),
        }
    };

    match caller {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Per-route gate run after [`auth_middleware`] and before the handler's
/// extractors, so a caller without the required role is refused before
/// the request body is parsed.
pub async fn require_operation(
    State(operation): State<Operation>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let caller = request.extensions().get::<Caller>();
    match authorize(caller, operation) {
        Ok(()) => next.run(request).await,
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::extract_token;

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(extract_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_token("Bearer   "), None);
        assert_eq!(extract_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(extract_token("abc.def.ghi"), None);
    }
}
