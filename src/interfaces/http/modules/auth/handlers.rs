//! Auth API handlers
//!
//! Login and token refresh are public; profile requires a bearer token.

use axum::{extract::State, Extension, Json};

use super::dto::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};
use crate::domain::Caller;
use crate::interfaces::http::common::{ApiErrorResponse, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::modules::users::{UserDto, UserHandlerState};

#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials", body = ApiErrorResponse),
        (status = 422, description = "Validation error", body = ApiErrorResponse)
    )
)]
pub async fn login(
    State(state): State<UserHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    let pair = state
        .user_service
        .login(&request.username, &request.password)
        .await?;
    Ok(Json(ApiResponse::success(pair.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/token/refresh",
    tag = "Authentication",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = ApiResponse<RefreshResponse>),
        (status = 401, description = "Refresh token invalid or expired", body = ApiErrorResponse)
    )
)]
pub async fn refresh_token(
    State(state): State<UserHandlerState>,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<RefreshResponse>>> {
    let grant = state.user_service.refresh(&request.refresh_token).await?;
    Ok(Json(ApiResponse::success(grant.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/profile",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserDto>),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse),
        (status = 404, description = "Account no longer exists", body = ApiErrorResponse)
    )
)]
pub async fn profile(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<ApiResponse<UserDto>>> {
    let user = state.user_service.profile(&caller).await?;
    Ok(Json(ApiResponse::success(user.into())))
}
