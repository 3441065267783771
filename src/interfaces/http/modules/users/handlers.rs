//! User management API handlers
//!
//! Listing is open to any authenticated caller (scoped by role); the rest
//! is admin-only. Access checks happen inside `UserService`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{CreateUserRequest, UpdateUserRequest, UserDto};
use crate::application::UserService;
use crate::domain::Caller;
use crate::interfaces::http::common::{ApiErrorResponse, ApiResponse, ApiResult, ValidatedJson};

/// Shared by the auth and users handlers
#[derive(Clone)]
pub struct UserHandlerState {
    pub user_service: Arc<UserService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users visible to the caller", body = ApiResponse<Vec<UserDto>>),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<ApiResponse<Vec<UserDto>>>> {
    let users = state.user_service.list_users(&caller).await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserDto>),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse),
        (status = 403, description = "Admin role required", body = ApiErrorResponse),
        (status = 409, description = "Username already taken", body = ApiErrorResponse),
        (status = 422, description = "Validation error", body = ApiErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<Caller>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserDto>>)> {
    let user = state.user_service.register(&caller, request.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<UserDto>),
        (status = 403, description = "Admin role required", body = ApiErrorResponse),
        (status = 404, description = "Not found", body = ApiErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<UserDto>>> {
    let user = state.user_service.get_user(&caller, &id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserDto>),
        (status = 403, description = "Admin role required", body = ApiErrorResponse),
        (status = 404, description = "Not found", body = ApiErrorResponse),
        (status = 409, description = "Username already taken", body = ApiErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<ApiResponse<UserDto>>> {
    let user = state
        .user_service
        .update_user(&caller, &id, request.into())
        .await?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Admin role required", body = ApiErrorResponse),
        (status = 404, description = "Not found", body = ApiErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.user_service.delete_user(&caller, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
