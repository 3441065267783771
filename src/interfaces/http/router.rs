//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    handler::Handler,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::UserService;
use crate::interfaces::http::common::{ApiErrorResponse, ApiResponse, ErrorBody};
use crate::domain::Operation;
use crate::interfaces::http::middleware::{auth_middleware, require_operation, AuthState};
use crate::interfaces::http::modules::{auth, health, metrics, request_id, users};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token from /api/v1/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::refresh_token,
        auth::profile,
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
    ),
    components(
        schemas(
            ApiResponse<String>,
            ErrorBody,
            ApiErrorResponse,
            health::HealthResponse,
            health::ComponentHealth,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RefreshRequest,
            auth::RefreshResponse,
            users::UserDto,
            users::CreateUserRequest,
            users::UpdateUserRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and account store connectivity"),
        (name = "Authentication", description = "Login, token refresh and the caller's own profile"),
        (name = "Users", description = "Account listing (scoped by role) and admin-only management"),
    ),
    info(
        title = "ERP Access Service API",
        version = "1.0.0",
        description = "Accounts, roles and bearer-token authentication for the ERP backend",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes.
///
/// `/metrics` is mounted only when a Prometheus handle is supplied.
pub fn create_api_router(
    user_service: Arc<UserService>,
    prometheus: Option<PrometheusHandle>,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth_state = AuthState {
        user_service: user_service.clone(),
    };
    let user_state = users::UserHandlerState {
        user_service: user_service.clone(),
    };

    // Public routes
    let public_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/token/refresh", post(auth::refresh_token))
        .with_state(user_state.clone());

    // Protected routes: the middleware resolves the caller; admin-only
    // handlers are gated again before their extractors run
    let protected_routes = Router::new()
        .route("/profile", get(auth::profile))
        .route(
            "/users",
            get(users::list_users).post(
                users::create_user
                    .layer(middleware::from_fn_with_state(Operation::Register, require_operation)),
            ),
        )
        .route(
            "/users/{id}",
            get(users::get_user
                .layer(middleware::from_fn_with_state(Operation::Retrieve, require_operation)))
            .patch(
                users::update_user
                    .layer(middleware::from_fn_with_state(Operation::Update, require_operation)),
            )
            .delete(
                users::delete_user
                    .layer(middleware::from_fn_with_state(Operation::Delete, require_operation)),
            ),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(user_state);

    let health_state = health::HealthState {
        user_service,
        started_at: Arc::new(Instant::now()),
    };

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .route(
            "/health",
            get(health::health_check).with_state(health_state),
        )
        .nest("/api/v1", public_routes.merge(protected_routes));

    if let Some(handle) = prometheus {
        router = router.route(
            "/metrics",
            get(metrics::prometheus_metrics).with_state(metrics::MetricsState { handle }),
        );
    }

    router
        .route_layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
