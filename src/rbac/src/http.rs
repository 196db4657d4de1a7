//! HTTP surface
//!
//! ## Endpoints
//!
//! - `POST /v1/check` - Authorization check for a principal and permission
//! - `POST /v1/effective-permissions` - Resolve a role set (requires `rbac:inspect`)
//! - `GET /v1/namespaces/:namespace/roles` - Roles of a namespace (requires `rbac:inspect`)
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus metrics (metrics router)
//!
//! Guarded routes read the principal from the `x-principal-id` and
//! `x-principal-roles` headers set by the upstream session layer.

use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::engine::AuthorizationEngine;
use crate::error::{RbacError, Result};
use crate::guard::{AccessGuard, GuardOutcome, PermissionGate, RevocationList};
use crate::types::{Decision, Namespace, PermissionId, Principal, RoleId};

pub const PRINCIPAL_ID_HEADER: &str = "x-principal-id";
pub const PRINCIPAL_ROLES_HEADER: &str = "x-principal-roles";

/// Permission required by the introspection endpoints
pub const INSPECT_PERMISSION: &str = "rbac:inspect";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    guard: AccessGuard,
    revocations: Arc<RevocationList>,
    start_time: Instant,
}

impl AppState {
    /// State backed by an in-memory revocation list with the default TTL
    pub fn new(engine: Arc<AuthorizationEngine>) -> Self {
        Self::with_revocations(engine, Arc::new(RevocationList::new()))
    }

    pub fn with_revocations(
        engine: Arc<AuthorizationEngine>,
        revocations: Arc<RevocationList>,
    ) -> Self {
        let guard = AccessGuard::new(engine, revocations.clone());

        Self {
            guard,
            revocations,
            start_time: Instant::now(),
        }
    }

    pub fn engine(&self) -> &Arc<AuthorizationEngine> {
        self.guard.engine()
    }

    pub fn revocations(&self) -> &Arc<RevocationList> {
        &self.revocations
    }
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// No principal, or the principal's session was revoked
    Unauthenticated,
    /// Denied; deliberately carries no detail
    Forbidden,
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "Authentication required".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "Access denied".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<RbacError> for AppError {
    fn from(err: RbacError) -> Self {
        match err {
            RbacError::UnknownRole(_) | RbacError::InvalidInput(_) => {
                AppError::BadRequest(err.to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Principal from the session headers
///
/// Roles are comma separated; blanks are ignored. Returns `None` without a
/// non-empty principal id.
pub fn principal_from_headers(headers: &HeaderMap) -> Option<Principal> {
    let id = headers
        .get(PRINCIPAL_ID_HEADER)?
        .to_str()
        .ok()?
        .trim();

    if id.is_empty() {
        return None;
    }

    let roles = headers
        .get(PRINCIPAL_ROLES_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty());

    Some(Principal::new(id).with_roles(roles))
}

/// State of one guarded route group
#[derive(Clone)]
pub struct GuardState {
    gate: PermissionGate,
    revocations: Arc<RevocationList>,
}

/// Route middleware: 401 without a live principal, 403 on any denial
///
/// The principal comes from the upstream session headers, so a stale role
/// set revokes that session.
pub async fn enforce_permission(
    State(state): State<GuardState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(principal) = principal_from_headers(request.headers()) else {
        return AppError::Unauthenticated.into_response();
    };

    if state.revocations.is_revoked(&principal) {
        return AppError::Unauthenticated.into_response();
    }

    match state.gate.check(&principal) {
        GuardOutcome::Allow => next.run(request).await,
        GuardOutcome::Deny | GuardOutcome::Reauthenticate => AppError::Forbidden.into_response(),
    }
}

/// Authorization check request
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub principal: Principal,
    pub permission: PermissionId,
}

/// Authorization check response
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    pub allowed: bool,
    pub decision: Decision,
    /// Set when the role set references roles missing from the catalog
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reauthenticate: bool,
}

/// POST /v1/check - Check authorization
async fn check_authorization(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> Json<CheckResponse> {
    // The body principal is not the caller's session: report, never revoke
    let outcome = state.guard.evaluate(&req.principal, &req.permission);

    let decision = outcome.decision();

    info!(
        "Authorization decision: {} (principal: {})",
        decision, req.principal.id
    );

    Json(CheckResponse {
        allowed: decision.is_allowed(),
        decision,
        reauthenticate: outcome == GuardOutcome::Reauthenticate,
    })
}

#[derive(Debug, Deserialize)]
pub struct EffectivePermissionsRequest {
    pub roles: Vec<RoleId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectivePermissionsResponse {
    pub roles: Vec<RoleId>,
    pub permissions: Vec<PermissionId>,
}

/// POST /v1/effective-permissions - Resolve a role set
async fn effective_permissions(
    State(state): State<AppState>,
    Json(req): Json<EffectivePermissionsRequest>,
) -> std::result::Result<Json<EffectivePermissionsResponse>, AppError> {
    let permissions = state.engine().effective_permissions(&req.roles)?;
    let roles: BTreeSet<RoleId> = req.roles.into_iter().collect();

    Ok(Json(EffectivePermissionsResponse {
        roles: roles.into_iter().collect(),
        permissions: permissions.iter().cloned().collect(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoleSummary {
    pub id: RoleId,
    pub namespace: Namespace,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Direct parents
    pub inherits: Vec<RoleId>,
}

/// GET /v1/namespaces/:namespace/roles - Roles of a namespace
async fn list_roles(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> std::result::Result<Json<Vec<RoleSummary>>, AppError> {
    let namespace: Namespace = namespace.parse()?;
    let model = state.engine().model();

    let roles = model
        .roles()
        .list_by_namespace(namespace)
        .into_iter()
        .map(|role| RoleSummary {
            id: role.id.clone(),
            namespace: role.namespace,
            description: role.description.clone(),
            inherits: model.hierarchy().parents_of(&role.id).to_vec(),
        })
        .collect();

    Ok(Json(roles))
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    uptime_seconds: u64,
    version: String,
}

/// GET /health - Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: crate::VERSION.to_string(),
    })
}

/// Metrics response (Prometheus format)
struct MetricsResponse {
    metrics: String,
}

impl IntoResponse for MetricsResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            self.metrics,
        )
            .into_response()
    }
}

/// GET /metrics - Prometheus metrics endpoint
async fn metrics(State(state): State<AppState>) -> MetricsResponse {
    MetricsResponse {
        metrics: state.engine().export_prometheus(),
    }
}

/// Create the HTTP router with all endpoints
///
/// # Errors
///
/// `UnknownPermission` if the model lacks a permission a route requires.
pub fn create_router(state: AppState) -> Result<Router> {
    let inspect = GuardState {
        gate: state.guard.gate(INSPECT_PERMISSION)?,
        revocations: state.revocations.clone(),
    };

    let introspection = Router::new()
        .route("/v1/effective-permissions", post(effective_permissions))
        .route("/v1/namespaces/:namespace/roles", get(list_roles))
        .route_layer(middleware::from_fn_with_state(inspect, enforce_permission));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO));

    Ok(Router::new()
        .route("/v1/check", post(check_authorization))
        .route("/health", get(health_check))
        .merge(introspection)
        .layer(ServiceBuilder::new().layer(trace).layer(cors))
        .with_state(state))
}

/// Create the metrics router
pub fn create_metrics_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .with_state(state)
}
