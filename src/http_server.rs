//! HTTP API for domain and record management
//!
//! Routes authenticated requests into the store operations and owns the
//! error-kind to status-code mapping. The caller's namespace claim is an
//! explicit value extracted from the bearer token and passed into each
//! handler.

use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, State},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::auth::{self, TokenSigner, WILDCARD};
use crate::config::ZoneConfig;
use crate::error::ZoneError;
use crate::model::{Domain, NewDomain, NewRecord, Record, RecordPatch, TokenRequest};
use crate::validation;
use crate::zone::ZoneStore;

/// HTTP server for the zone management API
pub struct HttpServer {
    store: Arc<ZoneStore>,
    signer: Arc<TokenSigner>,
    config: ZoneConfig,
}

impl HttpServer {
    pub fn new(store: Arc<ZoneStore>, signer: Arc<TokenSigner>, config: ZoneConfig) -> Self {
        Self {
            store,
            signer,
            config,
        }
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = self.config.bind_addr;
        let app = self.router();

        info!("Starting HTTP server on {}", bind_addr);
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;

        let shutdown_signal = async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to listen for ctrl-c");
            info!("Shutting down");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }

    /// Build the router with all API routes
    pub fn router(self) -> Router {
        let dev_token_enabled = self.config.secret_key == "development";

        let state = AppState {
            store: self.store,
            signer: self.signer,
        };

        let mut app = Router::new()
            .route("/health", get(health_check))
            .route("/domains", get(list_domains).post(create_domain))
            .route("/domains/{domain}", delete(delete_domain))
            .route("/records/{domain}", get(list_records).post(create_record))
            .route(
                "/records/{domain}/{record_id}",
                patch(update_record).delete(delete_record),
            )
            .route("/generate-token", post(generate_token));

        if dev_token_enabled {
            info!("Development signing secret in use; /dev-token enabled");
            app = app.route("/dev-token", get(dev_token));
        }

        app.with_state(state).layer(CorsLayer::permissive())
    }
}

#[derive(Clone)]
struct AppState {
    store: Arc<ZoneStore>,
    signer: Arc<TokenSigner>,
}

/// The caller's namespace claim, extracted from the bearer token
pub struct NamespaceClaim(pub String);

impl FromRequestParts<AppState> for NamespaceClaim {
    type Rejection = ZoneError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ZoneError::Auth("missing bearer token".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ZoneError::Auth("expected bearer authentication".to_string()))?;

        Ok(NamespaceClaim(state.signer.verify(token)?))
    }
}

impl IntoResponse for ZoneError {
    fn into_response(self) -> Response {
        let status = match &self {
            ZoneError::InvalidName(_)
            | ZoneError::NameTooLong(_)
            | ZoneError::InvalidInput(_)
            | ZoneError::PolicyViolation(_) => StatusCode::BAD_REQUEST,
            ZoneError::Forbidden(_) => StatusCode::FORBIDDEN,
            ZoneError::NotFound(_) => StatusCode::NOT_FOUND,
            ZoneError::Conflict(_) => StatusCode::CONFLICT,
            ZoneError::Auth(_) => StatusCode::UNAUTHORIZED,
            ZoneError::CorruptState(_) | ZoneError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!("internal error: {}", self);
            return (status, Json(json!({ "detail": "internal server error" }))).into_response();
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Basic health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Return the registered domains visible to the caller's namespace
async fn list_domains(
    State(state): State<AppState>,
    claim: NamespaceClaim,
) -> Result<Json<Vec<Domain>>, ZoneError> {
    let domains = state.store.list_domains().await?;
    Ok(Json(
        domains
            .into_iter()
            .filter(|d| auth::granted(&claim.0, &d.name))
            .collect(),
    ))
}

/// Create a new domain
async fn create_domain(
    State(state): State<AppState>,
    claim: NamespaceClaim,
    Json(domain): Json<NewDomain>,
) -> Result<Json<Domain>, ZoneError> {
    auth::ensure(&claim.0, &domain.name)?;
    validation::validate_name(&domain.name)?;
    Ok(Json(state.store.create_domain(&domain.name).await?))
}

/// Delete a domain and all its records
async fn delete_domain(
    State(state): State<AppState>,
    claim: NamespaceClaim,
    Path(domain): Path<String>,
) -> Result<StatusCode, ZoneError> {
    auth::ensure(&claim.0, &domain)?;
    state.store.delete_domain(&domain).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Return all records for a domain
async fn list_records(
    State(state): State<AppState>,
    claim: NamespaceClaim,
    Path(domain): Path<String>,
) -> Result<Json<Vec<Record>>, ZoneError> {
    auth::ensure(&claim.0, &domain)?;
    Ok(Json(state.store.list_records(&domain).await?))
}

/// Create a new record on a domain
async fn create_record(
    State(state): State<AppState>,
    claim: NamespaceClaim,
    Path(domain): Path<String>,
    Json(record): Json<NewRecord>,
) -> Result<Json<Record>, ZoneError> {
    auth::ensure(&claim.0, &domain)?;
    validation::validate_name(&record.name)?;
    Ok(Json(state.store.create_record(&domain, &record).await?))
}

/// Partially update a record by ID
async fn update_record(
    State(state): State<AppState>,
    claim: NamespaceClaim,
    Path((domain, record_id)): Path<(String, i64)>,
    Json(patch): Json<RecordPatch>,
) -> Result<Json<Record>, ZoneError> {
    auth::ensure(&claim.0, &domain)?;
    Ok(Json(
        state.store.update_record(&domain, record_id, &patch).await?,
    ))
}

/// Delete a record by ID
async fn delete_record(
    State(state): State<AppState>,
    claim: NamespaceClaim,
    Path((domain, record_id)): Path<(String, i64)>,
) -> Result<StatusCode, ZoneError> {
    auth::ensure(&claim.0, &domain)?;
    state.store.delete_record(&domain, record_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Issue a token for the requested namespace. Wildcard callers only, so a
/// namespace owner cannot mint tokens beyond its own scope.
async fn generate_token(
    State(state): State<AppState>,
    claim: NamespaceClaim,
    Json(req): Json<TokenRequest>,
) -> Result<Json<String>, ZoneError> {
    if claim.0 != WILDCARD {
        return Err(ZoneError::Forbidden(
            "token issuance requires a wildcard namespace".to_string(),
        ));
    }
    if req.namespace != WILDCARD {
        validation::validate_name(&req.namespace)?;
    }
    Ok(Json(state.signer.issue(&req.namespace)))
}

/// Issue a wildcard token. Only routed under the development secret.
async fn dev_token(State(state): State<AppState>) -> Json<String> {
    Json(state.signer.issue(WILDCARD))
}
