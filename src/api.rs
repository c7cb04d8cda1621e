// 🌐 REST API - Axum router for the dashboard and public profiles
//
// Handlers lock the shared SQLite connection, run one synchronous store
// call, and map StoreError onto HTTP status codes. Validation failures come
// back as 422 with per-field errors so the client can re-render its form.

use crate::banks::BankCodeTable;
use crate::checksums::CardBrand;
use crate::db::{self, PublicProfile, StoredIdentifier};
use crate::error::{FieldError, StoreError, StoreResult, ValidationErrors};
use crate::identifier::{normalize_and_validate, BankNameSource, CandidateIdentifier, NormalizedIdentifier};
use crate::owners::{Owner, Registration};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    banks: Arc<BankCodeTable>,
}

impl AppState {
    pub fn new(conn: Connection, banks: BankCodeTable) -> Self {
        AppState {
            db: Arc::new(Mutex::new(conn)),
            banks: Arc::new(banks),
        }
    }

    /// Run one store operation against the shared connection
    fn with_db<T>(&self, f: impl FnOnce(&Connection) -> StoreResult<T>) -> Result<T, ApiError> {
        let conn = self
            .db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".to_string()))?;

        f(&conn).map_err(ApiError::Store)
    }
}

// ============================================================================
// RESPONSE TYPES
// ============================================================================

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    field_errors: Vec<FieldError>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            field_errors: Vec::new(),
        }
    }
}

/// Normalized identifier as returned by /api/validate
#[derive(Debug, Serialize)]
struct NormalizedView {
    kind: &'static str,
    value: String,
    masked_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    bank_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bank_name_source: Option<BankNameSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand: Option<CardBrand>,
    alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    whatsapp_phone: Option<String>,
    is_public: bool,
}

impl From<&NormalizedIdentifier> for NormalizedView {
    fn from(n: &NormalizedIdentifier) -> Self {
        Self {
            kind: n.kind().as_str(),
            value: n.value().to_string(),
            masked_value: n.masked_value(),
            bank_code: n.identifier.bank_code().map(str::to_string),
            bank_name: n.identifier.bank_name().map(str::to_string),
            bank_name_source: n.identifier.bank_name_source(),
            brand: n.identifier.brand(),
            alias: n.alias.clone(),
            whatsapp_phone: n.whatsapp_phone.clone(),
            is_public: n.is_public,
        }
    }
}

/// Stored identifier for the owner's dashboard (masked)
#[derive(Debug, Serialize)]
struct IdentifierView {
    id: String,
    owner_id: String,
    kind: &'static str,
    masked_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    bank_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bank_name_source: Option<BankNameSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand: Option<CardBrand>,
    alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    whatsapp_phone: Option<String>,
    is_public: bool,
    updated_at: DateTime<Utc>,
}

impl From<&StoredIdentifier> for IdentifierView {
    fn from(s: &StoredIdentifier) -> Self {
        let n = &s.normalized;
        Self {
            id: s.id.clone(),
            owner_id: s.owner_id.clone(),
            kind: n.kind().as_str(),
            masked_value: n.masked_value(),
            bank_code: n.identifier.bank_code().map(str::to_string),
            bank_name: n.identifier.bank_name().map(str::to_string),
            bank_name_source: n.identifier.bank_name_source(),
            brand: n.identifier.brand(),
            alias: n.alias.clone(),
            whatsapp_phone: n.whatsapp_phone.clone(),
            is_public: n.is_public,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct OwnerView {
    id: String,
    display_name: String,
    email: Option<String>,
    phone: Option<String>,
    public_slug: String,
    profile_path: String,
}

impl From<&Owner> for OwnerView {
    fn from(o: &Owner) -> Self {
        Self {
            id: o.id.clone(),
            display_name: o.display_name.clone(),
            email: o.email.clone(),
            phone: o.phone.clone(),
            public_slug: o.public_slug.clone(),
            profile_path: o.profile_path(),
        }
    }
}

/// What customers see: full values, they need them to pay
#[derive(Debug, Serialize)]
struct PublicIdentifierView {
    kind: &'static str,
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand: Option<CardBrand>,
    alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    whatsapp_phone: Option<String>,
}

#[derive(Debug, Serialize)]
struct PublicProfileView {
    name: String,
    slug: String,
    identifiers: Vec<PublicIdentifierView>,
}

impl From<&PublicProfile> for PublicProfileView {
    fn from(p: &PublicProfile) -> Self {
        Self {
            name: p.owner.label().to_string(),
            slug: p.owner.public_slug.clone(),
            identifiers: p
                .identifiers
                .iter()
                .map(|s| {
                    let n = &s.normalized;
                    PublicIdentifierView {
                        kind: n.kind().as_str(),
                        value: n.value().to_string(),
                        bank_name: n
                            .identifier
                            .bank_name()
                            .filter(|b| !b.is_empty())
                            .map(str::to_string),
                        brand: n.identifier.brand(),
                        alias: n.alias.clone(),
                        whatsapp_phone: n.whatsapp_phone.clone(),
                    }
                })
                .collect(),
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    Internal(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Store(StoreError::Validation(errors))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, field_errors) = match self {
            ApiError::Store(StoreError::Validation(errors)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation failed".to_string(),
                errors.0,
            ),
            ApiError::Store(e @ StoreError::DuplicateKind { .. }) => {
                (StatusCode::CONFLICT, e.to_string(), Vec::new())
            }
            ApiError::Store(e @ (StoreError::OwnerNotFound(_) | StoreError::IdentifierNotFound(_))) => {
                (StatusCode::NOT_FOUND, e.to_string(), Vec::new())
            }
            ApiError::Store(e) => {
                error!("store error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string(), Vec::new())
            }
            ApiError::Internal(msg) => {
                error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string(), Vec::new())
            }
        };

        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message),
            field_errors,
        };

        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/validate - Normalize + validate without saving
async fn validate_identifier(
    State(state): State<AppState>,
    Json(candidate): Json<CandidateIdentifier>,
) -> ApiResult<Json<ApiResponse<NormalizedView>>> {
    let normalized = normalize_and_validate(&candidate, &state.banks)?;
    Ok(Json(ApiResponse::ok(NormalizedView::from(&normalized))))
}

/// POST /api/owners - Register an owner
async fn register_owner(
    State(state): State<AppState>,
    Json(registration): Json<Registration>,
) -> ApiResult<(StatusCode, Json<ApiResponse<OwnerView>>)> {
    let owner = state.with_db(|conn| db::create_owner(conn, &registration))?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(OwnerView::from(&owner)))))
}

/// GET /api/owners/:owner_id/identifiers - Dashboard listing (masked)
async fn list_owner_identifiers(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<IdentifierView>>>> {
    let identifiers = state.with_db(|conn| {
        db::get_owner(conn, &owner_id)?;
        db::list_identifiers(conn, &owner_id)
    })?;

    Ok(Json(ApiResponse::ok(
        identifiers.iter().map(IdentifierView::from).collect(),
    )))
}

/// POST /api/owners/:owner_id/identifiers - Save a new identifier
async fn create_owner_identifier(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
    Json(candidate): Json<CandidateIdentifier>,
) -> ApiResult<(StatusCode, Json<ApiResponse<IdentifierView>>)> {
    let stored = state.with_db(|conn| {
        db::create_identifier(conn, &owner_id, &candidate, &state.banks, "api")
    })?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(IdentifierView::from(&stored)))))
}

/// PUT /api/identifiers/:id - Edit (re-validates, kind may change)
async fn update_identifier(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(candidate): Json<CandidateIdentifier>,
) -> ApiResult<Json<ApiResponse<IdentifierView>>> {
    let stored =
        state.with_db(|conn| db::update_identifier(conn, &id, &candidate, &state.banks, "api"))?;

    Ok(Json(ApiResponse::ok(IdentifierView::from(&stored))))
}

/// DELETE /api/identifiers/:id
async fn delete_identifier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<String>>> {
    state.with_db(|conn| db::delete_identifier(conn, &id, "api"))?;
    Ok(Json(ApiResponse::ok(id)))
}

/// GET /u/:slug - Public payment profile
async fn public_profile(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ApiResponse<PublicProfileView>>> {
    let profile = state.with_db(|conn| db::public_profile(conn, &slug))?;
    Ok(Json(ApiResponse::ok(PublicProfileView::from(&profile))))
}

// ============================================================================
// Router
// ============================================================================

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/validate", post(validate_identifier))
        .route("/owners", post(register_owner))
        .route(
            "/owners/:owner_id/identifiers",
            get(list_owner_identifiers).post(create_owner_identifier),
        )
        .route(
            "/identifiers/:id",
            put(update_identifier).delete(delete_identifier),
        );

    Router::new()
        .nest("/api", api_routes)
        .route("/u/:slug", get(public_profile))
        .route("/u/:slug/", get(public_profile))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
