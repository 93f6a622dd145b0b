//! HTTP surface for the calculator and the admin pricing console.
//!
//! The handlers are thin consumers of the core: the submission
//! endpoint drives the wizard gates over the posted fields exactly as
//! the step-by-step UI would, and the admin endpoints delegate to the
//! pricing workflows. Field-level validation failures are rendered as
//! 422 responses naming each failing field; everything else goes
//! through the interface-error mapping with a correlation id.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;
use voicequote_core::errors::InterfaceError;
use voicequote_core::workflows::{PricingStore, ReportMailer};
use voicequote_core::{
    assemble, ApplicationError, CostBreakdown, FieldUpdate, PricingOverrideWorkflow, ProspectId,
    ReportIdentity, SubmissionWorkflow, WizardError, WizardSession, WorkflowError,
};
use voicequote_db::{DbPool, SqlPricingStore};

use crate::render::{report_response, ReportPdfGenerator};

#[derive(Clone)]
pub struct ApiState {
    pub db_pool: DbPool,
    pub admin_token: Option<SecretString>,
    pub renderer: Arc<ReportPdfGenerator>,
    pub mailer: Arc<dyn ReportMailer>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/submissions", post(submit_submission))
        .route("/api/prospects/{id}/report", get(download_report))
        .route("/api/admin/pricing", get(get_global_price).put(put_global_price))
        .route("/api/admin/prospects", get(list_prospects))
        .route("/api/admin/prospects/{id}/reprice", post(reprice_prospect))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    name: String,
    company_name: String,
    email: String,
    phone: String,
    minutes: u32,
}

#[derive(Debug, Deserialize)]
struct PriceRequest {
    cost_per_minute: Decimal,
}

async fn submit_submission(
    State(state): State<ApiState>,
    Json(request): Json<SubmitRequest>,
) -> Response {
    let mut session = WizardSession::new();
    session.update_field(FieldUpdate::Name(request.name));
    session.update_field(FieldUpdate::CompanyName(request.company_name));
    session.update_field(FieldUpdate::Email(request.email));
    session.update_field(FieldUpdate::Phone(request.phone));
    session.update_field(FieldUpdate::Minutes(request.minutes));

    // Walk the same gates the step-by-step UI enforces; the first
    // failing step reports its fields and nothing is persisted.
    for _ in 0..4 {
        if let Err(error) = session.next() {
            return validation_response(error);
        }
    }
    let submission = match session.finalize() {
        Ok(submission) => submission,
        Err(error) => return validation_response(error),
    };

    let workflow = SubmissionWorkflow::new(SqlPricingStore::new(state.db_pool.clone()));
    match workflow.submit(&submission, Utc::now()).await {
        Ok(payload) => (StatusCode::CREATED, Json(payload)).into_response(),
        Err(error) => interface_response(error.into()),
    }
}

async fn download_report(State(state): State<ApiState>, Path(id): Path<Uuid>) -> Response {
    let store = SqlPricingStore::new(state.db_pool.clone());
    let record = match store.get_by_id(&ProspectId(id)).await {
        Ok(record) => record,
        Err(error) => return interface_response(WorkflowError::from(error).into()),
    };

    let breakdown = match CostBreakdown::compute(record.minutes, record.cost_per_minute) {
        Ok(breakdown) => breakdown,
        Err(error) => return interface_response(ApplicationError::Domain(error)),
    };
    let payload = assemble(ReportIdentity::from(&record), &breakdown, Utc::now());

    match state.renderer.render_report(&payload).await {
        Ok(report) => report_response(report),
        Err(error) => interface_response(ApplicationError::Delivery(error.to_string())),
    }
}

async fn get_global_price(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize_admin(&headers, &state.admin_token) {
        return response;
    }

    let store = SqlPricingStore::new(state.db_pool.clone());
    match store.get_default().await {
        Ok(sentinel) => Json(json!({
            "cost_per_minute": sentinel.cost_per_minute,
            "premium_cost_per_minute": sentinel.cost_per_minute * Decimal::TWO,
            "updated_at": sentinel.updated_at,
        }))
        .into_response(),
        Err(error) => interface_response(WorkflowError::from(error).into()),
    }
}

async fn put_global_price(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(request): Json<PriceRequest>,
) -> Response {
    if let Err(response) = authorize_admin(&headers, &state.admin_token) {
        return response;
    }

    let store = SqlPricingStore::new(state.db_pool.clone());
    match voicequote_core::update_global_price(&store, request.cost_per_minute, Utc::now()).await {
        Ok(()) => Json(json!({
            "status": "ok",
            "cost_per_minute": request.cost_per_minute,
        }))
        .into_response(),
        Err(error) => interface_response(error.into()),
    }
}

async fn list_prospects(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize_admin(&headers, &state.admin_token) {
        return response;
    }

    let store = SqlPricingStore::new(state.db_pool.clone());
    match store.list_all().await {
        Ok(records) => Json(records).into_response(),
        Err(error) => interface_response(WorkflowError::from(error).into()),
    }
}

async fn reprice_prospect(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<PriceRequest>,
) -> Response {
    if let Err(response) = authorize_admin(&headers, &state.admin_token) {
        return response;
    }

    let workflow = PricingOverrideWorkflow::new(
        SqlPricingStore::new(state.db_pool.clone()),
        Arc::clone(&state.renderer),
        Arc::clone(&state.mailer),
    );
    match workflow.reprice(&ProspectId(id), request.cost_per_minute, Utc::now()).await {
        Ok(payload) => Json(json!({
            "status": "sent",
            "price_updated": true,
            "report": payload,
        }))
        .into_response(),
        Err(error) => reprice_error_response(error),
    }
}

/// Admin routes require a bearer token matching the configured admin
/// token. Checked before any side effect so a rejected request leaves
/// no partial state.
fn authorize_admin(headers: &HeaderMap, token: &Option<SecretString>) -> Result<(), Response> {
    let Some(expected) = token else {
        return Err(interface_response(ApplicationError::Unauthorized(
            "admin token is not configured".to_string(),
        )));
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match presented {
        Some(value) if value == expected.expose_secret() => Ok(()),
        _ => Err(interface_response(ApplicationError::Unauthorized(
            "missing or invalid admin token".to_string(),
        ))),
    }
}

fn validation_response(error: WizardError) -> Response {
    match error {
        WizardError::InvalidFields { step, fields } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "validation_failed",
                "step": step.number(),
                "fields": fields.iter().map(|field| field.as_str()).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        other => interface_response(ApplicationError::Validation(other)),
    }
}

fn interface_response(error: ApplicationError) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let interface = error.into_interface(correlation_id.clone());
    let status = match &interface {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    error!(
        event_name = "api.request_failed",
        correlation_id = %correlation_id,
        error = %interface,
        "request failed"
    );

    (
        status,
        Json(json!({
            "error": interface.user_message(),
            "correlation_id": correlation_id,
        })),
    )
        .into_response()
}

/// The reprice endpoint reports which side effect committed: a
/// delivery failure still means the price change is durable, and the
/// operator's recovery action is a redelivery, not a re-price.
fn reprice_error_response(error: WorkflowError) -> Response {
    let price_updated = matches!(error, WorkflowError::Delivery(_));
    let status = match &error {
        WorkflowError::InvalidPrice(_) => StatusCode::BAD_REQUEST,
        WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
        WorkflowError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
        WorkflowError::Delivery(_) => StatusCode::BAD_GATEWAY,
    };
    let correlation_id = Uuid::new_v4().to_string();

    error!(
        event_name = "api.reprice_failed",
        correlation_id = %correlation_id,
        price_updated,
        error = %error,
        "reprice request failed"
    );

    (
        status,
        Json(json!({
            "error": error.to_string(),
            "price_updated": price_updated,
            "correlation_id": correlation_id,
        })),
    )
        .into_response()
}
