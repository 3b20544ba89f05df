use crate::{
    api::{
        error::ApiError,
        response::{with_total_count, ApiResponse},
    },
    config::Config,
    models::{HealthStatus, StakePage, StakeTotal},
    service::PageOutcome,
    state::AppState,
    validation::{parse_page, parse_page_size, require_param, validate_evm_address},
};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, Method},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::{Any, CorsLayer}, trace::TraceLayer};
use tracing::{error, info};

// GET /stake/history/user/{address} query parameters
#[derive(Deserialize)]
pub struct HistoryQuery {
    page: Option<String>,
    #[serde(rename = "pageSize")]
    page_size: Option<String>,
}

// GET /stake/pay query parameters
#[derive(Deserialize)]
pub struct PaymentQuery {
    value: Option<String>,
}

fn cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new().allow_methods([Method::GET, Method::OPTIONS]);

    match config.cors_origin.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => base
            .allow_origin(origin)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
        Some(Err(_)) => {
            error!("Unparseable CORS_ORIGIN, cross-origin requests are disabled");
            base
        }
        None => base.allow_origin(Any).allow_headers(Any),
    }
}

// Create router with all routes under /api
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/healthchecker", get(health_check))
        .route("/stake/pay", get(stake_payment_link))
        .route("/stake/history/user/{address}", get(user_stake_history))
        .route("/stake/total/user/{address}", get(user_total_stake));

    Router::new()
        .nest("/api", api)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&app_state.config))
        .with_state(app_state)
}

// GET /healthchecker handler
async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "success",
        message: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

// GET /stake/history/user/{address} handler
async fn user_stake_history(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Result<Response, ApiError> {
    let address = validate_evm_address(&address)?;
    let page = parse_page(params.page.as_deref())?;
    let page_size = parse_page_size(params.page_size.as_deref())?;

    info!("Fetching stake history for {}, page: {}, page size: {}", address, page, page_size);

    let outcome = state
        .stakes
        .get_page(&address, page, page_size)
        .await
        .inspect_err(|e| error!("While getting stake history for {}: {}", address, e))?;

    let (status, records, total) = match outcome {
        PageOutcome::Success { records, total } => ("success", records, total),
        PageOutcome::NoData => ("no data", Vec::new(), 0),
        PageOutcome::PageOutOfRange { total } => ("no new page", Vec::new(), total),
    };

    let body = StakePage {
        status,
        page: records,
        page_number: page,
        page_size,
        total_records: total,
    };
    Ok(with_total_count(body, total))
}

// GET /stake/total/user/{address} handler
async fn user_total_stake(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<ApiResponse<StakeTotal>, ApiError> {
    let address = validate_evm_address(&address)?;

    let total = state
        .stakes
        .get_total(&address)
        .await
        .inspect_err(|e| error!("While getting stake total for {}: {}", address, e))?;

    Ok(ApiResponse {
        data: StakeTotal { address, total },
    })
}

// GET /stake/pay handler
async fn stake_payment_link(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaymentQuery>,
) -> Result<ApiResponse<serde_json::Map<String, serde_json::Value>>, ApiError> {
    let value = require_param("value", params.value.as_deref())?;

    let link = state
        .payments
        .generate_payment_link(value)
        .await
        .inspect_err(|e| error!("While generating payment link: {}", e))?;

    Ok(ApiResponse { data: link })
}
