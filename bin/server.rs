// Business Registry - Legal API
// REST surface for registering incorporation filings, with the filing worker
// running in the same process behind an in-memory queue

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use business_registry::services::AccountService;
use business_registry::{
    delete_bootstrap, find_business_by_identifier, is_temp_identifier, find_filing_by_id, insert_bootstrap, insert_filing,
    register_bootstrap, run_worker, setup_database, Config, Filing, FilingMessage, FilingStatus, FilingWorker,
    RegistrationBootstrap, Services, INCORPORATION_APPLICATION,
};
use rusqlite::Connection;
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    accounts: Arc<dyn AccountService>,
    queue: mpsc::Sender<FilingMessage>,
}

impl AppState {
    fn db(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable"))
    }
}

/// Error body: {"message": "..."}
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl ApiError {
    /// 503 when the bootstrap could not be affiliated with the account
    fn registration_unavailable() -> Self {
        ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Unable to create Incorporation Filing.")
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        tracing::error!(error = %format!("{e:#}"), "Storage failure");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "storage failure")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({"message": self.message}))).into_response()
    }
}

/// Stored filing JSON with the record's id and status stamped into the header
fn filing_response(filing: &Filing) -> Value {
    let mut body = filing.filing_json().clone();
    if let Some(header) = body.pointer_mut("/filing/header").and_then(Value::as_object_mut) {
        header.insert("filingId".to_string(), json!(filing.id));
        header.insert("status".to_string(), json!(filing.status.as_str()));
    }
    body
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(json!({"status": "OK", "version": business_registry::VERSION}))
}

/// GET /api/businesses/:identifier
async fn get_business(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if is_temp_identifier(&identifier) {
        return Ok(Json(json!({"message": "No information on temp registrations."})));
    }

    let business = find_business_by_identifier(&*state.db()?, &identifier)?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("{identifier} not found")))?;

    Ok(Json(json!({"business": business.json()})))
}

/// POST /api/businesses - register a new incorporation under a temp identifier
async fn create_business(
    State(state): State<AppState>,
    Json(mut payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let account = match payload.pointer("/filing/header/accountId") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    let is_incorporation =
        payload.pointer("/filing/header/name").and_then(Value::as_str) == Some(INCORPORATION_APPLICATION);

    let account = match account {
        Some(account) if is_incorporation => account,
        _ => {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "Requires a minimal Incorporation Filing.",
            ))
        }
    };

    let bootstrap = RegistrationBootstrap::new(account);
    insert_bootstrap(&*state.db()?, &bootstrap)?;

    let business_name = payload
        .pointer("/filing/incorporationApplication/nameRequest/nrNumber")
        .and_then(Value::as_str)
        .filter(|nr| !nr.is_empty())
        .unwrap_or(&bootstrap.identifier)
        .to_string();

    if let Err(e) = register_bootstrap(&*state.accounts, &bootstrap, &business_name).await {
        tracing::warn!(identifier = %bootstrap.identifier, error = %e, "Bootstrap affiliation failed");
        delete_bootstrap(&*state.db()?, &bootstrap.identifier)?;
        return Err(ApiError::registration_unavailable());
    }

    // the filing is keyed by the temp identifier until the worker assigns a real one
    if let Some(filing) = payload.get_mut("filing").and_then(Value::as_object_mut) {
        let business = filing
            .entry("business")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(business) = business.as_object_mut() {
            business.insert("identifier".to_string(), json!(bootstrap.identifier));
        }
    }

    let mut filing = Filing::new(Some(bootstrap.identifier.clone()), payload);
    filing.status = FilingStatus::Pending;
    filing.id = insert_filing(&*state.db()?, &filing)?;

    if let Err(e) = state.queue.send(FilingMessage::new(filing.id)).await {
        tracing::error!(filing_id = filing.id, error = %e, "Filing queue closed");
    }

    tracing::info!(filing_id = filing.id, identifier = %bootstrap.identifier, "Incorporation filing registered");
    Ok((StatusCode::CREATED, Json(filing_response(&filing))))
}

/// GET /api/filings/:id
async fn get_filing(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let filing = find_filing_by_id(&*state.db()?, id)?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("filing {id} not found")))?;

    Ok(Json(filing_response(&filing)))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,business_registry=debug")),
        )
        .init();

    let config = Config::from_env();

    let conn = Connection::open(&config.database_path)?;
    setup_database(&conn)?;
    tracing::info!(database = %config.database_path, "Database opened");
    let db = Arc::new(Mutex::new(conn));

    let services = Services::from_config(&config)?;
    let (queue, receiver) = mpsc::channel(config.queue_capacity);
    let worker = FilingWorker::new(db.clone(), services.clone());
    tokio::spawn(run_worker(worker, receiver));

    let state = AppState {
        db,
        accounts: services.accounts.clone(),
        queue,
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/businesses", axum::routing::post(create_business))
        .route("/businesses/:identifier", get(get_business))
        .route("/filings/:id", get(get_filing))
        .with_state(state);

    let app = Router::new().nest("/api", api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("🚀 Legal API running on http://{addr}");
    println!("   Businesses: http://{addr}/api/businesses/<identifier>");

    axum::serve(listener, app).await?;
    Ok(())
}
