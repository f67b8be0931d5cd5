//! Axum web server for the data quality dashboard.
//!
//! Serves the embedded dashboard page and a JSON API over the warehouse
//! client, DMF catalog, and schema describer. All dependencies are built
//! once at startup and injected through [`AppState`]; handlers hold no
//! other state.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::describer::{SchemaDescriber, load_schema_document};
use crate::dmf::{self, DMF_FUNCTIONS};
use crate::embeddings::EmbeddingClient;
use crate::sql;
use crate::warehouse::{ResultTable, WarehouseClient};
use crate::{DqError, Result};

const INDEX_HTML: &str = include_str!("assets/index.html");

/// Application state shared across handlers. Constructed once per process;
/// every field is read-only afterwards.
pub struct AppState {
    pub config: Config,
    pub warehouse: WarehouseClient,
    pub describer: SchemaDescriber<EmbeddingClient>,
    pub schema_document: String,
}

impl AppState {
    /// Build the full dependency graph from configuration. Connection or
    /// embedding-model failures surface here, before the server starts.
    #[inline]
    pub fn from_config(config: Config) -> Result<Self> {
        let warehouse = WarehouseClient::new(&config.warehouse)?;

        let embedder = EmbeddingClient::new(&config.embedding)
            .map_err(|e| DqError::Embedding(e.to_string()))?;
        embedder
            .health_check()
            .map_err(|e| DqError::Embedding(e.to_string()))?;

        let schema_document = load_schema_document(&config.dashboard.schema_document)?;
        let describer = SchemaDescriber::new(embedder, &config.cortex);

        Ok(Self {
            config,
            warehouse,
            describer,
            schema_document,
        })
    }
}

/// Build the axum router with all routes
#[inline]
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/api/tables", get(list_tables))
        .route("/api/tables/{table}/columns", get(table_columns))
        .route("/api/tables/{table}/quality", get(table_quality))
        .route("/api/tables/{table}/clean", get(table_clean))
        .route("/api/tables/{table}/describe", post(describe_table))
        .route("/api/dmfs", get(list_dmfs))
        .route("/api/dmf", post(run_dmf))
        .layer(cors)
        .with_state(state)
}

/// Start the dashboard server
#[inline]
pub async fn serve(config: Config, port_override: Option<u16>) -> Result<()> {
    let port = port_override.unwrap_or(config.dashboard.port);

    if config.dashboard.tables.is_empty() {
        return Err(DqError::Config(
            "no tables configured; set [dashboard] tables in config.toml".to_string(),
        ));
    }

    let state = Arc::new(AppState::from_config(config)?);
    let app = router(state);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(DqError::Io)?;

    info!("Dashboard listening on http://{}", addr);
    println!("❄️  Data Quality Dashboard");
    println!("   URL: http://localhost:{}", port);
    println!();
    println!("   Press Ctrl+C to stop");

    axum::serve(listener, app).await.map_err(DqError::Io)?;
    Ok(())
}

// ============================================================================
// Error mapping
// ============================================================================

struct ApiError(DqError);

impl From<DqError> for ApiError {
    fn from(error: DqError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DqError::Config(_) | DqError::Dmf(_) => StatusCode::BAD_REQUEST,
            DqError::Permission(_) => StatusCode::FORBIDDEN,
            DqError::Warehouse(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!("Request failed: {}", self.0);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Run a blocking warehouse/embedding call chain off the async runtime.
async fn run_blocking<T, F>(task: F) -> std::result::Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ApiError(DqError::Other(anyhow::anyhow!("task panicked: {}", e))))?
        .map_err(ApiError::from)
}

fn require_allowed_table(state: &AppState, table: &str) -> Result<()> {
    if state.config.dashboard.tables.iter().any(|t| t == table) {
        Ok(())
    } else {
        Err(DqError::Config(format!(
            "table '{}' is not in the configured table list",
            table
        )))
    }
}

fn base_relation(state: &AppState, table: &str) -> String {
    sql::qualified_table(
        &state.config.warehouse.database,
        &state.config.warehouse.schema,
        table,
    )
}

// ============================================================================
// API Handlers
// ============================================================================

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Serialize)]
struct TablesResponse {
    tables: Vec<String>,
}

/// GET /api/tables - tables surfaced by the dashboard
async fn list_tables(State(state): State<Arc<AppState>>) -> Json<TablesResponse> {
    Json(TablesResponse {
        tables: state.config.dashboard.tables.clone(),
    })
}

#[derive(Serialize)]
struct ColumnsResponse {
    table: String,
    columns: Vec<String>,
}

/// GET /api/tables/{table}/columns - column names from DESCRIBE TABLE
async fn table_columns(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
) -> ApiResult<ColumnsResponse> {
    require_allowed_table(&state, &table)?;

    let relation = base_relation(&state, &table);
    let result = run_blocking({
        let state = Arc::clone(&state);
        move || state.warehouse.execute(&sql::describe_table_query(&relation))
    })
    .await?;

    // DESCRIBE TABLE reports one row per column, name first
    let columns = result
        .rows
        .iter()
        .filter_map(|row| row.first().and_then(|v| v.as_str()))
        .map(ToString::to_string)
        .collect();

    Ok(Json(ColumnsResponse { table, columns }))
}

#[derive(Serialize)]
struct QualityResponse {
    table: String,
    total_records: i64,
    duplicate_records: i64,
    duplicates: Option<ResultTable>,
}

/// GET /api/tables/{table}/quality - row count, duplicate count, and a
/// preview of the duplicate rows when any exist
async fn table_quality(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
) -> ApiResult<QualityResponse> {
    require_allowed_table(&state, &table)?;

    let response = run_blocking({
        let state = Arc::clone(&state);
        move || {
            let relation = base_relation(&state, &table);
            let total_records = state
                .warehouse
                .execute(&sql::count_query(&relation))?
                .scalar_i64()
                .unwrap_or(0);

            let duplicate_relation = sql::duplicate_view(&table);
            let duplicate_records = state
                .warehouse
                .execute(&sql::count_query(&duplicate_relation))?
                .scalar_i64()
                .unwrap_or(0);

            let duplicates = if duplicate_records > 0 {
                Some(state.warehouse.execute(&sql::preview_query(
                    &duplicate_relation,
                    state.config.dashboard.preview_rows,
                ))?)
            } else {
                None
            };

            Ok(QualityResponse {
                table,
                total_records,
                duplicate_records,
                duplicates,
            })
        }
    })
    .await?;

    Ok(Json(response))
}

#[derive(Serialize)]
struct CleanResponse {
    table: String,
    clean_view: String,
    total_records: i64,
    clean_records: i64,
    preview: ResultTable,
}

/// GET /api/tables/{table}/clean - original vs deduplicated counts plus a
/// preview of the clean view
async fn table_clean(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
) -> ApiResult<CleanResponse> {
    require_allowed_table(&state, &table)?;

    let response = run_blocking({
        let state = Arc::clone(&state);
        move || {
            let relation = base_relation(&state, &table);
            let total_records = state
                .warehouse
                .execute(&sql::count_query(&relation))?
                .scalar_i64()
                .unwrap_or(0);

            let clean_view = sql::clean_view(&table);
            let clean_records = state
                .warehouse
                .execute(&sql::count_query(&clean_view))?
                .scalar_i64()
                .unwrap_or(0);

            let preview = state.warehouse.execute(&sql::preview_query(
                &clean_view,
                state.config.dashboard.preview_rows,
            ))?;

            Ok(CleanResponse {
                table,
                clean_view,
                total_records,
                clean_records,
                preview,
            })
        }
    })
    .await?;

    Ok(Json(response))
}

#[derive(Serialize)]
struct DmfInfo {
    name: &'static str,
    requires_column: bool,
}

/// GET /api/dmfs - the DMF catalog, in display order
async fn list_dmfs() -> Json<Vec<DmfInfo>> {
    let functions = DMF_FUNCTIONS
        .iter()
        .map(|f| DmfInfo {
            name: f.name,
            requires_column: f.requires_column(),
        })
        .collect();
    Json(functions)
}

/// Relation a DMF runs against: the base table or its clean view.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum DmfTarget {
    #[default]
    Base,
    Clean,
}

#[derive(Deserialize)]
struct DmfRequest {
    table: String,
    function: String,
    column: Option<String>,
    #[serde(default)]
    target: DmfTarget,
}

#[derive(Serialize)]
struct DmfResponse {
    sql: String,
    result: ResultTable,
    /// Populated when the result is a single cell, for metric display
    metric: Option<serde_json::Value>,
}

/// POST /api/dmf - run a data metric function against a table or its
/// clean view
async fn run_dmf(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DmfRequest>,
) -> ApiResult<DmfResponse> {
    require_allowed_table(&state, &request.table)?;

    let function = dmf::find(&request.function)
        .ok_or_else(|| DqError::Dmf(format!("unknown DMF function '{}'", request.function)))?;
    let expression = function.render(request.column.as_deref())?;

    let relation = match request.target {
        DmfTarget::Base => base_relation(&state, &request.table),
        DmfTarget::Clean => sql::clean_view(&request.table),
    };
    let query = sql::dmf_query(&expression, &relation);

    let result = run_blocking({
        let state = Arc::clone(&state);
        let query = query.clone();
        move || state.warehouse.execute(&query)
    })
    .await?;

    let metric = if result.rows.len() == 1 && result.columns.len() == 1 {
        result.scalar().cloned()
    } else {
        None
    };

    Ok(Json(DmfResponse {
        sql: query,
        result,
        metric,
    }))
}

#[derive(Serialize)]
struct DescribeResponse {
    table: String,
    description: String,
}

/// POST /api/tables/{table}/describe - AI-generated column descriptions
async fn describe_table(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
) -> ApiResult<DescribeResponse> {
    require_allowed_table(&state, &table)?;

    let description = run_blocking({
        let state = Arc::clone(&state);
        let table = table.clone();
        move || {
            state
                .describer
                .describe_table(&state.warehouse, &table, &state.schema_document)
        }
    })
    .await?;

    Ok(Json(DescribeResponse { table, description }))
}
