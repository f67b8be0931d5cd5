//! Warehouse client wrapper.
//!
//! Speaks the warehouse's HTTP statements API: each call submits one SQL
//! statement with the configured session context and returns the rows. The
//! session is established once per process and reused; there is no
//! reconnection or retry, a failed request is terminal for that user action.

#[cfg(test)]
mod tests;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::WarehouseConfig;
use crate::{DqError, Result};

const DEFAULT_TIMEOUT_SECONDS: u64 = 120;
const STATEMENTS_PATH: &str = "/api/v2/statements";

/// Statement issued for the Cortex completion call. Model, prompt, and the
/// token budget are bound as positional parameters, never interpolated.
const CORTEX_COMPLETE_SQL: &str =
    "SELECT SNOWFLAKE.CORTEX.COMPLETE(?, [{'role':'user', 'content':?}], {'max_tokens': ?})";

#[derive(Debug, Clone)]
pub struct WarehouseClient {
    agent: ureq::Agent,
    statements_url: Url,
    auth_header: String,
    session: WarehouseConfig,
}

/// Column names plus row values returned from one statement. Ephemeral,
/// recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultTable {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First cell of the first row, if any.
    #[inline]
    pub fn scalar(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }

    /// First cell parsed as an integer. The statements API returns numeric
    /// values as strings.
    #[inline]
    pub fn scalar_i64(&self) -> Option<i64> {
        match self.scalar()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    warehouse: &'a str,
    database: &'a str,
    schema: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bindings: Option<HashMap<String, Binding>>,
}

#[derive(Debug, Serialize)]
struct Binding {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
}

#[derive(Debug, Deserialize)]
struct StatementResponse {
    #[serde(rename = "resultSetMetaData")]
    result_set_meta_data: Option<ResultSetMetaData>,
    data: Option<Vec<Vec<Value>>>,
    message: Option<String>,
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultSetMetaData {
    #[serde(rename = "rowType")]
    row_type: Vec<ColumnType>,
}

#[derive(Debug, Deserialize)]
struct ColumnType {
    name: String,
}

impl WarehouseClient {
    #[inline]
    pub fn new(config: &WarehouseConfig) -> Result<Self> {
        let base_url = config
            .base_url()
            .map_err(|e| DqError::Config(e.to_string()))?;
        let statements_url = base_url
            .join(STATEMENTS_PATH)
            .map_err(|e| DqError::Config(format!("Failed to build statements URL: {}", e)))?;

        // Non-2xx responses carry the warehouse error body, so they must not
        // surface as transport errors.
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .http_status_as_error(false)
            .build()
            .into();

        let credentials = format!("{}:{}", config.user, config.password);
        let auth_header = format!("Basic {}", BASE64.encode(credentials));

        Ok(Self {
            agent,
            statements_url,
            auth_header,
            session: config.clone(),
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        self
    }

    /// Execute a SQL statement verbatim and return the full result table.
    ///
    /// No quoting or escaping is performed here; callers build identifiers
    /// through [`crate::sql`].
    #[inline]
    pub fn execute(&self, sql: &str) -> Result<ResultTable> {
        info!("Executing query: {}", sql);
        self.submit(sql, None)
    }

    /// Run a completion prompt through the warehouse's Cortex endpoint and
    /// return the generated text.
    #[inline]
    pub fn complete(&self, model: &str, prompt: &str, max_tokens: u32) -> Result<String> {
        debug!(
            "Executing completion with model '{}' ({} prompt bytes)",
            model,
            prompt.len()
        );

        let mut bindings = HashMap::new();
        bindings.insert(
            "1".to_string(),
            Binding {
                kind: "TEXT",
                value: model.to_string(),
            },
        );
        bindings.insert(
            "2".to_string(),
            Binding {
                kind: "TEXT",
                value: prompt.to_string(),
            },
        );
        bindings.insert(
            "3".to_string(),
            Binding {
                kind: "FIXED",
                value: max_tokens.to_string(),
            },
        );

        let table = self
            .submit(CORTEX_COMPLETE_SQL, Some(bindings))
            .map_err(reclassify_completion_error)?;

        let cell = table.scalar().ok_or_else(|| {
            DqError::Warehouse("No response received from the completion endpoint".to_string())
        })?;
        let raw = match cell {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        Ok(unwrap_completion(&raw))
    }

    fn submit(&self, sql: &str, bindings: Option<HashMap<String, Binding>>) -> Result<ResultTable> {
        let request = StatementRequest {
            statement: sql,
            warehouse: &self.session.warehouse,
            database: &self.session.database,
            schema: &self.session.schema,
            role: self.session.role.as_deref(),
            bindings,
        };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| DqError::Warehouse(format!("Failed to serialize statement: {}", e)))?;

        let mut response = self
            .agent
            .post(self.statements_url.as_str())
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("X-Snowflake-Account", &self.session.account)
            .send(&request_json)
            .map_err(|e| DqError::Warehouse(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| DqError::Warehouse(format!("Failed to read response: {}", e)))?;

        if status == 401 || status == 403 {
            warn!("Warehouse rejected credentials (status {})", status);
            return Err(DqError::Permission(format!(
                "HTTP {}: {}",
                status,
                error_message(&body)
            )));
        }

        if !(200..300).contains(&status) {
            return Err(DqError::Warehouse(format!(
                "HTTP {}: {}",
                status,
                error_message(&body)
            )));
        }

        let parsed: StatementResponse = serde_json::from_str(&body)
            .map_err(|e| DqError::Warehouse(format!("Failed to parse response: {}", e)))?;

        let columns = parsed
            .result_set_meta_data
            .map(|meta| meta.row_type.into_iter().map(|c| c.name).collect())
            .unwrap_or_default();
        let rows = parsed.data.unwrap_or_default();

        debug!("Statement returned {} rows", rows.len());
        Ok(ResultTable { columns, rows })
    }
}

/// Pull the human-readable message out of a warehouse error body, falling
/// back to the raw body text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<StatementResponse>(body)
        .ok()
        .and_then(|r| {
            r.message
                .map(|m| match r.code {
                    Some(code) => format!("{} (code {})", m, code),
                    None => m,
                })
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Completion failures caused by missing usage rights are reported
/// distinctly so the operator knows to grant access rather than chase a
/// transient fault.
fn reclassify_completion_error(error: DqError) -> DqError {
    match error {
        DqError::Warehouse(message) => {
            let lowered = message.to_lowercase();
            if lowered.contains("not authorized") || lowered.contains("privilege") {
                DqError::Permission(format!(
                    "{}. Does the role have USAGE on the SNOWFLAKE.CORTEX functions?",
                    message
                ))
            } else {
                DqError::Warehouse(message)
            }
        }
        other => other,
    }
}

/// Unwrap a completion payload. Some models return a JSON envelope
/// (`choices[0].messages`) with doubly-escaped newlines; plain text passes
/// through unchanged.
#[inline]
pub fn unwrap_completion(raw: &str) -> String {
    let text = serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|value| {
            value
                .get("choices")?
                .get(0)?
                .get("messages")?
                .as_str()
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| raw.to_string());

    text.replace("\\n\\n", "\n\n").replace("\\n", "\n")
}
