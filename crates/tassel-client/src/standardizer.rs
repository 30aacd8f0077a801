use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tassel_core::error::AppError;
use tassel_core::models::{StandardizedProgram, UNKNOWN_UNIVERSITY};
use tassel_core::traits::Standardizer;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the external program-standardization service.
///
/// POSTs a batch of combined "program, university" strings to `/standardize`
/// and reads back index-aligned rows carrying the llm-generated names.
#[derive(Clone)]
pub struct HttpStandardizer {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpStandardizer {
    pub fn new() -> Result<Self, AppError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, AppError> {
        Self::build(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(self, timeout: Duration) -> Result<Self, AppError> {
        Self::build(&self.base_url, timeout)
    }

    fn build(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: timeout.as_secs(),
        })
    }
}

// ---- Standardizer API types ----

#[derive(Serialize)]
struct StandardizeRequest {
    rows: Vec<RequestRow>,
}

#[derive(Serialize)]
struct RequestRow {
    program: String,
}

#[derive(Deserialize)]
struct StandardizeResponse {
    rows: Vec<ResponseRow>,
}

#[derive(Deserialize)]
struct ResponseRow {
    #[serde(rename = "llm-generated-program")]
    program: Option<String>,
    #[serde(rename = "llm-generated-university")]
    university: Option<String>,
}

impl ResponseRow {
    /// A blank or absent service value falls back to the input string for the
    /// program and to the Unknown sentinel for the university.
    fn into_pair(self, input: &str) -> StandardizedProgram {
        let program = self
            .program
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| input.to_string());
        let university = self
            .university
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_UNIVERSITY.to_string());
        StandardizedProgram {
            program,
            university,
        }
    }
}

impl Standardizer for HttpStandardizer {
    async fn standardize(&self, programs: &[String]) -> Result<Vec<StandardizedProgram>, AppError> {
        let url = format!("{}/standardize", self.base_url);
        let request = StandardizeRequest {
            rows: programs
                .iter()
                .map(|program| RequestRow {
                    program: program.clone(),
                })
                .collect(),
        };
        tracing::debug!(rows = programs.len(), "Standardize request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    AppError::NetworkError(format!("Connection failed: {e}"))
                } else {
                    AppError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::StandardizerError {
                message: format!("HTTP {status_code}: {body}"),
                status_code,
                retryable: status_code == 429 || status_code >= 500,
            });
        }

        let parsed: StandardizeResponse = response.json().await.map_err(|e| {
            AppError::HttpError(format!("Failed to parse standardizer response: {e}"))
        })?;

        if parsed.rows.len() != programs.len() {
            return Err(AppError::StandardizerError {
                message: format!(
                    "standardizer returned {} rows for {} inputs",
                    parsed.rows.len(),
                    programs.len()
                ),
                status_code: 200,
                retryable: false,
            });
        }

        Ok(parsed
            .rows
            .into_iter()
            .zip(programs)
            .map(|(row, input)| row.into_pair(input))
            .collect())
    }
}
