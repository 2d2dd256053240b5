//! Export operations: user lookup, SQLite export download, and code download.

mod client;
mod error;

pub mod code;
pub mod database;
pub mod user;

pub use client::{
    Endpoints, ExportClient, ExportClientBuilder, DEFAULT_API_BASE, DEFAULT_SITE_BASE,
    QUIET_FIELDS,
};
pub use code::{get_code, CodeOutcome};
pub use database::{get_db, DatabaseOutcome};
pub use error::ExportError;
pub use user::get_info;

use reqwest::Url;
use serde::de::DeserializeOwned;

fn invalid_url(input: &str, e: url::ParseError) -> ExportError {
    ExportError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    }
}

/// Fail with HttpStatus unless the response is 2xx.
fn check_status(
    response: reqwest::blocking::Response,
    url: &Url,
) -> Result<reqwest::blocking::Response, ExportError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ExportError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response)
}

/// GET a metadata endpoint and decode its JSON array body.
fn fetch_json_array<T: DeserializeOwned>(
    client: &mut ExportClient,
    url: Url,
) -> Result<Vec<T>, ExportError> {
    let response = client.get(url.clone()).map_err(|e| ExportError::Network {
        url: url.to_string(),
        source: e,
    })?;
    let response = check_status(response, &url)?;
    let body = response.bytes().map_err(|e| ExportError::BodyRead {
        url: url.to_string(),
        source: e,
    })?;
    serde_json::from_slice(&body).map_err(|e| ExportError::Decode {
        url: url.to_string(),
        source: e,
    })
}
