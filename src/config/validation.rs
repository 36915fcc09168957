//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate mock definitions (status, headers, method, path pattern)
//! - Validate value ranges and enumerations
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - The upstream URL is checked when the server starts, not here

use axum::http::{HeaderName, HeaderValue, Method, StatusCode};

use crate::config::schema::{MockConfig, ProxyConfig};
use crate::routing::matcher::{PathPattern, PatternError};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("mock #{index}: invalid path: {source}")]
    InvalidPath { index: usize, source: PatternError },
    #[error("mock #{index}: invalid method {method:?}")]
    InvalidMethod { index: usize, method: String },
    #[error("mock #{index}: invalid header name {name:?}")]
    InvalidHeaderName { index: usize, name: String },
    #[error("mock #{index}: invalid value for response header {name:?}")]
    InvalidHeaderValue { index: usize, name: String },
    #[error("mock #{index}: invalid status code {code}")]
    InvalidStatus { index: usize, code: u16 },
    #[error("mock #{index}: response sets both `body` and `file`")]
    BodyConflict { index: usize },
    #[error("shutdown.drain_timeout_secs must be greater than zero")]
    ZeroDrainTimeout,
    #[error("unknown log format {0:?} (expected \"pretty\" or \"json\")")]
    UnknownLogFormat(String),
}

/// Response headers the relay always sets itself.
const RELAY_CORS_HEADERS: [&str; 3] = [
    "access-control-allow-origin",
    "access-control-allow-methods",
    "access-control-allow-headers",
];

/// Mock response headers that collide with the injected CORS headers, as
/// `(mock index, header name)`. The response then carries `*` followed by
/// the mock's value, which browsers reject for `Access-Control-Allow-Origin`.
pub fn cors_header_overrides(config: &ProxyConfig) -> Vec<(usize, String)> {
    config
        .mocks
        .iter()
        .enumerate()
        .flat_map(|(index, mock)| {
            mock.response
                .headers
                .keys()
                .filter(|name| RELAY_CORS_HEADERS.contains(&name.to_ascii_lowercase().as_str()))
                .map(move |name| (index, name.clone()))
        })
        .collect()
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.shutdown.drain_timeout_secs == 0 {
        errors.push(ValidationError::ZeroDrainTimeout);
    }
    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::UnknownLogFormat(
            config.observability.log_format.clone(),
        ));
    }
    for (index, mock) in config.mocks.iter().enumerate() {
        validate_mock(index, mock, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_mock(index: usize, mock: &MockConfig, errors: &mut Vec<ValidationError>) {
    if let Err(source) = PathPattern::parse(&mock.path) {
        errors.push(ValidationError::InvalidPath { index, source });
    }

    if let Some(method) = mock.method.as_deref().filter(|m| !m.is_empty()) {
        if Method::from_bytes(method.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod {
                index,
                method: method.to_string(),
            });
        }
    }

    for name in mock.headers.keys() {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName {
                index,
                name: name.clone(),
            });
        }
    }

    let response = &mock.response;
    if StatusCode::from_u16(response.code).is_err() {
        errors.push(ValidationError::InvalidStatus {
            index,
            code: response.code,
        });
    }
    for (name, value) in &response.headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName {
                index,
                name: name.clone(),
            });
        } else if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::InvalidHeaderValue {
                index,
                name: name.clone(),
            });
        }
    }
    if response.body.is_some() && response.file.is_some() {
        errors.push(ValidationError::BodyConflict { index });
    }
}
