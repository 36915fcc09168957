//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};

use crate::config::schema::{MockConfig, ProxyConfig};
use crate::config::validation::{cors_header_overrides, validate_config, ValidationError};
use crate::mock::{MockResponse, MockRule};
use crate::routing::matcher::PathPattern;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
    #[error("failed to read body file {path:?} for mock #{index}: {source}")]
    MockBody {
        index: usize,
        path: PathBuf,
        source: std::io::Error,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    let config: ProxyConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Compile validated mock definitions into rules.
///
/// `base_dir` resolves relative `file` bodies, normally the directory of
/// the configuration file.
pub fn compile_mocks(config: &ProxyConfig, base_dir: &Path) -> Result<Vec<MockRule>, ConfigError> {
    for (index, header) in cors_header_overrides(config) {
        tracing::warn!(
            mock = index,
            header = %header,
            "Mock sets a CORS header; the relay's `*` is sent in front of it"
        );
    }

    config
        .mocks
        .iter()
        .enumerate()
        .map(|(index, mock)| compile_mock(index, mock, base_dir))
        .collect()
}

fn compile_mock(index: usize, mock: &MockConfig, base_dir: &Path) -> Result<MockRule, ConfigError> {
    let invalid = |e: ValidationError| ConfigError::Validation(vec![e]);

    let path = PathPattern::parse(&mock.path)
        .map_err(|source| invalid(ValidationError::InvalidPath { index, source }))?;

    let response = &mock.response;
    let status = StatusCode::from_u16(response.code).map_err(|_| {
        invalid(ValidationError::InvalidStatus {
            index,
            code: response.code,
        })
    })?;

    let body = match (&response.body, &response.file) {
        (Some(_), Some(_)) => return Err(invalid(ValidationError::BodyConflict { index })),
        (Some(text), None) => text.clone().into_bytes(),
        (None, Some(file)) => {
            let path = base_dir.join(file);
            fs::read(&path).map_err(|source| ConfigError::MockBody {
                index,
                path,
                source,
            })?
        }
        (None, None) => Vec::new(),
    };

    let mut canned = MockResponse::new(status, body);
    for (name, value) in &response.headers {
        let header_name = parse_header_name(index, name).map_err(invalid)?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            invalid(ValidationError::InvalidHeaderValue {
                index,
                name: name.clone(),
            })
        })?;
        canned = canned.with_header(header_name, header_value);
    }
    if let Some(ms) = response.delay_ms.filter(|ms| *ms > 0) {
        canned = canned.with_delay(Duration::from_millis(ms));
    }

    let mut rule = MockRule::new(path, canned).with_method(mock.method.clone().unwrap_or_default());
    for (key, value) in &mock.queries {
        rule = rule.with_query(key.clone(), value.clone());
    }
    for (name, value) in &mock.headers {
        rule = rule.with_header(parse_header_name(index, name).map_err(invalid)?, value.clone());
    }
    Ok(rule)
}

fn parse_header_name(index: usize, name: &str) -> Result<HeaderName, ValidationError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| ValidationError::InvalidHeaderName {
        index,
        name: name.to_string(),
    })
}
