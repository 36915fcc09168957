//! Upstream target parsing.

use axum::http::uri::PathAndQuery;
use url::Url;

/// Error returned when the upstream URL is unusable.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("invalid upstream URL {url:?}: {source}")]
    Parse { url: String, source: url::ParseError },
    #[error("unsupported upstream scheme {0:?} (expected http or https)")]
    UnsupportedScheme(String),
    #[error("upstream URL {0:?} has no host")]
    MissingHost(String),
}

/// The parsed upstream base. Immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    scheme: String,
    authority: String,
}

impl ProxyTarget {
    /// Parse an upstream base URL such as `https://api.example.com:8443`.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let url = Url::parse(raw.trim()).map_err(|source| TargetError::Parse {
            url: raw.to_string(),
            source,
        })?;

        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(TargetError::UnsupportedScheme(scheme.to_string()));
        }
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| TargetError::MissingHost(raw.to_string()))?;

        // Url drops the port when it is the scheme default
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self {
            scheme: scheme.to_string(),
            authority,
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host, plus the port when it is not the scheme default.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Build the upstream URI for an incoming path and raw query.
    pub fn request_uri(&self, path_and_query: Option<&PathAndQuery>) -> String {
        let tail = path_and_query.map(PathAndQuery::as_str).unwrap_or("/");
        format!("{}://{}{}", self.scheme, self.authority, tail)
    }
}

impl std::fmt::Display for ProxyTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}
