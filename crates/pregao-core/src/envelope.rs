//! JSON response envelope for machine-readable output.
//!
//! Every `--format json` payload is `{ meta, data, errors }`. `meta` says who
//! asked (request and trace ids), when, from which provider, how long it took
//! and whether the response cache answered. Skipped tickers surface as
//! `meta.warnings`; `errors` is reserved for a scan that produced nothing.

use serde::{Deserialize, Serialize};

use crate::scanner::{ScanReport, TickerIssue};
use crate::{ProviderId, UtcDateTime, ValidationError};

pub const SCHEMA_VERSION: &str = "v1.0.0";

const MIN_REQUEST_ID_LEN: usize = 8;
const TRACE_ID_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn success(meta: EnvelopeMeta, data: T) -> Self {
        Self {
            meta,
            data,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(
        meta: EnvelopeMeta,
        data: T,
        errors: Vec<EnvelopeError>,
    ) -> Result<Self, ValidationError> {
        meta.validate()?;
        errors.iter().try_for_each(EnvelopeError::validate)?;
        Ok(Self { meta, data, errors })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    pub schema_version: String,
    pub generated_at: UtcDateTime,
    pub source_chain: Vec<ProviderId>,
    pub latency_ms: u64,
    pub cache_hit: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    pub fn new(
        request_id: impl Into<String>,
        source_chain: Vec<ProviderId>,
        latency_ms: u64,
        cache_hit: bool,
    ) -> Result<Self, ValidationError> {
        let meta = Self {
            request_id: request_id.into(),
            trace_id: None,
            schema_version: SCHEMA_VERSION.to_owned(),
            generated_at: UtcDateTime::now(),
            source_chain,
            latency_ms,
            cache_hit,
            warnings: Vec::new(),
        };
        meta.validate()?;
        Ok(meta)
    }

    /// Stamped with the scan's own clock and latency; every skipped ticker
    /// and failed quote becomes a warning line.
    pub fn for_scan(
        request_id: impl Into<String>,
        source: ProviderId,
        report: &ScanReport,
        cache_hit: bool,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            generated_at: report.generated_at,
            warnings: report.warnings(),
            ..Self::new(request_id, vec![source], report.latency_ms, cache_hit)?
        })
    }

    pub fn with_trace_id(self, trace_id: impl Into<String>) -> Result<Self, ValidationError> {
        let meta = Self {
            trace_id: Some(trace_id.into()),
            ..self
        };
        meta.validate()?;
        Ok(meta)
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.request_id.trim().len() < MIN_REQUEST_ID_LEN {
            return Err(ValidationError::InvalidRequestId);
        }
        if self.trace_id.as_deref().is_some_and(|id| !is_trace_id(id)) {
            return Err(ValidationError::InvalidTraceId);
        }
        if !is_semver_tag(&self.schema_version) {
            return Err(ValidationError::InvalidSchemaVersion {
                value: self.schema_version.clone(),
            });
        }
        if self.source_chain.is_empty() {
            return Err(ValidationError::EmptySourceChain);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ProviderId>,
}

impl EnvelopeError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Result<Self, ValidationError> {
        let error = Self {
            code: code.into(),
            message: message.into(),
            retryable: None,
            source: None,
        };
        error.validate()?;
        Ok(error)
    }

    /// `TOTS3.SA: insufficient history ...`, retryable when the upstream
    /// was the problem rather than the ticker.
    pub fn from_issue(issue: &TickerIssue, source: ProviderId) -> Result<Self, ValidationError> {
        let retryable = matches!(
            issue.code.as_str(),
            "source.unavailable" | "source.rate_limited"
        );
        Ok(Self {
            retryable: Some(retryable),
            source: Some(source),
            ..Self::new(issue.code.clone(), format!("{}: {}", issue.symbol, issue.message))?
        })
    }

    pub fn with_source(self, source: ProviderId) -> Self {
        Self {
            source: Some(source),
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            Err(ValidationError::EmptyErrorCode)
        } else if self.message.trim().is_empty() {
            Err(ValidationError::EmptyErrorMessage)
        } else {
            Ok(())
        }
    }
}

/// `vMAJOR.MINOR.PATCH`, digits only.
fn is_semver_tag(value: &str) -> bool {
    value.strip_prefix('v').is_some_and(|version| {
        let parts: Vec<&str> = version.split('.').collect();
        parts.len() == 3
            && parts
                .iter()
                .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
    })
}

/// 32 hex characters, not all zero.
fn is_trace_id(value: &str) -> bool {
    value.len() == TRACE_ID_LEN
        && value.bytes().all(|b| b.is_ascii_hexdigit())
        && value.bytes().any(|b| b != b'0')
}
