use pregao_core::{EnvelopeMeta, ProviderId, ScanReport, ValidationError};
use uuid::Uuid;

/// Identity of one command run, turned into envelope metadata at the end.
///
/// The request id is a hyphenated UUID v4; the trace id is a second UUID in
/// simple form, which gives the 32 hex characters a W3C trace id needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub request_id: Uuid,
    pub trace_id: String,
    pub source: ProviderId,
}

impl Metadata {
    pub fn new(source: ProviderId) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            trace_id: Uuid::new_v4().simple().to_string(),
            source,
        }
    }

    pub fn scan_meta(&self, report: &ScanReport, cache_hit: bool) -> Result<EnvelopeMeta, ValidationError> {
        self.traced(EnvelopeMeta::for_scan(
            self.request_id.hyphenated().to_string(),
            self.source,
            report,
            cache_hit,
        )?)
    }

    /// For commands that never call the provider.
    pub fn local_meta(&self) -> Result<EnvelopeMeta, ValidationError> {
        self.traced(EnvelopeMeta::new(
            self.request_id.hyphenated().to_string(),
            vec![self.source],
            0,
            true,
        )?)
    }

    fn traced(&self, meta: EnvelopeMeta) -> Result<EnvelopeMeta, ValidationError> {
        meta.with_trace_id(self.trace_id.clone())
    }
}
