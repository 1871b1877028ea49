use std::time::Duration;

/// Request budget for Yahoo Finance.
///
/// Yahoo publishes no quota. This pace keeps a full 63-ticker scan (one
/// chart and one quote call per ticker) well under the point where it
/// starts answering 429.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderPolicy {
    /// Ticker jobs in flight at once.
    pub max_concurrency: usize,
    pub quota_window: Duration,
    /// Calls allowed per `quota_window`, also the burst size.
    pub quota_limit: u32,
}

impl ProviderPolicy {
    pub const fn yahoo() -> Self {
        Self {
            max_concurrency: 4,
            quota_window: Duration::from_secs(60),
            quota_limit: 120,
        }
    }

    /// Spacing between calls once the burst is spent.
    pub fn pace(&self) -> Duration {
        self.quota_window / self.quota_limit.max(1)
    }
}

impl Default for ProviderPolicy {
    fn default() -> Self {
        Self::yahoo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yahoo_pace_is_two_calls_a_second() {
        assert_eq!(ProviderPolicy::yahoo().pace(), Duration::from_millis(500));
    }

    #[test]
    fn zero_limit_does_not_divide_by_zero() {
        let policy = ProviderPolicy {
            quota_limit: 0,
            ..ProviderPolicy::yahoo()
        };
        assert_eq!(policy.pace(), Duration::from_secs(60));
    }
}
