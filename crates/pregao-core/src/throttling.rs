use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

use crate::provider_policy::ProviderPolicy;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Paces every Yahoo call of a scan through one token bucket. Clones share
/// the bucket.
#[derive(Clone)]
pub struct ThrottlingQueue {
    limiter: Arc<DirectRateLimiter>,
    waiting: Arc<AtomicUsize>,
}

impl ThrottlingQueue {
    pub fn from_policy(policy: &ProviderPolicy) -> Self {
        let burst = NonZeroU32::new(policy.quota_limit).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(policy.pace())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            waiting: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Takes a slot if one is free right now.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Waits for a slot.
    pub async fn wait(&self) {
        if self.try_acquire() {
            return;
        }
        self.waiting.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("yahoo request budget spent, waiting for a slot");
        self.limiter.until_ready().await;
        self.waiting.fetch_sub(1, Ordering::SeqCst);
    }

    /// Callers currently parked in [`Self::wait`].
    pub fn waiting_len(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}

impl Default for ThrottlingQueue {
    fn default() -> Self {
        Self::from_policy(&ProviderPolicy::yahoo())
    }
}
