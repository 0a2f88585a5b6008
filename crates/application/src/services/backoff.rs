use std::time::Duration;

/// Idle cycles stretch the polling interval geometrically up to `max`; any
/// change snaps it back to `base`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max: Duration,
    pub factor: f64,
}

impl BackoffPolicy {
    pub fn new(base: Duration, max: Duration, factor: f64) -> Self {
        let max = max.max(base);
        let factor = if factor.is_finite() && factor >= 1.0 {
            factor
        } else {
            1.0
        };
        Self { base, max, factor }
    }

    pub fn from_millis(base_ms: u64, max_ms: u64, factor: f64) -> Self {
        Self::new(
            Duration::from_millis(base_ms),
            Duration::from_millis(max_ms),
            factor,
        )
    }

    pub fn next(&self, current: Duration, changed: bool) -> Duration {
        if changed {
            return self.base;
        }
        let millis = (current.as_millis() as f64 * self.factor).round() as u64;
        Duration::from_millis(millis).min(self.max)
    }
}

#[derive(Debug, Clone)]
pub struct AdaptiveInterval {
    policy: BackoffPolicy,
    current: Duration,
}

impl AdaptiveInterval {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            current: policy.base,
            policy,
        }
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    pub fn record(&mut self, changed: bool) -> Duration {
        self.current = self.policy.next(self.current, changed);
        self.current
    }

    pub fn reset(&mut self) {
        self.current = self.policy.base;
    }
}
