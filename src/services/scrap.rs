/// Default number of failed retests a garment survives before disposal.
pub const DEFAULT_SCRAP_THRESHOLD: i32 = 3;

/// Terminal-transition rule: once a garment's rewash count exceeds the
/// threshold it is permanently retired.
///
/// Consulted only after an ESD failure has incremented the count — a
/// garment is never scrapped on a pass.
#[derive(Debug, Clone, Copy)]
pub struct ScrapPolicy {
    threshold: i32,
}

impl ScrapPolicy {
    pub fn new(threshold: i32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn should_scrap(&self, rewash_count: i32) -> bool {
        rewash_count > self.threshold
    }
}

impl Default for ScrapPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SCRAP_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_at_or_below_threshold_survive() {
        let policy = ScrapPolicy::default();
        for n in 0..=3 {
            assert!(!policy.should_scrap(n), "count {n} should not scrap");
        }
    }

    #[test]
    fn counts_above_threshold_scrap() {
        let policy = ScrapPolicy::default();
        assert!(policy.should_scrap(4));
        assert!(policy.should_scrap(10));
    }

    #[test]
    fn threshold_is_configurable() {
        let policy = ScrapPolicy::new(1);
        assert!(!policy.should_scrap(1));
        assert!(policy.should_scrap(2));
    }
}
