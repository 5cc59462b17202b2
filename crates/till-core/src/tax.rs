//! # Tax Policy
//!
//! Resolves the tax rate applicable to a category at a point in time.
//!
//! Resolution is pure and deterministic: given the same category override
//! and default, the same rate comes back. The per-category override is read
//! from the catalog on every cart mutation - there is no caching layer that
//! could miss a rate update between calls.

use serde::{Deserialize, Serialize};

use crate::types::TaxRate;

/// The terminal's tax policy: a configured default rate plus per-category
/// overrides stored as [`crate::types::TaxRule`] rows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaxPolicy {
    default_rate: TaxRate,
}

impl TaxPolicy {
    /// Creates a policy with the given default rate.
    pub const fn new(default_rate: TaxRate) -> Self {
        TaxPolicy { default_rate }
    }

    /// The rate applied when a category has no override.
    #[inline]
    pub const fn default_rate(&self) -> TaxRate {
        self.default_rate
    }

    /// Resolves the effective rate for a category.
    ///
    /// `category_rate` is the override looked up from the catalog at call
    /// time (`None` when the category has no TaxRule row).
    #[inline]
    pub fn effective(&self, category_rate: Option<TaxRate>) -> TaxRate {
        category_rate.unwrap_or(self.default_rate)
    }
}

impl Default for TaxPolicy {
    fn default() -> Self {
        TaxPolicy::new(TaxRate::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let policy = TaxPolicy::new(TaxRate::from_bps(1400));
        assert_eq!(
            policy.effective(Some(TaxRate::from_bps(500))).bps(),
            500
        );
    }

    #[test]
    fn test_falls_back_to_default() {
        let policy = TaxPolicy::new(TaxRate::from_bps(1400));
        assert_eq!(policy.effective(None).bps(), 1400);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let policy = TaxPolicy::new(TaxRate::from_bps(1400));
        let a = policy.effective(Some(TaxRate::from_bps(825)));
        let b = policy.effective(Some(TaxRate::from_bps(825)));
        assert_eq!(a, b);
    }
}
