//! # Session and Clock
//!
//! Explicit operating context for terminal operations.
//!
//! Shift and checkout operations take a `&Session` instead of reading
//! ambient global state: the operator identity and the clock travel with
//! the call. Tests substitute a [`FixedClock`] to make timestamps and
//! receipt numbers deterministic.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use till_core::Operator;

// =============================================================================
// Clock
// =============================================================================

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// =============================================================================
// Session
// =============================================================================

/// The operating context for one authenticated operator at the terminal.
#[derive(Clone)]
pub struct Session {
    /// The operator driving the terminal.
    pub operator: Operator,

    clock: Arc<dyn Clock>,
}

impl Session {
    /// Creates a session with the system clock.
    pub fn new(operator: Operator) -> Self {
        Session {
            operator,
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates a session with an explicit clock (tests).
    pub fn with_clock(operator: Operator, clock: Arc<dyn Clock>) -> Self {
        Session { operator, clock }
    }

    /// The current instant per this session's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("operator", &self.operator)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use till_core::Role;

    #[test]
    fn test_fixed_clock_is_deterministic() {
        let instant = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();
        let session = Session::with_clock(
            Operator {
                id: "op-1".to_string(),
                name: "Alice".to_string(),
                role: Role::Cashier,
            },
            Arc::new(FixedClock(instant)),
        );

        assert_eq!(session.now(), instant);
        assert_eq!(session.now(), instant);
    }
}
