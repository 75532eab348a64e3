//! Demand
//!
//! A `Demand` is the number of additional values a consumer is willing to
//! accept: either an exact count or unbounded. Consumers hand it to
//! producers through [`Subscription::request`](super::Subscription::request)
//! and as the return value of
//! [`Consumer::receive_value`](super::Consumer::receive_value).
//!
//! Arithmetic never overflows: additions that would exceed `u64::MAX`
//! saturate to [`Demand::Unbounded`], and subtraction from an exact count
//! stops at zero.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How many more values a consumer accepts.
///
/// Variant order matters: the derived ordering places every exact count
/// below `Unbounded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Demand {
    /// An exact, non-negative number of values.
    Exact(u64),

    /// Any number of values.
    Unbounded,
}

impl Demand {
    /// No additional demand.
    pub const NONE: Demand = Demand::Exact(0);

    /// Unbounded demand.
    pub const UNBOUNDED: Demand = Demand::Unbounded;

    /// Demand for at most `count` values.
    pub const fn max(count: u64) -> Self {
        Demand::Exact(count)
    }

    /// Whether this demand is unbounded.
    pub const fn is_unbounded(&self) -> bool {
        matches!(self, Demand::Unbounded)
    }

    /// Whether at least one more value may be delivered.
    pub const fn has_demand(&self) -> bool {
        match self {
            Demand::Unbounded => true,
            Demand::Exact(count) => *count > 0,
        }
    }

    /// The exact count, or `None` when unbounded.
    pub const fn exact(&self) -> Option<u64> {
        match self {
            Demand::Exact(count) => Some(*count),
            Demand::Unbounded => None,
        }
    }
}

impl Default for Demand {
    fn default() -> Self {
        Demand::NONE
    }
}

impl From<u64> for Demand {
    fn from(count: u64) -> Self {
        Demand::Exact(count)
    }
}

impl TryFrom<i64> for Demand {
    type Error = Error;

    fn try_from(count: i64) -> Result<Self> {
        u64::try_from(count)
            .map(Demand::Exact)
            .map_err(|_| Error::NegativeDemand(count))
    }
}

impl Add for Demand {
    type Output = Demand;

    fn add(self, rhs: Demand) -> Demand {
        match (self, rhs) {
            (Demand::Exact(a), Demand::Exact(b)) => {
                a.checked_add(b).map_or(Demand::Unbounded, Demand::Exact)
            }
            _ => Demand::Unbounded,
        }
    }
}

impl Add<u64> for Demand {
    type Output = Demand;

    fn add(self, rhs: u64) -> Demand {
        self + Demand::Exact(rhs)
    }
}

impl AddAssign for Demand {
    fn add_assign(&mut self, rhs: Demand) {
        *self = *self + rhs;
    }
}

impl AddAssign<u64> for Demand {
    fn add_assign(&mut self, rhs: u64) {
        *self = *self + rhs;
    }
}

/// Consumes `rhs` values from the demand. Unbounded stays unbounded.
impl Sub<u64> for Demand {
    type Output = Demand;

    fn sub(self, rhs: u64) -> Demand {
        match self {
            Demand::Exact(count) => Demand::Exact(count.saturating_sub(rhs)),
            Demand::Unbounded => Demand::Unbounded,
        }
    }
}

impl SubAssign<u64> for Demand {
    fn sub_assign(&mut self, rhs: u64) {
        *self = *self - rhs;
    }
}

impl PartialEq<u64> for Demand {
    fn eq(&self, other: &u64) -> bool {
        matches!(self, Demand::Exact(count) if count == other)
    }
}

impl PartialOrd<u64> for Demand {
    fn partial_cmp(&self, other: &u64) -> Option<Ordering> {
        Some(match self {
            Demand::Exact(count) => count.cmp(other),
            Demand::Unbounded => Ordering::Greater,
        })
    }
}

impl fmt::Display for Demand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Demand::Exact(count) => write!(f, "max({})", count),
            Demand::Unbounded => f.write_str("unbounded"),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_of_exact_counts() {
        assert_eq!(Demand::max(2) + Demand::max(3), Demand::max(5));
        assert_eq!(Demand::NONE + 4, Demand::max(4));
    }

    #[test]
    fn addition_saturates_to_unbounded() {
        assert_eq!(Demand::max(u64::MAX) + 1, Demand::Unbounded);
        assert_eq!(Demand::max(1) + Demand::UNBOUNDED, Demand::Unbounded);
        assert_eq!(Demand::UNBOUNDED + Demand::NONE, Demand::Unbounded);

        let mut demand = Demand::max(u64::MAX - 1);
        demand += Demand::max(5);
        assert!(demand.is_unbounded());
    }

    #[test]
    fn subtraction_stops_at_zero() {
        assert_eq!(Demand::max(3) - 1, Demand::max(2));
        assert_eq!(Demand::max(1) - 5, Demand::NONE);
        assert_eq!(Demand::UNBOUNDED - 100, Demand::Unbounded);
    }

    #[test]
    fn ordering_places_unbounded_last() {
        assert!(Demand::NONE < Demand::max(1));
        assert!(Demand::max(u64::MAX) < Demand::UNBOUNDED);
        assert!(Demand::UNBOUNDED > 0);
        assert!(Demand::max(1) > 0);
        assert!(Demand::NONE <= 0);
        assert_eq!(Demand::max(7), 7);
        assert_ne!(Demand::UNBOUNDED, u64::MAX);
    }

    #[test]
    fn has_demand() {
        assert!(!Demand::NONE.has_demand());
        assert!(Demand::max(1).has_demand());
        assert!(Demand::UNBOUNDED.has_demand());
    }

    #[test]
    fn exact_count() {
        assert_eq!(Demand::max(9).exact(), Some(9));
        assert_eq!(Demand::UNBOUNDED.exact(), None);
    }

    #[test]
    fn negative_counts_are_rejected() {
        assert_eq!(Demand::try_from(4i64).unwrap(), Demand::max(4));
        assert!(matches!(
            Demand::try_from(-1i64),
            Err(Error::NegativeDemand(-1))
        ));
    }

    #[test]
    fn display() {
        assert_eq!(Demand::max(3).to_string(), "max(3)");
        assert_eq!(Demand::UNBOUNDED.to_string(), "unbounded");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_representation() {
        let json = serde_json::to_string(&Demand::max(3)).unwrap();
        assert_eq!(json, r#"{"exact":3}"#);

        let back: Demand = serde_json::from_str(r#""unbounded""#).unwrap();
        assert_eq!(back, Demand::Unbounded);
    }
}
