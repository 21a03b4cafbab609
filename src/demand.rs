//! Demand: the flow-control currency of the publisher protocol.
//!
//! A subscriber tells its publisher how many more items it is prepared to
//! receive by requesting a [`Demand`]. Demand accumulates across requests and
//! is consumed as items are delivered.

use std::{
  fmt::{Display, Formatter},
  ops::{Add, AddAssign, Sub, SubAssign},
};

use crate::error::DemandError;

/// Number of items a subscriber is willing to receive.
///
/// Bounded demand is ordered by its count and every bounded demand is less
/// than [`Demand::Unlimited`].
///
/// ```
/// use rxlatest::prelude::*;
///
/// let mut demand = Demand::max(2);
/// demand += Demand::max(3);
/// assert_eq!(demand, Demand::max(5));
///
/// demand += Demand::UNLIMITED;
/// assert!(demand.is_unlimited());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Demand {
  /// At most this many more items.
  Max(usize),
  /// As many items as the publisher can produce.
  Unlimited,
}

impl Demand {
  /// No items requested.
  pub const NONE: Demand = Demand::Max(0);
  /// Unbounded demand.
  pub const UNLIMITED: Demand = Demand::Unlimited;

  /// Bounded demand of `count` items.
  #[inline]
  #[must_use]
  pub const fn max(count: usize) -> Self { Demand::Max(count) }

  /// Returns `true` if nothing is requested.
  #[inline]
  #[must_use]
  pub const fn is_none(&self) -> bool { matches!(self, Demand::Max(0)) }

  /// Returns `true` if the demand is unbounded.
  #[inline]
  #[must_use]
  pub const fn is_unlimited(&self) -> bool { matches!(self, Demand::Unlimited) }

  /// The bounded count, or `None` for unlimited demand.
  #[inline]
  #[must_use]
  pub const fn max_items(&self) -> Option<usize> {
    match self {
      Demand::Max(count) => Some(*count),
      Demand::Unlimited => None,
    }
  }

  /// Consumes a single unit of demand when available.
  ///
  /// Returns `false` and leaves the demand untouched when nothing is
  /// requested.
  #[must_use]
  pub fn take_one(&mut self) -> bool {
    match self {
      Demand::Unlimited => true,
      Demand::Max(count) if *count > 0 => {
        *count -= 1;
        true
      }
      Demand::Max(_) => false,
    }
  }
}

impl Default for Demand {
  fn default() -> Self { Demand::NONE }
}

impl Add for Demand {
  type Output = Demand;

  fn add(self, rhs: Demand) -> Demand {
    match (self, rhs) {
      (Demand::Max(a), Demand::Max(b)) => a.checked_add(b).map_or(Demand::Unlimited, Demand::Max),
      _ => Demand::Unlimited,
    }
  }
}

impl Add<usize> for Demand {
  type Output = Demand;

  #[inline]
  fn add(self, rhs: usize) -> Demand { self + Demand::Max(rhs) }
}

impl AddAssign for Demand {
  #[inline]
  fn add_assign(&mut self, rhs: Demand) { *self = *self + rhs; }
}

impl AddAssign<usize> for Demand {
  #[inline]
  fn add_assign(&mut self, rhs: usize) { *self = *self + rhs; }
}

/// Subtracting delivered items saturates at zero and never shrinks unlimited
/// demand.
impl Sub<usize> for Demand {
  type Output = Demand;

  fn sub(self, rhs: usize) -> Demand {
    match self {
      Demand::Max(count) => Demand::Max(count.saturating_sub(rhs)),
      Demand::Unlimited => Demand::Unlimited,
    }
  }
}

impl SubAssign<usize> for Demand {
  #[inline]
  fn sub_assign(&mut self, rhs: usize) { *self = *self - rhs; }
}

impl From<usize> for Demand {
  #[inline]
  fn from(count: usize) -> Self { Demand::Max(count) }
}

impl TryFrom<i64> for Demand {
  type Error = DemandError;

  fn try_from(count: i64) -> Result<Self, Self::Error> {
    usize::try_from(count)
      .map(Demand::Max)
      .or_else(|_| if count < 0 { Err(DemandError::Negative(count)) } else { Ok(Demand::Unlimited) })
  }
}

impl TryFrom<Demand> for usize {
  type Error = DemandError;

  fn try_from(demand: Demand) -> Result<Self, Self::Error> {
    demand.max_items().ok_or(DemandError::Unlimited)
  }
}

impl Display for Demand {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Demand::Max(count) => write!(f, "max({count})"),
      Demand::Unlimited => f.write_str("unlimited"),
    }
  }
}
