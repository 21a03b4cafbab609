//! Latest-value slots of a combination.
//!
//! The slots of an `N`-ary combination are a tuple of `N` options, one per
//! source, so every source keeps its own item type.

/// The full set of latest-value slots of an `N`-source combination.
pub(crate) trait LatestSlots<const N: usize>: Default + Send {
  /// The tuple emitted downstream.
  type Output: Send;

  /// Clones every latched value into a tuple, or `None` while any source has
  /// not emitted yet.
  fn snapshot(&self) -> Option<Self::Output>;
}

/// The slot of source `I`.
pub(crate) trait LatestSlot<const I: usize> {
  type Item;

  /// Replaces the value held for source `I`.
  fn latch(&mut self, item: Self::Item);
}

macro_rules! latest_slots {
  (@slot [$($All:ident),+]) => {};
  (@slot [$($All:ident),+] $idx:tt $T:ident $(, $rest_idx:tt $Rest:ident)*) => {
    impl<$($All),+> LatestSlot<$idx> for ($(Option<$All>,)+) {
      type Item = $T;

      #[inline]
      fn latch(&mut self, item: $T) { self.$idx = Some(item); }
    }

    latest_slots!(@slot [$($All),+] $($rest_idx $Rest),*);
  };
  ($n:literal; $($idx:tt $T:ident),+) => {
    impl<$($T: Clone + Send),+> LatestSlots<$n> for ($(Option<$T>,)+) {
      type Output = ($($T,)+);

      #[inline]
      fn snapshot(&self) -> Option<Self::Output> { Some(($(self.$idx.as_ref()?.clone(),)+)) }
    }

    latest_slots!(@slot [$($T),+] $($idx $T),+);
  };
}

latest_slots!(2; 0 A, 1 B);
latest_slots!(3; 0 A, 1 B, 2 C);
latest_slots!(4; 0 A, 1 B, 2 C, 3 D);
