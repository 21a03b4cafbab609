//! Subscription: the flow-control handle a publisher gives its subscriber.

use std::{
  fmt::{Debug, Formatter},
  sync::Arc,
};

use parking_lot::Mutex;

use crate::demand::Demand;

/// Handle a subscriber uses to request items or cancel.
///
/// Methods take `&self` so one handle can be shared between the subscriber
/// and whoever wants to cancel it; implementations synchronise internally.
/// Both methods must tolerate being called after cancellation or after the
/// publisher completed, in which case they do nothing.
pub trait Subscription: Send + Sync {
  /// Adds `demand` to the number of items the subscriber is willing to
  /// receive.
  fn request(&self, demand: Demand);

  /// Stops delivery and releases the resources held for this subscription.
  fn cancel(&self);
}

/// Shared, type-erased subscription.
pub type SubscriptionHandle = Arc<dyn Subscription>;

impl<T: Subscription + ?Sized> Subscription for Arc<T> {
  #[inline]
  fn request(&self, demand: Demand) { (**self).request(demand) }

  #[inline]
  fn cancel(&self) { (**self).cancel() }
}

impl<T: Subscription + ?Sized> Subscription for Box<T> {
  #[inline]
  fn request(&self, demand: Demand) { (**self).request(demand) }

  #[inline]
  fn cancel(&self) { (**self).cancel() }
}

#[derive(Default)]
struct CancelSlot {
  subscription: Option<SubscriptionHandle>,
  cancelled: bool,
}

/// Cancellation token returned by terminal subscribers such as
/// [`Publisher::sink`](crate::publisher::Publisher::sink).
///
/// Cancelling before the upstream handle arrived cancels the handle as soon as
/// it is attached. Cancelling twice is a no-op.
#[derive(Clone, Default)]
pub struct Cancellable(Arc<Mutex<CancelSlot>>);

impl Cancellable {
  pub(crate) fn new() -> Self { Self::default() }

  /// Stores the upstream handle, or cancels it right away when this token was
  /// already cancelled.
  pub(crate) fn attach(&self, subscription: SubscriptionHandle) {
    let mut slot = self.0.lock();
    if slot.cancelled {
      drop(slot);
      subscription.cancel();
    } else {
      slot.subscription = Some(subscription);
    }
  }

  /// Forgets the upstream handle once the publisher completed.
  pub(crate) fn release(&self) { self.0.lock().subscription = None; }

  /// Cancels the upstream subscription.
  pub fn cancel(&self) {
    let subscription = {
      let mut slot = self.0.lock();
      if slot.cancelled {
        return;
      }
      slot.cancelled = true;
      slot.subscription.take()
    };
    if let Some(subscription) = subscription {
      subscription.cancel();
    }
  }

  pub fn is_cancelled(&self) -> bool { self.0.lock().cancelled }

  /// Activates "RAII" behavior for this token: `cancel()` is called as soon
  /// as the returned guard goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `cancel()` is called immediately, which is probably not what you want!
  pub fn cancel_when_dropped(self) -> CancellableGuard { CancellableGuard(self) }
}

impl Debug for Cancellable {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let slot = self.0.lock();
    f.debug_struct("Cancellable")
      .field("cancelled", &slot.cancelled)
      .field("attached", &slot.subscription.is_some())
      .finish()
  }
}

/// An RAII implementation of a "scoped subscription". When this structure is
/// dropped (falls out of scope), the subscription is cancelled.
///
/// If you want to drop it immediately, wrap it in its own scope.
#[derive(Debug)]
#[must_use]
pub struct CancellableGuard(Cancellable);

impl Drop for CancellableGuard {
  #[inline]
  fn drop(&mut self) { self.0.cancel() }
}
