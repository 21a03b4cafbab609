//! Per-source side of a combination.
//!
//! Every source is subscribed with a [`SourceAdapter`] that only sees the
//! node through a [`FocusedView`] fixed to that source's position.

use std::{
  fmt::{Display, Formatter},
  sync::Arc,
};

use super::{
  node::CombineLatestNode,
  slots::{LatestSlot, LatestSlots},
};
use crate::{
  completion::Completion, demand::Demand, subscriber::Subscriber,
  subscription::SubscriptionHandle,
};

/// Position of a source in a combination, counted from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SourceId(usize);

impl SourceId {
  #[inline]
  pub(crate) const fn new(index: usize) -> Self { SourceId(index) }

  #[inline]
  pub(crate) fn index(self) -> usize { self.0 }
}

impl Display for SourceId {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "source #{}", self.0 + 1) }
}

/// What one source may do to the node it feeds.
pub(crate) trait FocusedView<Item, Err> {
  fn accept_subscription(&self, subscription: SubscriptionHandle);

  fn accept_item(&self, item: Item);

  fn accept_completion(&self, completion: Completion<Err>);
}

/// The node seen from source `I`.
pub(crate) struct Focus<Node, const I: usize>(Arc<Node>);

impl<Node, const I: usize> Focus<Node, I> {
  const SOURCE: SourceId = SourceId::new(I);

  pub(crate) fn new(node: Arc<Node>) -> Self { Focus(node) }
}

impl<L, Err, S, const N: usize, const I: usize> FocusedView<<L as LatestSlot<I>>::Item, Err>
  for Focus<CombineLatestNode<L, Err, S, N>, I>
where
  L: LatestSlots<N> + LatestSlot<I>,
  Err: Send,
  S: Subscriber<L::Output, Err> + Send,
{
  #[inline]
  fn accept_subscription(&self, subscription: SubscriptionHandle) {
    self.0.attach_subscription(Self::SOURCE, subscription)
  }

  #[inline]
  fn accept_item(&self, item: <L as LatestSlot<I>>::Item) { self.0.attach_item::<I>(item) }

  #[inline]
  fn accept_completion(&self, completion: Completion<Err>) {
    self.0.attach_completion(Self::SOURCE, completion)
  }
}

/// Subscriber attached to one source of a combination.
///
/// Requests unlimited demand as soon as it is subscribed and never applies
/// back-pressure: the node keeps only the latest item of each source.
pub(crate) struct SourceAdapter<V> {
  view: V,
}

impl<V> SourceAdapter<V> {
  pub(crate) fn new(view: V) -> Self { SourceAdapter { view } }
}

impl<Item, Err, V> Subscriber<Item, Err> for SourceAdapter<V>
where
  V: FocusedView<Item, Err>,
{
  fn receive_subscription(&mut self, subscription: SubscriptionHandle) {
    self.view.accept_subscription(subscription.clone());
    subscription.request(Demand::UNLIMITED);
  }

  #[inline]
  fn receive(&mut self, item: Item) -> Demand {
    self.view.accept_item(item);
    Demand::UNLIMITED
  }

  #[inline]
  fn receive_completion(&mut self, completion: Completion<Err>) {
    self.view.accept_completion(completion)
  }
}
