use crate::{
  completion::Completion, demand::Demand, publisher::Publisher, subscriber::Subscriber,
  subscription::SubscriptionHandle,
};

/// Publisher returned by [`Publisher::map`].
///
/// Demand and cancellation pass through untouched; only items are
/// transformed.
#[derive(Clone)]
pub struct Map<S, F> {
  source: S,
  func: F,
}

impl<S, F> Map<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { Map { source, func } }
}

impl<S, F, B> Publisher for Map<S, F>
where
  S: Publisher,
  F: FnMut(S::Item) -> B + Send + 'static,
{
  type Item = B;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<B, S::Err> + Send + 'static,
  {
    self.source.subscribe(MapSubscriber { downstream: subscriber, func: self.func })
  }
}

pub struct MapSubscriber<O, F> {
  downstream: O,
  func: F,
}

impl<Item, Err, O, F, B> Subscriber<Item, Err> for MapSubscriber<O, F>
where
  O: Subscriber<B, Err>,
  F: FnMut(Item) -> B,
{
  #[inline]
  fn receive_subscription(&mut self, subscription: SubscriptionHandle) {
    self.downstream.receive_subscription(subscription)
  }

  #[inline]
  fn receive(&mut self, item: Item) -> Demand { self.downstream.receive((self.func)(item)) }

  #[inline]
  fn receive_completion(&mut self, completion: Completion<Err>) {
    self.downstream.receive_completion(completion)
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[test]
  fn primitive_type() {
    let tracker = TrackingSubscriber::new();
    from_iter(100..101).map(|v| v * 2).subscribe(tracker.clone());
    assert_eq!(tracker.values(), vec![200]);
  }

  #[test]
  fn identity_keeps_values() {
    let tracker = TrackingSubscriber::new();
    just(100).map(|v| v).subscribe(tracker.clone());
    assert_eq!(tracker.values(), vec![100]);
  }

  #[test]
  fn map_types_mixed() {
    let tracker = TrackingSubscriber::new();
    from_iter(vec!['a', 'b', 'c']).map(|_| 1).subscribe(tracker.clone());
    assert_eq!(tracker.values().iter().sum::<i32>(), 3);
  }

  #[test]
  fn passes_demand_and_failure_through() {
    let subject = PassthroughSubject::<i32, &str>::new();
    let tracker = TrackingSubscriber::with_demand(Demand::max(1));
    subject.clone().map(|v| v.to_string()).subscribe(tracker.clone());

    subject.send(1);
    subject.send(2);
    subject.send_completion(Completion::Failed("bad"));

    assert_eq!(
      tracker.history(),
      vec![
        Signal::Subscription,
        Signal::Value("1".to_string()),
        Signal::Completion(Completion::Failed("bad"))
      ]
    );
  }
}
