//! CombineLatest Operator
//!
//! Combines two to four publishers into one publisher of tuples holding the
//! latest item of every source.
//!
//! Nothing is emitted until every source emitted at least once. After that
//! every item from any source produces exactly one tuple, built from that
//! item and the most recent item of each other source. Only the latest item
//! per source is kept; older ones are overwritten.
//!
//! Every source is asked for unlimited demand as soon as it is subscribed.
//! Demand requested by the downstream is forwarded to every running source
//! as well, but does not throttle emissions.
//!
//! The combination fails as soon as any source fails, cancelling the sources
//! still running, and finishes once every source finished. A source that
//! never completes keeps the combination from finishing.
//!
//! # Example
//!
//! ```rust
//! use rxlatest::prelude::*;
//!
//! let a = PassthroughSubject::<i32, ()>::new();
//! let b = PassthroughSubject::<char, ()>::new();
//! let tracker = TrackingSubscriber::new();
//! combine_latest2(a.clone(), b.clone()).subscribe(tracker.clone());
//!
//! a.send(1);
//! b.send('x');
//! b.send('y');
//! assert_eq!(tracker.values(), vec![(1, 'x'), (1, 'y')]);
//! ```

mod adapter;
mod node;
mod slots;

use self::node::CombineLatestNode;
use crate::{publisher::Publisher, subscriber::Subscriber};

/// Publisher combining the sources held in the tuple `Sources`.
///
/// Created by [`combine_latest2`], [`combine_latest3`], [`combine_latest4`]
/// or the `combine_latest*` methods of [`Publisher`].
#[derive(Clone)]
pub struct CombineLatest<Sources> {
  sources: Sources,
}

impl<Sources> CombineLatest<Sources> {
  pub fn new(sources: Sources) -> Self { CombineLatest { sources } }
}

/// Combines the latest items of `a` and `b`.
pub fn combine_latest2<A, B>(a: A, b: B) -> CombineLatest<(A, B)>
where
  A: Publisher,
  B: Publisher<Err = A::Err>,
{
  CombineLatest::new((a, b))
}

/// Combines the latest items of `a`, `b` and `c`.
pub fn combine_latest3<A, B, C>(a: A, b: B, c: C) -> CombineLatest<(A, B, C)>
where
  A: Publisher,
  B: Publisher<Err = A::Err>,
  C: Publisher<Err = A::Err>,
{
  CombineLatest::new((a, b, c))
}

/// Combines the latest items of four publishers.
pub fn combine_latest4<A, B, C, D>(a: A, b: B, c: C, d: D) -> CombineLatest<(A, B, C, D)>
where
  A: Publisher,
  B: Publisher<Err = A::Err>,
  C: Publisher<Err = A::Err>,
  D: Publisher<Err = A::Err>,
{
  CombineLatest::new((a, b, c, d))
}

macro_rules! impl_combine_latest {
  ($n:literal; $First:ident $(, $P:ident)+; $($idx:tt),+) => {
    impl<$First, $($P),+> Publisher for CombineLatest<($First, $($P),+)>
    where
      $First: Publisher,
      $First::Item: Clone + Send + 'static,
      $First::Err: Send + 'static,
      $(
        $P: Publisher<Err = $First::Err>,
        $P::Item: Clone + Send + 'static,
      )+
    {
      type Item = ($First::Item, $($P::Item),+);
      type Err = $First::Err;

      fn subscribe<S>(self, subscriber: S)
      where
        S: Subscriber<Self::Item, Self::Err> + Send + 'static,
      {
        let node = CombineLatestNode::<
          (Option<$First::Item>, $(Option<$P::Item>),+),
          $First::Err,
          S,
          $n,
        >::start(subscriber);
        $(self.sources.$idx.subscribe(node.adapter::<$idx>());)+
      }
    }
  };
}

impl_combine_latest!(2; A, B; 0, 1);
impl_combine_latest!(3; A, B, C; 0, 1, 2);
impl_combine_latest!(4; A, B, C, D; 0, 1, 2, 3);

#[cfg(test)]
mod tests {
  use std::{convert::Infallible, sync::Arc};

  use crate::prelude::*;

  #[test]
  fn latches_the_latest_value() {
    let a = PassthroughSubject::<i32, ()>::new();
    let b = PassthroughSubject::<i32, ()>::new();
    let tracker = TrackingSubscriber::new();
    combine_latest2(a.clone(), b.clone()).subscribe(tracker.clone());

    a.send(1);
    b.send(10);
    a.send(2);
    a.send(3);
    b.send(20);

    assert_eq!(tracker.values(), vec![(1, 10), (2, 10), (3, 10), (3, 20)]);
  }

  #[test]
  fn waits_for_every_source() {
    let a = PassthroughSubject::<i32, ()>::new();
    let b = PassthroughSubject::<i32, ()>::new();
    let tracker = TrackingSubscriber::new();
    combine_latest2(a.clone(), b.clone()).subscribe(tracker.clone());

    a.send(1);
    a.send(2);
    a.send(3);
    assert!(tracker.values().is_empty());

    b.send(7);
    assert_eq!(tracker.values(), vec![(3, 7)]);
  }

  #[test]
  fn synchronous_sources() {
    let tracker = TrackingSubscriber::new();
    from_iter(vec![1, 2]).combine_latest(from_iter(vec!['a', 'b'])).subscribe(tracker.clone());

    assert_eq!(
      tracker.history(),
      vec![
        Signal::Subscription,
        Signal::Value((2, 'a')),
        Signal::Value((2, 'b')),
        Signal::Completion(Completion::Finished)
      ]
    );
  }

  #[test]
  fn fails_fast() {
    let a = PassthroughSubject::<i32, &str>::new();
    let b = PassthroughSubject::<i32, &str>::new();
    let tracker = TrackingSubscriber::new();
    a.clone().combine_latest(b.clone()).subscribe(tracker.clone());

    a.send(1);
    b.send_completion(Completion::Failed("b broke"));
    a.send(2);
    a.send_completion(Completion::Finished);

    assert_eq!(
      tracker.history(),
      vec![Signal::Subscription, Signal::Completion(Completion::Failed("b broke"))]
    );
    assert_eq!(a.subscriber_count(), 0);
  }

  #[test]
  fn failure_cancels_running_sources() {
    let a = TestSubject::<i32, &str>::new();
    let b = TestSubject::<i32, &str>::new();
    let c = TestSubject::<i32, &str>::new();
    let tracker = TrackingSubscriber::new();
    combine_latest3(a.clone(), b.clone(), c.clone()).subscribe(tracker.clone());

    a.send_completion(Completion::Finished);
    c.send_completion(Completion::Failed("c broke"));

    assert_eq!(a.cancellations(), 0);
    assert_eq!(b.cancellations(), 1);
    assert_eq!(c.cancellations(), 0);
    assert_eq!(tracker.completion(), Some(Completion::Failed("c broke")));
  }

  #[test]
  fn never_finishing_source_keeps_it_open() {
    let tracker = TrackingSubscriber::<(i32, i32), Infallible>::new();
    combine_latest2(just(1), never::<i32, Infallible>()).subscribe(tracker.clone());

    assert_eq!(tracker.history(), vec![Signal::Subscription]);
  }

  #[test]
  fn failure_short_circuits_never_finishing_source() {
    let tracker = TrackingSubscriber::<(i32, i32), &str>::new();
    combine_latest2(never::<i32, &str>(), fail::<i32, _>("boom")).subscribe(tracker.clone());

    assert_eq!(tracker.completion(), Some(Completion::Failed("boom")));
  }

  #[test]
  fn three_sources() {
    let a = PassthroughSubject::<i32, ()>::new();
    let b = PassthroughSubject::<&str, ()>::new();
    let c = PassthroughSubject::<bool, ()>::new();
    let tracker = TrackingSubscriber::new();
    a.clone().combine_latest3(b.clone(), c.clone()).subscribe(tracker.clone());

    a.send(1);
    b.send("one");
    assert!(tracker.values().is_empty());
    c.send(true);
    a.send(2);
    c.send(false);

    assert_eq!(tracker.values(), vec![(1, "one", true), (2, "one", true), (2, "one", false)]);
  }

  #[test]
  fn four_sources_finish_together() {
    let a = PassthroughSubject::<u8, ()>::new();
    let b = PassthroughSubject::<u16, ()>::new();
    let c = PassthroughSubject::<u32, ()>::new();
    let d = PassthroughSubject::<String, ()>::new();
    let tracker = TrackingSubscriber::new();
    combine_latest4(a.clone(), b.clone(), c.clone(), d.clone()).subscribe(tracker.clone());

    a.send(1);
    b.send(2);
    c.send(3);
    d.send("four".to_string());
    a.send_completion(Completion::Finished);
    b.send_completion(Completion::Finished);
    c.send_completion(Completion::Finished);
    assert_eq!(tracker.completion(), None);

    d.send_completion(Completion::Finished);

    assert_eq!(tracker.values(), vec![(1, 2, 3, "four".to_string())]);
    assert_eq!(tracker.completion(), Some(Completion::Finished));
  }

  #[test]
  fn sources_get_unlimited_demand_on_subscribe() {
    let a = TestSubject::<i32, ()>::new();
    let b = TestSubject::<i32, ()>::new();
    let tracker = TrackingSubscriber::with_demand(Demand::max(1));
    combine_latest2(a.clone(), b.clone()).subscribe(tracker.clone());

    assert_eq!(a.requests(), vec![Demand::UNLIMITED]);
    assert_eq!(b.requests(), vec![Demand::UNLIMITED]);
  }

  #[test]
  fn downstream_demand_is_passed_through() {
    let a = TestSubject::<i32, ()>::new();
    let b = TestSubject::<i32, ()>::new();
    let tracker = TrackingSubscriber::with_demand(Demand::NONE);
    combine_latest2(a.clone(), b.clone()).subscribe(tracker.clone());

    tracker.request(Demand::max(5));

    assert_eq!(a.requests(), vec![Demand::UNLIMITED, Demand::max(5)]);
    assert_eq!(b.requests(), vec![Demand::UNLIMITED, Demand::max(5)]);
  }

  #[test]
  fn emissions_are_not_metered_by_downstream_demand() {
    let a = PassthroughSubject::<i32, ()>::new();
    let b = PassthroughSubject::<i32, ()>::new();
    let tracker = TrackingSubscriber::with_demand(Demand::max(1));
    combine_latest2(a.clone(), b.clone()).subscribe(tracker.clone());

    a.send(1);
    b.send(1);
    b.send(2);

    assert_eq!(tracker.values(), vec![(1, 1), (1, 2)]);
  }

  #[test]
  fn demand_returned_from_receive_is_forwarded() {
    let a = TestSubject::<i32, ()>::new();
    let b = TestSubject::<i32, ()>::new();
    let tracker = TrackingSubscriber::with_demand_per_item(Demand::UNLIMITED, Demand::max(1));
    combine_latest2(a.clone(), b.clone()).subscribe(tracker.clone());

    a.send(1);
    b.send(1);

    assert_eq!(a.requests(), vec![Demand::UNLIMITED, Demand::max(1)]);
  }

  #[test]
  fn cancel_reaches_every_source_once() {
    let a = TestSubject::<i32, ()>::new();
    let b = TestSubject::<i32, ()>::new();
    let tracker = TrackingSubscriber::new();
    combine_latest2(a.clone(), b.clone()).subscribe(tracker.clone());

    tracker.cancel();
    tracker.cancel();
    a.send(1);
    b.send(1);

    assert_eq!(a.cancellations(), 1);
    assert_eq!(b.cancellations(), 1);
    assert_eq!(tracker.history(), vec![Signal::Subscription]);
  }

  #[test]
  fn cancel_during_subscription() {
    struct CancelAtOnce;

    impl Subscriber<(i32, i32), ()> for CancelAtOnce {
      fn receive_subscription(&mut self, subscription: SubscriptionHandle) { subscription.cancel(); }

      fn receive(&mut self, _: (i32, i32)) -> Demand { panic!("no item expected") }

      fn receive_completion(&mut self, _: Completion<()>) { panic!("no completion expected") }
    }

    let a = TestSubject::<i32, ()>::new();
    let b = TestSubject::<i32, ()>::new();
    combine_latest2(a.clone(), b.clone()).subscribe(CancelAtOnce);
    a.send(1);
    b.send(1);

    assert_eq!(a.cancellations(), 1);
    assert_eq!(b.cancellations(), 1);
  }

  #[test]
  fn cancel_from_inside_receive() {
    struct CancelOnSecond {
      subscription: Option<SubscriptionHandle>,
      seen: Arc<parking_lot::Mutex<Vec<(i32, i32)>>>,
    }

    impl Subscriber<(i32, i32), ()> for CancelOnSecond {
      fn receive_subscription(&mut self, subscription: SubscriptionHandle) {
        self.subscription = Some(subscription);
      }

      fn receive(&mut self, item: (i32, i32)) -> Demand {
        let mut seen = self.seen.lock();
        seen.push(item);
        if seen.len() == 2 {
          if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
          }
        }
        Demand::NONE
      }

      fn receive_completion(&mut self, _: Completion<()>) {}
    }

    let a = PassthroughSubject::<i32, ()>::new();
    let b = PassthroughSubject::<i32, ()>::new();
    let seen = Arc::new(parking_lot::Mutex::new(vec![]));
    combine_latest2(a.clone(), b.clone())
      .subscribe(CancelOnSecond { subscription: None, seen: seen.clone() });

    a.send(1);
    b.send(1);
    b.send(2);
    b.send(3);

    assert_eq!(*seen.lock(), vec![(1, 1), (1, 2)]);
    assert_eq!(a.subscriber_count(), 0);
    assert_eq!(b.subscriber_count(), 0);
  }

  #[test]
  fn downstream_is_released_after_completion() {
    let a = PassthroughSubject::<i32, ()>::new();
    let b = PassthroughSubject::<i32, ()>::new();
    let witness = Arc::new(());
    let held = witness.clone();
    let _token = combine_latest2(a.clone(), b.clone()).sink(
      move |_| {
        let _ = &held;
      },
      |_| {},
    );
    assert_eq!(Arc::strong_count(&witness), 2);

    a.send_completion(Completion::Finished);
    b.send_completion(Completion::Finished);
    assert_eq!(Arc::strong_count(&witness), 1);
  }

  #[test]
  fn send_from_inside_receive() {
    struct Feedback {
      b: PassthroughSubject<i32, ()>,
      seen: Arc<parking_lot::Mutex<Vec<(i32, i32)>>>,
    }

    impl Subscriber<(i32, i32), ()> for Feedback {
      fn receive_subscription(&mut self, _: SubscriptionHandle) {}

      fn receive(&mut self, item: (i32, i32)) -> Demand {
        self.seen.lock().push(item);
        if item.1 == 1 {
          self.b.send(2);
        }
        Demand::NONE
      }

      fn receive_completion(&mut self, _: Completion<()>) {}
    }

    let a = PassthroughSubject::<i32, ()>::new();
    let b = PassthroughSubject::<i32, ()>::new();
    let seen = Arc::new(parking_lot::Mutex::new(vec![]));
    combine_latest2(a.clone(), b.clone()).subscribe(Feedback { b: b.clone(), seen: seen.clone() });

    a.send(10);
    b.send(1);
    a.send(20);

    assert_eq!(*seen.lock(), vec![(10, 1), (10, 2), (20, 2)]);
    assert_eq!(b.subscriber_count(), 1);
  }

  #[test]
  fn completion_from_inside_receive() {
    struct FailOnFirst {
      a: TestSubject<i32, &'static str>,
      b: TestSubject<i32, &'static str>,
      tracker: TrackingSubscriber<(i32, i32), &'static str>,
    }

    impl Subscriber<(i32, i32), &'static str> for FailOnFirst {
      fn receive_subscription(&mut self, subscription: SubscriptionHandle) {
        self.tracker.receive_subscription(subscription)
      }

      fn receive(&mut self, item: (i32, i32)) -> Demand {
        let more = self.tracker.receive(item);
        if item.1 == 1 {
          self.a.send_completion(Completion::Failed("stop"));
          self.b.send(2);
        }
        more
      }

      fn receive_completion(&mut self, completion: Completion<&'static str>) {
        self.tracker.receive_completion(completion)
      }
    }

    let a = TestSubject::<i32, &str>::new();
    let b = TestSubject::<i32, &str>::new();
    let tracker = TrackingSubscriber::new();
    combine_latest2(a.clone(), b.clone()).subscribe(FailOnFirst {
      a: a.clone(),
      b: b.clone(),
      tracker: tracker.clone(),
    });

    a.send(10);
    b.send(1);

    assert_eq!(
      tracker.history(),
      vec![
        Signal::Subscription,
        Signal::Value((10, 1)),
        Signal::Completion(Completion::Failed("stop"))
      ]
    );
    assert_eq!(a.cancellations(), 0);
    assert_eq!(b.cancellations(), 1);
  }

  #[test]
  fn cancel_from_inside_receive_completion() {
    struct CancelOnCompletion {
      subscription: Option<SubscriptionHandle>,
      tracker: TrackingSubscriber<(i32, i32), &'static str>,
    }

    impl Subscriber<(i32, i32), &'static str> for CancelOnCompletion {
      fn receive_subscription(&mut self, subscription: SubscriptionHandle) {
        self.subscription = Some(subscription.clone());
        self.tracker.receive_subscription(subscription)
      }

      fn receive(&mut self, item: (i32, i32)) -> Demand { self.tracker.receive(item) }

      fn receive_completion(&mut self, completion: Completion<&'static str>) {
        self.tracker.receive_completion(completion);
        if let Some(subscription) = self.subscription.take() {
          subscription.cancel();
        }
      }
    }

    let a = TestSubject::<i32, &str>::new();
    let b = TestSubject::<i32, &str>::new();
    let tracker = TrackingSubscriber::new();
    combine_latest2(a.clone(), b.clone())
      .subscribe(CancelOnCompletion { subscription: None, tracker: tracker.clone() });

    a.send(1);
    b.send(2);
    b.send_completion(Completion::Failed("b"));
    a.send(3);
    a.send_completion(Completion::Finished);

    assert_eq!(
      tracker.history(),
      vec![
        Signal::Subscription,
        Signal::Value((1, 2)),
        Signal::Completion(Completion::Failed("b"))
      ]
    );
    assert_eq!(a.cancellations(), 1);
    assert_eq!(b.cancellations(), 0);
    assert_eq!(a.subscriber_count(), 0);
  }
}
