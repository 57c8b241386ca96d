//! Replay-latest subjects and cached derived views.
//!
//! A [`Subject`] holds one value and broadcasts every change to its
//! subscribers through a `tokio::sync::watch` channel. New subscribers see the
//! current value first, then each later value (intermediate values may be
//! coalesced if a subscriber falls behind).
//!
//! Derived views are subjects too. [`Subject::map`] and [`combine`] register
//! a recompute step on their sources; the step runs once per source change,
//! synchronously inside `publish`/`modify`, and its result is published to the
//! derived subject only if it differs from the previous result. Every
//! subscriber of a derived view therefore sees the same cached value, and when
//! a mutation returns, all of its derived views are already up to date.
//!
//! Sources hold their derivations weakly: once the last handle to a derived
//! subject is dropped, the source stops recomputing it, and the entry is
//! pruned on the source's next change or next derivation.

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Recompute step registered on a source. Returns `false` once its target is gone.
type Recompute<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// A derived subject registered on a source, held weakly.
struct Dependent<T> {
    target: Weak<dyn Any + Send + Sync>,
    recompute: Recompute<T>,
}

impl<T> Dependent<T> {
    fn is_live(&self) -> bool {
        self.target.strong_count() > 0
    }
}

/// Bound shared by every value that can live in a subject.
pub trait Value: Clone + PartialEq + Send + Sync + 'static {}

impl<T> Value for T where T: Clone + PartialEq + Send + Sync + 'static {}

struct Inner<T> {
    tx: watch::Sender<T>,
    dependents: Mutex<Vec<Dependent<T>>>,
}

/// A writable, replay-latest value with change notification.
///
/// `Clone` is cheap: clones share the same value and subscribers.
pub struct Subject<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("value", &*self.inner.tx.borrow())
            .field("subscribers", &self.inner.tx.receiver_count())
            .finish()
    }
}

impl<T: Value> Subject<T> {
    /// Create a subject holding `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner {
                tx,
                dependents: Mutex::new(Vec::new()),
            }),
        }
    }

    /// A clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.tx.borrow().clone()
    }

    /// Run `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.tx.borrow())
    }

    /// Replace the value. Publishing a value equal to the current one is a no-op.
    ///
    /// Returns whether subscribers were notified.
    pub fn publish(&self, value: T) -> bool {
        self.modify(move |current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }

    /// Atomically read-modify-write the value.
    ///
    /// `f` returns whether it changed anything; subscribers and derived views
    /// are only notified when it did.
    pub fn modify(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        let changed = self.inner.tx.send_if_modified(f);
        if changed {
            self.notify_dependents();
        }
        changed
    }

    /// Subscribe with replay-latest semantics.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            rx: self.inner.tx.subscribe(),
            primed: false,
        }
    }

    /// A read-only view of this subject.
    #[must_use]
    pub fn observe(&self) -> Observable<T> {
        Observable {
            subject: self.clone(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.tx.receiver_count()
    }

    /// Derive a cached view that is recomputed once per change of `self`.
    #[must_use]
    pub fn map<U, F>(&self, f: F) -> Subject<U>
    where
        U: Value,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        // Holding the lock while seeding keeps a concurrent change from
        // slipping in between the initial computation and registration.
        let mut dependents = self.lock_dependents();
        let derived = Subject::new(self.with(&f));
        let target = Arc::downgrade(&derived.inner);
        attach(
            &mut dependents,
            derived.downgrade(),
            Box::new(move |value: &T| publish_weak(&target, || f(value))),
        );
        derived
    }

    fn register<U: Value>(&self, derived: &Subject<U>, recompute: Recompute<T>) {
        attach(&mut self.lock_dependents(), derived.downgrade(), recompute);
    }

    fn downgrade(&self) -> Weak<Inner<T>> {
        Arc::downgrade(&self.inner)
    }

    fn notify_dependents(&self) {
        let mut dependents = self.lock_dependents();
        // Read under the lock so the last notifier always propagates the latest value.
        let current = self.get();
        dependents.retain(|dependent| dependent.is_live() && (dependent.recompute)(&current));
    }

    fn lock_dependents(&self) -> MutexGuard<'_, Vec<Dependent<T>>> {
        self.inner
            .dependents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Register a derivation, dropping entries whose derived subject is gone.
fn attach<T, U: Value>(
    dependents: &mut Vec<Dependent<T>>,
    target: Weak<Inner<U>>,
    recompute: Recompute<T>,
) {
    dependents.retain(Dependent::is_live);
    dependents.push(Dependent { target, recompute });
}

/// Publish into a weakly held subject. Returns `false` if it no longer exists.
fn publish_weak<U: Value>(target: &Weak<Inner<U>>, compute: impl FnOnce() -> U) -> bool {
    target.upgrade().is_some_and(|inner| {
        Subject { inner }.publish(compute());
        true
    })
}

/// Derive a cached view from two sources (combine-latest).
///
/// The view is recomputed whenever either source changes, using the other
/// source's current value.
#[must_use]
pub fn combine<A, B, U, F>(a: &Subject<A>, b: &Subject<B>, f: F) -> Subject<U>
where
    A: Value,
    B: Value,
    U: Value,
    F: Fn(&A, &B) -> U + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let derived = Subject::new(a.with(|a| b.with(|b| f(a, b))));

    {
        let target = Arc::downgrade(&derived.inner);
        let other = b.downgrade();
        let f = Arc::clone(&f);
        a.register(
            &derived,
            Box::new(move |a_value: &A| {
                let Some(b_inner) = other.upgrade() else {
                    return false;
                };
                let b_value = b_inner.tx.borrow().clone();
                publish_weak(&target, || f(a_value, &b_value))
            }),
        );
    }
    {
        let target = Arc::downgrade(&derived.inner);
        let other = a.downgrade();
        let f = Arc::clone(&f);
        b.register(
            &derived,
            Box::new(move |b_value: &B| {
                let Some(a_inner) = other.upgrade() else {
                    return false;
                };
                let a_value = a_inner.tx.borrow().clone();
                publish_weak(&target, || f(&a_value, b_value))
            }),
        );
    }

    // Catch any change that landed between seeding and registration.
    derived.publish(a.with(|a| b.with(|b| f(a, b))));
    derived
}

/// A read-only handle to a subject.
///
/// Stores hand these out so consumers can read, subscribe, and derive, but
/// never publish.
pub struct Observable<T> {
    subject: Subject<T>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Observable").field(&self.subject).finish()
    }
}

impl<T: Value> Observable<T> {
    /// A clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.subject.get()
    }

    /// Run `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.subject.with(f)
    }

    /// Subscribe with replay-latest semantics.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<T> {
        self.subject.subscribe()
    }

    /// Derive a cached view, see [`Subject::map`].
    #[must_use]
    pub fn map<U, F>(&self, f: F) -> Observable<U>
    where
        U: Value,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        self.subject.map(f).observe()
    }

    /// Combine with another observable, see [`combine`].
    #[must_use]
    pub fn combine<B, U, F>(&self, other: &Observable<B>, f: F) -> Observable<U>
    where
        B: Value,
        U: Value,
        F: Fn(&T, &B) -> U + Send + Sync + 'static,
    {
        combine(&self.subject, &other.subject, f).observe()
    }
}

/// A live subscription to a subject. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
    primed: bool,
}

impl<T: Value> Subscription<T> {
    /// Wait for the next value.
    ///
    /// The first call resolves immediately with the current value. Later
    /// calls resolve with the latest value after a change. Returns `None` once
    /// the subject has been dropped.
    pub async fn next(&mut self) -> Option<T> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Whether a value is waiting that `next` has not returned yet.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.primed || self.rx.has_changed().unwrap_or(false)
    }

    /// Convert into a `Stream` of values.
    ///
    /// The stream starts with the current value unless `next` already
    /// returned it.
    #[must_use]
    pub fn into_stream(self) -> WatchStream<T> {
        if self.primed {
            WatchStream::from_changes(self.rx)
        } else {
            WatchStream::new(self.rx)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio_stream::StreamExt;

    use super::*;

    #[tokio::test]
    async fn test_new_subscriber_gets_current_value() {
        let subject = Subject::new(1);
        subject.publish(2);

        let mut sub = subject.subscribe();
        assert_eq!(sub.next().await, Some(2));
    }

    #[tokio::test]
    async fn test_subscriber_sees_changes() {
        let subject = Subject::new(String::from("a"));
        let mut sub = subject.subscribe();
        assert_eq!(sub.next().await.as_deref(), Some("a"));

        subject.publish(String::from("b"));
        assert_eq!(sub.next().await.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_next_returns_none_after_subject_dropped() {
        let subject = Subject::new(0u8);
        let mut sub = subject.subscribe();
        assert_eq!(sub.next().await, Some(0));

        drop(subject);
        assert_eq!(sub.next().await, None);
    }

    #[test]
    fn test_publish_is_distinct_until_changed() {
        let subject = Subject::new(5);
        let mut sub = subject.subscribe();
        assert!(sub.has_pending());
        sub.primed = true;

        assert!(!subject.publish(5));
        assert!(!sub.has_pending());
        assert!(subject.publish(6));
        assert!(sub.has_pending());
    }

    #[test]
    fn test_modify_reports_change() {
        let subject = Subject::new(vec![1, 2]);
        assert!(!subject.modify(|_| false));
        assert!(subject.modify(|v| {
            v.push(3);
            true
        }));
        assert_eq!(subject.get(), vec![1, 2, 3]);
    }

    #[test]
    fn test_map_recomputes_synchronously() {
        let source = Subject::new(vec![1, 2, 3]);
        let sum = source.map(|v: &Vec<i32>| v.iter().sum::<i32>());
        assert_eq!(sum.get(), 6);

        source.modify(|v| {
            v.push(4);
            true
        });
        assert_eq!(sum.get(), 10);
    }

    #[test]
    fn test_map_computes_once_per_change() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Subject::new(1);
        let counted = Arc::clone(&calls);
        let doubled = source.map(move |v: &i32| {
            counted.fetch_add(1, Ordering::SeqCst);
            v * 2
        });

        let _subs: Vec<_> = (0..5).map(|_| doubled.subscribe()).collect();
        source.publish(2);
        source.publish(2);

        // Seed + one real change; subscribers and the duplicate publish add nothing.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(doubled.get(), 4);
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_same_derived_value() {
        let source = Subject::new(3);
        let squared = source.map(|v: &i32| v * v);
        let mut early = squared.subscribe();
        assert_eq!(early.next().await, Some(9));

        source.publish(4);
        let mut late = squared.subscribe();
        assert_eq!(early.next().await, Some(16));
        assert_eq!(late.next().await, Some(16));
    }

    #[test]
    fn test_map_chains() {
        let source = Subject::new(2);
        let plus_one = source.map(|v: &i32| v + 1);
        let times_ten = plus_one.map(|v: &i32| v * 10);

        source.publish(5);
        assert_eq!(times_ten.get(), 60);
    }

    #[test]
    fn test_dropped_derivation_is_detached() {
        let source = Subject::new(1);
        let derived = source.map(|v: &i32| v + 1);
        assert_eq!(source.lock_dependents().len(), 1);

        drop(derived);
        source.publish(2);
        assert!(source.lock_dependents().is_empty());
    }

    #[test]
    fn test_dropped_derivations_are_pruned_without_a_publish() {
        let source = Subject::new(1);
        for _ in 0..1000 {
            drop(source.map(|v: &i32| v + 1));
        }
        assert!(source.lock_dependents().len() <= 1);

        let kept = source.map(|v: &i32| v * 2);
        assert_eq!(source.lock_dependents().len(), 1);
        source.publish(4);
        assert_eq!(kept.get(), 8);
    }

    #[test]
    fn test_dropped_combinations_are_pruned() {
        let left = Subject::new(1);
        let right = Subject::new(2);
        for _ in 0..100 {
            drop(combine(&left, &right, |a: &i32, b: &i32| a + b));
        }
        assert!(left.lock_dependents().len() <= 1);
        assert!(right.lock_dependents().len() <= 1);
    }

    #[test]
    fn test_combine_tracks_both_sources() {
        let items = Subject::new(vec![1, 5, 10, 20]);
        let max = Subject::new(8);
        let filtered = combine(&items, &max, |items: &Vec<i32>, max: &i32| {
            items.iter().copied().filter(|v| v <= max).collect::<Vec<_>>()
        });
        assert_eq!(filtered.get(), vec![1, 5]);

        max.publish(15);
        assert_eq!(filtered.get(), vec![1, 5, 10]);

        items.publish(vec![2, 30]);
        assert_eq!(filtered.get(), vec![2]);
    }

    #[test]
    fn test_observable_is_read_only_view() {
        let subject = Subject::new(1);
        let observable = subject.observe();
        let label = observable.map(|v: &i32| format!("#{v}"));

        subject.publish(7);
        assert_eq!(observable.get(), 7);
        assert_eq!(label.get(), "#7");
    }

    #[tokio::test]
    async fn test_into_stream_replays_current_value() {
        let subject = Subject::new(1);
        let mut stream = subject.subscribe().into_stream();
        assert_eq!(stream.next().await, Some(1));

        subject.publish(2);
        assert_eq!(stream.next().await, Some(2));
    }

    #[tokio::test]
    async fn test_dropping_subscription_unsubscribes() {
        let subject = Subject::new(1);
        let sub = subject.subscribe();
        assert_eq!(subject.subscriber_count(), 1);
        drop(sub);
        assert_eq!(subject.subscriber_count(), 0);
        assert!(subject.publish(2));
    }
}
