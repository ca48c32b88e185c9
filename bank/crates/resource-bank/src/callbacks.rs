//! Balance change notifications.
//!
//! Each bank owns three channels: `collected` (credits), `spent` (debits)
//! and `amount_changed` (both, fired right after the specific one). Delivery
//! is synchronous: every listener registered when an event fires is called
//! exactly once before the bank operation returns.
//!
//! Channels are cheap shared handles. A listener may keep a clone of a
//! channel and unsubscribe itself, or anyone else, while it is being called;
//! the current delivery still reaches every listener that was registered
//! when it started.
//!
//! Listener panics are not caught. A panicking listener unwinds through the
//! bank call and the remaining listeners of that event are skipped.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// One applied balance change, as seen by listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceChange<'a, T> {
    pub resource: T,
    /// Positive for credits. On the `spent` channel this is the magnitude
    /// removed; on `amount_changed` a debit is reported negative.
    pub amount: i64,
    /// Balance after the change.
    pub balance: i64,
    pub source: &'a str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Rc<RefCell<dyn for<'a> FnMut(&ResourceChange<'a, T>)>>;

struct ChannelInner<T> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
}

/// A multicast list of listeners for one kind of event.
pub struct EventChannel<T> {
    inner: Rc<RefCell<ChannelInner<T>>>,
}

impl<T> Clone for EventChannel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for EventChannel<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ChannelInner {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }
}

impl<T> fmt::Debug for EventChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("listeners", &self.len())
            .finish()
    }
}

impl<T> EventChannel<T> {
    pub fn len(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Copy + 'static> EventChannel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: for<'a> FnMut(&ResourceChange<'a, T>) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        let listener: Listener<T> = Rc::new(RefCell::new(listener));
        inner.listeners.push((id, listener));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(existing, _)| *existing != id);
        inner.listeners.len() != before
    }

    pub(crate) fn emit(&self, change: &ResourceChange<'_, T>) {
        // Snapshot first so listeners may (un)subscribe while we iterate.
        let listeners: Vec<Listener<T>> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            (&mut *listener.borrow_mut())(change);
        }
    }
}

/// The three channels a bank fires into.
pub struct ResourceBankCallbacks<T> {
    amount_changed: EventChannel<T>,
    collected: EventChannel<T>,
    spent: EventChannel<T>,
}

impl<T> Default for ResourceBankCallbacks<T> {
    fn default() -> Self {
        Self {
            amount_changed: EventChannel::default(),
            collected: EventChannel::default(),
            spent: EventChannel::default(),
        }
    }
}

impl<T> fmt::Debug for ResourceBankCallbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceBankCallbacks")
            .field("amount_changed", &self.amount_changed)
            .field("collected", &self.collected)
            .field("spent", &self.spent)
            .finish()
    }
}

impl<T: Copy + fmt::Debug + 'static> ResourceBankCallbacks<T> {
    /// Fired after every successful credit or debit. Debits are reported
    /// with a negative amount.
    pub fn amount_changed(&self) -> &EventChannel<T> {
        &self.amount_changed
    }

    /// Fired only when a balance increases.
    pub fn collected(&self) -> &EventChannel<T> {
        &self.collected
    }

    /// Fired only when a balance decreases. The amount is the positive
    /// magnitude removed.
    pub fn spent(&self) -> &EventChannel<T> {
        &self.spent
    }

    pub(crate) fn invoke_collected(&self, resource: T, amount: i64, balance: i64, source: &str) {
        tracing::trace!(?resource, amount, balance, source, "resource collected");
        let change = ResourceChange {
            resource,
            amount,
            balance,
            source,
        };
        self.collected.emit(&change);
        self.amount_changed.emit(&change);
    }

    pub(crate) fn invoke_spent(&self, resource: T, amount: i64, balance: i64, source: &str) {
        tracing::trace!(?resource, amount, balance, source, "resource spent");
        let spent = ResourceChange {
            resource,
            amount,
            balance,
            source,
        };
        self.spent.emit(&spent);
        self.amount_changed.emit(&ResourceChange {
            amount: -amount,
            ..spent
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    type Log = Rc<RefCell<Vec<(&'static str, i64)>>>;

    fn record(log: &Log, tag: &'static str) -> impl FnMut(&ResourceChange<'_, u8>) + 'static {
        let log = Rc::clone(log);
        move |change| log.borrow_mut().push((tag, change.amount))
    }

    #[test]
    fn spent_fires_before_negative_amount_changed() {
        let callbacks = ResourceBankCallbacks::<u8>::default();
        let log: Log = Rc::default();
        callbacks.amount_changed().subscribe(record(&log, "changed"));
        callbacks.spent().subscribe(record(&log, "spent"));
        callbacks.collected().subscribe(record(&log, "collected"));

        callbacks.invoke_spent(0, 40, 60, "shop");
        callbacks.invoke_collected(0, 5, 65, "chest");

        assert_eq!(
            *log.borrow(),
            vec![
                ("spent", 40),
                ("changed", -40),
                ("collected", 5),
                ("changed", 5)
            ]
        );
    }

    #[test]
    fn unsubscribe_reports_whether_anything_was_removed() {
        let channel = EventChannel::<u8>::new();
        let id = channel.subscribe(|_| {});
        assert_eq!(channel.len(), 1);
        assert!(channel.unsubscribe(id));
        assert!(!channel.unsubscribe(id));
        assert!(channel.is_empty());
    }

    #[test]
    fn debug_shows_listener_count_for_any_payload() {
        let channel = EventChannel::<u8>::new();
        channel.subscribe(|_| {});
        assert_eq!(format!("{channel:?}"), "EventChannel { listeners: 1 }");

        let strings = EventChannel::<String>::default();
        assert_eq!(strings.len(), 0);
        assert!(format!("{strings:?}").contains("listeners: 0"));
    }

    #[test]
    fn listener_can_unsubscribe_itself_and_others_mid_delivery() {
        let channel = EventChannel::<u8>::new();
        let calls = Rc::new(Cell::new(0));
        let own_id: Rc<Cell<Option<SubscriptionId>>> = Rc::default();
        let other_id: Rc<Cell<Option<SubscriptionId>>> = Rc::default();

        let first = {
            let handle = channel.clone();
            let calls = Rc::clone(&calls);
            let own_id = Rc::clone(&own_id);
            let other_id = Rc::clone(&other_id);
            channel.subscribe(move |_| {
                calls.set(calls.get() + 1);
                if let Some(id) = own_id.get() {
                    handle.unsubscribe(id);
                }
                if let Some(id) = other_id.get() {
                    handle.unsubscribe(id);
                }
            })
        };
        own_id.set(Some(first));

        let second = {
            let calls = Rc::clone(&calls);
            channel.subscribe(move |_| calls.set(calls.get() + 1))
        };
        other_id.set(Some(second));

        let change = ResourceChange {
            resource: 1u8,
            amount: 1,
            balance: 1,
            source: "test",
        };
        channel.emit(&change);
        // Both were registered when delivery began.
        assert_eq!(calls.get(), 2);
        assert!(channel.is_empty());

        channel.emit(&change);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn listener_added_during_delivery_waits_for_next_event() {
        let channel = EventChannel::<u8>::new();
        let late_calls = Rc::new(Cell::new(0));
        {
            let handle = channel.clone();
            let late_calls = Rc::clone(&late_calls);
            let mut added = false;
            channel.subscribe(move |_| {
                if !added {
                    added = true;
                    let late_calls = Rc::clone(&late_calls);
                    handle.subscribe(move |_| late_calls.set(late_calls.get() + 1));
                }
            });
        }
        let change = ResourceChange {
            resource: 0u8,
            amount: 3,
            balance: 3,
            source: "",
        };
        channel.emit(&change);
        assert_eq!(late_calls.get(), 0);
        channel.emit(&change);
        assert_eq!(late_calls.get(), 1);
    }
}
