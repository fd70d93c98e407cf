//! Change Events
//!
//! Synchronous publish/subscribe table keyed by event kind. Delivery happens
//! in the mutator's context, in subscription order. A failing or panicking
//! observer is logged and skipped; it never aborts the mutation.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use serde_json::{Map, Value};

/// Outcome of a single observer callback
pub type ListenerResult = Result<(), Box<dyn std::error::Error>>;

/// Structural tree changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreeEvent {
    ItemAdded,
    ItemRemoved,
    ItemModified,
    ItemMoved,
    TreeReset,
}

/// Transient UI-state changes published by the view-model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewEvent {
    ItemSelected,
    ItemDeselected,
    ItemExpanded,
    ItemCollapsed,
}

/// Description of a change
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<Map<String, Value>>,
}

impl EventPayload {
    pub fn for_item(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent_id: Option<&str>) -> Self {
        self.parent_id = parent_id.map(str::to_string);
        self
    }

    pub fn with_old_parent(mut self, old_parent_id: Option<&str>) -> Self {
        self.old_parent_id = old_parent_id.map(str::to_string);
        self
    }

    pub fn with_index(mut self, index: Option<usize>) -> Self {
        self.index = index;
        self
    }

    pub fn with_delta(mut self, delta: Map<String, Value>) -> Self {
        self.delta = Some(delta);
        self
    }
}

/// Receiver of published events
///
/// Closures `FnMut(E, &P) -> ListenerResult` implement it automatically.
pub trait TreeObserver<E, P> {
    fn on_event(&mut self, event: E, payload: &P) -> ListenerResult;
}

impl<E, P, F> TreeObserver<E, P> for F
where
    F: FnMut(E, &P) -> ListenerResult,
{
    fn on_event(&mut self, event: E, payload: &P) -> ListenerResult {
        self(event, payload)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Subscription<E, P> {
    id: SubscriptionId,
    event: E,
    observer: Box<dyn TreeObserver<E, P>>,
}

pub struct EventBus<E, P> {
    subscriptions: Vec<Subscription<E, P>>,
    next_id: u64,
}

impl<E, P> Default for EventBus<E, P> {
    fn default() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E, P> fmt::Debug for EventBus<E, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl<E, P> EventBus<E, P>
where
    E: Copy + PartialEq + fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        event: E,
        observer: impl TreeObserver<E, P> + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            event,
            observer: Box::new(observer),
        });
        id
    }

    /// Returns `false` if no such subscription exists for `event`
    pub fn unsubscribe(&mut self, event: E, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions
            .retain(|sub| !(sub.id == id && sub.event == event));
        before != self.subscriptions.len()
    }

    pub fn subscriber_count(&self, event: E) -> usize {
        self.subscriptions
            .iter()
            .filter(|sub| sub.event == event)
            .count()
    }

    pub fn publish(&mut self, event: E, payload: &P) {
        for sub in self.subscriptions.iter_mut().filter(|sub| sub.event == event) {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                sub.observer.on_event(event, payload)
            }));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    log::warn!("Observer {:?} failed on {:?}: {}", sub.id, event, e);
                }
                Err(_) => {
                    log::error!("Observer {:?} panicked on {:?}", sub.id, event);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn recorder(log: &Log, tag: &'static str) -> impl FnMut(TreeEvent, &EventPayload) -> ListenerResult {
        let log = Rc::clone(log);
        move |event, payload| {
            log.borrow_mut()
                .push(format!("{tag}:{event:?}:{}", payload.id.as_deref().unwrap_or("-")));
            Ok(())
        }
    }

    #[test]
    fn test_delivery_in_subscription_order() {
        let log: Log = Rc::default();
        let mut bus: EventBus<TreeEvent, EventPayload> = EventBus::new();
        bus.subscribe(TreeEvent::ItemAdded, recorder(&log, "first"));
        bus.subscribe(TreeEvent::ItemAdded, recorder(&log, "second"));
        bus.subscribe(TreeEvent::ItemRemoved, recorder(&log, "other"));

        bus.publish(TreeEvent::ItemAdded, &EventPayload::for_item("a"));

        assert_eq!(
            *log.borrow(),
            vec!["first:ItemAdded:a".to_string(), "second:ItemAdded:a".to_string()]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let log: Log = Rc::default();
        let mut bus: EventBus<TreeEvent, EventPayload> = EventBus::new();
        let id = bus.subscribe(TreeEvent::ItemMoved, recorder(&log, "x"));
        assert_eq!(bus.subscriber_count(TreeEvent::ItemMoved), 1);

        assert!(!bus.unsubscribe(TreeEvent::ItemAdded, id));
        assert!(bus.unsubscribe(TreeEvent::ItemMoved, id));
        assert!(!bus.unsubscribe(TreeEvent::ItemMoved, id));

        bus.publish(TreeEvent::ItemMoved, &EventPayload::default());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_failing_observer_does_not_stop_delivery() {
        let log: Log = Rc::default();
        let mut bus: EventBus<TreeEvent, EventPayload> = EventBus::new();
        bus.subscribe(TreeEvent::TreeReset, |_: TreeEvent, _: &EventPayload| -> ListenerResult {
            Err("boom".into())
        });
        bus.subscribe(TreeEvent::TreeReset, |_: TreeEvent, _: &EventPayload| -> ListenerResult {
            panic!("observer bug")
        });
        bus.subscribe(TreeEvent::TreeReset, recorder(&log, "after"));

        bus.publish(TreeEvent::TreeReset, &EventPayload::default());

        assert_eq!(*log.borrow(), vec!["after:TreeReset:-".to_string()]);
    }

    #[test]
    fn test_payload_serialization_skips_empty_fields() {
        let payload = EventPayload::for_item("b")
            .with_parent(Some("a"))
            .with_old_parent(None);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"id": "b", "parent_id": "a"}));
    }
}
