//! # Event Emitter
//!
//! Subscribe/emit capability over a closed set of event names.
//!
//! An [`Event`] is a payload that knows its own name. Listeners subscribe by
//! name and receive the full payload:
//!
//! ```rust
//! use applepay_core::{ApplePayEvent, Emitter, EventEmitter, SessionEvent};
//! use std::sync::Arc;
//!
//! let emitter = EventEmitter::<SessionEvent>::new();
//! emitter.on(ApplePayEvent::Ready, Arc::new(|_event: &SessionEvent| println!("ready")));
//! assert_eq!(emitter.emit(SessionEvent::Ready), 1);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// A payload that can be emitted, keyed by a closed name type
pub trait Event: Clone + Send + Sync + 'static {
    type Name: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    fn name(&self) -> Self::Name;
}

/// Callback invoked with each matching event
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Handle returned by `on`/`once`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Subscribe/emit capability
pub trait Emitter<E: Event> {
    /// Call `listener` for every event named `name`
    fn on(&self, name: E::Name, listener: Listener<E>) -> ListenerId;

    /// Call `listener` for the next event named `name` only
    fn once(&self, name: E::Name, listener: Listener<E>) -> ListenerId;

    /// Remove a listener. Returns false if it was not registered.
    fn off(&self, name: E::Name, id: ListenerId) -> bool;

    /// Deliver an event to its listeners. Returns how many were called.
    fn emit(&self, event: E) -> usize;

    /// Number of listeners registered for `name`
    fn listener_count(&self, name: E::Name) -> usize;
}

struct Registration<E> {
    id: ListenerId,
    once: bool,
    listener: Listener<E>,
}

/// In-process emitter.
///
/// Listeners run in registration order on the emitting thread, after the
/// internal lock is released, so they may subscribe, unsubscribe or emit.
pub struct EventEmitter<E: Event> {
    listeners: Mutex<HashMap<E::Name, Vec<Registration<E>>>>,
    next_id: AtomicU64,
}

impl<E: Event> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<E::Name, Vec<Registration<E>>>> {
        // Listeners never run while this lock is held.
        self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn register(&self, name: E::Name, listener: Listener<E>, once: bool) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().entry(name).or_default().push(Registration {
            id,
            once,
            listener,
        });
        id
    }

    /// Listeners that an event named `name` would reach now, dropping
    /// `once` registrations as if the event had been emitted.
    ///
    /// Lets a caller fix the audience of an event while it holds its own
    /// lock, then call the listeners after releasing it.
    pub fn take_audience(&self, name: E::Name) -> Vec<Listener<E>> {
        let mut listeners = self.lock();
        match listeners.get_mut(&name) {
            Some(regs) => {
                let audience = regs.iter().map(|reg| reg.listener.clone()).collect();
                regs.retain(|reg| !reg.once);
                audience
            }
            None => Vec::new(),
        }
    }

    /// Remove every listener for every name
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<E: Event> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<E::Name, usize> =
            self.lock().iter().map(|(name, regs)| (*name, regs.len())).collect();
        f.debug_struct("EventEmitter").field("listeners", &counts).finish()
    }
}

impl<E: Event> Emitter<E> for EventEmitter<E> {
    fn on(&self, name: E::Name, listener: Listener<E>) -> ListenerId {
        self.register(name, listener, false)
    }

    fn once(&self, name: E::Name, listener: Listener<E>) -> ListenerId {
        self.register(name, listener, true)
    }

    fn off(&self, name: E::Name, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let Some(regs) = listeners.get_mut(&name) else {
            return false;
        };
        let before = regs.len();
        regs.retain(|reg| reg.id != id);
        before != regs.len()
    }

    fn emit(&self, event: E) -> usize {
        let to_call = self.take_audience(event.name());
        for listener in &to_call {
            listener(&event);
        }
        to_call.len()
    }

    fn listener_count(&self, name: E::Name) -> usize {
        self.lock().get(&name).map(Vec::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApplePayError;
    use crate::event::{ApplePayEvent, SessionEvent};
    use std::sync::atomic::AtomicUsize;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Listener<SessionEvent>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let make = {
            let log = log.clone();
            move |tag: &str| -> Listener<SessionEvent> {
                let log = log.clone();
                let tag = tag.to_string();
                Arc::new(move |event: &SessionEvent| {
                    log.lock().unwrap().push(format!("{}:{}", tag, event.name()));
                })
            }
        };
        (log, make)
    }

    #[test]
    fn test_listeners_called_in_order() {
        let emitter = EventEmitter::<SessionEvent>::new();
        let (log, make) = recorder();
        emitter.on(ApplePayEvent::Ready, make("a"));
        emitter.on(ApplePayEvent::Ready, make("b"));
        emitter.on(ApplePayEvent::Cancel, make("c"));

        assert_eq!(emitter.emit(SessionEvent::Ready), 2);
        assert_eq!(*log.lock().unwrap(), vec!["a:ready", "b:ready"]);
    }

    #[test]
    fn test_emit_without_listeners() {
        let emitter = EventEmitter::<SessionEvent>::new();
        assert_eq!(emitter.emit(SessionEvent::Cancel), 0);
        assert_eq!(emitter.listener_count(ApplePayEvent::Cancel), 0);
    }

    #[test]
    fn test_once_fires_once() {
        let emitter = EventEmitter::<SessionEvent>::new();
        let (log, make) = recorder();
        emitter.once(ApplePayEvent::Error, make("once"));
        emitter.on(ApplePayEvent::Error, make("always"));

        emitter.emit(SessionEvent::Error(ApplePayError::NotReady));
        emitter.emit(SessionEvent::Error(ApplePayError::InProgress));

        assert_eq!(
            *log.lock().unwrap(),
            vec!["once:error", "always:error", "always:error"]
        );
        assert_eq!(emitter.listener_count(ApplePayEvent::Error), 1);
    }

    #[test]
    fn test_off_removes_listener() {
        let emitter = EventEmitter::<SessionEvent>::new();
        let (log, make) = recorder();
        let id = emitter.on(ApplePayEvent::Token, make("t"));

        assert!(emitter.off(ApplePayEvent::Token, id));
        assert!(!emitter.off(ApplePayEvent::Token, id));
        assert!(!emitter.off(ApplePayEvent::Ready, id));

        emitter.emit(SessionEvent::Token(crate::payment::Token::new("tok")));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_take_audience_consumes_once() {
        let emitter = EventEmitter::<SessionEvent>::new();
        let (log, make) = recorder();
        emitter.once(ApplePayEvent::Ready, make("once"));
        emitter.on(ApplePayEvent::Ready, make("always"));

        let audience = emitter.take_audience(ApplePayEvent::Ready);
        assert_eq!(audience.len(), 2);
        assert_eq!(emitter.listener_count(ApplePayEvent::Ready), 1);
        assert!(log.lock().unwrap().is_empty());

        for listener in &audience {
            listener(&SessionEvent::Ready);
        }
        assert_eq!(*log.lock().unwrap(), vec!["once:ready", "always:ready"]);
    }

    #[test]
    fn test_listener_can_reenter() {
        let emitter = Arc::new(EventEmitter::<SessionEvent>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let inner = {
            let calls = calls.clone();
            Arc::new(move |_: &SessionEvent| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };
        let reentrant = {
            let emitter = emitter.clone();
            Arc::new(move |_: &SessionEvent| {
                emitter.on(ApplePayEvent::Cancel, inner.clone());
                emitter.emit(SessionEvent::Cancel);
            })
        };

        emitter.once(ApplePayEvent::Ready, reentrant);
        emitter.emit(SessionEvent::Ready);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.listener_count(ApplePayEvent::Cancel), 1);
    }
}
