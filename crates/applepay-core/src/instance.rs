//! # Session Instance
//!
//! The handle returned by the Apple Pay factory: two operations plus the
//! emitter capability over [`SessionEvent`]s.

use crate::config::ApplePayConfig;
use crate::emitter::Emitter;
use crate::event::SessionEvent;
use std::sync::Arc;

/// Zero-argument callback passed to `ready` and `begin`
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Wrap a closure as an optional [`Callback`]
pub fn callback(f: impl FnOnce() + Send + 'static) -> Option<Callback> {
    Some(Box::new(f))
}

/// An Apple Pay session handle
pub trait ApplePayInstance: Emitter<SessionEvent> + Send + Sync {
    /// Run `cb` once the payment sheet can be shown; immediately if it
    /// already can. Failures surface as an `error` event instead.
    fn ready(&self, cb: Option<Callback>);

    /// Ask for the payment sheet to be presented. `cb` runs once the request
    /// has been issued; the outcome arrives as `token`, `paymentAuthorized`,
    /// `cancel` or `error` events.
    fn begin(&self, cb: Option<Callback>);
}

/// Factory: one configuration in, one session out. Errors are reported
/// later through the session's `error` event.
pub type ApplePay = dyn Fn(ApplePayConfig) -> Arc<dyn ApplePayInstance> + Send + Sync;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::{EventEmitter, Listener, ListenerId};
    use crate::event::ApplePayEvent;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Minimal instance that is ready on construction
    struct AlwaysReady {
        events: EventEmitter<SessionEvent>,
    }

    impl Emitter<SessionEvent> for AlwaysReady {
        fn on(&self, name: ApplePayEvent, listener: Listener<SessionEvent>) -> ListenerId {
            self.events.on(name, listener)
        }
        fn once(&self, name: ApplePayEvent, listener: Listener<SessionEvent>) -> ListenerId {
            self.events.once(name, listener)
        }
        fn off(&self, name: ApplePayEvent, id: ListenerId) -> bool {
            self.events.off(name, id)
        }
        fn emit(&self, event: SessionEvent) -> usize {
            self.events.emit(event)
        }
        fn listener_count(&self, name: ApplePayEvent) -> usize {
            self.events.listener_count(name)
        }
    }

    impl ApplePayInstance for AlwaysReady {
        fn ready(&self, cb: Option<Callback>) {
            if let Some(cb) = cb {
                cb();
            }
        }

        fn begin(&self, cb: Option<Callback>) {
            if let Some(cb) = cb {
                cb();
            }
            self.emit(SessionEvent::Cancel);
        }
    }

    #[test]
    fn test_factory_shape() {
        let factory: Box<ApplePay> = Box::new(|_config: ApplePayConfig| {
            Arc::new(AlwaysReady {
                events: EventEmitter::new(),
            }) as Arc<dyn ApplePayInstance>
        });

        let instance = factory(ApplePayConfig::new("US", "USD").with_total("19.99"));
        let hits = Arc::new(AtomicUsize::new(0));

        for event in ApplePayEvent::ALL {
            instance.on(event, Arc::new(|_: &SessionEvent| {}));
            assert_eq!(instance.listener_count(event), 1);
        }

        let counter = hits.clone();
        instance.ready(callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let counter = hits.clone();
        instance.begin(callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        instance.begin(None);

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
