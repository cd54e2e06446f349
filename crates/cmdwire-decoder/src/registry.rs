use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cmdwire_table::CommandIdentity;
use tracing::{debug, warn};

use crate::value::{DecodedCommand, FromArgs};

/// Receives decoded commands for one identity.
///
/// Any `Fn(&DecodedCommand) + Send + Sync` closure is a handler.
pub trait CommandHandler: Send + Sync {
    fn handle(&self, command: &DecodedCommand);
}

impl<F> CommandHandler for F
where
    F: Fn(&DecodedCommand) + Send + Sync,
{
    fn handle(&self, command: &DecodedCommand) {
        self(command)
    }
}

/// Shared handler slot.
pub type SharedHandler = Arc<dyn CommandHandler>;

/// Thread-safe map from command identity to at most one handler.
///
/// Registration and lookup may run on different threads. Handlers are
/// invoked outside the lock, so a handler may register or unregister others.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<CommandIdentity, SharedHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler` for `identity`, returning the handler it replaced.
    pub fn register<H>(&self, identity: CommandIdentity, handler: H) -> Option<SharedHandler>
    where
        H: CommandHandler + 'static,
    {
        self.register_shared(identity, Arc::new(handler))
    }

    /// Install an already shared handler.
    pub fn register_shared(
        &self,
        identity: CommandIdentity,
        handler: SharedHandler,
    ) -> Option<SharedHandler> {
        let previous = self.write().insert(identity, handler);
        debug!(%identity, replaced = previous.is_some(), "handler registered");
        previous
    }

    /// Install a handler that receives the arguments as a typed tuple.
    ///
    /// If the decoded values do not convert into `A`, the handler is skipped
    /// and a warning is logged.
    pub fn register_typed<A, F>(&self, identity: CommandIdentity, handler: F) -> Option<SharedHandler>
    where
        A: FromArgs + 'static,
        F: Fn(A) + Send + Sync + 'static,
    {
        self.register(
            identity,
            TypedHandler {
                handler,
                _args: PhantomData,
            },
        )
    }

    /// Remove the handler for `identity`. Returns whether one was present.
    pub fn unregister(&self, identity: CommandIdentity) -> bool {
        let removed = self.write().remove(&identity).is_some();
        if removed {
            debug!(%identity, "handler unregistered");
        }
        removed
    }

    /// Current handler for `identity`, if any.
    pub fn handler(&self, identity: CommandIdentity) -> Option<SharedHandler> {
        self.read().get(&identity).cloned()
    }

    pub fn is_registered(&self, identity: CommandIdentity) -> bool {
        self.read().contains_key(&identity)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Registered identities in ascending order.
    pub fn identities(&self) -> Vec<CommandIdentity> {
        let mut identities: Vec<_> = self.read().keys().copied().collect();
        identities.sort();
        identities
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    // A panicking handler never holds the lock, so the map is always
    // consistent and a poisoned lock can be used as is.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<CommandIdentity, SharedHandler>> {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<CommandIdentity, SharedHandler>> {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("identities", &self.identities())
            .finish()
    }
}

struct TypedHandler<A, F> {
    handler: F,
    _args: PhantomData<fn(A)>,
}

impl<A, F> CommandHandler for TypedHandler<A, F>
where
    A: FromArgs,
    F: Fn(A) + Send + Sync,
{
    fn handle(&self, command: &DecodedCommand) {
        match command.args::<A>() {
            Ok(args) => (self.handler)(args),
            Err(err) => warn!(
                identity = %command.identity,
                error = %err,
                "arguments do not match typed handler; skipped"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::value::DecodedValue;

    const BATTERY: CommandIdentity = CommandIdentity::new(0, 5, 1);

    fn battery(percent: u8) -> DecodedCommand {
        DecodedCommand::new(BATTERY, vec![DecodedValue::U8(percent)])
    }

    #[test]
    fn register_replaces_previous_handler() {
        let registry = HandlerRegistry::new();
        assert!(registry.register(BATTERY, |_: &DecodedCommand| {}).is_none());
        assert!(registry.register(BATTERY, |_: &DecodedCommand| {}).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_reports_presence() {
        let registry = HandlerRegistry::new();
        registry.register(BATTERY, |_: &DecodedCommand| {});
        assert!(registry.unregister(BATTERY));
        assert!(!registry.unregister(BATTERY));
        assert!(registry.is_empty());
    }

    #[test]
    fn typed_handler_receives_tuple() {
        let registry = HandlerRegistry::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&seen);
        registry.register_typed(BATTERY, move |(percent,): (u8,)| {
            sink.store(percent as usize, Ordering::SeqCst);
        });

        registry.handler(BATTERY).unwrap().handle(&battery(64));
        assert_eq!(seen.load(Ordering::SeqCst), 64);
    }

    #[test]
    fn typed_handler_skips_mismatched_arguments() {
        let registry = HandlerRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&calls);
        registry.register_typed(BATTERY, move |_: (u16,)| {
            sink.fetch_add(1, Ordering::SeqCst);
        });

        registry.handler(BATTERY).unwrap().handle(&battery(10));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handler_can_mutate_registry_while_running() {
        let registry = Arc::new(HandlerRegistry::new());
        let inner = Arc::clone(&registry);
        registry.register(BATTERY, move |_: &DecodedCommand| {
            inner.unregister(BATTERY);
        });

        let handler = registry.handler(BATTERY).unwrap();
        handler.handle(&battery(1));
        assert!(!registry.is_registered(BATTERY));
    }

    #[test]
    fn identities_are_sorted() {
        let registry = HandlerRegistry::new();
        registry.register(CommandIdentity::new(1, 0, 2), |_: &DecodedCommand| {});
        registry.register(CommandIdentity::new(0, 5, 1), |_: &DecodedCommand| {});
        assert_eq!(
            registry.identities(),
            vec![CommandIdentity::new(0, 5, 1), CommandIdentity::new(1, 0, 2)]
        );
    }
}
