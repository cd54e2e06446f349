use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cmdwire_table::{CommandIdentity, CommandTable, TableError};
use serde::Serialize;
use tracing::trace;

use crate::config::DecoderConfig;
use crate::decoder::decode_with_config;
use crate::error::{DecodeError, Result};
use crate::registry::{CommandHandler, HandlerRegistry, SharedHandler};
use crate::value::{DecodedCommand, FromArgs};

/// Hand `command` to the handler registered for its identity.
///
/// Returns whether a handler ran. A command without a handler is dropped
/// silently.
pub fn dispatch(registry: &HandlerRegistry, command: DecodedCommand) -> bool {
    // Clone the handler out so the registry lock is released before it runs.
    match registry.handler(command.identity) {
        Some(handler) => {
            handler.handle(&command);
            true
        }
        None => {
            trace!(identity = %command.identity, "no handler; dropped");
            false
        }
    }
}

/// Counters kept by a [`CommandDecoder`].
#[derive(Debug, Default)]
struct DecoderStats {
    decoded: AtomicU64,
    dispatched: AtomicU64,
    unhandled: AtomicU64,
    unknown: AtomicU64,
    truncated: AtomicU64,
    malformed: AtomicU64,
}

/// Point-in-time copy of a decoder's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Buffers decoded successfully.
    pub decoded: u64,
    /// Commands that reached a handler.
    pub dispatched: u64,
    /// Commands decoded with no handler registered.
    pub unhandled: u64,
    /// Buffers naming a command missing from the table.
    pub unknown: u64,
    /// Buffers that ended early.
    pub truncated: u64,
    /// Buffers with bad strings or rejected trailing bytes.
    pub malformed: u64,
}

/// Descriptor table plus handler registry: the receive side of the protocol.
///
/// Shareable across threads. The table is immutable once built; handlers
/// may be added and removed at any time.
#[derive(Debug)]
pub struct CommandDecoder {
    table: Arc<CommandTable>,
    registry: Arc<HandlerRegistry>,
    config: DecoderConfig,
    stats: DecoderStats,
}

impl CommandDecoder {
    pub fn new(table: Arc<CommandTable>) -> Self {
        Self::with_config(table, DecoderConfig::default())
    }

    pub fn with_config(table: Arc<CommandTable>, config: DecoderConfig) -> Self {
        Self::with_registry(table, Arc::new(HandlerRegistry::new()), config)
    }

    /// Use a registry shared with other decoders.
    pub fn with_registry(
        table: Arc<CommandTable>,
        registry: Arc<HandlerRegistry>,
        config: DecoderConfig,
    ) -> Self {
        Self {
            table,
            registry,
            config,
            stats: DecoderStats::default(),
        }
    }

    /// Decoder over the built-in command table.
    pub fn builtin() -> Self {
        Self::new(cmdwire_table::builtin_shared())
    }

    pub fn table(&self) -> &Arc<CommandTable> {
        &self.table
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode one command buffer.
    pub fn decode(&self, buffer: &[u8]) -> Result<DecodedCommand> {
        let result = decode_with_config(&self.table, buffer, &self.config);
        let counter = match &result {
            Ok(_) => &self.stats.decoded,
            Err(DecodeError::UnknownCommand(_)) => &self.stats.unknown,
            Err(DecodeError::Truncated { .. }) => &self.stats.truncated,
            Err(_) => &self.stats.malformed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        result
    }

    /// Hand a decoded command to its handler. Returns whether one ran.
    pub fn dispatch(&self, command: DecodedCommand) -> bool {
        let handled = dispatch(&self.registry, command);
        let counter = if handled {
            &self.stats.dispatched
        } else {
            &self.stats.unhandled
        };
        counter.fetch_add(1, Ordering::Relaxed);
        handled
    }

    /// Decode `buffer` and dispatch the result.
    ///
    /// `Ok(false)` means the command was valid but nothing was registered.
    pub fn decode_and_dispatch(&self, buffer: &[u8]) -> Result<bool> {
        let command = self.decode(buffer)?;
        Ok(self.dispatch(command))
    }

    /// Register a handler, returning the one it replaced.
    pub fn register_handler<H>(&self, identity: CommandIdentity, handler: H) -> Option<SharedHandler>
    where
        H: CommandHandler + 'static,
    {
        self.registry.register(identity, handler)
    }

    /// Register a handler by dotted command name.
    pub fn register_named<H>(
        &self,
        name: &str,
        handler: H,
    ) -> std::result::Result<CommandIdentity, TableError>
    where
        H: CommandHandler + 'static,
    {
        let identity = self.table.require_name(name)?.identity;
        self.registry.register(identity, handler);
        Ok(identity)
    }

    /// Register a typed handler by dotted command name.
    pub fn register_typed<A, F>(
        &self,
        name: &str,
        handler: F,
    ) -> std::result::Result<CommandIdentity, TableError>
    where
        A: FromArgs + 'static,
        F: Fn(A) + Send + Sync + 'static,
    {
        let identity = self.table.require_name(name)?.identity;
        self.registry.register_typed(identity, handler);
        Ok(identity)
    }

    pub fn unregister_handler(&self, identity: CommandIdentity) -> bool {
        self.registry.unregister(identity)
    }

    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            decoded: self.stats.decoded.load(Ordering::Relaxed),
            dispatched: self.stats.dispatched.load(Ordering::Relaxed),
            unhandled: self.stats.unhandled.load(Ordering::Relaxed),
            unknown: self.stats.unknown.load(Ordering::Relaxed),
            truncated: self.stats.truncated.load(Ordering::Relaxed),
            malformed: self.stats.malformed.load(Ordering::Relaxed),
        }
    }
}
