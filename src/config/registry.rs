// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::errors::{DuplicateRegistrationError, RegistrationKind};
use crate::observability::messages::registry::HandlerRegistered;
use crate::observability::messages::StructuredLog;
use crate::traits::{InputHandler, MessageHandler};

/// Collects handler registrations during startup.
///
/// Registration only exists on the builder. Once [`RegistryBuilder::build`] has
/// produced a [`HandlerRegistry`], the tables are frozen, so nothing can be
/// registered after the consumer loop starts reading them.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use event_relay::config::RegistryBuilder;
/// use event_relay::errors::DuplicateRegistrationError;
/// use event_relay::outputs::LogHandler;
///
/// # fn main() -> Result<(), DuplicateRegistrationError> {
/// let mut builder = RegistryBuilder::new();
/// builder.register_message_handler("io.example.outputs.log", Arc::new(LogHandler))?;
///
/// // Same type again is a configuration error and keeps the first handler
/// assert!(builder
///     .register_message_handler("io.example.outputs.log", Arc::new(LogHandler))
///     .is_err());
///
/// let registry = builder.build();
/// assert!(registry.lookup_message_handler("io.example.outputs.log").is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
    input_handlers: BTreeMap<String, Arc<dyn InputHandler>>,
    message_handlers: HashMap<String, Arc<dyn MessageHandler>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an ingestion path prefix to an input handler.
    pub fn register_input_handler(
        &mut self,
        prefix: impl Into<String>,
        handler: Arc<dyn InputHandler>,
    ) -> Result<(), DuplicateRegistrationError> {
        let prefix = prefix.into();
        if self.input_handlers.contains_key(&prefix) {
            return Err(DuplicateRegistrationError {
                kind: RegistrationKind::InputPrefix,
                key: prefix,
            });
        }

        HandlerRegistered {
            kind: RegistrationKind::InputPrefix,
            key: &prefix,
            handler: &handler.help().path,
        }
        .log();
        self.input_handlers.insert(prefix, handler);
        Ok(())
    }

    /// Bind a message type to the handler that consumes it.
    pub fn register_message_handler(
        &mut self,
        message_type: impl Into<String>,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), DuplicateRegistrationError> {
        let message_type = message_type.into();
        if self.message_handlers.contains_key(&message_type) {
            return Err(DuplicateRegistrationError {
                kind: RegistrationKind::MessageType,
                key: message_type,
            });
        }

        HandlerRegistered {
            kind: RegistrationKind::MessageType,
            key: &message_type,
            handler: handler.name(),
        }
        .log();
        self.message_handlers.insert(message_type, handler);
        Ok(())
    }

    /// Freeze the registrations.
    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            input_handlers: self.input_handlers,
            message_handlers: self.message_handlers,
        }
    }
}

/// Immutable handler tables shared by the dispatcher and the ingestion router.
pub struct HandlerRegistry {
    input_handlers: BTreeMap<String, Arc<dyn InputHandler>>,
    message_handlers: HashMap<String, Arc<dyn MessageHandler>>,
}

impl HandlerRegistry {
    pub fn lookup_message_handler(&self, message_type: &str) -> Option<Arc<dyn MessageHandler>> {
        self.message_handlers.get(message_type).cloned()
    }

    /// Registered input handlers in prefix order.
    pub fn input_handlers(&self) -> impl Iterator<Item = (&str, &Arc<dyn InputHandler>)> {
        self.input_handlers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn message_types(&self) -> impl Iterator<Item = &str> {
        self.message_handlers.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut message_types: Vec<_> = self.message_types().collect();
        message_types.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("input_prefixes", &self.input_handlers.keys().collect::<Vec<_>>())
            .field("message_types", &message_types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{StaticHandler, StubInput};
    use crate::traits::Handling;

    #[test]
    fn test_duplicate_message_type_keeps_first() {
        let mut builder = RegistryBuilder::new();
        builder
            .register_message_handler(
                "io.example.outputs.log",
                Arc::new(StaticHandler::new("first", Handling::Stop)),
            )
            .unwrap();

        let err = builder
            .register_message_handler(
                "io.example.outputs.log",
                Arc::new(StaticHandler::new("second", Handling::Continue)),
            )
            .unwrap_err();

        assert_eq!(err.kind, RegistrationKind::MessageType);
        assert_eq!(err.key, "io.example.outputs.log");

        let registry = builder.build();
        let handler = registry.lookup_message_handler("io.example.outputs.log").unwrap();
        assert_eq!(handler.name(), "first");
    }

    #[test]
    fn test_duplicate_input_prefix_keeps_first() {
        let mut builder = RegistryBuilder::new();
        builder
            .register_input_handler("generic", Arc::new(StubInput::new("/generic/first")))
            .unwrap();

        let err = builder
            .register_input_handler("generic", Arc::new(StubInput::new("/generic/second")))
            .unwrap_err();
        assert_eq!(err.kind, RegistrationKind::InputPrefix);

        let registry = builder.build();
        let handlers: Vec<_> = registry.input_handlers().collect();
        assert_eq!(handlers.len(), 1);
        assert_eq!(handlers[0].0, "generic");
        assert_eq!(handlers[0].1.help().path, "/generic/first");
    }

    #[test]
    fn test_tables_are_independent() {
        let mut builder = RegistryBuilder::new();
        builder
            .register_input_handler("shared.key.name", Arc::new(StubInput::new("/x")))
            .unwrap();
        builder
            .register_message_handler(
                "shared.key.name",
                Arc::new(StaticHandler::new("h", Handling::Stop)),
            )
            .unwrap();

        let registry = builder.build();
        assert!(registry.lookup_message_handler("shared.key.name").is_some());
        assert!(registry.lookup_message_handler("io.example.unknown").is_none());
        assert_eq!(registry.message_types().count(), 1);
    }
}
