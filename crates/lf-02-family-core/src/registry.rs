//! # Family Registry
//!
//! The node's dispatch table and store set.
//!
//! A registry is an explicit handle created at startup and passed to whatever
//! needs it, so several ledgers can live in one process.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut registry = FamilyRegistry::new();
//! registry.register_family(Arc::new(ClinicalFamily::default()), in_memory_store_factory())?;
//! registry.validate_complete()?;
//!
//! let transaction = registry.dispatch(message)?;
//! let store = registry.store_for(&message_transaction_type)?;
//! ```

use crate::adapters::memory_store::InMemoryStore;
use crate::domain::entities::FamilyTags;
use crate::domain::errors::ConfigurationError;
use crate::message::TransactionMessage;
use crate::ports::inbound::{FamilyTransaction, TransactionFamily};
use crate::ports::outbound::KeyValueStore;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

/// Turns a routed message into the family's transaction.
pub type MessageHandler =
    Arc<dyn Fn(TransactionMessage) -> Box<dyn FamilyTransaction> + Send + Sync>;

/// Creates the store for one transaction type.
pub type StoreFactory = Arc<dyn Fn() -> Arc<dyn KeyValueStore> + Send + Sync>;

/// Store factory backed by [`InMemoryStore`].
pub fn in_memory_store_factory() -> StoreFactory {
    Arc::new(|| Arc::new(InMemoryStore::new()) as Arc<dyn KeyValueStore>)
}

struct StoreEntry {
    store_name: String,
    store: Arc<dyn KeyValueStore>,
}

/// Message-type to handler, transaction-type to store.
#[derive(Default)]
pub struct FamilyRegistry {
    handlers: HashMap<String, (String, MessageHandler)>,
    stores: HashMap<String, StoreEntry>,
    families: Vec<FamilyTags>,
}

impl FamilyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a message type to a handler producing transactions of
    /// `transaction_type`.
    pub fn register_message_handler(
        &mut self,
        message_type: &str,
        transaction_type: &str,
        handler: MessageHandler,
    ) -> Result<(), ConfigurationError> {
        if self.handlers.contains_key(message_type) {
            error!(message_type, "[Registry] Handler already registered");
            return Err(ConfigurationError::DuplicateFamily {
                tag: message_type.to_string(),
            });
        }
        info!(message_type, transaction_type, "[Registry] Registered message handler");
        self.handlers.insert(
            message_type.to_string(),
            (transaction_type.to_string(), handler),
        );
        Ok(())
    }

    /// Bind a transaction type to a freshly created store.
    pub fn register_transaction_store(
        &mut self,
        transaction_type: &str,
        store_name: &str,
        factory: StoreFactory,
    ) -> Result<(), ConfigurationError> {
        if self.stores.contains_key(transaction_type) {
            error!(transaction_type, "[Registry] Store already registered");
            return Err(ConfigurationError::DuplicateFamily {
                tag: transaction_type.to_string(),
            });
        }
        info!(transaction_type, store_name, "[Registry] Registered transaction store");
        self.stores.insert(
            transaction_type.to_string(),
            StoreEntry {
                store_name: store_name.to_string(),
                store: factory(),
            },
        );
        Ok(())
    }

    /// Register a family's handler and store in one step.
    ///
    /// Fails without changing the registry if either tag is taken.
    pub fn register_family<F: TransactionFamily>(
        &mut self,
        family: Arc<F>,
        factory: StoreFactory,
    ) -> Result<(), ConfigurationError> {
        let tags = family.tags();

        if self.handlers.contains_key(tags.message_type) {
            return Err(ConfigurationError::DuplicateFamily {
                tag: tags.message_type.to_string(),
            });
        }
        if self.stores.contains_key(tags.transaction_type) {
            return Err(ConfigurationError::DuplicateFamily {
                tag: tags.transaction_type.to_string(),
            });
        }

        let handler: MessageHandler = Arc::new(move |message: TransactionMessage| {
            Box::new(message.unwrap_with(family.as_ref())) as Box<dyn FamilyTransaction>
        });

        self.register_message_handler(tags.message_type, tags.transaction_type, handler)?;
        self.register_transaction_store(tags.transaction_type, tags.store_name, factory)?;
        self.families.push(tags);

        info!(family = tags.name, "[Registry] ✓ Family loaded");
        Ok(())
    }

    /// Every handler must have a store for the transaction type it produces.
    pub fn validate_complete(&self) -> Result<(), ConfigurationError> {
        for (message_type, (transaction_type, _)) in &self.handlers {
            if !self.stores.contains_key(transaction_type) {
                error!(message_type = %message_type, transaction_type = %transaction_type,
                    "[Registry] ✗ Handler without store");
                return Err(ConfigurationError::MissingStore {
                    message_type: message_type.clone(),
                    transaction_type: transaction_type.clone(),
                });
            }
        }
        Ok(())
    }

    /// Route a message to its family's handler.
    pub fn dispatch(
        &self,
        message: TransactionMessage,
    ) -> Result<Box<dyn FamilyTransaction>, ConfigurationError> {
        let (_, handler) = self
            .handlers
            .get(&message.message_type)
            .ok_or_else(|| ConfigurationError::UnknownMessageType(message.message_type.clone()))?;
        Ok(handler(message))
    }

    pub fn store_for(
        &self,
        transaction_type: &str,
    ) -> Result<Arc<dyn KeyValueStore>, ConfigurationError> {
        self.stores
            .get(transaction_type)
            .map(|entry| entry.store.clone())
            .ok_or_else(|| ConfigurationError::UnknownTransactionType(transaction_type.to_string()))
    }

    /// Look a store up by its name, e.g. `ClinicalTransaction`.
    pub fn store_by_name(&self, store_name: &str) -> Option<Arc<dyn KeyValueStore>> {
        self.stores
            .values()
            .find(|entry| entry.store_name == store_name)
            .map(|entry| entry.store.clone())
    }

    /// Transaction type a message type routes to.
    pub fn transaction_type_of(&self, message_type: &str) -> Option<&str> {
        self.handlers.get(message_type).map(|(t, _)| t.as_str())
    }

    pub fn families(&self) -> &[FamilyTags] {
        &self.families
    }

    pub fn is_registered(&self, message_type: &str) -> bool {
        self.handlers.contains_key(message_type)
    }
}

impl std::fmt::Debug for FamilyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut stores: Vec<&str> = self.stores.values().map(|e| e.store_name.as_str()).collect();
        stores.sort_unstable();
        f.debug_struct("FamilyRegistry")
            .field("families", &self.families)
            .field("stores", &stores)
            .finish()
    }
}
