//! Application state for the attendance API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::attendance::PunchRecorder;
use crate::clock::{Clock, SystemClock};
use crate::config::ConfigLoader;
use crate::ledger::LeaveLedger;
use crate::store::{DocumentStore, InMemoryStore};

/// Shared application state.
///
/// Contains resources that are shared across all request handlers: the
/// document store, the clock, and the ledger and punch recorder built on
/// top of them.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    ledger: LeaveLedger,
    recorder: PunchRecorder,
}

impl AppState {
    /// Creates a new application state over `store` and `clock`.
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger: LeaveLedger::new(Arc::clone(&store), Arc::clone(&clock)),
            recorder: PunchRecorder::new(Arc::clone(&store), Arc::clone(&clock)),
            store,
            clock,
        }
    }

    /// Creates an in-memory state seeded with the loaded policy and the
    /// system clock.
    pub fn from_config(config: ConfigLoader) -> Self {
        let store: Arc<dyn DocumentStore> =
            Arc::new(InMemoryStore::with_policy(config.into_policy()));
        Self::new(store, Arc::new(SystemClock))
    }

    /// Returns the document store.
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Returns the clock.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Returns the leave ledger.
    pub fn ledger(&self) -> &LeaveLedger {
        &self.ledger
    }

    /// Returns the punch recorder.
    pub fn recorder(&self) -> &PunchRecorder {
        &self.recorder
    }
}
