//! View generations for discarding stale results.
//!
//! Every screen change calls [`ViewGeneration::advance`]; requests started
//! from a screen carry the [`ViewScope`] that was current at the time. A
//! request whose scope is no longer live must not apply its result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ViewGeneration {
    current: Arc<AtomicU64>,
}

impl ViewGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation. Every scope handed out before is dead.
    pub fn advance(&self) -> ViewScope {
        let id = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        ViewScope {
            current: Arc::clone(&self.current),
            id,
        }
    }

    /// Scope for the generation that is current right now.
    pub fn scope(&self) -> ViewScope {
        ViewScope {
            current: Arc::clone(&self.current),
            id: self.current.load(Ordering::SeqCst),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewScope {
    current: Arc<AtomicU64>,
    id: u64,
}

impl ViewScope {
    /// A scope nothing can invalidate, for one-shot command line flows.
    pub fn detached() -> Self {
        ViewGeneration::new().scope()
    }

    pub fn is_live(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.id
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}
