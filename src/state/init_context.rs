//! Tracks which page behaviours have been wired

use std::collections::HashSet;

/// Page behaviours set up at load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Behavior {
    NavigationMenu,
    ScrollSpy,
    SmoothScroll,
    ActiveMenu,
    Images,
    Forms,
    FaqSearch,
    MicroInteractions,
}

impl Behavior {
    pub const ALL: [Behavior; 8] = [
        Behavior::NavigationMenu,
        Behavior::ScrollSpy,
        Behavior::SmoothScroll,
        Behavior::ActiveMenu,
        Behavior::Images,
        Behavior::Forms,
        Behavior::FaqSearch,
        Behavior::MicroInteractions,
    ];
}

/// Initialization context handed to every initializer
#[derive(Debug, Default)]
pub struct InitContext {
    initialized: HashSet<Behavior>,
}

impl InitContext {
    /// Claim a behaviour for initialization. Returns false if it was already
    /// initialized, in which case the caller must not bind anything.
    pub fn claim(&mut self, behavior: Behavior) -> bool {
        let fresh = self.initialized.insert(behavior);
        if !fresh {
            tracing::debug!("{behavior:?} already initialized, skipping");
        }
        fresh
    }

    pub fn is_initialized(&self, behavior: Behavior) -> bool {
        self.initialized.contains(&behavior)
    }

    pub fn is_complete(&self) -> bool {
        Behavior::ALL.iter().all(|&b| self.is_initialized(b))
    }
}
