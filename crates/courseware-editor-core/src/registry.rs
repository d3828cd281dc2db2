//! Tracks which anchors currently have a live editor session.

use std::sync::Arc;

use dashmap::DashSet;
use smol_str::SmolStr;

/// Shared set of claimed anchors.
///
/// Cloning shares the underlying set, so every adapter mounted into the same
/// page should be handed a clone of one registry.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    live: Arc<DashSet<SmolStr>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim an anchor. Returns `false` if it is already owned by a live session.
    pub fn claim(&self, anchor: &str) -> bool {
        self.live.insert(SmolStr::new(anchor))
    }

    /// Release an anchor. Returns `false` if it was not claimed.
    pub fn release(&self, anchor: &str) -> bool {
        self.live.remove(anchor).is_some()
    }

    pub fn is_live(&self, anchor: &str) -> bool {
        self.live.contains(anchor)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_is_exclusive() {
        let registry = SessionRegistry::new();
        let shared = registry.clone();
        assert!(registry.claim("lesson-body"));
        assert!(!shared.claim("lesson-body"));
        assert!(shared.is_live("lesson-body"));
        assert!(shared.claim("quiz-intro"));
        assert_eq!(registry.len(), 2);

        assert!(shared.release("lesson-body"));
        assert!(!registry.release("lesson-body"));
        assert!(registry.claim("lesson-body"));
    }
}
