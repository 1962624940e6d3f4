//! Per-source delivery overrides

use crate::domain::ChatId;
use std::collections::HashMap;

/// Maps a source channel to the chat its predictions go to
#[derive(Debug, Clone)]
pub struct RedirectMap {
    routes: HashMap<ChatId, ChatId>,
    default_destination: ChatId,
}

impl RedirectMap {
    pub fn new(default_destination: ChatId) -> Self {
        Self {
            routes: HashMap::new(),
            default_destination,
        }
    }

    /// Last writer wins
    pub fn set(&mut self, source: ChatId, destination: ChatId) {
        self.routes.insert(source, destination);
    }

    pub fn get(&self, source: ChatId) -> ChatId {
        self.routes
            .get(&source)
            .copied()
            .unwrap_or(self.default_destination)
    }

    pub fn clear(&mut self) {
        self.routes.clear();
    }

    pub fn default_destination(&self) -> ChatId {
        self.default_destination
    }

    /// Overrides sorted by source id
    pub fn routes(&self) -> Vec<(ChatId, ChatId)> {
        let mut routes: Vec<_> = self.routes.iter().map(|(s, d)| (*s, *d)).collect();
        routes.sort_unstable();
        routes
    }
}
