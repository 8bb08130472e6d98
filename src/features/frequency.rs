//! Online corpus statistics: distinct users seen so far, and per action type the
//! distinct users who performed it. Both grow monotonically with the stream.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct ActionFrequency {
    users: HashSet<String>,
    action_users: HashMap<String, HashSet<String>>,
}

impl ActionFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, user_id: &str, action: &str) {
        if !self.users.contains(user_id) {
            self.users.insert(user_id.to_string());
        }
        let performers = self.action_users.entry(action.to_string()).or_default();
        if !performers.contains(user_id) {
            performers.insert(user_id.to_string());
        }
    }

    /// Distinct users observed so far
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Distinct users who performed `action` so far
    pub fn users_for(&self, action: &str) -> usize {
        self.action_users.get(action).map_or(0, HashSet::len)
    }

    pub fn action_count(&self) -> usize {
        self.action_users.len()
    }

    /// `log10((1 + users) / performers)` at the current stream position.
    pub fn idf(&self, action: &str) -> f64 {
        // Every scored action was recorded first, so performers >= 1.
        let performers = self.users_for(action).max(1) as f64;
        ((1 + self.user_count()) as f64 / performers).log10()
    }
}
