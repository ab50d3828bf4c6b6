//! Strongest scope seen per dependency key.

use indexmap::IndexMap;
use sysdeps_core::{DependencyKey, Scope};
use tracing::debug;

/// Tracks the highest-priority scope observed for each key
#[derive(Debug, Clone, Default)]
pub struct ScopeManager {
    scopes: IndexMap<DependencyKey, Scope>,
}

impl ScopeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation; a weaker scope never replaces a stronger one
    pub fn update(&mut self, key: &DependencyKey, scope: Scope) {
        match self.scopes.get_mut(key) {
            Some(current) => {
                if scope.outranks(*current) {
                    debug!("Scope of {} raised from {} to {}", key, current, scope);
                    *current = scope;
                }
            },
            None => {
                self.scopes.insert(key.clone(), scope);
            },
        }
    }

    /// Recorded scope, `Compile` for keys never observed
    pub fn scope(&self, key: &DependencyKey) -> Scope {
        self.scopes.get(key).copied().unwrap_or_default()
    }

    pub fn get(&self, key: &DependencyKey) -> Option<Scope> {
        self.scopes.get(key).copied()
    }

    pub fn scopes(&self) -> &IndexMap<DependencyKey, Scope> {
        &self.scopes
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stronger_scope_wins() {
        let key = DependencyKey::new("g", "a");
        let mut scopes = ScopeManager::new();

        scopes.update(&key, Scope::Test);
        assert_eq!(scopes.scope(&key), Scope::Test);

        scopes.update(&key, Scope::Runtime);
        assert_eq!(scopes.scope(&key), Scope::Runtime);

        scopes.update(&key, Scope::Provided);
        assert_eq!(scopes.scope(&key), Scope::Runtime);

        scopes.update(&key, Scope::Compile);
        scopes.update(&key, Scope::Test);
        assert_eq!(scopes.scope(&key), Scope::Compile);
    }

    #[test]
    fn test_unknown_key_defaults_to_compile() {
        let scopes = ScopeManager::new();
        let key = DependencyKey::new("g", "unseen");
        assert_eq!(scopes.scope(&key), Scope::Compile);
        assert_eq!(scopes.get(&key), None);
    }
}
