//! The loaded fact universe.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::fact::Fact;

/// Facts keyed by id, remembering declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Fact>", into = "Vec<Fact>")]
pub struct FactUniverse {
    facts: Vec<Fact>,
    index: HashMap<String, usize>,
}

impl FactUniverse {
    /// Creates an empty universe.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fact. Returns false (and keeps the existing record) when
    /// the id is already present.
    pub fn insert(&mut self, fact: Fact) -> bool {
        if self.index.contains_key(fact.id()) {
            return false;
        }
        self.index.insert(fact.id().to_string(), self.facts.len());
        self.facts.push(fact);
        true
    }

    /// Looks up a fact by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Fact> {
        self.index.get(id).map(|&idx| &self.facts[idx])
    }

    /// True if the id is known.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Resolves an id: a known id yields the universe fact, an unknown one
    /// yields a synthesized fact with an empty name.
    #[must_use]
    pub fn resolve(&self, id: &str) -> Fact {
        self.get(id).cloned().unwrap_or_else(|| Fact::unnamed(id))
    }

    /// Number of facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// True if no facts were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Iterates facts in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Fact> {
        self.facts.iter()
    }
}

impl From<Vec<Fact>> for FactUniverse {
    fn from(facts: Vec<Fact>) -> Self {
        facts.into_iter().collect()
    }
}

impl From<FactUniverse> for Vec<Fact> {
    fn from(universe: FactUniverse) -> Self {
        universe.facts
    }
}

impl FromIterator<Fact> for FactUniverse {
    fn from_iter<I: IntoIterator<Item = Fact>>(iter: I) -> Self {
        let mut universe = Self::new();
        for fact in iter {
            universe.insert(fact);
        }
        universe
    }
}
