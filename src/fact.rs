//! Fact types.
//!
//! A fact is an atomic proposition keyed by its id. The name is a display
//! label only: two facts with the same id are the same fact regardless of
//! the name each instance carries.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// An identity-keyed proposition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    id: String,
    #[serde(default)]
    name: String,
}

impl Fact {
    /// Creates a fact with the given id and display name.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Creates a fact that carries no display name.
    ///
    /// Rule loading synthesizes these for ids missing from the universe.
    #[must_use]
    pub fn unnamed(id: impl Into<String>) -> Self {
        Self::new(id, String::new())
    }

    /// The unique key of this fact.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The display name (may be empty).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text used in traces: the name, or the id when the name is empty.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

impl PartialEq for Fact {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Fact {}

// Must agree with `str`'s hash so that `Borrow<str>` lookups work.
impl Hash for Fact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Fact {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fact {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Borrow<str> for Fact {
    fn borrow(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// A mutable working set of facts.
pub type FactSet = HashSet<Fact>;

/// Returns the facts of `set` sorted by id.
#[must_use]
pub fn sorted(set: &FactSet) -> Vec<Fact> {
    let mut facts: Vec<Fact> = set.iter().cloned().collect();
    facts.sort();
    facts
}

/// Joins fact labels with `", "`, in the given order.
pub(crate) fn join_labels<'a>(facts: impl IntoIterator<Item = &'a Fact>) -> String {
    facts
        .into_iter()
        .map(Fact::label)
        .collect::<Vec<_>>()
        .join(", ")
}
