//! Parameter constraints
//!
//! A constraint decides whether a captured value may bind to a parameter.
//! Constraints are a matching filter: when one rejects a value, the trie
//! lookup moves on to the next candidate instead of failing the request.
//! Predicates must be pure and synchronous.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type PredicateFn = dyn Fn(&str) -> bool + Send + Sync;

/// A predicate over a captured path value
#[derive(Clone)]
pub enum Constraint {
    /// Must parse as a signed 64-bit integer
    Int,
    /// Must be a valid UUID
    Uuid,
    /// Alphabetic characters only
    Alpha,
    /// Alphanumerics, hyphens and underscores
    Slug,
    /// Regular expression matched against the whole value
    Regex(Regex),
    /// Application supplied predicate
    Predicate { name: String, func: Arc<PredicateFn> },
}

impl Constraint {
    /// Compile a regex constraint, anchored to the whole value
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{})$", pattern)).map(Constraint::Regex)
    }

    /// Wrap a custom predicate
    pub fn predicate<N, F>(name: N, func: F) -> Self
    where
        N: Into<String>,
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Constraint::Predicate {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Stable textual identity, used for ordering and conflict checks
    pub fn key(&self) -> String {
        match self {
            Constraint::Int => "<int>".to_string(),
            Constraint::Uuid => "<uuid>".to_string(),
            Constraint::Alpha => "<alpha>".to_string(),
            Constraint::Slug => "<slug>".to_string(),
            Constraint::Regex(regex) => {
                let anchored = regex.as_str();
                let source = anchored
                    .strip_prefix("^(?:")
                    .and_then(|s| s.strip_suffix(")$"))
                    .unwrap_or(anchored);
                format!("({})", source)
            }
            Constraint::Predicate { name, .. } => format!("<{}>", name),
        }
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constraint{}", self.key())
    }
}

/// Check a captured value against a constraint
pub fn validate(value: &str, constraint: &Constraint) -> bool {
    if value.is_empty() {
        return false;
    }

    match constraint {
        Constraint::Int => value.parse::<i64>().is_ok(),
        Constraint::Uuid => uuid::Uuid::parse_str(value).is_ok(),
        Constraint::Alpha => value.chars().all(|c| c.is_alphabetic()),
        Constraint::Slug => value
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_'),
        Constraint::Regex(regex) => regex.is_match(value),
        Constraint::Predicate { func, .. } => func(value),
    }
}

/// Named constraints available to `:name<constraint>` patterns
#[derive(Clone, Debug)]
pub struct ConstraintTable {
    named: HashMap<String, Constraint>,
}

impl ConstraintTable {
    /// A table preloaded with `int`, `uuid`, `alpha` and `slug`
    pub fn new() -> Self {
        let mut named = HashMap::new();
        named.insert("int".to_string(), Constraint::Int);
        named.insert("uuid".to_string(), Constraint::Uuid);
        named.insert("alpha".to_string(), Constraint::Alpha);
        named.insert("slug".to_string(), Constraint::Slug);
        Self { named }
    }

    pub fn define<N: Into<String>>(&mut self, name: N, constraint: Constraint) {
        self.named.insert(name.into(), constraint);
    }

    pub fn get(&self, name: &str) -> Option<&Constraint> {
        self.named.get(name)
    }
}

impl Default for ConstraintTable {
    fn default() -> Self {
        Self::new()
    }
}
