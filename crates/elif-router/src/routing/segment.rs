//! Single-segment matching
//!
//! Compares the next request segment against one trie node. Values are
//! already percent-decoded by the caller. Parameters and wildcards always
//! match syntactically; constraints are checked separately.

use super::constraint::Constraint;

/// What a trie node matches
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentKind {
    /// Exact literal text
    Static(String),
    /// Any single segment
    Param(String),
    /// A single segment accepted by the constraint
    Constrained { name: String, constraint: Constraint },
    /// All remaining segments, optionally filtered
    Wildcard {
        name: String,
        constraint: Option<Constraint>,
    },
}

impl SegmentKind {
    /// Parameter name, `None` for static segments
    pub fn name(&self) -> Option<&str> {
        match self {
            SegmentKind::Static(_) => None,
            SegmentKind::Param(name)
            | SegmentKind::Constrained { name, .. }
            | SegmentKind::Wildcard { name, .. } => Some(name),
        }
    }

    pub fn constraint(&self) -> Option<&Constraint> {
        match self {
            SegmentKind::Constrained { constraint, .. } => Some(constraint),
            SegmentKind::Wildcard { constraint, .. } => constraint.as_ref(),
            _ => None,
        }
    }

    /// Pattern syntax for this segment
    pub fn to_pattern(&self) -> String {
        match self {
            SegmentKind::Static(text) => text.clone(),
            SegmentKind::Param(name) => format!(":{}", name),
            SegmentKind::Constrained { name, constraint } => format!(":{}{}", name, constraint.key()),
            SegmentKind::Wildcard { name, constraint } => match constraint {
                Some(constraint) => format!("*{}{}", name, constraint.key()),
                None => format!("*{}", name),
            },
        }
    }
}

/// Result of comparing one node against the request path
#[derive(Debug, PartialEq, Eq)]
pub enum SegmentMatch<'s> {
    ExactStatic,
    ParamCapture(&'s str),
    /// The remaining segments joined with `/`
    WildcardCapture(String),
    NoMatch,
}

/// Match `kind` against the first of `remaining`
///
/// Wildcards consume every remaining segment and reject captures that
/// contain a `..` component unless `allow_traversal` is set.
pub fn match_segment<'s, S: AsRef<str>>(
    kind: &SegmentKind,
    remaining: &'s [S],
    allow_traversal: bool,
) -> SegmentMatch<'s> {
    let Some(first) = remaining.first() else {
        return SegmentMatch::NoMatch;
    };
    let segment = first.as_ref();

    match kind {
        SegmentKind::Static(text) if text == segment => SegmentMatch::ExactStatic,
        SegmentKind::Static(_) => SegmentMatch::NoMatch,
        SegmentKind::Param(_) | SegmentKind::Constrained { .. } => SegmentMatch::ParamCapture(segment),
        SegmentKind::Wildcard { .. } => {
            let captured = remaining
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<_>>()
                .join("/");

            if !allow_traversal && is_traversal(&captured) {
                tracing::debug!(target: "elif::router", "Rejected wildcard capture '{}'", captured);
                return SegmentMatch::NoMatch;
            }

            SegmentMatch::WildcardCapture(captured)
        }
    }
}

/// True when any `/` or `\` separated component is `..`
fn is_traversal(value: &str) -> bool {
    value.split(['/', '\\']).any(|component| component == "..")
}
