//! Prefix trie with backtracking lookup
//!
//! Children of a node are tried in a fixed order:
//! 1. the static child whose text equals the segment
//! 2. constrained parameters whose constraint accepts the segment
//! 3. the unconstrained parameter
//! 4. the wildcard
//!
//! When a branch dead-ends the walk returns to the parent and tries the
//! next candidate. The walk uses an explicit stack, so its depth is bounded
//! by the number of path segments.

use super::constraint::validate;
use super::params::PathParams;
use super::pattern::RoutePattern;
use super::segment::{match_segment, SegmentKind, SegmentMatch};
use super::HttpMethod;
use crate::errors::{ConflictError, ConflictKind};
use std::collections::BTreeMap;

/// Value stored at a terminal node together with its pattern
#[derive(Debug)]
struct Terminal<T> {
    pattern: String,
    value: T,
}

#[derive(Debug)]
struct Node<T> {
    kind: SegmentKind,
    /// First pattern that created this node, for conflict messages
    origin: String,
    statics: BTreeMap<String, Node<T>>,
    /// Constrained parameters ordered by constraint key, unconstrained last
    params: Vec<Node<T>>,
    wildcard: Option<Box<Node<T>>>,
    terminal: Option<Terminal<T>>,
}

impl<T> Node<T> {
    fn new(kind: SegmentKind, origin: &str) -> Self {
        Self {
            kind,
            origin: origin.to_string(),
            statics: BTreeMap::new(),
            params: Vec::new(),
            wildcard: None,
            terminal: None,
        }
    }
}

/// Ordering of parameter siblings
fn param_rank(kind: &SegmentKind) -> (u8, String) {
    match kind {
        SegmentKind::Constrained { constraint, .. } => (0, constraint.key()),
        _ => (1, String::new()),
    }
}

/// A successful trie lookup
#[derive(Debug)]
pub struct TrieMatch<'t, T> {
    pub value: &'t T,
    /// Canonical pattern of the matched route
    pub pattern: &'t str,
    pub params: PathParams,
}

/// Route trie for one HTTP method (or for method-agnostic routes)
#[derive(Debug)]
pub struct RouteTrie<T> {
    method: Option<HttpMethod>,
    root: Node<T>,
    len: usize,
}

struct Frame<'t, T> {
    node: &'t Node<T>,
    depth: usize,
    cursor: usize,
    params_mark: usize,
}

impl<T> RouteTrie<T> {
    /// `method` is only used to describe conflicts
    pub fn new(method: Option<HttpMethod>) -> Self {
        Self {
            method,
            root: Node::new(SegmentKind::Static(String::new()), "/"),
            len: 0,
        }
    }

    pub fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    /// Number of registered routes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a route, creating nodes as needed
    pub fn insert(&mut self, pattern: &RoutePattern, value: T) -> Result<(), ConflictError> {
        let method = self.method;
        let canonical = pattern.canonical();
        let conflict = |kind, existing: &str| ConflictError {
            kind,
            method,
            pattern: pattern.original_path.clone(),
            existing: existing.to_string(),
        };

        let mut node = &mut self.root;
        for segment in &pattern.segments {
            node = match segment {
                SegmentKind::Static(text) => node
                    .statics
                    .entry(text.clone())
                    .or_insert_with(|| Node::new(segment.clone(), &canonical)),
                SegmentKind::Param(_) | SegmentKind::Constrained { .. } => {
                    if let Some(existing) = node.params.first() {
                        if existing.kind.name() != segment.name() {
                            return Err(conflict(ConflictKind::ParamNameMismatch, &existing.origin));
                        }
                    }

                    let index = match node.params.iter().position(|child| child.kind == *segment) {
                        Some(index) => index,
                        None => {
                            let rank = param_rank(segment);
                            let index = node
                                .params
                                .iter()
                                .position(|child| param_rank(&child.kind) > rank)
                                .unwrap_or(node.params.len());
                            node.params.insert(index, Node::new(segment.clone(), &canonical));
                            index
                        }
                    };
                    &mut node.params[index]
                }
                SegmentKind::Wildcard { .. } => {
                    if let Some(existing) = &node.wildcard {
                        if existing.kind != *segment {
                            return Err(conflict(ConflictKind::WildcardMismatch, &existing.origin));
                        }
                    }
                    node.wildcard
                        .get_or_insert_with(|| Box::new(Node::new(segment.clone(), &canonical)))
                        .as_mut()
                }
            };
        }

        if let Some(existing) = &node.terminal {
            return Err(conflict(ConflictKind::DuplicateRoute, &existing.pattern));
        }

        node.terminal = Some(Terminal {
            pattern: canonical,
            value,
        });
        self.len += 1;
        Ok(())
    }

    /// Consume the trie, returning every stored value
    pub fn into_values(self) -> Vec<T> {
        let mut values = Vec::with_capacity(self.len);
        let mut pending = vec![self.root];

        while let Some(node) = pending.pop() {
            if let Some(terminal) = node.terminal {
                values.push(terminal.value);
            }
            pending.extend(node.statics.into_values());
            pending.extend(node.params);
            if let Some(wildcard) = node.wildcard {
                pending.push(*wildcard);
            }
        }

        values
    }

    /// Find the highest priority route for already decoded path segments
    pub fn lookup<'t, S: AsRef<str>>(
        &'t self,
        segments: &[S],
        allow_traversal: bool,
    ) -> Option<TrieMatch<'t, T>> {
        let mut params = PathParams::with_capacity(4);
        let mut stack: Vec<Frame<'t, T>> = Vec::with_capacity(segments.len() + 1);
        stack.push(Frame {
            node: &self.root,
            depth: 0,
            cursor: 0,
            params_mark: 0,
        });

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            let depth = frame.depth;

            if depth == segments.len() {
                if let Some(terminal) = &node.terminal {
                    return Some(TrieMatch {
                        value: &terminal.value,
                        pattern: &terminal.pattern,
                        params,
                    });
                }
                stack.pop();
                continue;
            }

            params.truncate(frame.params_mark);
            let cursor = frame.cursor;
            frame.cursor += 1;

            let remaining = &segments[depth..];
            let child = if cursor == 0 {
                node.statics.get(remaining[0].as_ref())
            } else if cursor <= node.params.len() {
                node.params.get(cursor - 1)
            } else if cursor == node.params.len() + 1 {
                node.wildcard.as_deref()
            } else {
                stack.pop();
                continue;
            };
            let Some(child) = child else {
                continue;
            };

            match match_segment(&child.kind, remaining, allow_traversal) {
                SegmentMatch::ExactStatic => {
                    stack.push(Frame {
                        node: child,
                        depth: depth + 1,
                        cursor: 0,
                        params_mark: params.len(),
                    });
                }
                SegmentMatch::ParamCapture(value) => {
                    if let Some(constraint) = child.kind.constraint() {
                        if !validate(value, constraint) {
                            continue;
                        }
                    }
                    if let Some(name) = child.kind.name() {
                        params.push(name, value.to_string());
                    }
                    stack.push(Frame {
                        node: child,
                        depth: depth + 1,
                        cursor: 0,
                        params_mark: params.len(),
                    });
                }
                SegmentMatch::WildcardCapture(value) => {
                    if let Some(constraint) = child.kind.constraint() {
                        if !validate(&value, constraint) {
                            continue;
                        }
                    }
                    if let (Some(terminal), Some(name)) = (&child.terminal, child.kind.name()) {
                        params.push(name, value);
                        return Some(TrieMatch {
                            value: &terminal.value,
                            pattern: &terminal.pattern,
                            params,
                        });
                    }
                }
                SegmentMatch::NoMatch => {}
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::constraint::ConstraintTable;

    fn trie(routes: &[(&'static str, &str)]) -> RouteTrie<&'static str> {
        let table = ConstraintTable::new();
        let mut trie = RouteTrie::new(Some(HttpMethod::GET));
        for (id, path) in routes {
            let pattern = RoutePattern::parse(path, &table).unwrap();
            trie.insert(&pattern, *id).unwrap();
        }
        trie
    }

    fn find(trie: &RouteTrie<&'static str>, path: &str) -> Option<(&'static str, Vec<(String, String)>)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        trie.lookup(&segments, false).map(|m| {
            let params = m
                .params
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect();
            (*m.value, params)
        })
    }

    #[test]
    fn test_static_lookup() {
        let trie = trie(&[("root", "/"), ("users", "/users"), ("status", "/api/status")]);
        assert_eq!(find(&trie, "/").unwrap().0, "root");
        assert_eq!(find(&trie, "/users").unwrap(), ("users", vec![]));
        assert_eq!(find(&trie, "/api/status").unwrap().0, "status");
        assert!(find(&trie, "/api").is_none());
        assert!(find(&trie, "/api/status/extra").is_none());
    }

    #[test]
    fn test_priority_order() {
        let trie = trie(&[
            ("wild", "/files/*path"),
            ("param", "/files/:name"),
            ("int", "/files/:name<int>"),
            ("static", "/files/config.json"),
        ]);

        assert_eq!(find(&trie, "/files/config.json").unwrap().0, "static");
        assert_eq!(find(&trie, "/files/42").unwrap().0, "int");
        assert_eq!(find(&trie, "/files/readme.md").unwrap().0, "param");
        assert_eq!(find(&trie, "/files/docs/readme.md").unwrap().0, "wild");
    }

    #[test]
    fn test_backtracks_past_static_dead_end() {
        let trie = trie(&[("me", "/users/me"), ("posts", "/users/:id/posts")]);

        let (id, params) = find(&trie, "/users/me/posts").unwrap();
        assert_eq!(id, "posts");
        assert_eq!(params, vec![("id".to_string(), "me".to_string())]);
    }

    #[test]
    fn test_constraint_failure_deep_in_the_path() {
        let trie = trie(&[
            ("numeric", r"/a/:x/b/:y(\d+)"),
            ("fallback", "/a/*rest"),
        ]);

        assert_eq!(find(&trie, "/a/1/b/2").unwrap().0, "numeric");
        let (id, params) = find(&trie, "/a/1/b/z").unwrap();
        assert_eq!(id, "fallback");
        // captures from the abandoned branch are discarded
        assert_eq!(params, vec![("rest".to_string(), "1/b/z".to_string())]);
    }

    #[test]
    fn test_param_order_is_left_to_right() {
        let trie = trie(&[("comment", "/users/:user/posts/:post/comments/:comment")]);
        let (_, params) = find(&trie, "/users/u1/posts/p2/comments/c3").unwrap();
        let names: Vec<&str> = params.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["user", "post", "comment"]);
    }

    #[test]
    fn test_wildcard_requires_a_segment() {
        let trie = trie(&[("wild", "/files/*path")]);
        assert!(find(&trie, "/files").is_none());
        assert!(find(&trie, "/files/../secret").is_none());
    }

    #[test]
    fn test_conflicts() {
        let table = ConstraintTable::new();
        let mut trie = RouteTrie::new(Some(HttpMethod::GET));
        let parse = |p: &str| RoutePattern::parse(p, &table).unwrap();

        trie.insert(&parse("/users/:id"), 1).unwrap();
        let err = trie.insert(&parse("/users/:id"), 2).unwrap_err();
        assert_eq!(err.kind, ConflictKind::DuplicateRoute);

        let err = trie.insert(&parse("/users/:name/posts"), 3).unwrap_err();
        assert_eq!(err.kind, ConflictKind::ParamNameMismatch);
        assert_eq!(err.existing, "/users/:id");

        // same name with a constraint is a distinct, higher priority sibling
        trie.insert(&parse("/users/:id<int>"), 4).unwrap();

        trie.insert(&parse("/files/*path"), 5).unwrap();
        let err = trie.insert(&parse("/files/*rest"), 6).unwrap_err();
        assert_eq!(err.kind, ConflictKind::WildcardMismatch);

        assert_eq!(trie.len(), 3);
    }
}
