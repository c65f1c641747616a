//! Route pattern parsing
//!
//! Patterns are parsed once at registration time. Supported syntax:
//! - `users` static text, percent-decoded like request segments
//! - `:id` parameter, `:id(\d+)` regex constraint, `:id<int>` named constraint
//! - `*path` wildcard, with the same optional constraint suffixes; must be last
//!
//! Empty segments are ignored, so `/users/` and `//users` equal `/users`.

use super::constraint::{Constraint, ConstraintTable};
use super::segment::SegmentKind;
use crate::errors::{RouteError, RouteResult};
use std::collections::HashSet;

/// Parsed route pattern
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePattern {
    /// The path string as registered
    pub original_path: String,
    pub segments: Vec<SegmentKind>,
    /// Parameter names in path order
    pub param_names: Vec<String>,
}

impl RoutePattern {
    /// Parse a route pattern, resolving `<name>` constraints from `table`
    pub fn parse(path: &str, table: &ConstraintTable) -> RouteResult<Self> {
        let raw_segments = split_segments(path)
            .map_err(|reason| RouteError::invalid_pattern(path, reason))?;

        let mut segments = Vec::with_capacity(raw_segments.len());
        for raw in raw_segments {
            segments.push(parse_segment(path, raw, table)?);
        }

        Self::from_segments(path.to_string(), segments)
    }

    /// Build a pattern from already parsed segments, re-validating it
    pub fn from_segments(original_path: String, segments: Vec<SegmentKind>) -> RouteResult<Self> {
        let mut seen = HashSet::new();
        let mut param_names = Vec::new();

        for (index, segment) in segments.iter().enumerate() {
            if matches!(segment, SegmentKind::Wildcard { .. }) && index != segments.len() - 1 {
                return Err(RouteError::invalid_pattern(
                    original_path,
                    "wildcard must be the last segment",
                ));
            }

            if let Some(name) = segment.name() {
                if !seen.insert(name.to_string()) {
                    return Err(RouteError::invalid_pattern(
                        original_path,
                        format!("duplicate parameter name '{}'", name),
                    ));
                }
                param_names.push(name.to_string());
            }
        }

        Ok(Self {
            original_path,
            segments,
            param_names,
        })
    }

    /// This pattern re-rooted under `prefix`
    pub fn prefixed(&self, prefix: &RoutePattern) -> RouteResult<Self> {
        let mut segments = prefix.segments.clone();
        segments.extend(self.segments.iter().cloned());
        Self::from_segments(join_paths(&prefix.original_path, &self.original_path), segments)
    }

    /// Canonical path, e.g. `/users/:id<int>`
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            out.push_str(&segment.to_pattern());
        }
        if out.is_empty() {
            out.push('/');
        }
        out
    }

    /// Check if this is a static route (no parameters or wildcard)
    pub fn is_static(&self) -> bool {
        self.segments
            .iter()
            .all(|seg| matches!(seg, SegmentKind::Static(_)))
    }

    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(SegmentKind::Wildcard { .. }))
    }
}

/// Concatenate two path strings with exactly one `/` between them
pub(crate) fn join_paths(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{}", path),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}/{}", prefix, path),
    }
}

/// Split on `/` outside of constraint parentheses
fn split_segments(path: &str) -> Result<Vec<&str>, String> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in path.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if depth > 0 => escaped = true,
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unbalanced ')'".to_string())?;
            }
            '/' if depth == 0 => {
                if i > start {
                    segments.push(&path[start..i]);
                }
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err("unbalanced '('".to_string());
    }
    if start < path.len() {
        segments.push(&path[start..]);
    }

    Ok(segments)
}

fn parse_segment(path: &str, raw: &str, table: &ConstraintTable) -> RouteResult<SegmentKind> {
    if let Some(rest) = raw.strip_prefix(':') {
        if rest.contains('/') {
            return Err(RouteError::InvalidConstraint {
                pattern: path.to_string(),
                reason: format!("parameter '{}' matches one segment and cannot contain '/'", rest),
            });
        }
        let (name, constraint) = parse_named(path, rest, table)?;
        Ok(match constraint {
            Some(constraint) => SegmentKind::Constrained { name, constraint },
            None => SegmentKind::Param(name),
        })
    } else if let Some(rest) = raw.strip_prefix('*') {
        let (name, constraint) = parse_named(path, rest, table)?;
        Ok(SegmentKind::Wildcard { name, constraint })
    } else {
        let text = urlencoding::decode(raw).map_err(|e| {
            RouteError::invalid_pattern(path, format!("invalid percent-encoding in '{}': {}", raw, e))
        })?;
        Ok(SegmentKind::Static(text.into_owned()))
    }
}

/// Parse `name`, `name(regex)` or `name<constraint>`
fn parse_named(
    path: &str,
    definition: &str,
    table: &ConstraintTable,
) -> RouteResult<(String, Option<Constraint>)> {
    let name_end = definition
        .find(|c| c == '(' || c == '<')
        .unwrap_or(definition.len());
    let name = &definition[..name_end];
    let suffix = &definition[name_end..];

    if name.is_empty() {
        return Err(RouteError::invalid_pattern(path, "parameter name cannot be empty"));
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(RouteError::invalid_pattern(
            path,
            format!("invalid parameter name '{}'", name),
        ));
    }

    let constraint = if suffix.is_empty() {
        None
    } else if let Some(regex) = suffix.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        let constraint = Constraint::regex(regex).map_err(|e| RouteError::InvalidConstraint {
            pattern: path.to_string(),
            reason: format!("invalid regex '{}': {}", regex, e),
        })?;
        Some(constraint)
    } else if let Some(named) = suffix.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        let constraint = table
            .get(named)
            .cloned()
            .ok_or_else(|| RouteError::UnknownConstraint {
                pattern: path.to_string(),
                name: named.to_string(),
            })?;
        Some(constraint)
    } else {
        return Err(RouteError::InvalidConstraint {
            pattern: path.to_string(),
            reason: format!("unrecognised constraint suffix '{}'", suffix),
        });
    };

    Ok((name.to_string(), constraint))
}
