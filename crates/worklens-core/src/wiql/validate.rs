//! Defensive repair of WIQL produced by an untrusted upstream generator.
//!
//! # Overview
//!
//! The backend grammar allows only exact match (`=`, `<>`) and
//! hierarchical-under match (`UNDER`) on `[System.IterationPath]`.
//! AI-generated queries regularly apply `CONTAINS` to that field, which the
//! backend rejects with a client error. Rather than failing the whole chat
//! turn, this module rewrites each illegal fragment into the closest legal
//! predicate.
//!
//! # Design
//!
//! - **Repair, don't reject**: an illegal fragment is a generator bug, not a
//!   user error. The corrector always terminates with a legal query.
//! - **Quote-aware scan**: the query is walked linearly; text inside string
//!   literals is never matched as a field reference, so a title search for
//!   the literal text `[System.IterationPath]` survives untouched.
//! - **Monotone-safe**: only illegal constructs are replaced, nothing else
//!   is touched. Running the corrector on its own output is a no-op.
//!
//! Per occurrence the replacement is resolved in order:
//!
//! 1. the searched term names a known sprint (by name or path suffix) —
//!    `UNDER` that sprint's full path;
//! 2. the term names a path segment of a known sprint (an area/team) —
//!    `UNDER` the path prefix ending at that segment;
//! 3. otherwise — the permissive non-empty predicate
//!    `[System.IterationPath] <> ''`.

use tracing::warn;

use crate::model::Sprint;

/// The field whose substring matching the backend grammar forbids.
const ITERATION_PATH_FIELD: &str = "[System.IterationPath]";

/// The permissive predicate used when no sprint mapping exists.
const NON_EMPTY_PREDICATE: &str = "[System.IterationPath] <> ''";

/// Outcome of validating (and possibly repairing) one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery {
    /// The legal query: either the input verbatim or a repaired copy.
    pub query: String,
    /// `true` when at least one fragment was rewritten.
    pub was_fixed: bool,
    /// Human-readable summary of the applied fixes; `None` when untouched.
    pub fix_reason: Option<String>,
}

/// Validate `query` against the iteration-path grammar restriction and
/// rewrite every illegal fragment.
///
/// `scope` names the project or organization the query runs under and only
/// appears in the fix summary. `sprints` is the (possibly empty) cached
/// sprint list used to resolve searched terms into real iteration paths.
#[must_use]
pub fn validate_and_fix_query(query: &str, scope: &str, sprints: &[Sprint]) -> ValidatedQuery {
    let mut out = String::with_capacity(query.len());
    let mut reasons: Vec<String> = Vec::new();
    let mut cursor = 0;
    let bytes = query.as_bytes();

    while cursor < bytes.len() {
        // Skip string literals wholesale; field names inside them are data.
        if bytes[cursor] == b'\'' {
            match literal_end(query, cursor) {
                Some(end) => {
                    out.push_str(&query[cursor..end]);
                    cursor = end;
                }
                None => {
                    // Unterminated literal: nothing after it can be parsed,
                    // and the backend would reject it. Keep the tail as-is;
                    // it contains no field reference we could mis-rewrite.
                    out.push_str(&query[cursor..]);
                    cursor = bytes.len();
                }
            }
            continue;
        }

        if !matches_field_at(query, cursor) {
            let ch_len = query[cursor..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            out.push_str(&query[cursor..cursor + ch_len]);
            cursor += ch_len;
            continue;
        }

        // Field reference found; decide whether the operator is illegal.
        let after_field = cursor + ITERATION_PATH_FIELD.len();
        match parse_contains_fragment(query, after_field) {
            Some(fragment) => {
                let (replacement, reason) = resolve_replacement(&fragment, sprints);
                warn!(
                    scope,
                    term = fragment.term.as_deref().unwrap_or("<unparsed>"),
                    %replacement,
                    "rewrote illegal iteration-path fragment"
                );
                out.push_str(&replacement);
                reasons.push(reason);
                cursor = fragment.end;
            }
            None => {
                out.push_str(ITERATION_PATH_FIELD);
                cursor = after_field;
            }
        }
    }

    if reasons.is_empty() {
        ValidatedQuery {
            query: out,
            was_fixed: false,
            fix_reason: None,
        }
    } else {
        let summary = format!(
            "iteration path does not support substring match in '{scope}': {}",
            reasons.join("; ")
        );
        ValidatedQuery {
            query: out,
            was_fixed: true,
            fix_reason: Some(summary),
        }
    }
}

/// One illegal `CONTAINS` fragment: byte range and the searched term.
struct ContainsFragment {
    /// Byte offset one past the end of the fragment in the original query.
    end: usize,
    /// The searched term with quote escapes undone; `None` when the literal
    /// was malformed (unterminated quote).
    term: Option<String>,
    /// Whether the operator was negated (`NOT CONTAINS`).
    negated: bool,
}

/// Try to parse `[NOT] CONTAINS [WORDS] '<term>'` starting at `pos`
/// (immediately after the field name). Returns `None` when the operator at
/// this position is something else, i.e. the fragment is already legal.
fn parse_contains_fragment(query: &str, pos: usize) -> Option<ContainsFragment> {
    let mut cursor = skip_spaces(query, pos);

    let negated = if let Some(after) = keyword_at(query, cursor, "NOT") {
        cursor = skip_spaces(query, after);
        true
    } else {
        false
    };

    let after_contains = keyword_at(query, cursor, "CONTAINS")?;
    cursor = skip_spaces(query, after_contains);

    if let Some(after_words) = keyword_at(query, cursor, "WORDS") {
        cursor = skip_spaces(query, after_words);
    }

    if query.as_bytes().get(cursor) != Some(&b'\'') {
        // Operator present but no literal follows; replace through the
        // operator and let the caller's permissive predicate stand in.
        return Some(ContainsFragment {
            end: cursor,
            term: None,
            negated,
        });
    }

    match literal_end(query, cursor) {
        Some(end) => {
            let raw = &query[cursor + 1..end - 1];
            Some(ContainsFragment {
                end,
                term: Some(raw.replace("''", "'")),
                negated,
            })
        }
        None => Some(ContainsFragment {
            // Unterminated literal: consume the rest of the query so the
            // repaired output ends with a legal predicate.
            end: query.len(),
            term: None,
            negated,
        }),
    }
}

/// Pick the legal replacement predicate for one fragment.
fn resolve_replacement(fragment: &ContainsFragment, sprints: &[Sprint]) -> (String, String) {
    // A negated substring match has no faithful UNDER equivalent; the
    // permissive predicate is the only rewrite that cannot over-restrict.
    if fragment.negated {
        return (
            NON_EMPTY_PREDICATE.to_string(),
            "negated substring match replaced with non-empty check".to_string(),
        );
    }

    let Some(term) = fragment.term.as_deref().map(str::trim).filter(|t| !t.is_empty())
    else {
        return (
            NON_EMPTY_PREDICATE.to_string(),
            "malformed substring match replaced with non-empty check".to_string(),
        );
    };

    if let Some(path) = sprint_path_for_term(term, sprints) {
        let predicate = format!("[System.IterationPath] UNDER '{}'", path.replace('\'', "''"));
        let reason = format!("'{term}' resolved to iteration path '{path}'");
        return (predicate, reason);
    }

    if let Some(prefix) = segment_path_for_term(term, sprints) {
        let predicate = format!(
            "[System.IterationPath] UNDER '{}'",
            prefix.replace('\'', "''")
        );
        let reason = format!("'{term}' matched path segment, scoped under '{prefix}'");
        return (predicate, reason);
    }

    (
        NON_EMPTY_PREDICATE.to_string(),
        format!("'{term}' matched no known sprint, replaced with non-empty check"),
    )
}

/// Resolve `term` against whole sprints: name match, exact path match, or
/// final path segment match. First hit wins (caller-supplied order).
fn sprint_path_for_term(term: &str, sprints: &[Sprint]) -> Option<String> {
    sprints
        .iter()
        .find(|sprint| {
            sprint.name.eq_ignore_ascii_case(term)
                || sprint.path.eq_ignore_ascii_case(term)
                || sprint
                    .path_segments()
                    .last()
                    .is_some_and(|leaf| leaf.eq_ignore_ascii_case(term))
        })
        .map(|sprint| sprint.path.clone())
}

/// Resolve `term` against intermediate path segments (area/team names),
/// yielding the prefix that covers that segment's whole subtree.
fn segment_path_for_term(term: &str, sprints: &[Sprint]) -> Option<String> {
    sprints
        .iter()
        .find_map(|sprint| sprint.path_through_segment(term))
}

/// Byte offset one past the closing quote of the literal starting at
/// `start` (which must point at `'`). Doubled quotes are escapes.
fn literal_end(query: &str, start: usize) -> Option<usize> {
    let bytes = query.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Some(i + 1);
        }
        i += 1;
    }
    None
}

/// Whether the iteration-path field name occurs at `pos`, case-insensitively.
fn matches_field_at(query: &str, pos: usize) -> bool {
    query
        .get(pos..pos + ITERATION_PATH_FIELD.len())
        .is_some_and(|slice| slice.eq_ignore_ascii_case(ITERATION_PATH_FIELD))
}

/// Whether `keyword` occurs at `pos` as a standalone word; returns the
/// offset one past it when it does.
fn keyword_at(query: &str, pos: usize, keyword: &str) -> Option<usize> {
    let end = pos + keyword.len();
    let slice = query.get(pos..end)?;
    if !slice.eq_ignore_ascii_case(keyword) {
        return None;
    }
    // Must not run into a longer identifier.
    match query.as_bytes().get(end) {
        Some(b) if b.is_ascii_alphanumeric() || *b == b'_' => None,
        _ => Some(end),
    }
}

fn skip_spaces(query: &str, pos: usize) -> usize {
    let bytes = query.as_bytes();
    let mut i = pos;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}
