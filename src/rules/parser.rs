// Rule string parser - turns a pipe-delimited egg rule expression into a
// RuleSet. Embedded `regex:/.../` clauses may contain `|` and `:`, which
// would corrupt a naive split, so regex bodies are lifted out into
// placeholders first and restored after clause splitting.

use crate::egg::EggVariable;
use crate::rules::{RuleDescriptor, RuleError, RuleKind, RuleSet};

const REGEX_PLACEHOLDER: &str = "__ptero_regex__";

/// Parses the rule string of an egg variable using the variable's display
/// name for error messages.
pub fn parse_variable_rules(variable: &EggVariable) -> RuleSet {
    parse_rule_string(&variable.name, &variable.rules)
}

/// Parses a raw rule string into descriptors, silently dropping clauses
/// whose rule name is not in the vocabulary.
pub fn parse_rule_string(field_name: &str, raw: &str) -> RuleSet {
    parse_inner(field_name, raw, false).unwrap_or_default()
}

/// Like `parse_rule_string`, but surfaces unrecognized rule names as an
/// error instead of dropping them. Intended for egg-import tooling that
/// wants to catch template-author typos early.
pub fn parse_rule_string_strict(field_name: &str, raw: &str) -> Result<RuleSet, RuleError> {
    parse_inner(field_name, raw, true)
}

fn parse_inner(field_name: &str, raw: &str, strict: bool) -> Result<RuleSet, RuleError> {
    let mut set = RuleSet::new();
    if raw.trim().is_empty() {
        return Ok(set);
    }

    let (substituted, mut regex_bodies) = extract_regex_bodies(raw);

    for clause in substituted.split('|') {
        if clause.is_empty() {
            continue;
        }

        let (name, param_list) = match clause.split_once(':') {
            Some((name, params)) => (name, Some(params)),
            None => (clause, None),
        };

        let kind = match RuleKind::from_wire(name) {
            Some(kind) => kind,
            None => {
                if strict {
                    return Err(RuleError::UnknownRule {
                        name: name.to_string(),
                        field: field_name.to_string(),
                    });
                }
                tracing::debug!(rule = name, field = field_name, "dropping unrecognized rule");
                continue;
            }
        };

        let parameters: Vec<String> = match param_list {
            Some(params) => params
                .split(',')
                // Placeholders are consumed in the order the regex bodies
                // were extracted from the source string.
                .map(|p| {
                    if p == REGEX_PLACEHOLDER && !regex_bodies.is_empty() {
                        regex_bodies.remove(0)
                    } else {
                        p.to_string()
                    }
                })
                .collect(),
            None => Vec::new(),
        };

        set.insert(RuleDescriptor::build(kind, field_name, parameters));
    }

    // Without an explicit `required` clause every constraint only applies
    // when the client actually filled the field in.
    if !set.is_required() {
        set.relax();
    }

    Ok(set)
}

/// Lifts every `regex:/.../` body out of the rule string, replacing it with
/// a placeholder token, and returns the rewritten string plus the bodies in
/// extraction order. A body ends at the first `/` that is followed by a
/// clause separator or the end of the string, so `|` and `:` inside the
/// pattern survive intact.
fn extract_regex_bodies(raw: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(raw.len());
    let mut bodies = Vec::new();
    let mut rest = raw;

    while let Some(pos) = rest.find("regex:/") {
        let body_start = pos + "regex:".len();
        out.push_str(&rest[..pos]);

        match find_regex_end(&rest[body_start..]) {
            Some(end) => {
                // Body includes its delimiters and any trailing flag
                // letters, e.g. `/^[a-z]+$/i`.
                bodies.push(rest[body_start..body_start + end + 1].to_string());
                out.push_str("regex:");
                out.push_str(REGEX_PLACEHOLDER);
                rest = &rest[body_start + end + 1..];
            }
            None => {
                // Unterminated pattern; leave the clause as-is and let the
                // clause parser deal with whatever is left.
                out.push_str(&rest[pos..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    (out, bodies)
}

/// Finds the inclusive end index (within `tail`, which starts at the
/// opening `/`) of a regex clause: a closing `/`, optionally followed by
/// flag letters, that runs up against a `|` separator or the end of the
/// string.
fn find_regex_end(tail: &str) -> Option<usize> {
    let bytes = tail.as_bytes();
    for (i, &b) in bytes.iter().enumerate().skip(1) {
        if b != b'/' {
            continue;
        }
        let mut j = i + 1;
        while j < bytes.len() && bytes[j].is_ascii_alphabetic() {
            j += 1;
        }
        if j == bytes.len() || bytes[j] == b'|' {
            return Some(j - 1);
        }
    }
    None
}
