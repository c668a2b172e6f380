// Rule evaluator - executes parsed rule descriptors against submitted
// values. Values are classified once into a tagged type so min/max/between
// branch on a decided shape instead of inspecting raw strings ad hoc.

use crate::rules::{RuleDescriptor, RuleKind, RuleSet};
use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    // Domain-or-URL: an optional scheme, dotted labels, optional port/path.
    Regex::new(r"(?i)^(https?://)?([a-z0-9]([a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,}(:\d+)?(/\S*)?$")
        .expect("url pattern is valid")
});

/// A submitted value classified by shape. Form input arrives as strings;
/// anything that parses as a number is treated numerically so `min:1` on a
/// slot count compares values, not string lengths.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Num(f64),
    List(Vec<String>),
}

impl FieldValue {
    /// Classifies one raw form value.
    pub fn ingest(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(n) => Self::Num(n),
            Err(_) => Self::Str(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Str(s) => s.is_empty(),
            Self::Num(_) => false,
            Self::List(items) => items.is_empty(),
        }
    }

    /// Textual rendering used by character-class rules.
    fn text(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Num(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Self::List(items) => items.join(","),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Str(s) => s.trim().parse().ok(),
            Self::List(_) => None,
        }
    }

    /// The magnitude min/max/between compare: numeric value, string
    /// length, or element count.
    fn size(&self) -> f64 {
        match self {
            Self::Num(n) => *n,
            Self::Str(s) => s.chars().count() as f64,
            Self::List(items) => items.len() as f64,
        }
    }
}

/// Outcome of checking one descriptor against one value.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Pass,
    Fail(String),
    /// The rule produced no verdict: a conditional rule on an empty field,
    /// or a rule whose parameters cannot be interpreted. Non-enforcement
    /// keeps template-author mistakes from blocking provisioning.
    Skip,
}

/// Runs a full rule set against an optionally-submitted value, returning
/// the failure messages in rule order.
pub fn run_rules(set: &RuleSet, raw: Option<&str>) -> Vec<String> {
    let value = raw.map(FieldValue::ingest);
    set.iter()
        .filter_map(|descriptor| match check_rule(descriptor, value.as_ref()) {
            Verdict::Fail(message) => Some(message),
            _ => None,
        })
        .collect()
}

/// Checks one descriptor. `None` means the field was not submitted at all.
pub fn check_rule(descriptor: &RuleDescriptor, value: Option<&FieldValue>) -> Verdict {
    let empty = value.map(FieldValue::is_empty).unwrap_or(true);

    if descriptor.kind == RuleKind::Required {
        return if empty {
            Verdict::Fail(descriptor.message.clone())
        } else {
            Verdict::Pass
        };
    }

    if empty {
        // Conditional rules only apply to filled-in fields. Unconditional
        // non-required rules still see the empty value below.
        if descriptor.conditional {
            return Verdict::Skip;
        }
    }

    let value = match value {
        Some(v) => v,
        None => return Verdict::Skip,
    };

    let pass = match descriptor.kind {
        // Handled by the early return above.
        RuleKind::Required => true,
        RuleKind::Regex => match compile_rule_pattern(descriptor.param(0)) {
            Some(re) => re.is_match(&value.text()),
            None => {
                tracing::warn!(
                    pattern = descriptor.param(0),
                    "skipping regex rule with uncompilable pattern"
                );
                return Verdict::Skip;
            }
        },
        RuleKind::Numeric => value.as_number().is_some(),
        RuleKind::Integer => match value.as_number() {
            Some(n) => n.fract() == 0.0,
            None => false,
        },
        RuleKind::String => matches!(value, FieldValue::Str(_)),
        RuleKind::AlphaNum => {
            let text = value.text();
            !text.is_empty() && text.chars().all(|c| c.is_ascii_alphanumeric())
        }
        RuleKind::AlphaDash => {
            let text = value.text();
            let stripped: String = text.chars().filter(|c| *c != '-' && *c != '_').collect();
            !text.is_empty() && stripped.chars().all(|c| c.is_ascii_alphanumeric())
        }
        RuleKind::Url => URL_RE.is_match(value.text().trim()),
        RuleKind::Min => match parse_bound(descriptor.param(0)) {
            Some(min) => value.size() >= min,
            None => return Verdict::Skip,
        },
        RuleKind::Max => match parse_bound(descriptor.param(0)) {
            Some(max) => value.size() <= max,
            None => return Verdict::Skip,
        },
        RuleKind::Between => match (parse_bound(descriptor.param(0)), parse_bound(descriptor.param(1))) {
            (Some(lo), Some(hi)) => {
                let size = value.size();
                size >= lo && size <= hi
            }
            _ => return Verdict::Skip,
        },
        RuleKind::DigitsBetween => {
            match (parse_bound(descriptor.param(0)), parse_bound(descriptor.param(1))) {
                (Some(lo), Some(hi)) => {
                    let text = value.text();
                    let digits = text.strip_prefix('-').unwrap_or(&text);
                    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                        false
                    } else {
                        let len = digits.chars().count() as f64;
                        len >= lo && len <= hi
                    }
                }
                _ => return Verdict::Skip,
            }
        }
    };

    if pass {
        Verdict::Pass
    } else {
        Verdict::Fail(descriptor.message.clone())
    }
}

fn parse_bound(raw: &str) -> Option<f64> {
    raw.trim().parse().ok()
}

/// Compiles a `/pattern/flags` rule parameter into a `Regex`. Only the `i`
/// flag is honored; other PCRE modifiers have no engine-level equivalent
/// here and are ignored.
fn compile_rule_pattern(param: &str) -> Option<Regex> {
    let start = param.find('/')?;
    let end = param.rfind('/')?;
    if end <= start {
        return None;
    }
    let body = &param[start + 1..end];
    let flags = &param[end + 1..];

    let pattern = if flags.contains('i') {
        format!("(?i){}", body)
    } else {
        body.to_string()
    };
    Regex::new(&pattern).ok()
}
