// Rule vocabulary - the fixed catalog of validation rules egg authors may
// attach to a variable, and the error message each one produces.

use serde::Serialize;

/// Supported rule names. Wire names are snake_case (`digits_between`);
/// the camelCase aliases seen in some eggs are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    Required,
    Regex,
    Numeric,
    Integer,
    String,
    AlphaNum,
    AlphaDash,
    Url,
    Min,
    Max,
    Between,
    DigitsBetween,
}

impl RuleKind {
    pub fn from_wire(name: &str) -> Option<Self> {
        Some(match name {
            "required" => Self::Required,
            "regex" => Self::Regex,
            "numeric" => Self::Numeric,
            "integer" => Self::Integer,
            "string" => Self::String,
            "alpha_num" | "alphaNum" => Self::AlphaNum,
            "alpha_dash" | "alphaDash" => Self::AlphaDash,
            "url" => Self::Url,
            "min" => Self::Min,
            "max" => Self::Max,
            "between" => Self::Between,
            "digits_between" | "digitsBetween" => Self::DigitsBetween,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Regex => "regex",
            Self::Numeric => "numeric",
            Self::Integer => "integer",
            Self::String => "string",
            Self::AlphaNum => "alphaNum",
            Self::AlphaDash => "alphaDash",
            Self::Url => "url",
            Self::Min => "min",
            Self::Max => "max",
            Self::Between => "between",
            Self::DigitsBetween => "digitsBetween",
        }
    }
}

/// One parsed validation rule, ready for the generic rule executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleDescriptor {
    pub kind: RuleKind,
    /// Raw string parameters from the rule clause; numeric coercion
    /// happens at evaluation time.
    pub parameters: Vec<String>,
    /// Only enforce when the field has a non-empty submitted value. Set
    /// by the parser when the source string lacks a `required` clause.
    pub conditional: bool,
    pub message: String,
}

impl RuleDescriptor {
    /// Builds the descriptor for a recognized rule, with the error message
    /// templated from the field name and parameters.
    pub fn build(kind: RuleKind, field_name: &str, parameters: Vec<String>) -> Self {
        let message = message_for(kind, field_name, &parameters);
        Self {
            kind,
            parameters,
            conditional: false,
            message,
        }
    }

    pub(crate) fn param(&self, index: usize) -> &str {
        self.parameters.get(index).map(String::as_str).unwrap_or("")
    }
}

fn message_for(kind: RuleKind, field: &str, params: &[String]) -> String {
    let p = |i: usize| params.get(i).map(String::as_str).unwrap_or("");
    match kind {
        RuleKind::Required => format!("The {} field is required.", field),
        RuleKind::Regex => format!("The {} field must match the regex {}.", field, p(0)),
        RuleKind::Numeric => format!("The {} field must contain a number.", field),
        RuleKind::Integer => format!("The {} field must contain an integer.", field),
        RuleKind::String => format!("The {} field must contain a string.", field),
        RuleKind::AlphaNum => format!(
            "The {} field must contain only the following characters a-z, A-Z, or 0-9.",
            field
        ),
        RuleKind::AlphaDash => format!(
            "The {} field must contain only the following characters a-z, A-Z, 0-9, -, or _.",
            field
        ),
        RuleKind::Url => format!(
            "The {} field must contain a valid url (e.g. www.domain.com).",
            field
        ),
        RuleKind::Min => format!("The {} field must contain a minimum of {}.", field, p(0)),
        RuleKind::Max => format!("The {} field has a maximum of {}.", field, p(0)),
        RuleKind::Between => format!(
            "The {} field must contain a value between {} and {}.",
            field,
            p(0),
            p(1)
        ),
        RuleKind::DigitsBetween => format!(
            "The {} field must contain a value between {} and {} digits long.",
            field,
            p(0),
            p(1)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_map_to_kinds() {
        assert_eq!(RuleKind::from_wire("required"), Some(RuleKind::Required));
        assert_eq!(
            RuleKind::from_wire("digits_between"),
            Some(RuleKind::DigitsBetween)
        );
        assert_eq!(RuleKind::from_wire("alpha_num"), Some(RuleKind::AlphaNum));
        assert_eq!(RuleKind::from_wire("alphaDash"), Some(RuleKind::AlphaDash));
        assert_eq!(RuleKind::from_wire("sometimes"), None);
        assert_eq!(RuleKind::from_wire(""), None);
    }

    #[test]
    fn messages_are_parameterized() {
        let d = RuleDescriptor::build(
            RuleKind::Between,
            "Slots",
            vec!["1".to_string(), "100".to_string()],
        );
        assert_eq!(
            d.message,
            "The Slots field must contain a value between 1 and 100."
        );
        assert!(!d.conditional);

        let d = RuleDescriptor::build(RuleKind::Required, "Username", vec![]);
        assert_eq!(d.message, "The Username field is required.");
    }
}
