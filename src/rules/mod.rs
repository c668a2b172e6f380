// Rule engine - parses egg variable rule strings into validation descriptors
// and evaluates them against submitted field values.

mod eval;
mod parser;
mod vocabulary;

pub use eval::{check_rule, run_rules, FieldValue, Verdict};
pub use parser::{parse_rule_string, parse_rule_string_strict, parse_variable_rules};
pub use vocabulary::{RuleDescriptor, RuleKind};

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RuleError {
    #[error("unknown rule '{name}' on field '{field}'")]
    UnknownRule { name: String, field: String },
}

/// An ordered set of parsed rule descriptors for one field.
///
/// Insertion order follows the source rule string; re-inserting a rule of
/// the same kind replaces the earlier descriptor in place, matching the
/// keyed-array behavior billing frameworks expect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    descriptors: Vec<RuleDescriptor>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, descriptor: RuleDescriptor) {
        match self.descriptors.iter_mut().find(|d| d.kind == descriptor.kind) {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    pub fn get(&self, kind: RuleKind) -> Option<&RuleDescriptor> {
        self.descriptors.iter().find(|d| d.kind == kind)
    }

    /// Whether the source rule string declared the field mandatory.
    pub fn is_required(&self) -> bool {
        self.get(RuleKind::Required).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Marks every descriptor conditional. Applied by the parser when the
    /// source string carries no `required` clause, so that constraints are
    /// only enforced when the field was actually filled in.
    pub(crate) fn relax(&mut self) {
        for descriptor in &mut self.descriptors {
            descriptor.conditional = true;
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a RuleDescriptor;
    type IntoIter = std::slice::Iter<'a, RuleDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}
