// Service field planning - decides which egg variables each audience may
// edit on the service form and what value to pre-fill.

use crate::egg::Egg;
use crate::provision::{PackageMeta, SubmittedFields};
use crate::rules::parse_variable_rules;
use serde::Serialize;

/// Who the service form is being rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Admin,
    Client,
}

/// One editable field in the rendered plan. `key` is the lower-cased
/// environment name the form posts under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldPlan {
    pub key: String,
    pub label: String,
    pub prefill: String,
    pub required: bool,
    pub help_text: String,
}

/// Computes the presentation plan for an egg's variables.
///
/// Admins see every variable; clients only see those the package flags
/// with `<lowercased_env>_display`. Prefill precedence: submitted value
/// (redisplay after a validation error), package default, egg default.
pub fn service_field_plan(
    egg: &Egg,
    meta: &PackageMeta,
    submitted: Option<&SubmittedFields>,
    audience: Audience,
) -> Vec<FieldPlan> {
    egg.variables
        .iter()
        .filter(|variable| match audience {
            Audience::Admin => true,
            Audience::Client => meta.displays_to_client(&variable.env_variable),
        })
        .map(|variable| {
            let key = variable.billing_key();
            let rules = parse_variable_rules(variable);
            let required = rules.is_required();

            let prefill = submitted
                .and_then(|s| s.field(&key))
                .or_else(|| meta.get_non_empty(&key))
                .unwrap_or(&variable.default_value)
                .to_string();

            FieldPlan {
                key,
                label: if required {
                    variable.name.clone()
                } else {
                    format!("{} (optional)", variable.name)
                },
                prefill,
                required,
                help_text: variable.description.clone(),
            }
        })
        .collect()
}
