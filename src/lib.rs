// ptero-provision - billing-side provisioning core for Pterodactyl panels
//
// Translates billing events (service add/edit) into panel server parameters,
// and panel egg definitions into validation rules and service form plans.
// All of the interesting logic is pure computation over in-memory data; the
// only I/O lives in the `panel` client module.

pub mod egg;
pub mod panel;
pub mod provision;
pub mod rules;

pub use egg::{Egg, EggVariable};
pub use panel::{PanelClient, PanelConfig, PanelError};
pub use provision::{
    service_field_plan, Audience, BillingClient, FieldPlan, PackageMeta, ParameterResolver,
    PersistedFields, ServerParameterSet, SubmittedFields,
};
pub use rules::{parse_rule_string, FieldValue, RuleDescriptor, RuleKind, RuleSet};
