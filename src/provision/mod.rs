// Provisioning - merges package meta, submitted fields, persisted fields
// and egg defaults into outbound panel parameters, and plans which egg
// variables each audience gets to edit.

mod fields;
mod meta;
mod params;

pub use fields::{service_field_plan, Audience, FieldPlan};
pub use meta::{BillingClient, PackageMeta, PersistedFields, SubmittedFields};
pub use params::{
    parse_port_ranges, user_creation_parameters, DeployDirectives, FeatureLimits,
    ParameterResolver, PortRange, ServerBuildUpdate, ServerDetailsUpdate, ServerLimits,
    ServerParameterSet, ServerStartupUpdate, UserCreationParameters,
};
