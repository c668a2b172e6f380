// Panel client - thin async wrapper over the Pterodactyl application API.
// The provisioning core never calls into this module; callers fetch egg
// definitions here, run the pure resolvers, then submit the payloads here.

mod client;
mod response;

pub use client::{PanelClient, PanelConfig, PanelError};
pub use response::{ApiErrorDetail, ApiList, ApiObject};
