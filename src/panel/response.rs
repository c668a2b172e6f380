// Response envelopes - the panel wraps every resource in an
// {"object": ..., "attributes": ...} envelope and every collection in a
// {"object": "list", "data": [...]} envelope.

use crate::egg::{Egg, EggVariable};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiObject<T> {
    #[serde(default)]
    pub object: String,
    pub attributes: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiList<T> {
    #[serde(default)]
    pub object: String,
    pub data: Vec<ApiObject<T>>,
}

impl<T> ApiList<T> {
    /// Unwraps every item's attributes.
    pub fn into_attributes(self) -> Vec<T> {
        self.data.into_iter().map(|item| item.attributes).collect()
    }
}

/// One entry of the panel's error payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

/// Egg attributes as served by `GET /nests/{nest}/eggs/{egg}?include=variables`,
/// with the variable list nested under a relationship envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EggAttributes {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub docker_image: String,
    pub startup: String,
    #[serde(default)]
    pub relationships: Option<EggRelationships>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EggRelationships {
    pub variables: ApiList<EggVariable>,
}

impl From<EggAttributes> for Egg {
    fn from(attributes: EggAttributes) -> Self {
        Egg {
            id: attributes.id,
            name: attributes.name,
            description: attributes.description,
            docker_image: attributes.docker_image,
            startup: attributes.startup,
            variables: attributes
                .relationships
                .map(|r| r.variables.into_attributes())
                .unwrap_or_default(),
        }
    }
}
