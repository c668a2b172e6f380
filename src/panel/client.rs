// Panel HTTP client - typed requests against the application API using an
// explicit configuration struct (base URL + application key). No retry or
// backoff policy lives here; callers own that.

use crate::egg::{Egg, Location, Nest, Node, PanelUser, Server};
use crate::panel::response::{ApiErrorBody, ApiList, ApiObject, EggAttributes};
use crate::panel::ApiErrorDetail;
use crate::provision::{
    ServerBuildUpdate, ServerDetailsUpdate, ServerParameterSet, ServerStartupUpdate,
    UserCreationParameters,
};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("panel request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("panel returned {status}: {}", summarize(.errors))]
    Api {
        status: StatusCode,
        errors: Vec<ApiErrorDetail>,
    },
}

fn summarize(errors: &[ApiErrorDetail]) -> String {
    if errors.is_empty() {
        return "no error detail".to_string();
    }
    errors
        .iter()
        .map(|e| e.detail.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Connection settings for one panel installation.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Base URL including scheme, e.g. `https://panel.example.com`.
    pub base_url: String,
    /// An application API key with read/write access.
    pub api_key: String,
}

pub struct PanelClient {
    http: Client,
    config: PanelConfig,
}

impl PanelClient {
    pub fn new(config: PanelConfig) -> Result<Self, PanelError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http, config })
    }

    fn url(&self, route: &str) -> String {
        format!(
            "{}/api/application/{}",
            self.config.base_url.trim_end_matches('/'),
            route
        )
    }

    async fn request<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        route: &str,
        body: Option<&B>,
    ) -> Result<T, PanelError> {
        let url = self.url(route);
        tracing::debug!(%method, %url, "panel request");

        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(&self.config.api_key)
            .header("Accept", "Application/vnd.pterodactyl.v1+json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let errors = response
                .json::<ApiErrorBody>()
                .await
                .map(|body| body.errors)
                .unwrap_or_default();
            tracing::warn!(%status, %url, "panel request rejected");
            return Err(PanelError::Api { status, errors });
        }

        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, route: &str) -> Result<T, PanelError> {
        self.request::<(), T>(Method::GET, route, None).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        route: &str,
        body: &B,
    ) -> Result<T, PanelError> {
        self.request(Method::POST, route, Some(body)).await
    }

    async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        route: &str,
        body: &B,
    ) -> Result<T, PanelError> {
        self.request(Method::PATCH, route, Some(body)).await
    }

    /// Sends a body-less POST for panel actions that return no payload.
    async fn post_action(&self, route: &str) -> Result<(), PanelError> {
        let url = self.url(route);
        tracing::debug!(%url, "panel action");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("Accept", "Application/vnd.pterodactyl.v1+json")
            .send()
            .await?;
        self.expect_empty(response).await
    }

    async fn delete(&self, route: &str) -> Result<(), PanelError> {
        let url = self.url(route);
        tracing::debug!(%url, "panel delete");
        let response = self
            .http
            .delete(&url)
            .bearer_auth(&self.config.api_key)
            .header("Accept", "Application/vnd.pterodactyl.v1+json")
            .send()
            .await?;
        self.expect_empty(response).await
    }

    async fn expect_empty(&self, response: reqwest::Response) -> Result<(), PanelError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let errors = response
            .json::<ApiErrorBody>()
            .await
            .map(|body| body.errors)
            .unwrap_or_default();
        Err(PanelError::Api { status, errors })
    }

    // ---- locations / nests / eggs / nodes ----

    pub async fn get_locations(&self) -> Result<Vec<Location>, PanelError> {
        let list: ApiList<Location> = self.get("locations").await?;
        Ok(list.into_attributes())
    }

    pub async fn get_nests(&self) -> Result<Vec<Nest>, PanelError> {
        let list: ApiList<Nest> = self.get("nests").await?;
        Ok(list.into_attributes())
    }

    pub async fn get_nodes(&self) -> Result<Vec<Node>, PanelError> {
        let list: ApiList<Node> = self.get("nodes").await?;
        Ok(list.into_attributes())
    }

    pub async fn get_eggs(&self, nest_id: u64) -> Result<Vec<Egg>, PanelError> {
        let list: ApiList<EggAttributes> = self
            .get(&format!("nests/{}/eggs?include=variables", nest_id))
            .await?;
        Ok(list.into_attributes().into_iter().map(Egg::from).collect())
    }

    /// Fetches one egg with its declared variables included.
    pub async fn get_egg(&self, nest_id: u64, egg_id: u64) -> Result<Egg, PanelError> {
        let envelope: ApiObject<EggAttributes> = self
            .get(&format!(
                "nests/{}/eggs/{}?include=variables",
                nest_id, egg_id
            ))
            .await?;
        Ok(envelope.attributes.into())
    }

    // ---- servers ----

    pub async fn get_server(&self, server_id: u64) -> Result<Server, PanelError> {
        let envelope: ApiObject<Server> = self.get(&format!("servers/{}", server_id)).await?;
        Ok(envelope.attributes)
    }

    pub async fn get_server_by_external_id(&self, external_id: &str) -> Result<Server, PanelError> {
        let envelope: ApiObject<Server> = self
            .get(&format!("servers/external/{}", external_id))
            .await?;
        Ok(envelope.attributes)
    }

    pub async fn create_server(&self, params: &ServerParameterSet) -> Result<Server, PanelError> {
        tracing::info!(name = %params.name, egg = params.egg, "creating panel server");
        let envelope: ApiObject<Server> = self.post("servers", params).await?;
        Ok(envelope.attributes)
    }

    pub async fn update_server_details(
        &self,
        server_id: u64,
        params: &ServerDetailsUpdate,
    ) -> Result<Server, PanelError> {
        let envelope: ApiObject<Server> = self
            .patch(&format!("servers/{}/details", server_id), params)
            .await?;
        Ok(envelope.attributes)
    }

    pub async fn update_server_build(
        &self,
        server_id: u64,
        params: &ServerBuildUpdate,
    ) -> Result<Server, PanelError> {
        let envelope: ApiObject<Server> = self
            .patch(&format!("servers/{}/build", server_id), params)
            .await?;
        Ok(envelope.attributes)
    }

    pub async fn update_server_startup(
        &self,
        server_id: u64,
        params: &ServerStartupUpdate,
    ) -> Result<Server, PanelError> {
        let envelope: ApiObject<Server> = self
            .patch(&format!("servers/{}/startup", server_id), params)
            .await?;
        Ok(envelope.attributes)
    }

    pub async fn suspend_server(&self, server_id: u64) -> Result<(), PanelError> {
        self.post_action(&format!("servers/{}/suspend", server_id))
            .await
    }

    pub async fn unsuspend_server(&self, server_id: u64) -> Result<(), PanelError> {
        self.post_action(&format!("servers/{}/unsuspend", server_id))
            .await
    }

    pub async fn reinstall_server(&self, server_id: u64) -> Result<(), PanelError> {
        self.post_action(&format!("servers/{}/reinstall", server_id))
            .await
    }

    pub async fn delete_server(&self, server_id: u64) -> Result<(), PanelError> {
        self.delete(&format!("servers/{}", server_id)).await
    }

    pub async fn force_delete_server(&self, server_id: u64) -> Result<(), PanelError> {
        self.delete(&format!("servers/{}/force", server_id)).await
    }

    // ---- users ----

    pub async fn get_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<PanelUser, PanelError> {
        let envelope: ApiObject<PanelUser> = self
            .get(&format!("users/external/{}", external_id))
            .await?;
        Ok(envelope.attributes)
    }

    pub async fn create_user(
        &self,
        params: &UserCreationParameters,
    ) -> Result<PanelUser, PanelError> {
        tracing::info!(email = %params.email, "creating panel user");
        let envelope: ApiObject<PanelUser> = self.post("users", params).await?;
        Ok(envelope.attributes)
    }

    pub async fn delete_user(&self, user_id: u64) -> Result<(), PanelError> {
        self.delete(&format!("users/{}", user_id)).await
    }
}
