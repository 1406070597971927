use anyhow::{Context, Result};
use async_trait::async_trait;
use pipeline_canvas::model::NodeType;
use reqwest::Client;
use url::Url;

use crate::config::ApiConfig;
use crate::dto::GraphPayload;

const GRAPH_ENDPOINT: &str = "transform/dbt_project/graph/";

/// Operations the canvas needs from the transform backend.
#[async_trait]
pub trait TransformApi: Send + Sync {
    /// Fetches the canonical project graph.
    async fn fetch_graph(&self) -> Result<GraphPayload>;

    /// Deletes a source-model node.
    async fn delete_model(&self, id: &str) -> Result<()>;

    /// Deletes an operation node.
    async fn delete_operation(&self, id: &str) -> Result<()>;

    /// Deletes a node through the endpoint matching its type.
    async fn delete_node(&self, id: &str, node_type: NodeType) -> Result<()> {
        match node_type {
            NodeType::SourceModel => self.delete_model(id).await,
            NodeType::Operation => self.delete_operation(id).await,
        }
    }
}

/// `reqwest`-backed implementation.
#[derive(Clone)]
pub struct HttpTransformApi {
    client: Client,
    config: ApiConfig,
}

impl HttpTransformApi {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn delete(&self, url: Url) -> Result<()> {
        tracing::debug!(%url, "DELETE");
        self.authorize(self.client.delete(url.clone()))
            .send()
            .await
            .with_context(|| format!("DELETE {} failed", url))?
            .error_for_status()
            .with_context(|| format!("DELETE {} rejected", url))?;
        Ok(())
    }
}

#[async_trait]
impl TransformApi for HttpTransformApi {
    #[tracing::instrument(skip(self))]
    async fn fetch_graph(&self) -> Result<GraphPayload> {
        let url = self.config.endpoint(GRAPH_ENDPOINT)?;
        let payload = self
            .authorize(self.client.get(url.clone()))
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("GET {} rejected", url))?
            .json::<GraphPayload>()
            .await
            .context("Invalid graph payload")?;

        tracing::debug!(
            nodes = payload.nodes.len(),
            edges = payload.edges.len(),
            "Fetched graph"
        );
        Ok(payload)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_model(&self, id: &str) -> Result<()> {
        let url = self
            .config
            .endpoint(&format!("transform/dbt_project/model/{}/", id))?;
        self.delete(url).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_operation(&self, id: &str) -> Result<()> {
        let url = self
            .config
            .endpoint(&format!("transform/dbt_project/model/operations/{}/", id))?;
        self.delete(url).await
    }
}
