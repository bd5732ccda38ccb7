//! REST client for the bare metal service.
//!
//! Metal inventories are small enough that the API serves them unpaged;
//! everything is addressed underneath the workspace the scope names.

use serde::Deserialize;

use poolsweep_common::MetalScope;

use super::context::StratusContext;
use super::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    /// Cloud resource name, the handle the tagging service keys on.
    pub crn: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetalInstance {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetalNetwork {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkPort {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct InstanceList {
    #[serde(default)]
    instances: Vec<MetalInstance>,
}

#[derive(Debug, Deserialize)]
struct NetworkList {
    #[serde(default)]
    networks: Vec<MetalNetwork>,
}

#[derive(Debug, Deserialize)]
struct PortList {
    #[serde(default)]
    ports: Vec<NetworkPort>,
}

/// Client for one workspace of the bare metal service.
#[derive(Debug, Clone)]
pub struct MetalClient {
    ctx: StratusContext,
    base: String,
    scope: MetalScope,
}

impl MetalClient {
    pub fn new(ctx: &StratusContext, scope: MetalScope) -> Self {
        let base = ctx.metal_endpoint(&scope.zone);
        Self {
            ctx: ctx.clone(),
            base,
            scope,
        }
    }

    fn workspace_url(&self) -> String {
        format!("{}/workspaces/{}", self.base, self.scope.workspace_id)
    }

    /// Details of the scoped workspace, including its CRN.
    pub async fn workspace(&self) -> Result<Workspace, ApiError> {
        self.ctx.get_json(&self.workspace_url(), &[]).await
    }

    pub async fn list_instances(&self) -> Result<Vec<MetalInstance>, ApiError> {
        let list: InstanceList = self
            .ctx
            .get_json(&format!("{}/instances", self.workspace_url()), &[])
            .await?;
        Ok(list.instances)
    }

    pub async fn delete_instance(&self, id: &str) -> Result<(), ApiError> {
        self.ctx
            .delete(&format!("{}/instances/{id}", self.workspace_url()))
            .await
    }

    pub async fn list_networks(&self) -> Result<Vec<MetalNetwork>, ApiError> {
        let list: NetworkList = self
            .ctx
            .get_json(&format!("{}/networks", self.workspace_url()), &[])
            .await?;
        Ok(list.networks)
    }

    /// Ports still attached to a network; they block network deletion.
    pub async fn list_ports(&self, network_id: &str) -> Result<Vec<NetworkPort>, ApiError> {
        let list: PortList = self
            .ctx
            .get_json(
                &format!("{}/networks/{network_id}/ports", self.workspace_url()),
                &[],
            )
            .await?;
        Ok(list.ports)
    }

    pub async fn delete_port(&self, network_id: &str, port_id: &str) -> Result<(), ApiError> {
        self.ctx
            .delete(&format!(
                "{}/networks/{network_id}/ports/{port_id}",
                self.workspace_url()
            ))
            .await
    }

    pub async fn delete_network(&self, network_id: &str) -> Result<(), ApiError> {
        self.ctx
            .delete(&format!("{}/networks/{network_id}", self.workspace_url()))
            .await
    }
}
