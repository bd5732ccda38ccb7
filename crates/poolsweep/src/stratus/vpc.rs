//! REST client for the VPC family of services.
//!
//! Every call is confined to the scope a pooled resource carries: listings
//! filter on the resource group (and network, where the API supports it),
//! deletions only ever receive identifiers from those listings.

use serde::Deserialize;

use poolsweep_common::VpcScope;

use super::context::StratusContext;
use super::error::ApiError;
use super::paging::{Page, CURSOR_PARAM};

/// Reference to another entity by id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntityRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VpcInstance {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subnet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub vpc: Option<EntityRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublicGateway {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FloatingIp {
    pub id: String,
    pub name: String,
    /// Interface the address is bound to, absent when unbound.
    #[serde(default)]
    pub target: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadBalancer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subnets: Vec<EntityRef>,
    #[serde(default)]
    pub resource_group: Option<EntityRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Vpc {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct Href {
    href: String,
}

#[derive(Debug, Deserialize)]
struct InstancePage {
    #[serde(default)]
    instances: Vec<VpcInstance>,
    next: Option<Href>,
}

#[derive(Debug, Deserialize)]
struct SubnetPage {
    #[serde(default)]
    subnets: Vec<Subnet>,
    next: Option<Href>,
}

#[derive(Debug, Deserialize)]
struct FloatingIpPage {
    #[serde(default)]
    floating_ips: Vec<FloatingIp>,
    next: Option<Href>,
}

#[derive(Debug, Deserialize)]
struct LoadBalancerPage {
    #[serde(default)]
    load_balancers: Vec<LoadBalancer>,
    next: Option<Href>,
}

#[derive(Debug, Deserialize)]
struct VpcPage {
    #[serde(default)]
    vpcs: Vec<Vpc>,
    next: Option<Href>,
}

/// Client for one region and resource group of the VPC service.
#[derive(Debug, Clone)]
pub struct VpcClient {
    ctx: StratusContext,
    base: String,
    scope: VpcScope,
}

impl VpcClient {
    pub fn new(ctx: &StratusContext, scope: VpcScope) -> Self {
        let base = ctx.vpc_endpoint(&scope.region);
        Self {
            ctx: ctx.clone(),
            base,
            scope,
        }
    }

    pub fn scope(&self) -> &VpcScope {
        &self.scope
    }

    fn group_query(&self, cursor: Option<String>) -> Vec<(&'static str, String)> {
        let mut query = vec![("resource_group.id", self.scope.resource_group.clone())];
        if let Some(cursor) = cursor {
            query.push((CURSOR_PARAM, cursor));
        }
        query
    }

    pub async fn list_instances(
        &self,
        cursor: Option<String>,
    ) -> Result<Page<VpcInstance>, ApiError> {
        let url = format!("{}/instances", self.base);
        let page: InstancePage = self.ctx.get_json(&url, &self.group_query(cursor)).await?;
        Ok(Page {
            items: page.instances,
            next: page.next.map(|n| n.href),
        })
    }

    pub async fn delete_instance(&self, id: &str) -> Result<(), ApiError> {
        self.ctx
            .delete(&format!("{}/instances/{id}", self.base))
            .await
    }

    /// List the scoped subnets, narrowed to the protected network when the
    /// scope names one.
    pub async fn list_subnets(&self, cursor: Option<String>) -> Result<Page<Subnet>, ApiError> {
        let mut query = self.group_query(cursor);
        if let Some(vpc_id) = &self.scope.vpc_id {
            query.push(("vpc.id", vpc_id.clone()));
        }
        let url = format!("{}/subnets", self.base);
        let page: SubnetPage = self.ctx.get_json(&url, &query).await?;
        Ok(Page {
            items: page.subnets,
            next: page.next.map(|n| n.href),
        })
    }

    pub async fn subnet(&self, id: &str) -> Result<Subnet, ApiError> {
        self.ctx
            .get_json(&format!("{}/subnets/{id}", self.base), &[])
            .await
    }

    pub async fn delete_subnet(&self, id: &str) -> Result<(), ApiError> {
        self.ctx.delete(&format!("{}/subnets/{id}", self.base)).await
    }

    /// Gateway attached to a subnet; a not-found error means none is.
    pub async fn subnet_public_gateway(&self, id: &str) -> Result<PublicGateway, ApiError> {
        self.ctx
            .get_json(&format!("{}/subnets/{id}/public_gateway", self.base), &[])
            .await
    }

    pub async fn detach_subnet_public_gateway(&self, id: &str) -> Result<(), ApiError> {
        self.ctx
            .delete(&format!("{}/subnets/{id}/public_gateway", self.base))
            .await
    }

    pub async fn delete_public_gateway(&self, id: &str) -> Result<(), ApiError> {
        self.ctx
            .delete(&format!("{}/public_gateways/{id}", self.base))
            .await
    }

    pub async fn list_floating_ips(
        &self,
        cursor: Option<String>,
    ) -> Result<Page<FloatingIp>, ApiError> {
        let url = format!("{}/floating_ips", self.base);
        let page: FloatingIpPage = self.ctx.get_json(&url, &self.group_query(cursor)).await?;
        Ok(Page {
            items: page.floating_ips,
            next: page.next.map(|n| n.href),
        })
    }

    pub async fn delete_floating_ip(&self, id: &str) -> Result<(), ApiError> {
        self.ctx
            .delete(&format!("{}/floating_ips/{id}", self.base))
            .await
    }

    /// List every load balancer in the region.
    ///
    /// The load balancer API cannot filter server-side; scope filtering
    /// happens in the teardown step.
    pub async fn list_load_balancers(
        &self,
        cursor: Option<String>,
    ) -> Result<Page<LoadBalancer>, ApiError> {
        let mut query = Vec::new();
        if let Some(cursor) = cursor {
            query.push((CURSOR_PARAM, cursor));
        }
        let url = format!("{}/load_balancers", self.base);
        let page: LoadBalancerPage = self.ctx.get_json(&url, &query).await?;
        Ok(Page {
            items: page.load_balancers,
            next: page.next.map(|n| n.href),
        })
    }

    pub async fn load_balancer(&self, id: &str) -> Result<LoadBalancer, ApiError> {
        self.ctx
            .get_json(&format!("{}/load_balancers/{id}", self.base), &[])
            .await
    }

    pub async fn delete_load_balancer(&self, id: &str) -> Result<(), ApiError> {
        self.ctx
            .delete(&format!("{}/load_balancers/{id}", self.base))
            .await
    }

    pub async fn list_vpcs(&self, cursor: Option<String>) -> Result<Page<Vpc>, ApiError> {
        let url = format!("{}/vpcs", self.base);
        let page: VpcPage = self.ctx.get_json(&url, &self.group_query(cursor)).await?;
        Ok(Page {
            items: page.vpcs,
            next: page.next.map(|n| n.href),
        })
    }

    pub async fn delete_vpc(&self, id: &str) -> Result<(), ApiError> {
        self.ctx.delete(&format!("{}/vpcs/{id}", self.base)).await
    }
}
