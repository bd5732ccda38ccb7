//! Provider scopes carried in resource attributes.
//!
//! Every pooled resource names the provider identifiers its cleanup must be
//! confined to. The scope types validate those attributes up front so the
//! teardown steps never run with a partial scope.

use std::fmt;

use thiserror::Error;

use crate::resource::PoolResource;

/// Attribute holding the VPC region of a resource.
pub const ATTR_REGION: &str = "region";
/// Attribute holding the resource group confining VPC cleanup.
pub const ATTR_RESOURCE_GROUP: &str = "resource-group";
/// Attribute naming a protected network that narrows VPC cleanup further.
pub const ATTR_VPC_ID: &str = "vpc-id";
/// Attribute holding the workspace confining metal cleanup.
pub const ATTR_WORKSPACE_ID: &str = "workspace-id";
/// Attribute holding the zone a metal workspace lives in.
pub const ATTR_ZONE: &str = "zone";
/// Attribute the daemon rewrites with the freshly rotated API key.
pub const ATTR_API_KEY: &str = "api-key";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("resource {resource:?} has no {key:?} attribute")]
    MissingAttr { resource: String, key: &'static str },
    #[error("unsupported resource type {rtype:?}")]
    UnsupportedKind { rtype: String },
}

/// Provider family a resource kind belongs to, by kind-name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Bare metal workspaces ("metal-*" kinds).
    Metal,
    /// Virtual private cloud sandboxes ("vpc-*" kinds).
    Vpc,
}

impl Family {
    /// Classify a resource kind by its name prefix.
    pub fn of(rtype: &str) -> Result<Self, ScopeError> {
        if rtype.starts_with("metal") {
            Ok(Family::Metal)
        } else if rtype.starts_with("vpc") {
            Ok(Family::Vpc)
        } else {
            Err(ScopeError::UnsupportedKind {
                rtype: rtype.to_string(),
            })
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Metal => write!(f, "metal"),
            Family::Vpc => write!(f, "vpc"),
        }
    }
}

fn require(resource: &PoolResource, key: &'static str) -> Result<String, ScopeError> {
    resource
        .attr(key)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ScopeError::MissingAttr {
            resource: resource.name.clone(),
            key,
        })
}

/// Cleanup scope for the VPC family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpcScope {
    /// Region whose API endpoint serves this resource.
    pub region: String,
    /// Resource group every deletion is confined to.
    pub resource_group: String,
    /// Protected network; when set, entities on it are left alone.
    pub vpc_id: Option<String>,
}

impl VpcScope {
    pub fn from_resource(resource: &PoolResource) -> Result<Self, ScopeError> {
        Ok(Self {
            region: require(resource, ATTR_REGION)?,
            resource_group: require(resource, ATTR_RESOURCE_GROUP)?,
            vpc_id: resource
                .attr(ATTR_VPC_ID)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        })
    }
}

/// Cleanup scope for the metal family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetalScope {
    /// Workspace every deletion is confined to.
    pub workspace_id: String,
    /// Zone whose API endpoint serves the workspace.
    pub zone: String,
}

impl MetalScope {
    pub fn from_resource(resource: &PoolResource) -> Result<Self, ScopeError> {
        Ok(Self {
            workspace_id: require(resource, ATTR_WORKSPACE_ID)?,
            zone: require(resource, ATTR_ZONE)?,
        })
    }
}
