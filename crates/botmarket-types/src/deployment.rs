//! Deployment descriptors attached to a chatbot registration.
//!
//! The stored document keeps a `deployment_type` discriminant so older
//! records written as loose maps keep deserializing.

use serde::{Deserialize, Serialize};

/// How a chatbot's backing service was provisioned.
///
/// Each mode is an explicit struct variant rather than a loosely-typed map.
/// The discriminant serializes as `deployment_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "deployment_type", rename_all = "lowercase")]
pub enum DeploymentResource {
    /// Platform-managed function app. Optional names fall back to
    /// platform defaults at provisioning time.
    Managed {
        resource_group_name: String,
        location: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        app_insights_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        storage_account_name: Option<String>,
    },
    /// Developer-supplied infrastructure in their own subscription.
    Custom {
        resource_group_name: String,
        location: String,
        subscription_id: String,
    },
    /// Terraform-applied infrastructure.
    Terraform {
        resource_group_name: String,
        location: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subscription_id: Option<String>,
    },
}

impl DeploymentResource {
    /// The resource group every variant carries.
    pub fn resource_group_name(&self) -> &str {
        match self {
            DeploymentResource::Managed {
                resource_group_name,
                ..
            }
            | DeploymentResource::Custom {
                resource_group_name,
                ..
            }
            | DeploymentResource::Terraform {
                resource_group_name,
                ..
            } => resource_group_name,
        }
    }
}
