//! Types returned by the gateway and profile collaborators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One proxied route of the gateway (`GET /api/gateway/routes`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTableEntry {
    /// Route path pattern (e.g., "/services/mfront1/**").
    pub path: String,

    /// Upstream service identifier.
    pub service_id: String,

    /// Registered instances of the upstream service.
    #[serde(default)]
    pub service_instances: Vec<ServiceInstance>,
}

impl RouteTableEntry {
    /// Whether at least one instance reports itself `UP`.
    pub fn has_healthy_instance(&self) -> bool {
        self.service_instances
            .iter()
            .any(|i| i.status.as_deref() == Some("UP"))
    }
}

/// An upstream instance behind a gateway route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstance {
    #[serde(default)]
    pub instance_id: Option<String>,
    pub uri: String,
    #[serde(default)]
    pub secure: bool,
    /// Health as reported by the registry ("UP", "DOWN", ...).
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Environment flags from the profile collaborator (`GET /management/info`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInfo {
    #[serde(default)]
    pub active_profiles: Vec<String>,
}

impl ProfileInfo {
    pub fn in_production(&self) -> bool {
        self.has_profile("prod")
    }

    pub fn open_api_enabled(&self) -> bool {
        self.has_profile("api-docs")
    }

    fn has_profile(&self, name: &str) -> bool {
        self.active_profiles.iter().any(|p| p == name)
    }
}
