use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_ADMIN, ROLE_AGENT, ROLE_CLIENT};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Subject of the access token, also the profile id
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// Agent-level access (admin or agent)
    pub fn has_agent_access(&self) -> bool {
        self.is_admin() || self.has_role(ROLE_AGENT)
    }

    /// Client-level access (admin or client)
    pub fn has_client_access(&self) -> bool {
        self.is_admin() || self.has_role(ROLE_CLIENT)
    }

    /// Highest role held, used when a profile row is first created
    pub fn primary_role(&self) -> &'static str {
        if self.is_admin() {
            ROLE_ADMIN
        } else if self.has_role(ROLE_AGENT) {
            ROLE_AGENT
        } else {
            ROLE_CLIENT
        }
    }
}

/// Provider-managed metadata that end users cannot edit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppMetadata {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Keep only the roles this service knows; a token without any is a client
pub fn resolve_roles(app_metadata: Option<&AppMetadata>, role_claim: Option<&str>) -> Vec<String> {
    let known = |role: &str| matches!(role, ROLE_ADMIN | ROLE_AGENT | ROLE_CLIENT);

    let mut roles: Vec<String> = app_metadata
        .map(|meta| {
            meta.roles
                .iter()
                .filter(|r| known(r))
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    if roles.is_empty() {
        if let Some(role) = role_claim.filter(|r| known(r)) {
            roles.push(role.to_string());
        }
    }

    if roles.is_empty() {
        roles.push(ROLE_CLIENT.to_string());
    }

    roles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "user-1".to_string(),
            email: None,
            phone: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_role_hierarchy() {
        let admin = user(&["admin"]);
        assert!(admin.has_agent_access());
        assert!(admin.has_client_access());

        let agent = user(&["agent"]);
        assert!(agent.has_agent_access());
        assert!(!agent.has_client_access());
        assert!(!agent.is_admin());

        let client = user(&["client"]);
        assert!(client.has_client_access());
        assert!(!client.has_agent_access());
    }

    #[test]
    fn test_primary_role() {
        assert_eq!(user(&["client", "admin"]).primary_role(), "admin");
        assert_eq!(user(&["agent"]).primary_role(), "agent");
        assert_eq!(user(&[]).primary_role(), "client");
    }

    #[test]
    fn test_resolve_roles_prefers_app_metadata() {
        let meta = AppMetadata {
            roles: vec!["agent".to_string(), "superuser".to_string()],
        };
        assert_eq!(resolve_roles(Some(&meta), Some("admin")), vec!["agent"]);
    }

    #[test]
    fn test_resolve_roles_falls_back_to_role_claim() {
        assert_eq!(resolve_roles(None, Some("admin")), vec!["admin"]);
        let empty = AppMetadata::default();
        assert_eq!(resolve_roles(Some(&empty), Some("agent")), vec!["agent"]);
    }

    #[test]
    fn test_resolve_roles_defaults_to_client() {
        // Hosted providers put "authenticated" in the role claim
        assert_eq!(resolve_roles(None, Some("authenticated")), vec!["client"]);
        assert_eq!(resolve_roles(None, None), vec!["client"]);
    }
}
