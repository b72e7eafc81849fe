use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::core::error::AppError;

/// Identity class of the acting user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Guest,
    Citizen,
    Authority,
    Admin,
    Moderator,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Guest,
        Role::Citizen,
        Role::Authority,
        Role::Admin,
        Role::Moderator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Citizen => "citizen",
            Role::Authority => "authority",
            Role::Admin => "admin",
            Role::Moderator => "moderator",
        }
    }

    /// Ranking used when a token carries several roles
    fn rank(&self) -> u8 {
        match self {
            Role::Guest => 0,
            Role::Citizen => 1,
            Role::Authority => 2,
            Role::Moderator => 3,
            Role::Admin => 4,
        }
    }

    /// Pick the highest-privilege recognized role from a token's role claim.
    ///
    /// Unknown role names are ignored. An authenticated token with no recognized
    /// role is a plain citizen; `guest` is never granted through a token.
    pub fn from_claim_roles(roles: &[String]) -> Role {
        roles
            .iter()
            .filter_map(|r| r.parse::<Role>().ok())
            .filter(|r| *r != Role::Guest)
            .max_by_key(Role::rank)
            .unwrap_or(Role::Citizen)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| AppError::InvalidValue(format!("Unknown role '{}'", s)))
    }
}

/// The resolved identity/role pair attempting an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    pub role: Role,
    /// Stable user identifier, present for authenticated sessions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Principal {
    pub fn guest() -> Self {
        Self {
            role: Role::Guest,
            user_id: None,
        }
    }

    pub fn authenticated(role: Role, user_id: impl Into<String>) -> Self {
        Self {
            role,
            user_id: Some(user_id.into()),
        }
    }

    #[cfg(test)]
    pub fn citizen(user_id: impl Into<String>) -> Self {
        Self::authenticated(Role::Citizen, user_id)
    }

    /// Whether `creator_id` refers to this principal
    pub fn owns(&self, creator_id: Option<&str>) -> bool {
        match (self.user_id.as_deref(), creator_id) {
            (Some(me), Some(creator)) => me == creator,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_highest_role_wins() {
        assert_eq!(
            Role::from_claim_roles(&roles(&["citizen", "authority"])),
            Role::Authority
        );
        assert_eq!(
            Role::from_claim_roles(&roles(&["moderator", "admin", "citizen"])),
            Role::Admin
        );
    }

    #[test]
    fn test_unrecognized_roles_fall_back_to_citizen() {
        assert_eq!(Role::from_claim_roles(&[]), Role::Citizen);
        assert_eq!(
            Role::from_claim_roles(&roles(&["super_admin", "guest"])),
            Role::Citizen
        );
    }

    #[test]
    fn test_role_parse_rejects_unknown() {
        assert_eq!("moderator".parse::<Role>().ok(), Some(Role::Moderator));
        assert!(matches!(
            "Authority".parse::<Role>(),
            Err(AppError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_ownership() {
        let me = Principal::citizen("user-1");
        assert!(me.owns(Some("user-1")));
        assert!(!me.owns(Some("user-2")));
        assert!(!me.owns(None));
        assert!(!Principal::guest().owns(None));
    }
}
