//! User profile and role model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role of the signed-in user, as far as fetch planning is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Staff,
    /// Any other role (manager, district manager, ...). Treated as non-staff.
    Other(String),
}

impl Role {
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Staff)
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            "staff" => Self::Staff,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub branch_location: Option<String>,
}

impl Profile {
    /// Staff accounts without a branch are waiting for an admin to grant access.
    #[must_use]
    pub fn is_pending_access(&self) -> bool {
        self.role.is_staff()
            && self
                .branch_id
                .as_deref()
                .map_or(true, |branch| branch.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: &str, branch_id: Option<&str>) -> Profile {
        Profile {
            id: "p1".to_string(),
            name: "Ana".to_string(),
            email: None,
            role: Role::from(role.to_string()),
            branch_id: branch_id.map(ToString::to_string),
            branch_name: None,
            branch_location: None,
        }
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!(Role::from(" Admin ".to_string()), Role::Admin);
        assert_eq!(Role::from("STAFF".to_string()), Role::Staff);
        assert_eq!(
            Role::from("Manager".to_string()),
            Role::Other("manager".to_string())
        );
    }

    #[test]
    fn role_roundtrips_through_json() {
        let parsed: Profile = serde_json::from_str(
            r#"{"id":"1","name":"Ana","role":"district_manager","branch_id":"b1"}"#,
        )
        .unwrap();
        assert_eq!(parsed.role, Role::Other("district_manager".to_string()));
        let json = serde_json::to_string(&parsed).unwrap();
        assert!(json.contains(r#""role":"district_manager""#));
    }

    #[test]
    fn pending_access_requires_staff_without_branch() {
        assert!(profile("staff", None).is_pending_access());
        assert!(profile("staff", Some("  ")).is_pending_access());
        assert!(!profile("staff", Some("b1")).is_pending_access());
        assert!(!profile("admin", None).is_pending_access());
    }
}
