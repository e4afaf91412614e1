//! Users, roles and profile updates.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ProductId, UserId};

/// Storefront role. Only gates which screens are offered; the backend
/// enforces real access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

/// A saved postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub id: String,
    pub street: String,
    pub city: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// A storefront user.
///
/// `token` is the bearer token returned at login; `Debug` output redacts it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wishlist: Vec<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

crate::record_keys!(User, "id" <- "_id", "name" <- "username");

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("status", &self.status)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl User {
    /// Create a user with the given role and no optional details.
    #[must_use]
    pub fn new(
        id: impl Into<UserId>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
            status: None,
            addresses: Vec::new(),
            wishlist: Vec::new(),
            phone: None,
            address: None,
            token: None,
            last_login: None,
            login_count: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Whether the user may see admin screens.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Shallow-merge a profile patch into this user.
    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone);
        }
        if let Some(address) = patch.address {
            self.address = Some(address);
        }
        if let Some(addresses) = patch.addresses {
            self.addresses = addresses;
        }
    }
}

/// Fields a user may edit on their own profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<Address>>,
}

/// Payload for registering or creating a user.
///
/// The backend names the display name `username`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let mut user = User::new("u-1", "Ada", "ada@example.com", Role::User);
        user.token = Some("eyJhbGciOi.secret".into());
        let out = format!("{user:?}");
        assert!(out.contains("[REDACTED]"));
        assert!(!out.contains("eyJhbGciOi"));
    }

    #[test]
    fn test_new_user_debug_redacts_password() {
        let new = NewUser {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "hunter22".into(),
        };
        assert!(!format!("{new:?}").contains("hunter22"));
    }

    #[test]
    fn test_apply_profile_patch_is_shallow() {
        let mut user = User::new("u-1", "Ada", "ada@example.com", Role::User);
        user.phone = Some("555-0100".into());
        user.apply(ProfilePatch {
            name: Some("Ada L.".into()),
            address: Some("12 Hat Lane".into()),
            ..ProfilePatch::default()
        });
        assert_eq!(user.name, "Ada L.");
        assert_eq!(user.address.as_deref(), Some("12 Hat Lane"));
        assert_eq!(user.phone.as_deref(), Some("555-0100"));
        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_user_accepts_username_alias() {
        let user: User = serde_json::from_value(serde_json::json!({
            "_id": "u-9",
            "username": "milliner",
            "email": "m@example.com",
            "role": "admin"
        }))
        .unwrap();
        assert_eq!(user.name, "milliner");
        assert!(user.is_admin());
    }

    #[test]
    fn test_user_with_name_and_username_prefers_name() {
        let user: User = serde_json::from_value(serde_json::json!({
            "_id": "u-9",
            "id": "u-9",
            "name": "Mara Milliner",
            "username": "milliner",
            "email": "m@example.com"
        }))
        .unwrap();
        assert_eq!(user.id.as_str(), "u-9");
        assert_eq!(user.name, "Mara Milliner");
    }
}
