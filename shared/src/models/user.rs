//! User Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// User role, stored in session metadata
///
/// - `cliente`: 下单、查看自己的订单
/// - `mesero`: 推进订单状态
/// - `admin`: 后台管理 + 推进订单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Cliente,
    Mesero,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cliente => "cliente",
            Self::Mesero => "mesero",
            Self::Admin => "admin",
        }
    }

    /// Staff roles may advance or cancel orders
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Mesero | Self::Admin)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cliente" => Ok(Self::Cliente),
            "mesero" => Ok(Self::Mesero),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// User profile row (`users` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

/// Embedded user reference, as returned by `users(name, email)` embeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Profile attached to a sign-up request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

/// Sign-in payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Sign-up payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[validate(length(max = 120))]
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_defaults_to_cliente() {
        let user: User =
            serde_json::from_str(r#"{"id": "u1", "email": "ana@example.com"}"#).unwrap();
        assert_eq!(user.role, Role::Cliente);
        assert!(!user.role.is_staff());
    }

    #[test]
    fn test_staff_roles() {
        assert!(Role::Mesero.is_staff());
        assert!(Role::Admin.is_staff());
        assert!(!Role::Mesero.is_admin());
        assert_eq!("mesero".parse::<Role>().unwrap(), Role::Mesero);
        assert!("chef".parse::<Role>().is_err());
    }

    #[test]
    fn test_sign_up_validation() {
        let req = SignUpRequest {
            email: "not-an-email".into(),
            password: "12345".into(),
            name: "Ana".into(),
            role: Role::Cliente,
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }
}
