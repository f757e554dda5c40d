use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{CatalogError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Reader,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reader => write!(f, "reader"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// Who is driving the presenter and with which rights.
///
/// Owned by the presentation layer; the catalog never sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: String,
    pub role: Role,
}

impl Session {
    /// Check credentials and open a session.
    ///
    /// Both fields must be non-blank. Admin mode additionally requires the
    /// configured admin password; reader mode accepts any pair.
    pub fn login(username: &str, password: &str, as_admin: bool, auth: &AuthConfig) -> Result<Self> {
        let user = username.trim();
        if user.is_empty() || password.trim().is_empty() {
            return Err(CatalogError::InvalidCredentials(
                "username and password are required".into(),
            ));
        }
        let role = if as_admin {
            if password != auth.admin_password {
                return Err(CatalogError::InvalidCredentials("wrong admin password".into()));
            }
            Role::Admin
        } else {
            Role::Reader
        };
        tracing::info!(user, %role, "session opened");
        Ok(Self {
            user: user.to_string(),
            role,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_login_accepts_any_pair() {
        let session = Session::login(" alice ", "pw", false, &AuthConfig::default()).unwrap();
        assert_eq!(session.user, "alice");
        assert_eq!(session.role, Role::Reader);
        assert!(!session.is_admin());
    }

    #[test]
    fn test_login_rejects_blank_fields() {
        let auth = AuthConfig::default();
        assert!(Session::login("", "pw", false, &auth).is_err());
        assert!(Session::login("bob", "  ", false, &auth).is_err());
    }

    #[test]
    fn test_admin_login_checks_password() {
        let auth = AuthConfig::default();
        assert!(Session::login("admin", "1234", true, &auth).unwrap().is_admin());
        let err = Session::login("admin", "4321", true, &auth).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidCredentials(_)));
    }

    #[test]
    fn test_admin_password_is_compared_verbatim() {
        let auth = AuthConfig::default();
        for padded in [" 1234 ", "1234\n", "\t1234"] {
            let err = Session::login("admin", padded, true, &auth).unwrap_err();
            assert!(matches!(err, CatalogError::InvalidCredentials(_)));
        }
    }
}
