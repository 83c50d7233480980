//! Audit stamping configuration.
//!
//! Controls whether the stamping hooks are installed and where they look for
//! the acting user in a write's context.

use audited_core::{CURRENT_USER_KEY, PrincipalResolver};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_enabled() -> bool {
    true
}

fn default_context_key() -> String {
    CURRENT_USER_KEY.to_string()
}

fn default_id_field() -> String {
    "id".to_string()
}

fn default_role_field() -> String {
    "role".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuditSection {
    /// Install the creator/updater stamping hooks.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Write-context key holding the current user.
    #[serde(default = "default_context_key")]
    pub context_key: String,

    /// Member of the current user holding its UUID.
    #[serde(default = "default_id_field")]
    pub id_field: String,

    /// Member of the current user holding its integer role.
    #[serde(default = "default_role_field")]
    pub role_field: String,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            context_key: default_context_key(),
            id_field: default_id_field(),
            role_field: default_role_field(),
        }
    }
}

impl AuditSection {
    /// Reject blank key or field names.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first blank setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("audit.context_key", &self.context_key),
            ("audit.id_field", &self.id_field),
            ("audit.role_field", &self.role_field),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// The principal resolver described by this section.
    #[must_use]
    pub fn resolver(&self) -> PrincipalResolver {
        PrincipalResolver::new(
            self.context_key.trim(),
            self.id_field.trim(),
            self.role_field.trim(),
        )
    }
}
