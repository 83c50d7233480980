//! The acting principal and its resolution from a `WriteContext`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::context::{CURRENT_USER_KEY, WriteContext};
use crate::errors::PrincipalError;

/// The `{id, role}` pair of the user performing a write.
///
/// Built fresh for every write and never persisted on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub role: i64,
}

impl Principal {
    #[must_use]
    pub const fn new(id: Uuid, role: i64) -> Self {
        Self { id, role }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (role {})", self.id, self.role)
    }
}

/// Reads a `Principal` out of a `WriteContext`.
///
/// The current-user value is looked up under `context_key`; its identifier
/// and role are read from the `id_field` and `role_field` members. Member
/// names match exactly first, then ignoring ASCII case, so both
/// `{"id": ..}` and `{"ID": ..}` resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalResolver {
    context_key: String,
    id_field: String,
    role_field: String,
}

impl Default for PrincipalResolver {
    fn default() -> Self {
        Self::new(CURRENT_USER_KEY, "id", "role")
    }
}

impl PrincipalResolver {
    #[must_use]
    pub fn new(
        context_key: impl Into<String>,
        id_field: impl Into<String>,
        role_field: impl Into<String>,
    ) -> Self {
        Self {
            context_key: context_key.into(),
            id_field: id_field.into(),
            role_field: role_field.into(),
        }
    }

    #[must_use]
    pub fn context_key(&self) -> &str {
        &self.context_key
    }

    #[must_use]
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    #[must_use]
    pub fn role_field(&self) -> &str {
        &self.role_field
    }

    /// Resolve the acting principal for a write.
    ///
    /// # Errors
    ///
    /// Returns `PrincipalError` when the context has no current user, or the
    /// identifier or role is present but unparseable. An absent member
    /// resolves to its zero value (nil id, role `0`). Resolution is all or
    /// nothing: a valid id with a bad role is still an error.
    pub fn resolve(&self, ctx: &WriteContext) -> Result<Principal, PrincipalError> {
        let user = ctx
            .get(&self.context_key)
            .ok_or_else(|| PrincipalError::Missing {
                key: self.context_key.clone(),
            })?;
        self.principal_from_value(user)
    }

    /// Extract a principal from a current-user value.
    ///
    /// # Errors
    ///
    /// See [`PrincipalResolver::resolve`].
    pub fn principal_from_value(&self, user: &Value) -> Result<Principal, PrincipalError> {
        let id = match field_text(user, &self.id_field) {
            None => Uuid::nil(),
            Some(raw) => Uuid::parse_str(raw.trim()).map_err(|e| PrincipalError::InvalidId {
                value: raw.clone(),
                reason: e.to_string(),
            })?,
        };

        let role = match field_text(user, &self.role_field) {
            None => 0,
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|e| PrincipalError::InvalidRole {
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
        };

        Ok(Principal { id, role })
    }
}

fn lookup<'a>(user: &'a Value, field: &str) -> Option<&'a Value> {
    let obj = user.as_object()?;
    obj.get(field).or_else(|| {
        obj.iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(field))
            .map(|(_, value)| value)
    })
}

/// Render a member the way it would print: strings verbatim, everything else
/// through its JSON text. `None` when the member is absent.
fn field_text(user: &Value, field: &str) -> Option<String> {
    lookup(user, field).map(|value| match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
