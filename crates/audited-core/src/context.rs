//! Per-write key/value context.
//!
//! Every write takes a `&WriteContext` explicitly. The caller stores the
//! acting user under [`CURRENT_USER_KEY`] (or a configured key); the audit
//! hooks only read it.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Value, json};

use crate::errors::CoreError;
use crate::principal::Principal;

/// Default context key for the acting user.
pub const CURRENT_USER_KEY: &str = "audited:current_user";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteContext {
    values: BTreeMap<String, Value>,
}

impl WriteContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context carrying `user` under [`CURRENT_USER_KEY`].
    ///
    /// `user` can be any serializable value; the resolver reads its `id` and
    /// `role` fields by name.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Serialization` if `user` cannot be converted to JSON.
    pub fn with_current_user<U: Serialize + ?Sized>(user: &U) -> Result<Self, CoreError> {
        let mut ctx = Self::new();
        ctx.set(CURRENT_USER_KEY, user)?;
        Ok(ctx)
    }

    /// Context carrying `principal` under [`CURRENT_USER_KEY`] with the
    /// default `id`/`role` field names.
    #[must_use]
    pub fn for_principal(principal: Principal) -> Self {
        let mut ctx = Self::new();
        ctx.values.insert(
            CURRENT_USER_KEY.to_string(),
            json!({ "id": principal.id.to_string(), "role": principal.role }),
        );
        ctx
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Serialization` if `value` cannot be converted to JSON.
    pub fn set<V: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &V,
    ) -> Result<(), CoreError> {
        self.values.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
