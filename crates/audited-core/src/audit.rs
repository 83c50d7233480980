//! The audit field set and the `Auditable` capability.
//!
//! A record becomes auditable by embedding [`AuditFields`] and implementing
//! [`HasAuditFields`]:
//!
//! ```
//! use audited_core::{AuditFields, Auditable, HasAuditFields, Principal};
//!
//! #[derive(Default)]
//! struct Invoice {
//!     number: String,
//!     audit: AuditFields,
//! }
//!
//! impl HasAuditFields for Invoice {
//!     fn audit_fields(&self) -> &AuditFields {
//!         &self.audit
//!     }
//!
//!     fn audit_fields_mut(&mut self) -> &mut AuditFields {
//!         &mut self.audit
//!     }
//! }
//!
//! let mut invoice = Invoice::default();
//! invoice.set_created_by(Principal::new(uuid::Uuid::new_v4(), 2));
//! assert_eq!(invoice.created_by().role, 2);
//! ```
//!
//! Types that keep the audit columns elsewhere can implement [`Auditable`]
//! directly instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::principal::Principal;

/// Creator/updater identity, timestamps, and the soft-delete marker.
///
/// `created_at`, `updated_at` and `deleted_at` belong to the record layer's
/// timestamp and soft-delete handling. The `*_by_*` pairs are written by the
/// audit hooks. `created_by_name` and `updated_by_name` are never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFields {
    pub created_at: DateTime<Utc>,
    pub created_by_id: Uuid,
    pub created_by_role: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_by_name: String,

    pub updated_at: DateTime<Utc>,
    pub updated_by_id: Uuid,
    pub updated_by_role: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub updated_by_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AuditFields {
    /// Whether the record has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Capability of a record whose creator and updater can be stamped.
///
/// Setters overwrite unconditionally; there is no validation.
pub trait Auditable {
    fn set_created_by(&mut self, principal: Principal);
    fn created_by(&self) -> Principal;
    fn set_updated_by(&mut self, principal: Principal);
    fn updated_by(&self) -> Principal;
}

/// Records that embed an [`AuditFields`] value.
pub trait HasAuditFields {
    fn audit_fields(&self) -> &AuditFields;
    fn audit_fields_mut(&mut self) -> &mut AuditFields;
}

impl HasAuditFields for AuditFields {
    fn audit_fields(&self) -> &AuditFields {
        self
    }

    fn audit_fields_mut(&mut self) -> &mut AuditFields {
        self
    }
}

impl<T: HasAuditFields> Auditable for T {
    fn set_created_by(&mut self, principal: Principal) {
        let fields = self.audit_fields_mut();
        fields.created_by_id = principal.id;
        fields.created_by_role = principal.role;
    }

    fn created_by(&self) -> Principal {
        let fields = self.audit_fields();
        Principal::new(fields.created_by_id, fields.created_by_role)
    }

    fn set_updated_by(&mut self, principal: Principal) {
        let fields = self.audit_fields_mut();
        fields.updated_by_id = principal.id;
        fields.updated_by_role = principal.role;
    }

    fn updated_by(&self) -> Principal {
        let fields = self.audit_fields();
        Principal::new(fields.updated_by_id, fields.updated_by_role)
    }
}
