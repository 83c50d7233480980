//! # audited-hooks
//!
//! Creator/updater stamping for the audited record layer.
//!
//! Installs two processors on an [`AuditDb`]'s callback chains:
//! - [`ASSIGN_CREATED_BY`] right after `orm:before_create`
//! - [`ASSIGN_UPDATED_BY`] right after `orm:before_update`
//!
//! Each one checks that the record is [`Auditable`](audited_core::Auditable),
//! resolves the acting [`Principal`](audited_core::Principal) from the write's
//! context and stamps the creator or updater columns. A write whose record is
//! not auditable, or whose context has no usable principal, goes through
//! unstamped: the hooks never fail a write.
//!
//! ```no_run
//! # async fn demo() -> Result<(), audited_db::error::DatabaseError> {
//! use audited_db::AuditDb;
//!
//! let mut db = AuditDb::open_local(":memory:").await?;
//! audited_hooks::register_callbacks(&mut db);
//! audited_hooks::register_callbacks(&mut db); // no-op
//! # Ok(())
//! # }
//! ```

mod stamp;

use audited_config::{AuditSection, ConfigError};
use audited_core::PrincipalResolver;
use audited_db::AuditDb;
use audited_db::callbacks::{BEFORE_CREATE, BEFORE_UPDATE};

pub use stamp::{assign_created_by, assign_updated_by};

/// Name of the create-chain processor.
pub const ASSIGN_CREATED_BY: &str = "audited:assign_created_by";
/// Name of the update-chain processor.
pub const ASSIGN_UPDATED_BY: &str = "audited:assign_updated_by";

/// Install both hooks with the default principal resolver.
///
/// Idempotent: a hook already present under its name is left in place.
pub fn register_callbacks(db: &mut AuditDb) {
    register_callbacks_with(db, &PrincipalResolver::default());
}

/// Install both hooks, resolving the principal with `resolver`.
///
/// A hook already present under its name is left untouched, including its
/// resolver: the first registration wins.
pub fn register_callbacks_with(db: &mut AuditDb, resolver: &PrincipalResolver) {
    let callbacks = db.callbacks_mut();

    if callbacks.create().get(ASSIGN_CREATED_BY).is_none() {
        let resolver = resolver.clone();
        callbacks
            .create_mut()
            .after(BEFORE_CREATE)
            .register(ASSIGN_CREATED_BY, move |scope| {
                assign_created_by(scope, &resolver);
                Ok(())
            });
    }

    if callbacks.update().get(ASSIGN_UPDATED_BY).is_none() {
        let resolver = resolver.clone();
        callbacks
            .update_mut()
            .after(BEFORE_UPDATE)
            .register(ASSIGN_UPDATED_BY, move |scope| {
                assign_updated_by(scope, &resolver);
                Ok(())
            });
    }

    tracing::debug!(
        context_key = resolver.context_key(),
        "audit stamping callbacks registered"
    );
}

/// Install the hooks as described by the `[audit]` config section.
///
/// Returns whether the hooks are installed (`false` when `audit.enabled` is
/// off).
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if the section has a blank key or
/// field name.
pub fn register_from_config(db: &mut AuditDb, audit: &AuditSection) -> Result<bool, ConfigError> {
    audit.validate()?;
    if !audit.enabled {
        tracing::debug!("audit stamping disabled by config");
        return Ok(false);
    }
    register_callbacks_with(db, &audit.resolver());
    Ok(true)
}
