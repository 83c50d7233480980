//! The stamping processors.
//!
//! Both run inside a callback chain and never return an error: any reason
//! not to stamp (record not auditable, no principal in the context, a
//! malformed principal) is logged and the write continues untouched.

use audited_core::columns::{CREATED_BY_ID, CREATED_BY_ROLE, UPDATED_BY_ID, UPDATED_BY_ROLE};
use audited_core::{Principal, PrincipalResolver};
use audited_db::helpers::uuid_value;
use audited_db::scope::Scope;
use libsql::Value;

/// Stamp the creator of a record about to be inserted.
///
/// Sets `created_by_id` / `created_by_role` on the record and in the pending
/// column set. Updater columns are left alone.
pub fn assign_created_by(scope: &mut Scope<'_>, resolver: &PrincipalResolver) {
    let Some(principal) = acting_principal(scope, resolver) else {
        return;
    };
    if let Some(auditable) = scope.record_mut().as_auditable_mut() {
        auditable.set_created_by(principal);
    }
    stage_columns(scope, CREATED_BY_ID, CREATED_BY_ROLE, principal);
}

/// Stamp the updater of a record about to be updated.
///
/// For a sparse update the updater columns are added to the partial-attribute
/// map, since only that map is written. Otherwise they are set on the record
/// and in the pending column set. Creator columns are left alone.
pub fn assign_updated_by(scope: &mut Scope<'_>, resolver: &PrincipalResolver) {
    let Some(principal) = acting_principal(scope, resolver) else {
        return;
    };
    if let Some(auditable) = scope.record_mut().as_auditable_mut() {
        auditable.set_updated_by(principal);
    }

    if let Some(attrs) = scope.update_attrs_mut() {
        attrs.insert(UPDATED_BY_ID.to_string(), uuid_value(principal.id));
        attrs.insert(UPDATED_BY_ROLE.to_string(), Value::Integer(principal.role));
        tracing::trace!(%principal, "updater staged in attribute map");
        return;
    }
    stage_columns(scope, UPDATED_BY_ID, UPDATED_BY_ROLE, principal);
}

/// The principal to stamp, if the record opts in and the context names one.
fn acting_principal(scope: &mut Scope<'_>, resolver: &PrincipalResolver) -> Option<Principal> {
    if scope.record_mut().as_auditable_mut().is_none() {
        tracing::trace!(table = scope.table_name(), "record is not auditable, skipping");
        return None;
    }
    match resolver.resolve(scope.context()) {
        Ok(principal) => Some(principal),
        Err(e) => {
            tracing::debug!(
                table = scope.table_name(),
                kind = %scope.kind(),
                error = %e,
                "no usable principal, write left unstamped"
            );
            None
        }
    }
}

fn stage_columns(scope: &mut Scope<'_>, id_column: &str, role_column: &str, principal: Principal) {
    if !(scope.has_column(id_column) && scope.has_column(role_column)) {
        tracing::debug!(
            table = scope.table_name(),
            "auditable record does not persist {id_column}/{role_column}"
        );
        return;
    }
    let staged = scope
        .set_column(id_column, uuid_value(principal.id))
        .and_then(|()| scope.set_column(role_column, Value::Integer(principal.role)));
    match staged {
        Ok(()) => tracing::trace!(table = scope.table_name(), %principal, "stamped {id_column}"),
        Err(e) => tracing::debug!(table = scope.table_name(), error = %e, "could not stamp {id_column}"),
    }
}
