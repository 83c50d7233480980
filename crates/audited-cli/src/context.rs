use std::path::Path;

use anyhow::Context;
use audited_config::AuditedConfig;
use audited_core::{Principal, WriteContext};
use audited_db::AuditDb;

use crate::cli::GlobalFlags;
use crate::note::Note;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub db: AuditDb,
    /// Context passed to every write; carries `--as-user` when given.
    pub write_ctx: WriteContext,
}

impl AppContext {
    /// Open the database, create the `notes` table and install the audit
    /// hooks as configured.
    pub async fn init(config: &AuditedConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let path = flags.db.as_deref().unwrap_or(&config.database.path);
        if path != ":memory:" {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create database directory {}", parent.display())
                    })?;
                }
            }
        }

        let mut db = AuditDb::open_local(path)
            .await
            .with_context(|| format!("failed to open database at {path}"))?;
        Note::ensure_table(&db)
            .await
            .context("failed to create notes table")?;

        let installed = audited_hooks::register_from_config(&mut db, &config.audit)?;
        if !installed {
            tracing::warn!("audit stamping is disabled; writes will not record their author");
        }

        let write_ctx = write_context(config, flags)?;
        Ok(Self { db, write_ctx })
    }
}

/// Place the acting user under the configured key and field names.
fn write_context(config: &AuditedConfig, flags: &GlobalFlags) -> anyhow::Result<WriteContext> {
    let mut ctx = WriteContext::new();
    let Some(id) = flags.as_user else {
        return Ok(ctx);
    };

    let principal = Principal::new(id, flags.as_role);
    let mut user = serde_json::Map::new();
    user.insert(config.audit.id_field.trim().to_string(), id.to_string().into());
    user.insert(config.audit.role_field.trim().to_string(), principal.role.into());
    ctx.set(config.audit.context_key.trim(), &user)?;

    tracing::debug!(%principal, "acting as principal");
    Ok(ctx)
}
