//! Integration tests for TOML and environment configuration loading.
//!
//! Uses `figment::Jail` for sandboxed cwd and env var manipulation.

use audited_config::{AuditedConfig, ConfigError};
use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;

#[test]
fn loads_sections_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[database]
path = "/var/lib/audited/app.db"

[audit]
enabled = false
context_key = "app:session_user"
id_field = "user_id"
role_field = "kind"
"#,
        )?;

        let config: AuditedConfig = Figment::from(Serialized::defaults(AuditedConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.database.path, "/var/lib/audited/app.db");
        assert!(!config.audit.enabled);
        assert_eq!(config.audit.context_key, "app:session_user");
        assert_eq!(config.audit.id_field, "user_id");
        assert_eq!(config.audit.role_field, "kind");
        Ok(())
    });
}

#[test]
fn partial_section_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[audit]\nrole_field = \"level\"\n")?;

        let config: AuditedConfig = Figment::from(Serialized::defaults(AuditedConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert!(config.audit.enabled);
        assert_eq!(config.audit.context_key, "audited:current_user");
        assert_eq!(config.audit.id_field, "id");
        assert_eq!(config.audit.role_field, "level");
        assert_eq!(config.database.path, ".audited/audited.db");
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up_by_figment() {
    Jail::expect_with(|jail| {
        jail.create_dir(".audited")?;
        jail.create_file(".audited/config.toml", "[database]\npath = \"project.db\"\n")?;

        let config = AuditedConfig::load().unwrap();
        assert_eq!(config.database.path, "project.db");
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".audited")?;
        jail.create_file(".audited/config.toml", "[audit]\nid_field = \"from_toml\"\n")?;
        jail.set_env("AUDITED_AUDIT__ID_FIELD", "from_env");
        jail.set_env("AUDITED_AUDIT__ENABLED", "false");

        let config = AuditedConfig::load().unwrap();
        assert_eq!(config.audit.id_field, "from_env");
        assert!(!config.audit.enabled);
        Ok(())
    });
}

#[test]
fn blank_field_name_fails_to_load() {
    Jail::expect_with(|jail| {
        jail.create_dir(".audited")?;
        jail.create_file(".audited/config.toml", "[audit]\nrole_field = \"\"\n")?;

        let err = AuditedConfig::load().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "audit.role_field"));
        Ok(())
    });
}

#[test]
fn malformed_value_is_a_figment_error() {
    Jail::expect_with(|jail| {
        jail.create_file("bad.toml", "[audit]\nenabled = \"sometimes\"\n")?;

        let figment = Figment::from(Serialized::defaults(AuditedConfig::default()))
            .merge(Toml::file("bad.toml"))
            .merge(Env::prefixed("AUDITED_").split("__"));
        let err = AuditedConfig::from_figment(&figment).unwrap_err();
        assert!(matches!(err, ConfigError::Figment(_)));
        Ok(())
    });
}
