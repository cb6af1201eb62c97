use baise_config::BaiseConfig;
use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};

#[test]
fn env_var_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.set_env("BAISE_STORE__ENFORCE_UNIQUE", "false");

        jail.create_file(
            "config.toml",
            r#"
[store]
enforce_unique = true
check_references = true
"#,
        )?;

        let config: BaiseConfig = Figment::from(Serialized::defaults(BaiseConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("BAISE_").split("__"))
            .extract()?;

        // Env should win over TOML
        assert!(!config.store.enforce_unique);
        // TOML value not overridden by env should remain
        assert!(config.store.check_references);
        Ok(())
    });
}

#[test]
fn full_env_provider_chain() {
    Jail::expect_with(|jail| {
        let home = jail.directory().to_path_buf();
        jail.set_env("XDG_CONFIG_HOME", home.display());
        jail.set_env("BAISE_STORE__CHECK_REFERENCES", "true");
        jail.set_env("BAISE_GENERAL__LOG_FILTER", "debug");
        jail.set_env("BAISE_GENERAL__EXPORT_DIR", "/tmp/baise-schemas");

        let config = BaiseConfig::load().expect("config loads");

        assert!(config.store.check_references);
        assert!(config.store.enforce_unique);
        assert_eq!(config.general.log_filter, "debug");
        assert_eq!(config.general.export_dir, "/tmp/baise-schemas");
        Ok(())
    });
}

/// `BAISE_LOG` is read by the binary's subscriber, not by figment; an
/// unknown top-level key is ignored.
#[test]
fn log_env_var_does_not_break_extraction() {
    Jail::expect_with(|jail| {
        let home = jail.directory().to_path_buf();
        jail.set_env("XDG_CONFIG_HOME", home.display());
        jail.set_env("BAISE_LOG", "trace");

        let config = BaiseConfig::load().expect("config loads");
        assert_eq!(config.general.log_filter, "warn");
        Ok(())
    });
}

/// Typo'd env var keys are silently ignored; the value stays at its default.
#[test]
fn typo_env_var_silently_ignored() {
    Jail::expect_with(|jail| {
        jail.set_env("BAISE_STORE__ENFORCE_UNIQE", "false");

        let config: BaiseConfig = Figment::from(Serialized::defaults(BaiseConfig::default()))
            .merge(Env::prefixed("BAISE_").split("__"))
            .extract()?;

        assert!(config.store.enforce_unique);
        Ok(())
    });
}
