//! Config file resolution plus CLI flag overrides on top of
//! `manifester_config`.

use std::path::PathBuf;

use manifester_config::Config;
use manifester_core::MdmBackend;

use crate::cli::{GlobalOpts, MdmArg};
use crate::error::CliError;

/// `--config-file` / `MANIFESTER_CONFIG`, else the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config_file
        .clone()
        .unwrap_or_else(manifester_config::config_path)
}

/// Load file + env config, then apply CLI overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = config_path(global);
    tracing::debug!(path = %path.display(), exists = path.exists(), "loading config");

    let mut cfg = manifester_config::load_config(&path)?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(dir) = &global.manifest_dir {
        cfg.manifest_dir.clone_from(dir);
    }
    if let Some(mdm) = global.mdm {
        cfg.mdm.backend = match mdm {
            MdmArg::Kandji => MdmBackend::Kandji,
            MdmArg::Jamf => MdmBackend::Jamf,
        };
    }
}

/// Starter file written by `config init`.
pub fn starter_config() -> Config {
    let mut cfg = Config::default();
    cfg.mdm.url = Some("https://<subdomain>.api.kandji.io".into());
    cfg.mdm.token_env = Some("KANDJI_TOKEN".into());
    cfg.okta.domain = Some("<org>.okta.com".into());
    cfg.okta.token_env = Some("OKTA_TOKEN".into());
    cfg
}

/// Effective config with every plaintext secret masked.
pub fn redacted(cfg: &Config) -> Config {
    let mut shown = cfg.clone();
    for secret in [
        &mut shown.mdm.token,
        &mut shown.mdm.password,
        &mut shown.okta.token,
    ] {
        if secret.is_some() {
            *secret = Some("********".into());
        }
    }
    shown
}
