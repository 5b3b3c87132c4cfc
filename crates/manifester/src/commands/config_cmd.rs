//! Config subcommand handlers.

use std::io::{self, BufRead};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path(global).display().to_string(), false);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::config_path(global);
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            manifester_config::save_config(&path, &config::starter_config())?;
            if !global.quiet {
                eprintln!("Wrote {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let shown = config::redacted(&config::load(global)?);
            let as_toml = toml::to_string_pretty(&shown)
                .map_err(|e| CliError::Serialize(e.to_string()))?;
            let out = output::render_single(&global.output, &shown, |_| as_toml.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetSecret { secret } => {
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            let value = line.trim_end_matches(['\r', '\n']);
            if value.is_empty() {
                return Err(CliError::Validation {
                    field: "secret".into(),
                    reason: "nothing read from stdin".into(),
                });
            }
            manifester_config::store_secret(secret.key(), value)?;
            if !global.quiet {
                eprintln!("Stored {} in the system keyring", secret.key());
            }
            Ok(())
        }
    }
}
