//! CLI command implementations

use std::io::{self, Write};
use std::path::Path;

use crate::config::{RestoreArgs, RestoreConfig};
use crate::observability::{log_event_with_fields, Event};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Dispatch a parsed command
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::CheckConfig { config, restore } => {
            let effective = check_config(config.as_deref(), restore)?;
            write_config(&mut io::stdout(), &effective)
        }
    }
}

/// Load the config file (or defaults), overlay flags and validate.
///
/// Returns the effective configuration with credentials masked.
pub fn check_config(path: Option<&Path>, flags: RestoreArgs) -> CliResult<RestoreConfig> {
    let base = match path {
        Some(path) => RestoreConfig::load(path)?,
        None => RestoreConfig::default(),
    };
    let effective = flags.apply(base);
    effective.validate()?;

    let source = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<defaults>".to_string());
    log_event_with_fields(Event::ConfigLoaded, &[("path", source.as_str())]);
    Ok(effective.redacted())
}

fn write_config<W: Write>(out: &mut W, config: &RestoreConfig) -> CliResult<()> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| CliError::io_error(format!("can't render config: {}", e)))?;
    writeln!(out, "{}", json).map_err(|e| CliError::io_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliErrorCode;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_check_config_overlays_flags_and_redacts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("restore.json");
        fs::write(
            &path,
            r#"{"restore_from_backup": true, "binlog_host": "binlog-1", "binlog_port": 3306,
                "binlog_user": "repl", "binlog_password": "hunter2"}"#,
        )
        .unwrap();

        let flags = RestoreArgs {
            binlog_timeout: Some(Duration::from_secs(5)),
            ..Default::default()
        };
        let effective = check_config(Some(path.as_path()), flags).unwrap();

        assert!(effective.restore_from_backup);
        assert_eq!(effective.binlog_timeout, Duration::from_secs(5));
        assert_eq!(effective.binlog_password.as_deref(), Some("****"));

        let mut out = Vec::new();
        write_config(&mut out, &effective).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("\"binlog_timeout\": \"5s\""));
    }

    #[test]
    fn test_check_config_defaults_without_file() {
        let effective = check_config(None, RestoreArgs::default()).unwrap();
        assert_eq!(effective, RestoreConfig::default());
    }

    #[test]
    fn test_check_config_rejects_invalid_flags() {
        let flags = RestoreArgs {
            init_tablet_type: Some("RESTORE".to_string()),
            ..Default::default()
        };
        let err = check_config(None, flags).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::ConfigError);
    }

    #[test]
    fn test_check_config_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");
        let err = check_config(Some(path.as_path()), RestoreArgs::default()).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::ConfigError);
    }
}
