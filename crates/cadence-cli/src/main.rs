//! `cadence`: sanitize, audit and clean form payloads from the command line.

use cadence_core::FieldKind;
use cadence_security::{check_dangerous_content_with, AuditLog, FieldConfigMap, Sanitizer, SanitizerConfig};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Exit status when the URL policy rejects the input.
const EXIT_REJECTED: i32 = 2;

#[derive(Parser)]
#[command(name = "cadence", about = "Cadence - user input sanitization and XSS defence")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "cadence.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sanitize one value with a field policy
    Sanitize {
        /// Field policy (display_name, bio, username, url, email, text)
        #[arg(short, long, default_value = "text")]
        field: FieldKind,
        /// Text to sanitize; read from stdin when omitted
        text: Option<String>,
    },
    /// Report suspicious content without changing it
    Audit {
        /// Text to scan; read from stdin when omitted
        text: Option<String>,
        /// Audit log directory (overrides config)
        #[arg(long)]
        log_dir: Option<PathBuf>,
        /// Field name recorded in the audit log
        #[arg(long, default_value = "input")]
        field: String,
    },
    /// Sanitize a JSON form submission using the configured field table
    Form {
        /// JSON file to read; stdin when omitted
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Default, Deserialize)]
struct CadenceConfig {
    #[serde(default)]
    sanitizer: SanitizerConfig,
    #[serde(default)]
    audit: AuditConfig,
    #[serde(default)]
    fields: FieldConfigMap,
}

#[derive(Debug, Default, Deserialize)]
struct AuditConfig {
    #[serde(default)]
    log_dir: Option<PathBuf>,
}

fn parse_config(raw: &str) -> anyhow::Result<CadenceConfig> {
    let config: CadenceConfig = toml::from_str(raw)?;
    config.sanitizer.validate()?;
    Ok(config)
}

async fn load_config(path: &Path) -> anyhow::Result<CadenceConfig> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        info!(path = %path.display(), "No config file, using defaults");
        return Ok(CadenceConfig::default());
    }
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
    })?;
    parse_config(&raw)
        .map_err(|e| anyhow::anyhow!("Invalid config file '{}': {}", path.display(), e))
}

async fn read_input(text: Option<String>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    let mut buf = String::new();
    tokio::io::stdin().read_to_string(&mut buf).await?;
    // Shell pipes usually add one trailing newline.
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
    Ok(buf)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config).await?;
    let sanitizer = Sanitizer::new(config.sanitizer);

    match cli.command {
        Commands::Sanitize { field, text } => {
            let input = read_input(text).await?;
            match sanitizer.sanitize_field(field, &input) {
                Some(clean) => println!("{clean}"),
                None => {
                    warn!(field = %field, "Input rejected by policy");
                    std::process::exit(EXIT_REJECTED);
                }
            }
        }
        Commands::Audit {
            text,
            log_dir,
            field,
        } => {
            let input = read_input(text).await?;
            let report = check_dangerous_content_with(&input, sanitizer.config());
            println!("{}", serde_json::to_string_pretty(&report)?);

            if let Some(dir) = log_dir.or(config.audit.log_dir) {
                let audit = AuditLog::new(dir);
                audit.log_report(Uuid::new_v4(), field, &report);
                audit.close().await?;
            }
        }
        Commands::Form { file } => {
            let raw = match file {
                Some(path) => tokio::fs::read_to_string(&path).await.map_err(|e| {
                    anyhow::anyhow!("Failed to read form file '{}': {}", path.display(), e)
                })?,
                None => read_input(None).await?,
            };
            let Value::Object(form) = serde_json::from_str::<Value>(&raw)? else {
                anyhow::bail!("Form input must be a JSON object");
            };
            let cleaned = sanitizer.sanitize_form_data(&form, &config.fields);
            info!(
                fields = cleaned.len(),
                configured = config.fields.len(),
                "Form sanitized"
            );
            println!("{}", serde_json::to_string_pretty(&Value::Object(cleaned))?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.sanitizer, SanitizerConfig::default());
        assert!(config.audit.log_dir.is_none());
        assert!(config.fields.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = parse_config(
            r#"
            [sanitizer]
            max_input_length = 5000
            max_passes = 4
            bio_max_newlines = 3

            [audit]
            log_dir = "./data/audit"

            [fields.bio]
            type = "bio"
            [fields.website]
            type = "url"
            [fields.name]
            type = "displayName"
            "#,
        )
        .unwrap();
        assert_eq!(config.sanitizer.max_input_length, 5000);
        assert_eq!(config.sanitizer.max_passes, 4);
        assert_eq!(config.sanitizer.bio_max_newlines, 3);
        assert_eq!(config.audit.log_dir, Some(PathBuf::from("./data/audit")));
        assert_eq!(config.fields["bio"].kind, Some(FieldKind::Bio));
        assert_eq!(config.fields["website"].kind, Some(FieldKind::Url));
        assert_eq!(config.fields["name"].kind, Some(FieldKind::DisplayName));
    }

    #[test]
    fn test_invalid_limits_rejected() {
        assert!(parse_config("[sanitizer]\nmax_passes = 0\n").is_err());
        assert!(parse_config("[sanitizer]\nmax_input_length = 0\n").is_err());
    }

    #[test]
    fn test_unknown_field_type_rejected() {
        assert!(parse_config("[fields.x]\ntype = \"html\"\n").is_err());
    }

    #[tokio::test]
    async fn test_missing_config_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = load_config(&tmp.path().join("absent.toml")).await.unwrap();
        assert_eq!(config.sanitizer, SanitizerConfig::default());
    }

    #[tokio::test]
    async fn test_config_file_loaded() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("cadence.toml");
        tokio::fs::write(&path, "[fields.handle]\ntype = \"username\"\n")
            .await
            .unwrap();
        let config = load_config(&path).await.unwrap();
        assert_eq!(config.fields["handle"].kind, Some(FieldKind::Username));
    }

    #[test]
    fn test_cli_parses_field_kind() {
        let cli = Cli::try_parse_from(["cadence", "sanitize", "--field", "display-name", "x"]).unwrap();
        match cli.command {
            Commands::Sanitize { field, text } => {
                assert_eq!(field, FieldKind::DisplayName);
                assert_eq!(text.as_deref(), Some("x"));
            }
            _ => panic!("expected sanitize"),
        }
    }
}
