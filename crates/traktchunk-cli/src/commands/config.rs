use crate::output::{Output, OutputFormat};
use chunk_config::{CredentialStore, JsonFileCredentialStore, PathManager, ServiceConfig};
use chunk_models::CredentialRecord;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;

pub fn show_config(
    config: &ServiceConfig,
    config_file: &Path,
    paths: &PathManager,
    full: bool,
    output: &Output,
) -> Result<()> {
    let credentials_path = config.credentials_path(paths.credentials_file());
    let store = JsonFileCredentialStore::new(credentials_path.clone());
    let record = match store.load() {
        Ok(record) => Some(record),
        Err(e) => {
            output.warn(format!("Could not read credential record: {}", e));
            None
        }
    };

    let secret = |value: Option<&str>| -> String {
        let value = value.unwrap_or_default();
        if full && !value.is_empty() {
            value.to_string()
        } else {
            mask_string(value)
        }
    };

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            println!("\n{}", "╔════════════════════════════════════════════════════════════╗".bright_white());
            println!("{}", "║".bright_white());
            println!("{} {}", "║".bright_white(), "Configuration".bright_cyan().bold());
            println!("{}", "╚════════════════════════════════════════════════════════════╝".bright_white());
            println!();

            let mut info_table = Table::new();
            info_table.set_header(vec![
                Cell::new("Config File").add_attribute(comfy_table::Attribute::Bold),
                Cell::new(format!(
                    "{}{}",
                    config_file.display(),
                    if config_file.exists() { "" } else { " (not found, using defaults)" }
                )),
            ]);
            info_table.add_row(vec![Cell::new("Config Dir"), Cell::new(paths.config_dir().display().to_string())]);
            info_table.add_row(vec![Cell::new("Credentials"), Cell::new(credentials_path.display().to_string())]);
            info_table.load_preset(comfy_table::presets::UTF8_FULL);
            info_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", info_table);
            println!();

            let mut service_table = Table::new();
            service_table.set_header(vec![
                Cell::new("Service").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold)
            ]);
            service_table.add_row(vec![Cell::new("Bind"), Cell::new(&config.server.bind)]);
            service_table.add_row(vec![Cell::new("API Base"), Cell::new(&config.trakt.api_base)]);
            service_table.add_row(vec![Cell::new("Token URL"), Cell::new(&config.trakt.token_url)]);
            service_table.add_row(vec![Cell::new("API Version"), Cell::new(&config.trakt.api_version)]);
            service_table.add_row(vec![
                Cell::new("Send API Key"),
                Cell::new(if config.trakt.send_api_key { "✓".green().to_string() } else { "✗".red().to_string() }),
            ]);
            service_table.add_row(vec![Cell::new("Timeout"), Cell::new(format!("{}s", config.trakt.timeout_secs))]);
            service_table.add_row(vec![
                Cell::new("Window Policy"),
                Cell::new(format!("{:?}", config.window.policy).to_lowercase()),
            ]);
            service_table.add_row(vec![
                Cell::new("Sort By listed_at"),
                Cell::new(if config.window.sort_by_listed_at { "✓".green().to_string() } else { "✗".red().to_string() }),
            ]);
            service_table.add_row(vec![
                Cell::new("Log File"),
                Cell::new(
                    config
                        .logging
                        .file
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "<stderr>".to_string()),
                ),
            ]);
            service_table.load_preset(comfy_table::presets::UTF8_FULL);
            service_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", service_table);
            println!();

            if let Some(record) = &record {
                let mut creds_table = Table::new();
                creds_table.set_header(vec![
                    Cell::new("Trakt Credentials").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold)
                ]);
                creds_table.add_row(vec![Cell::new("Client ID"), Cell::new(secret(record.client_id.as_deref()))]);
                creds_table.add_row(vec![Cell::new("Client Secret"), Cell::new(secret(record.client_secret.as_deref()))]);
                creds_table.add_row(vec![Cell::new("Access Token"), Cell::new(secret(record.access_token.as_deref()))]);
                creds_table.add_row(vec![Cell::new("Refresh Token"), Cell::new(secret(record.refresh_token.as_deref()))]);
                creds_table.add_row(vec![Cell::new("Expires At"), Cell::new(expiry(record))]);
                creds_table.load_preset(comfy_table::presets::UTF8_FULL);
                creds_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
                println!("{}", creds_table);
                println!();
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let credentials = record.as_ref().map(|record| {
                json!({
                    "client_id": secret(record.client_id.as_deref()),
                    "client_secret": secret(record.client_secret.as_deref()),
                    "access_token": secret(record.access_token.as_deref()),
                    "refresh_token": secret(record.refresh_token.as_deref()),
                    "expires_at": record.expires_at,
                })
            });
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "config_file_exists": config_file.exists(),
                "credentials_file": credentials_path.display().to_string(),
                "config": config,
                "credentials": credentials,
            }));
        }
    }

    Ok(())
}

/// Write the default configuration to `config_file`.
pub fn init_config(config_file: &Path, force: bool, output: &Output) -> Result<()> {
    if config_file.exists() && !force {
        output.warn(format!("Configuration file already exists at: {}", config_file.display()));
        output.info("Use --force to overwrite it.");
        return Ok(());
    }

    ServiceConfig::default()
        .save_to_file(config_file)
        .map_err(|e| eyre!("Failed to write config to {}: {}", config_file.display(), e))?;
    output.success(format!("Configuration written to {}", config_file.display()));
    Ok(())
}

fn expiry(record: &CredentialRecord) -> String {
    record
        .expires_at_utc()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "<not set>".to_string())
}

pub fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traktchunk.toml");
        let output = Output::new(OutputFormat::Json, true);

        init_config(&path, false, &output).unwrap();
        let written = ServiceConfig::load_from_file(&path).unwrap();
        assert_eq!(written.server.bind, "0.0.0.0:5252");

        std::fs::write(&path, "[server]\nbind = \"127.0.0.1:1\"\n").unwrap();
        init_config(&path, false, &output).unwrap();
        assert_eq!(ServiceConfig::load_from_file(&path).unwrap().server.bind, "127.0.0.1:1");

        init_config(&path, true, &output).unwrap();
        assert_eq!(ServiceConfig::load_from_file(&path).unwrap().server.bind, "0.0.0.0:5252");
    }

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "<not set>");
        assert_eq!(mask_string("abcd"), "****");
        assert_eq!(mask_string("abcdef123"), "ab***23");
    }
}
