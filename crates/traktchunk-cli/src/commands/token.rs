use super::config::mask_string;
use crate::output::{Output, OutputFormat};
use chunk_config::{PathManager, ServiceConfig};
use chunk_core::{ChunkService, TokenStatus};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;

pub async fn run_token(
    cmd: crate::TokenCommands,
    config: &ServiceConfig,
    paths: &PathManager,
    output: &Output,
) -> Result<()> {
    let service = ChunkService::from_config(config, paths)
        .map_err(|e| eyre!("Failed to initialise service: {}", e))?;
    let tokens = service.tokens();

    match cmd {
        crate::TokenCommands::Status => {
            let status = tokens.status().await.map_err(|e| eyre!("{}", e))?;
            report_status(&status, &tokens.store_location(), output);
            Ok(())
        }
        crate::TokenCommands::Ensure => match tokens.ensure_access_token().await {
            Ok(token) => {
                match output.format() {
                    OutputFormat::Human => {
                        output.success(format!("Access token ready: {}", mask_string(token.as_str())));
                    }
                    OutputFormat::Json | OutputFormat::JsonPretty => {
                        output.json(&json!({
                            "status": "valid",
                            "access_token": mask_string(token.as_str()),
                            "location": tokens.store_location(),
                        }));
                    }
                }
                Ok(())
            }
            Err(e) => Err(eyre!("Failed to obtain access token: {}", e)),
        },
    }
}

fn report_status(status: &TokenStatus, location: &str, output: &Output) {
    let (state, expires_at, refreshable) = match status {
        TokenStatus::Valid { expires_at } => ("valid", Some(*expires_at), None),
        TokenStatus::Expired { expires_at, refreshable } => ("expired", *expires_at, Some(*refreshable)),
        TokenStatus::Missing { refreshable } => ("missing", None, Some(*refreshable)),
    };

    match output.format() {
        OutputFormat::Human => {
            output.info(format!("Credential record: {}", location));
            let expiry = expires_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string());
            match status {
                TokenStatus::Valid { .. } => output.success(format!("Access token valid until {}", expiry)),
                TokenStatus::Expired { refreshable: true, .. } => {
                    output.warn(format!("Access token expired ({}); it will be refreshed on the next request", expiry))
                }
                TokenStatus::Missing { refreshable: true } => {
                    output.warn("No access token stored; one will be obtained with the refresh token")
                }
                TokenStatus::Expired { refreshable: false, .. } | TokenStatus::Missing { refreshable: false } => {
                    output.error("No valid access or refresh token available. Please update config with refresh_token.")
                }
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "status": state,
                "expires_at": expires_at.map(|t| t.to_rfc3339()),
                "refreshable": refreshable,
                "location": location,
            }));
        }
    }
}
