use anyhow::{bail, Context};
use chrono::{TimeZone, Utc};
use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::authz::Capability;
use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[arg(long, help = "User id recorded in the token")]
    pub user_id: i64,

    #[arg(long, help = "User display name")]
    pub name: String,

    #[arg(long, help = "Capability to grant, e.g. \"view products\" (repeatable)")]
    pub permission: Vec<String>,

    #[arg(long, help = "Grant every product capability")]
    pub all: bool,

    #[arg(
        long,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Token lifetime in hours (defaults to configuration)"
    )]
    pub expiry_hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config();

    let mut permissions = args.permission;
    if args.all {
        permissions.extend(Capability::ALL.iter().map(|c| c.as_str().to_string()));
    }
    permissions.sort();
    permissions.dedup();

    for permission in &permissions {
        if Capability::parse(permission).is_none() {
            bail!("Unknown capability '{}'", permission);
        }
    }

    let expiry_hours = args.expiry_hours.unwrap_or(config.security.jwt_expiry_hours);
    let claims = Claims::new(args.user_id, args.name, permissions, expiry_hours).context("invalid token expiry")?;
    let token = generate_jwt(&claims, &config.security.jwt_secret).context("failed to mint token")?;

    match output_format {
        OutputFormat::Json => {
            let expires_at = Utc.timestamp_opt(claims.exp, 0).single();
            println!(
                "{}",
                json!({
                    "token": token,
                    "user_id": claims.user_id,
                    "permissions": claims.permissions,
                    "expires_at": expires_at,
                })
            );
        }
        OutputFormat::Text => println!("{}", token),
    }

    Ok(())
}
