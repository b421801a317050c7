use std::path::Path;

use anyhow::Context;
use blobguard_gate::PathResolver;
use blobguard_server::content_type::content_type_for;
use blobguard_server::{AppState, BlobGuardServer, ServerConfig};
use blobguard_types::{AccessDecision, Principal};
use colored::Colorize;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args).await,
        Command::Resolve(args) => cmd_resolve(&config, args),
        Command::Authorize(args) => cmd_authorize(config, args).await,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => ServerConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(ServerConfig::default()),
    }
}

async fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(root) = args.root {
        config.storage_root = root;
    }
    if let Some(catalog) = args.catalog {
        config.catalog_path = Some(catalog);
    }
    let server = BlobGuardServer::from_config(config).context("building server")?;
    server.serve().await.context("serving")
}

fn cmd_resolve(config: &ServerConfig, args: ResolveArgs) -> anyhow::Result<()> {
    let resolver = PathResolver::new(config.guarded_namespace.clone());
    match resolver.resolve(&args.path) {
        Ok(resolved) => {
            println!("Storage key:  {}", resolved.storage_key.as_str().bold());
            println!("Content type: {}", content_type_for(&resolved.extension).cyan());
            match &resolved.guarded_object_id {
                Some(id) => println!("Guarded:      {} (object {})", "yes".yellow(), id.as_str().bold()),
                None => println!("Guarded:      {}", "no".green()),
            }
        }
        Err(e) => println!("{} {} (served as 404)", "✗".red().bold(), e),
    }
    Ok(())
}

async fn cmd_authorize(mut config: ServerConfig, args: AuthorizeArgs) -> anyhow::Result<()> {
    if let Some(catalog) = args.catalog {
        config.catalog_path = Some(catalog);
    }
    let state = AppState::from_config(&config).context("loading catalog")?;
    let principal = match args.user {
        Some(name) => Principal::user(name),
        None => Principal::anonymous(),
    };

    let resolved = match state.resolver.resolve(&args.path) {
        Ok(resolved) => resolved,
        Err(e) => {
            println!("{} not found: {}", "✗".red().bold(), e);
            return Ok(());
        }
    };
    let Some(id) = &resolved.guarded_object_id else {
        println!("{} {} is not guarded; served to {}", "✓".green().bold(), resolved.storage_key, principal);
        return Ok(());
    };

    let decision = state.guard.authorize(&principal, id).await?;
    let mark = match decision {
        AccessDecision::Allow => "✓".green().bold(),
        AccessDecision::Forbidden | AccessDecision::NotFound => "✗".red().bold(),
    };
    println!("{} {} for {} on object {}", mark, decision.to_string().bold(), principal, id.as_str().yellow());
    Ok(())
}
