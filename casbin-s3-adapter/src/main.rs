use std::path::Path;

use anyhow::{Context, Result};
use casbin::{CoreApi, DefaultModel, Enforcer};
use casbin_s3_adapter::{LocalFsBackend, PolicyAdapter, S3Adapter, policy};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.store.to_config()?;
    let mut model = DefaultModel::from_file(&cli.model)
        .await
        .with_context(|| format!("failed to load model {}", cli.model.display()))?;
    let remote = S3Adapter::new(config.clone()).await?;

    match cli.command {
        Commands::Push { policy } => {
            let local = local_adapter(&policy)?;
            let rules = local.load(&mut model).await?;
            let bytes = remote.save(&model).await?;
            tracing::info!(
                rules,
                bytes,
                bucket = %config.bucket,
                key = %config.key,
                "pushed {}",
                policy.display()
            );
        }
        Commands::Pull { output } => {
            let rules = remote.load(&mut model).await?;
            match output {
                Some(path) => {
                    local_adapter(&path)?.save(&model).await?;
                    tracing::info!(rules, "wrote {}", path.display());
                }
                None => print!("{}", String::from_utf8_lossy(&policy::serialize_model(&model))),
            }
        }
        Commands::Enforce { sub, obj, act } => {
            let e = Enforcer::new(model, remote).await?;
            let allowed = e.enforce((sub.as_str(), obj.as_str(), act.as_str()))?;
            println!("{}", if allowed { "allow" } else { "deny" });
            if !allowed {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

/// Treats the file's directory as a bucket and its name as the key.
fn local_adapter(path: &Path) -> Result<PolicyAdapter<LocalFsBackend>> {
    let name = path
        .file_name()
        .with_context(|| format!("{} is not a file path", path.display()))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Ok(PolicyAdapter::with_backend(
        LocalFsBackend::new(dir),
        name.to_string_lossy().into_owned(),
    ))
}
