// SPDX-License-Identifier: PMPL-1.0-or-later
//! Clearance API server binary

use anyhow::Context;
use clearance_api::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ApiConfig::from_env();

    tracing::info!(
        host = %config.host,
        port = config.port,
        fallback = %config.fallback_path,
        unknown_permission_policy = %config.unknown_permission_policy,
        allow_anonymous = config.allow_anonymous,
        "Loaded configuration"
    );

    clearance_api::serve(config)
        .await
        .context("Clearance API server failed")?;

    Ok(())
}
