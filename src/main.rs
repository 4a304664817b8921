use anyhow::Context;

use cake_diorama::{DioramaApp, DioramaConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("cake_diorama=info"))
        .init();

    let config = DioramaConfig::load().context("failed to load configuration")?;
    log::info!("Assets from {}", config.asset_root.display());

    let app = DioramaApp::new(config)?;
    app.run()?;
    Ok(())
}
