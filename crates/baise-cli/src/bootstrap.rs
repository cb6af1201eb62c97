use anyhow::Context;
use baise_config::BaiseConfig;

/// Load `.env` from the working directory (if any), then the layered config.
pub fn load_config() -> anyhow::Result<BaiseConfig> {
    load_dotenv()?;
    BaiseConfig::load().context("failed to load baise configuration")
}

fn load_dotenv() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let env_path = cwd.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
        return Ok(());
    }

    // Fall back to the nearest `.env` in a parent directory.
    dotenvy::dotenv().ok();
    Ok(())
}
