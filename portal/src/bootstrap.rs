use crate::config::AppConfig;

/// Load .env from multiple candidate paths.
pub fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Foundation init: environment and configuration.
pub fn init_foundation() -> Result<AppConfig, anyhow::Error> {
    load_dotenv();
    let config = AppConfig::load();

    for setting in config.settings_info() {
        tracing::debug!(
            key = %setting.key,
            value = %setting.value,
            has_value = setting.has_value,
            "{}",
            setting.description
        );
    }
    if config.access_token.is_none() {
        tracing::warn!("ACADEMY_ACCESS_TOKEN is not set, requests will be anonymous");
    }

    tracing::info!(
        api = %config.api_base_url,
        role = config.role.as_str(),
        "Settings loaded"
    );
    Ok(config)
}
