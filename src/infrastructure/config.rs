use serde::Deserialize;

const CONFIG_FILE: &str = "config/app";
const ENV_PREFIX: &str = "LOGDASH";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub logs: LogSettings,
    pub analytics: AnalyticsSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsSettings {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

/// Load settings from built-in defaults, the optional `config/app` file and
/// `LOGDASH_*` environment variables (`__` separates nested keys).
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(CONFIG_FILE).required(false))
        .add_source(environment());

    build(builder)
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn build(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> anyhow::Result<AppConfig> {
    let settings = builder
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("logs.path", "data/logs.csv")?
        .set_default("analytics.base_url", "http://localhost:8000")?
        .set_default("analytics.timeout_secs", 30_i64)?
        .build()?;

    Ok(settings.try_deserialize()?)
}
