use clap::Parser;
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/khata.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite connection URL.
    pub database: String,
    /// Log level for the env filter.
    pub level: String,
    /// Sender id attributed to console input.
    pub sender: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: "sqlite:./khata.db?mode=rwc".to_string(),
            level: "info".to_string(),
            sender: "console".to_string(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "khata", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override database URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    /// Override the sender id attributed to console input.
    #[arg(long)]
    sender: Option<String>,
    /// Process a single message and exit instead of reading stdin.
    #[arg(long)]
    message: Option<String>,
}

pub fn load() -> Result<(AppConfig, Option<String>), config::ConfigError> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("KHATA"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(database_url) = args.database_url {
        settings.database = database_url;
    }
    if let Some(sender) = args.sender {
        settings.sender = sender;
    }

    Ok((settings, args.message))
}
