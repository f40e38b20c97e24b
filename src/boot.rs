use std::{env, str::FromStr as _};

use clap::Parser as _;
use config_rs::Config as ConfigRs;
use tracing::{debug, trace};

use crate::{
    app_info::AppInfo,
    cli::{Cli, Commands},
    commands::{serve, version},
    config::Config,
    environment::Environment,
    jobs::recurring::JobRegistry,
    setup_tracing::setup_tracing_for_command,
};

const ENVIRONMENT_VARIABLE: &str = "APP_ENVIRONMENT";

/// Configuration for bootstrapping the application.
///
/// Carries the binary's metadata plus the compiled-in registry of
/// recurring jobs registered against the scheduler at startup.
pub struct BootConfig {
    pub app_info: AppInfo,
    pub job_registry: JobRegistry,
}

impl BootConfig {
    #[must_use]
    pub const fn new(app_info: AppInfo, job_registry: JobRegistry) -> Self {
        Self {
            app_info,
            job_registry,
        }
    }
}

pub async fn boot(config: BootConfig) {
    let cli = Cli::parse();

    if matches!(cli.command, Some(Commands::Version)) {
        version::print_version_info(config.app_info);
        return;
    }

    let environment = set_environment();

    let app_config = read_config(&environment);

    setup_tracing_for_command(&cli.command, &app_config.tracing.log_level);

    debug!("Environment set to: {:?}", environment);
    trace!("Configuration loaded: {:?}", app_config);

    match cli.command {
        Some(Commands::Version) => version::print_version_info(config.app_info),
        Some(Commands::Serve) | None => {
            serve::handle_serve_command(environment, app_config, config.job_registry).await;
        }
    }
}

#[must_use]
pub fn set_environment() -> Environment {
    env::var(ENVIRONMENT_VARIABLE)
        .ok()
        .and_then(|s| Environment::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn read_config(environment: &Environment) -> Config {
    let config_file_name = format!("config/{environment}");

    trace!("Reading configuration from: {}", config_file_name);

    ConfigRs::builder()
        .add_source(config_rs::File::with_name(&config_file_name))
        .add_source(config_rs::Environment::with_prefix("APP").separator("__"))
        .build()
        .unwrap()
        .try_deserialize()
        .expect("Failed to deserialize configuration")
}
