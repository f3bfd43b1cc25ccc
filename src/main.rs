use std::env;

use netd_config::load_source;
use netd_config::store_source_in_file;
use netd_config::utils::file_io::create_dir_if_not_exist;
use netd_config::DaemonConfig;
use netd_config::MapElementSizes;
use netd_config::Result;
use netd_config::SystemResources;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

fn main() -> Result<()> {
    // Initializing Logs
    init_observability();

    let config_path = env::args().nth(1);
    let source = load_source(config_path.as_deref())?;

    let mut config = match DaemonConfig::populate(&source, &SystemResources, MapElementSizes::datapath_defaults()) {
        Ok(config) => config,
        Err(e) => {
            error!("Refusing to start with invalid configuration: {}", e);
            return Err(e);
        }
    };

    let state_dir = config.state_dir.clone();
    create_dir_if_not_exist(&state_dir)?;
    store_source_in_file(&source, &state_dir)?;
    config.store_in_file(&state_dir)?;

    if let Err(e) = config.validate_unchanged() {
        if e.is_fatal() {
            return Err(e);
        }
        warn!("{}", e);
    }

    info!("Configuration stored in {}", state_dir.display());
    Ok(())
}

pub fn init_observability() {
    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));
    tracing_subscriber::registry().with(base_subscriber).init();
}
