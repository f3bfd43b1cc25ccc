//! Configuration sources and the resolved daemon configuration.
//!
//! Sources are layered with priority (lowest first):
//! 1. Optional local file `config/netd`
//! 2. File named by the `CONFIG_PATH` environment variable
//! 3. Explicit file passed to [`load_source`]
//! 4. Environment variables `NETD__<KEY>` (highest priority)
//!
//! Deprecated option names are then mapped onto their replacements.

mod daemon;
mod source;
pub use daemon::*;
pub use source::*;

#[cfg(test)]
mod daemon_test;

//---
use std::env;

use config::Config;
use config::Environment;
use config::File;
use config::Value;
use tracing::debug;
use tracing::warn;

use crate::constants::DEPRECATED_OPTION_NAMES;
use crate::constants::ENV_PREFIX;
use crate::constants::ENV_SEPARATOR;
use crate::Result;

/// Builds the layered configuration source consumed by [`DaemonConfig::populate`].
///
/// # Arguments
/// * `config_path` - Optional path to an operator-supplied config file; it must exist
pub fn load_source(config_path: Option<&str>) -> Result<Config> {
    let mut builder = Config::builder().add_source(File::with_name("config/netd").required(false));

    if let Ok(path) = env::var("CONFIG_PATH") {
        debug!("Loading config file from CONFIG_PATH: {}", path);
        builder = builder.add_source(File::with_name(&path));
    }

    if let Some(path) = config_path {
        builder = builder.add_source(File::with_name(path).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .ignore_empty(true)
            .try_parsing(true),
    );

    replace_deprecated_fields(builder.build()?)
}

/// Copies values set under a deprecated key to the current key, unless the
/// current key is set as well.
pub fn replace_deprecated_fields(source: Config) -> Result<Config> {
    let mut overrides = Vec::new();
    for (old, new) in DEPRECATED_OPTION_NAMES {
        let Ok(value) = source.get::<Value>(old) else {
            continue;
        };
        if source.get::<Value>(new).is_ok() {
            warn!("Ignoring deprecated option {} since {} is also set", old, new);
            continue;
        }
        warn!("Option {} is deprecated, use {} instead", old, new);
        overrides.push((*new, value));
    }

    if overrides.is_empty() {
        return Ok(source);
    }

    let mut builder = Config::builder().add_source(source);
    for (key, value) in overrides {
        builder = builder.set_override(key, value)?;
    }
    Ok(builder.build()?)
}
