//! Per-map event buffer settings.
//!
//! Descriptors have the form `<enabled|disabled>_<max size>_<ttl>`, for
//! example `enabled_100_24h`.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::constants::BPF_MAP_EVENT_BUFFERS_NAME;
use crate::constants::DEFAULT_EVENT_BUFFER_DESCRIPTORS;
use crate::utils::duration::parse_duration;
use crate::Error;
use crate::EventBufferError;
use crate::Result;

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventBufferConfig {
    /// Never true when `max_size` is 0
    pub enabled: bool,
    pub max_size: usize,
    pub ttl: Duration,
}

/// Parses one event buffer descriptor.
pub fn parse_event_buffer_tuple(descriptor: &str) -> std::result::Result<EventBufferConfig, EventBufferError> {
    let tokens: Vec<&str> = descriptor.split('_').collect();
    let [flag, size_token, ttl_token] = tokens[..] else {
        return Err(EventBufferError::WrongTokenCount {
            descriptor: descriptor.to_string(),
            found: tokens.len(),
        });
    };

    let enabled = match flag {
        "enabled" => true,
        "disabled" => false,
        _ => {
            return Err(EventBufferError::InvalidEnabledFlag {
                token: flag.to_string(),
            })
        }
    };

    let size: i64 = size_token.parse().map_err(|e: std::num::ParseIntError| EventBufferError::InvalidMaxSize {
        token: size_token.to_string(),
        reason: e.to_string(),
    })?;
    let max_size = usize::try_from(size).map_err(|_| EventBufferError::NegativeMaxSize { value: size })?;

    let ttl = parse_duration(ttl_token).map_err(|reason| EventBufferError::InvalidTtl {
        token: ttl_token.to_string(),
        reason,
    })?;

    Ok(EventBufferConfig {
        enabled: enabled && max_size != 0,
        max_size,
        ttl,
    })
}

/// Event buffer settings indexed by map name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBufferConfigs(BTreeMap<String, EventBufferConfig>);

impl EventBufferConfigs {
    /// Starts from the built-in descriptors.
    pub fn with_defaults() -> Result<Self> {
        let mut configs = Self::default();
        configs.merge(
            DEFAULT_EVENT_BUFFER_DESCRIPTORS
                .iter()
                .map(|(name, descriptor)| (name.to_string(), descriptor.to_string())),
        )?;
        Ok(configs)
    }

    /// Replaces the whole entry of every named map; nothing is merged field by field.
    ///
    /// Stops at the first malformed descriptor.
    pub fn merge<I, K, V>(
        &mut self,
        entries: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, descriptor) in entries {
            let name = name.as_ref();
            let config =
                parse_event_buffer_tuple(descriptor.as_ref()).map_err(|source| Error::MalformedDescriptor {
                    option: BPF_MAP_EVENT_BUFFERS_NAME,
                    map: name.to_string(),
                    source,
                })?;
            self.0.insert(name.to_string(), config);
        }
        Ok(())
    }

    /// Settings for `name`, or a disabled config when the map is unknown.
    pub fn get(
        &self,
        name: &str,
    ) -> EventBufferConfig {
        self.0.get(name).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
