use std::collections::BTreeMap;
use std::collections::HashMap;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use config::Value;

use crate::utils::duration::parse_duration;
use crate::Result;

/// Read-only view of a key-value configuration source.
///
/// Every getter returns `Ok(None)` when the key is not set, so callers can
/// tell an operator override apart from a built-in default.
pub trait ConfigSource {
    fn get_string(
        &self,
        key: &str,
    ) -> Result<Option<String>>;

    fn get_bool(
        &self,
        key: &str,
    ) -> Result<Option<bool>>;

    fn get_int(
        &self,
        key: &str,
    ) -> Result<Option<i64>>;

    fn get_float(
        &self,
        key: &str,
    ) -> Result<Option<f64>>;

    fn get_string_list(
        &self,
        key: &str,
    ) -> Result<Option<Vec<String>>>;

    /// Accepts either a table or a `name=value,name2=value2` string.
    fn get_string_map(
        &self,
        key: &str,
    ) -> Result<Option<BTreeMap<String, String>>>;

    fn is_set(
        &self,
        key: &str,
    ) -> bool;

    fn get_duration(
        &self,
        key: &str,
    ) -> Result<Option<Duration>> {
        match self.get_string(key)? {
            None => Ok(None),
            Some(raw) => parse_duration(&raw)
                .map(Some)
                .map_err(|e| ConfigError::Message(format!("{key}: {e}")).into()),
        }
    }
}

fn optional<T>(result: std::result::Result<T, ConfigError>) -> Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_pairs(
    key: &str,
    raw: &str,
) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, value) = pair.split_once('=').ok_or_else(|| {
            ConfigError::Message(format!(
                "{key}: expected 'name=value' pairs separated by ',', got {pair:?}"
            ))
        })?;
        map.insert(name.trim().to_string(), value.trim().to_string());
    }
    Ok(map)
}

impl ConfigSource for Config {
    fn get_string(
        &self,
        key: &str,
    ) -> Result<Option<String>> {
        optional(Config::get_string(self, key))
    }

    fn get_bool(
        &self,
        key: &str,
    ) -> Result<Option<bool>> {
        optional(Config::get_bool(self, key))
    }

    fn get_int(
        &self,
        key: &str,
    ) -> Result<Option<i64>> {
        optional(Config::get_int(self, key))
    }

    fn get_float(
        &self,
        key: &str,
    ) -> Result<Option<f64>> {
        optional(Config::get_float(self, key))
    }

    fn get_string_list(
        &self,
        key: &str,
    ) -> Result<Option<Vec<String>>> {
        if let Ok(list) = self.get::<Vec<String>>(key) {
            return Ok(Some(list));
        }
        let raw = optional(Config::get_string(self, key))?;
        Ok(raw.map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        }))
    }

    fn get_string_map(
        &self,
        key: &str,
    ) -> Result<Option<BTreeMap<String, String>>> {
        if let Ok(table) = self.get::<HashMap<String, String>>(key) {
            return Ok(Some(table.into_iter().collect()));
        }
        match optional(Config::get_string(self, key))? {
            None => Ok(None),
            Some(raw) => parse_pairs(key, &raw).map(Some),
        }
    }

    fn is_set(
        &self,
        key: &str,
    ) -> bool {
        self.get::<Value>(key).is_ok()
    }
}
