//! Environment variable fallbacks.
//!
//! Env vars are a fallback, not an override: they only fill fields that no
//! config file set.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::merge::{ConfigLayer, FieldSources};

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

/// All supported `TANDEM_*` env var mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "TANDEM_DEFAULT_MODE",
        field_path: "storage.default_mode",
    },
    EnvMapping {
        var_name: "TANDEM_DURABLE_PATH",
        field_path: "storage.durable_path",
    },
    EnvMapping {
        var_name: "TANDEM_SYNC_ON_WRITE",
        field_path: "storage.sync_on_write",
    },
    EnvMapping {
        var_name: "TANDEM_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "TANDEM_LOG_FORMAT",
        field_path: "logging.format",
    },
];

/// Apply environment variable fallbacks to fields that were not set by any
/// config file layer.
///
/// Returns the number of env vars applied.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let set_by_file = sources
            .get(mapping.field_path)
            .is_some_and(|layer| *layer != ConfigLayer::Defaults);
        if set_by_file {
            continue;
        }

        if let Some(val) = env_vars.get(mapping.var_name) {
            let Some(value) = coerce_to_toml_value(mapping.field_path, val) else {
                warn!(
                    var = mapping.var_name,
                    field = mapping.field_path,
                    value = %val,
                    "ignoring env var with a value of the wrong type"
                );
                continue;
            };
            debug!(
                var = mapping.var_name,
                field = mapping.field_path,
                "applying env var fallback"
            );

            set_field(merged, mapping.field_path, value);
            sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
            count = count.saturating_add(1);
        }
    }

    count
}

/// Set a `section.field` path in the TOML tree.
fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) {
    let Some((section, field)) = path.split_once('.') else {
        return;
    };
    let Some(table) = root.as_table_mut() else {
        return;
    };

    let section_val = table
        .entry(section.to_owned())
        .or_insert(toml::Value::Table(toml::map::Map::new()));
    if let Some(section_table) = section_val.as_table_mut() {
        section_table.insert(field.to_owned(), value);
    }
}

/// Coerce a string env var value to the TOML type of the target field.
///
/// Returns `None` if a typed field's value does not parse.
fn coerce_to_toml_value(path: &str, val: &str) -> Option<toml::Value> {
    if path == "storage.sync_on_write" {
        return val.parse::<bool>().ok().map(toml::Value::Boolean);
    }

    Some(toml::Value::String(val.to_owned()))
}

/// Collect all current environment variables into a map.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}
