#![forbid(unsafe_code)]

mod display;
mod error;
mod persistence;
mod recording;
mod rounding;
mod settings;

pub use display::Display;
pub use error::Error;
pub use persistence::Persistence;
pub use recording::{RecordFrequency, Recording, RecordingConfig};
pub use rounding::RoundingPolicy;
pub use settings::SettingsStore;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use toml_edit::{DocumentMut, Item};
use tracing::debug;

/// Environment variables with this prefix override file values, e.g.
/// `BATTERY_INFO_DISPLAY__ROUNDING=floor`.
pub const ENV_PREFIX: &str = "BATTERY_INFO_";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub display: Display,
    pub recording: Recording,
    pub persistence: Persistence,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the configuration from a TOML file layered over the defaults,
    /// then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parse a TOML string layered over the defaults. No environment overrides.
    pub fn from_toml_str(toml: &str) -> Result<Self, Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(toml))
            .extract()
            .map_err(|err| Error::from(Box::new(err)))
    }

    /// Write the configuration to `path`.
    ///
    /// Keys and comments already present in the file that this model does not
    /// know about are kept.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let mut doc = match fs::read_to_string(path) {
            Ok(text) => text.parse::<DocumentMut>()?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => DocumentMut::new(),
            Err(err) => return Err(err.into()),
        };
        let fresh = toml_edit::ser::to_document(self)?;
        merge_document(&mut doc, &fresh);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, doc.to_string())?;
        debug!(path = %path.display(), "config saved");
        Ok(())
    }
}

/// Optional settings. Unset means absent from the file, so a stale value
/// left in the document would come back on the next load.
const OPTIONAL_KEYS: &[(&str, &str)] = &[
    ("persistence", "database_path"),
    ("persistence", "export_dir"),
];

fn merge_document(doc: &mut DocumentMut, fresh: &DocumentMut) {
    for &(section, key) in OPTIONAL_KEYS {
        let set = fresh
            .get(section)
            .and_then(Item::as_table)
            .is_some_and(|table| table.contains_key(key));
        if set {
            continue;
        }
        if let Some(target) = doc.get_mut(section).and_then(Item::as_table_mut) {
            target.remove(key);
        }
    }

    for (section, item) in fresh.iter() {
        match (item.as_table(), doc.get_mut(section).and_then(Item::as_table_mut)) {
            (Some(source), Some(target)) => {
                for (key, value) in source.iter() {
                    match target.get_mut(key) {
                        Some(Item::Value(existing)) if value.is_value() => {
                            let decor = existing.decor().clone();
                            let mut replacement = value.clone();
                            if let Some(v) = replacement.as_value_mut() {
                                *v.decor_mut() = decor;
                            }
                            target.insert(key, replacement);
                        }
                        _ => {
                            target.insert(key, value.clone());
                        }
                    }
                }
            }
            _ => {
                doc.insert(section, item.clone());
            }
        }
    }
}
