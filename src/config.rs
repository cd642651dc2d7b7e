use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::cli::{InventoryArgs, ScanArgs};
use crate::platform;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DATABASE_FILE_NAME: &str = "movies.db";
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "couldn't find a library path.\n\
         Make a config file with the path in it, or pass the path in as an argument.\n\
         The config file should look something like:\n\
         \n\
         [movies1]\n\
         path = \"/home/me/movies/\""
    )]
    NoRoots,

    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid lookup_timeout {value:?} in config: {source}")]
    Timeout {
        value: String,
        #[source]
        source: humantime::DurationError,
    },
}

/// On-disk config layout. The `reeltrack` table holds run settings, every
/// other table is a named library.
///
/// ```toml
/// [reeltrack]
/// database = "movies.db"
/// lookup_timeout = "10s"
///
/// [movies1]
/// path = "/srv/movies/"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default, rename = "reeltrack")]
    pub settings: Settings,

    #[serde(flatten)]
    pub libraries: BTreeMap<String, Library>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    pub database: Option<PathBuf>,
    pub report_dir: Option<PathBuf>,
    pub lookup_timeout: Option<String>,
    pub omdb_api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Library {
    pub path: Option<PathBuf>,
}

impl ConfigFile {
    /// Load `explicit` if given, otherwise the default file when it exists.
    /// Relative paths inside the file resolve against the file's directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = platform::state_dir().join(CONFIG_FILE_NAME);
                if !default.exists() {
                    tracing::debug!(path = %default.display(), "no config file");
                    return Ok(ConfigFile::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        let mut file = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        if let Some(base) = path.parent() {
            file.resolve_relative(base);
        }

        Ok(file)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn resolve_relative(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };

        if let Some(db) = self.settings.database.as_mut() {
            resolve(db);
        }
        if let Some(dir) = self.settings.report_dir.as_mut() {
            resolve(dir);
        }
        for library in self.libraries.values_mut() {
            if let Some(path) = library.path.as_mut() {
                resolve(path);
            }
        }
    }

    /// Library roots that exist as directories, in library-name order.
    pub fn library_roots(&self) -> Vec<PathBuf> {
        let mut roots = Vec::new();

        for (name, library) in &self.libraries {
            match &library.path {
                Some(path) if path.is_dir() => roots.push(path.clone()),
                Some(path) => {
                    tracing::warn!(library = %name, path = %path.display(), "configured path is not a directory, skipping");
                }
                None => {
                    tracing::warn!(library = %name, "library has no path, skipping");
                }
            }
        }

        roots
    }

    fn lookup_timeout(&self) -> Result<Option<Duration>, ConfigError> {
        self.settings
            .lookup_timeout
            .as_deref()
            .map(|value| {
                humantime::parse_duration(value).map_err(|source| ConfigError::Timeout {
                    value: value.to_string(),
                    source,
                })
            })
            .transpose()
    }
}

/// Inventory location: `--db`, then the config file, then next to the program.
pub fn database_path(args: &InventoryArgs, file: &ConfigFile) -> PathBuf {
    args.db
        .clone()
        .or_else(|| file.settings.database.clone())
        .unwrap_or_else(|| platform::state_dir().join(DATABASE_FILE_NAME))
}

pub struct Config {
    pub roots: Vec<PathBuf>,
    pub database: PathBuf,
    pub report_dir: PathBuf,
    pub lookup_timeout: Duration,
    pub omdb_api_key: Option<String>,
    pub lookup_enabled: bool,
}

impl Config {
    pub fn from_scan_args(args: &ScanArgs) -> Result<Self, ConfigError> {
        let file = ConfigFile::load(args.inventory.config.as_deref())?;
        Self::from_parts(args, &file)
    }

    /// Command-line values win over the config file.
    pub fn from_parts(args: &ScanArgs, file: &ConfigFile) -> Result<Self, ConfigError> {
        let mut roots = file.library_roots();
        roots.extend(args.roots.iter().cloned());

        if roots.is_empty() {
            return Err(ConfigError::NoRoots);
        }

        let lookup_timeout = match args.lookup_timeout {
            Some(timeout) => timeout,
            None => file.lookup_timeout()?.unwrap_or(DEFAULT_LOOKUP_TIMEOUT),
        };

        Ok(Config {
            roots,
            database: database_path(&args.inventory, file),
            report_dir: args
                .out_dir
                .clone()
                .or_else(|| file.settings.report_dir.clone())
                .unwrap_or_else(|| PathBuf::from(".")),
            lookup_timeout,
            omdb_api_key: args.omdb_key.clone().or_else(|| file.settings.omdb_api_key.clone()),
            lookup_enabled: !args.no_lookup,
        })
    }
}
