//! Load typed records from configuration files.
//!
//! The format is picked from the file extension: `.json`, `.yaml` or `.yml`.
//!
//! ```no_run
//! use bindery::{Bindable, Options};
//!
//! #[derive(Debug, Default, Bindable)]
//! struct AppConfig {
//!     #[bind(tag = "name,required")]
//!     name: String,
//!     workers: u32,
//! }
//!
//! let config: AppConfig = bindery_config::load("app.yaml", &Options::new()).unwrap();
//! ```

use std::path::{Path, PathBuf};

use bindery::{Bind, BindError, Options, Unbind, Value};
use bindery_json::JsonError;
use bindery_yaml::YamlError;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Picks the format from the extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Format::Json => &["json"],
            Format::Yaml => &["yaml", "yml"],
        }
    }

    fn parse(self, text: &str) -> Result<Value, FormatError> {
        match self {
            Format::Json => Ok(bindery_json::from_str(text)?),
            Format::Yaml => Ok(bindery_yaml::from_str(text)?),
        }
    }

    fn render(self, value: &Value) -> Result<String, FormatError> {
        match self {
            Format::Json => Ok(bindery_json::to_string_pretty(value)?),
            Format::Yaml => Ok(bindery_yaml::to_string(value)?),
        }
    }
}

/// Parse or render failure of one of the supported formats.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error(transparent)]
    Json(#[from] JsonError),
    #[error(transparent)]
    Yaml(#[from] YamlError),
}

/// Error type for configuration loading and saving.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
    #[error("invalid {}: {source}", path.display())]
    Bind {
        path: PathBuf,
        #[source]
        source: BindError,
    },
    #[error("cannot encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
    #[error("unsupported config format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Io { path, .. }
            | LoadError::Parse { path, .. }
            | LoadError::Bind { path, .. }
            | LoadError::Encode { path, .. }
            | LoadError::UnsupportedFormat { path } => path,
        }
    }
}

fn format_of(path: &Path) -> Result<Format, LoadError> {
    Format::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat {
        path: path.to_path_buf(),
    })
}

/// Reads and parses a file into a generic value.
pub fn load_value(path: impl AsRef<Path>) -> Result<Value, LoadError> {
    let path = path.as_ref();
    let format = format_of(path)?;
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), ?format, "loading config");
    format.parse(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a file and binds it into a fresh `T`.
pub fn load<T: Bind + Default + 'static>(
    path: impl AsRef<Path>,
    options: &Options,
) -> Result<T, LoadError> {
    let path = path.as_ref();
    let value = load_value(path)?;
    bindery::bind(&value, options).map_err(|source| LoadError::Bind {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a file over an existing `target`, keeping fields the file leaves out.
pub fn load_into<T: Bind + 'static>(
    target: &mut T,
    path: impl AsRef<Path>,
    options: &Options,
) -> Result<(), LoadError> {
    let path = path.as_ref();
    let value = load_value(path)?;
    bindery::merge(target, &value, options).map_err(|source| LoadError::Bind {
        path: path.to_path_buf(),
        source,
    })
}

/// Unbinds `value` and writes it to `path` in the format of its extension.
pub fn save<T: Unbind + 'static>(
    value: &T,
    path: impl AsRef<Path>,
    options: &Options,
) -> Result<(), LoadError> {
    let path = path.as_ref();
    let format = format_of(path)?;
    let map = bindery::unbind(value, options).map_err(|source| LoadError::Bind {
        path: path.to_path_buf(),
        source,
    })?;
    let text = format
        .render(&Value::Map(map))
        .map_err(|source| LoadError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), ?format, "saving config");
    std::fs::write(path, text).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Walks up from `start_dir` looking for `<stem>.json`, `<stem>.yaml` or `<stem>.yml`.
pub fn find_config_file(start_dir: &Path, stem: &str) -> Option<PathBuf> {
    let mut current = start_dir;
    loop {
        for format in [Format::Json, Format::Yaml] {
            for extension in format.extensions() {
                let candidate = current.join(format!("{stem}.{extension}"));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        current = current.parent()?;
    }
}

/// Finds the nearest config file above `start_dir` and loads it.
pub fn load_from_dir<T: Bind + Default + 'static>(
    start_dir: &Path,
    stem: &str,
    options: &Options,
) -> Result<Option<(PathBuf, T)>, LoadError> {
    match find_config_file(start_dir, stem) {
        Some(path) => {
            let config = load(&path, options)?;
            Ok(Some((path, config)))
        }
        None => Ok(None),
    }
}
