//! Read-only settings the pipeline depends on.
//!
//! [`DashboardConfig::default`] mirrors the production defaults; [`DashboardConfig::from_env`]
//! loads a `.env` file (if any) and applies `SHEET_DASHBOARD_*` overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{DashboardError, DashboardResult};

const ENV_PREFIX: &str = "SHEET_DASHBOARD_";

fn default_max_upload_size() -> u64 {
    // 50 MB in bytes
    50 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    vec![".xlsx".to_string(), ".xls".to_string(), ".csv".to_string()]
}

fn default_preview_rows() -> usize {
    1000
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardConfig {
    /// Largest accepted upload, in bytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
    /// Accepted file extensions, with leading dot, compared case-insensitively.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    /// Maximum number of rows returned as an ingestion preview.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    /// Where uploads are stored before ingestion.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Cache entry lifetime. `None` keeps entries until they are cleared.
    #[serde(default)]
    pub cache_ttl: Option<Duration>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            max_upload_size: default_max_upload_size(),
            allowed_extensions: default_allowed_extensions(),
            preview_rows: default_preview_rows(),
            upload_dir: default_upload_dir(),
            cache_ttl: None,
        }
    }
}

impl DashboardConfig {
    /// Defaults, overridden by `SHEET_DASHBOARD_*` variables from the environment or `.env`.
    pub fn from_env() -> DashboardResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> DashboardResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let mut config = Self::default();

        if let Some(raw) = var("MAX_UPLOAD_SIZE") {
            config.max_upload_size = parse_setting("MAX_UPLOAD_SIZE", &raw)?;
        }
        if let Some(raw) = var("ALLOWED_EXTENSIONS") {
            config.allowed_extensions = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(normalize_extension)
                .collect();
        }
        if let Some(raw) = var("PREVIEW_ROWS") {
            config.preview_rows = parse_setting("PREVIEW_ROWS", &raw)?;
        }
        if let Some(raw) = var("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(raw);
        }
        if let Some(raw) = var("CACHE_TTL_SECS") {
            let secs: u64 = parse_setting("CACHE_TTL_SECS", &raw)?;
            config.cache_ttl = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Refuse uploads with a disallowed extension or a payload above `max_upload_size`.
    pub fn check_upload(&self, file_name: &str, size: u64) -> DashboardResult<()> {
        let ext = extension_of(Path::new(file_name));
        if !self
            .allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
        {
            return Err(DashboardError::UploadRejected {
                message: format!(
                    "invalid file type '{ext}'. Allowed: {}",
                    self.allowed_extensions.join(", ")
                ),
            });
        }
        if size > self.max_upload_size {
            return Err(DashboardError::UploadRejected {
                message: format!(
                    "file too large ({size} bytes). Maximum size: {:.1}MB",
                    self.max_upload_size as f64 / (1024.0 * 1024.0)
                ),
            });
        }
        Ok(())
    }
}

/// Lower-cased extension with a leading dot, or an empty string.
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.to_ascii_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

fn parse_setting<T: std::str::FromStr>(name: &str, raw: &str) -> DashboardResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        DashboardError::validation(format!("invalid {ENV_PREFIX}{name} value '{raw}': {e}"))
    })
}
