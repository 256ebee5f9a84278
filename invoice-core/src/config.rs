//! Runtime configuration from the environment (and an optional `.env`).

use std::env;
use std::path::PathBuf;

use crate::layout::{LayoutOptions, PageSize};

pub const DATABASE_PATH_VAR: &str = "POS_DATABASE_PATH";
pub const ARCHIVE_DIR_VAR: &str = "POS_ARCHIVE_DIR";
pub const PUBLIC_BASE_URL_VAR: &str = "POS_PUBLIC_BASE_URL";
pub const LOGO_PATH_VAR: &str = "POS_LOGO_PATH";
pub const COMPRESS_PDF_VAR: &str = "POS_COMPRESS_PDF";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub archive_dir: PathBuf,
    pub public_base_url: Option<String>,
    pub logo_path: PathBuf,
    pub compress_pdf: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: PathBuf::from("invoices.db"),
            archive_dir: PathBuf::from("archive"),
            public_base_url: None,
            logo_path: PathBuf::from("assets/RLogo.png"),
            compress_pdf: true,
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset or blank keys take their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let compress_pdf = match get(COMPRESS_PDF_VAR) {
            Some(v) => parse_bool(&v).unwrap_or_else(|| {
                log::warn!("{COMPRESS_PDF_VAR}={v:?} is not a boolean, using default");
                defaults.compress_pdf
            }),
            None => defaults.compress_pdf,
        };

        Config {
            database_path: get(DATABASE_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            archive_dir: get(ARCHIVE_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.archive_dir),
            public_base_url: get(PUBLIC_BASE_URL_VAR),
            logo_path: get(LOGO_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.logo_path),
            compress_pdf,
        }
    }

    /// A4 page with the configured logo.
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            page: PageSize::A4,
            logo_path: Some(self.logo_path.clone()),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
