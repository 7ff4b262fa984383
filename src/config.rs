use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MANDI_API_URL: &str =
    "https://api.data.gov.in/resource/9ef84268-d588-465a-a308-a864a43d0070";
pub const DEFAULT_PORT: u16 = 8000;

/// Process configuration, read once at startup and handed to each service.
#[derive(Clone)]
pub struct Config {
    pub google_api_key: Option<String>,
    pub mandi_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_url: String,
    pub mandi_api_url: String,
    pub static_dir: PathBuf,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_api_key: None,
            mandi_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_url: DEFAULT_GEMINI_API_URL.to_string(),
            mandi_api_url: DEFAULT_MANDI_API_URL.to_string(),
            static_dir: PathBuf::from("static"),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("PORT must be a valid u16, got {:?}", raw)))?,
            None => defaults.port,
        };

        Ok(Self {
            google_api_key: get("GOOGLE_API_KEY"),
            mandi_api_key: get("DATA_GOV_IN_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_api_url: get("GEMINI_API_URL").unwrap_or(defaults.gemini_api_url),
            mandi_api_url: get("MANDI_API_URL").unwrap_or(defaults.mandi_api_url),
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            port,
        })
    }
}

// Keys are reported as set/unset only.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("google_api_key", &self.google_api_key.as_ref().map(|_| "<set>"))
            .field("mandi_api_key", &self.mandi_api_key.as_ref().map(|_| "<set>"))
            .field("gemini_model", &self.gemini_model)
            .field("gemini_api_url", &self.gemini_api_url)
            .field("mandi_api_url", &self.mandi_api_url)
            .field("static_dir", &self.static_dir)
            .field("port", &self.port)
            .finish()
    }
}
