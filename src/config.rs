//! API key file and client settings

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{QuizError, QuizResult};

pub const API_KEY_FILE: &str = "api.json";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Contents of `api.json`
#[derive(Debug, Deserialize)]
pub struct ApiKeyConfig {
    #[serde(rename = "chatgpt_api_key", default)]
    pub api_key: String,
}

/// Connection settings for the chat-completion endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub temperature: f32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// `api.json` next to the executable, or in the working directory when absent there
pub fn default_key_path() -> PathBuf {
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .or_else(|| env::current_dir().ok());

    match exe_dir.map(|dir| dir.join(API_KEY_FILE)) {
        Some(path) if path.exists() => path,
        _ => PathBuf::from(API_KEY_FILE),
    }
}

/// Read the API key; blank keys count as missing
pub fn load_api_key(path: &Path) -> QuizResult<String> {
    let raw = fs::read_to_string(path).map_err(|e| {
        let message = format!("{} 파일을 읽을 수 없습니다: {}", path.display(), e);
        QuizError::Configuration(message)
    })?;

    let config: ApiKeyConfig = serde_json::from_str(&raw).map_err(|e| {
        let message = format!("{} 파일을 해석할 수 없습니다: {}", path.display(), e);
        QuizError::Configuration(message)
    })?;

    let key = config.api_key.trim();
    if key.is_empty() {
        return Err(QuizError::Configuration(format!(
            "{}에 API 키가 없습니다",
            path.display()
        )));
    }

    Ok(key.to_string())
}
