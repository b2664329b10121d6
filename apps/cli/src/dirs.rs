use std::env;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "youknow";

pub fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

fn require_home() -> Result<PathBuf, String> {
    home_dir().ok_or_else(|| "resolve HOME: not set".to_string())
}

/// `~/Library/Application Support/youknow` on macOS, `$XDG_CONFIG_HOME/youknow` elsewhere.
pub fn config_dir() -> Result<PathBuf, String> {
    if cfg!(target_os = "macos") {
        return Ok(macos_support_dir(require_home()?));
    }
    Ok(xdg_dir("XDG_CONFIG_HOME", ".config")?.join(APP_DIR_NAME))
}

/// Directory holding `youknow.sqlite`.
pub fn data_dir() -> Result<PathBuf, String> {
    if cfg!(target_os = "macos") {
        return Ok(macos_support_dir(require_home()?));
    }
    Ok(xdg_dir("XDG_DATA_HOME", ".local/share")?.join(APP_DIR_NAME))
}

fn macos_support_dir(home: PathBuf) -> PathBuf {
    home.join("Library")
        .join("Application Support")
        .join(APP_DIR_NAME)
}

fn xdg_dir(var: &str, fallback: &str) -> Result<PathBuf, String> {
    match env::var_os(var).filter(|value| !value.is_empty()) {
        Some(value) => Ok(PathBuf::from(value)),
        None => Ok(require_home()?.join(fallback)),
    }
}
