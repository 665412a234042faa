use std::env;
use std::path::PathBuf;

const PRELUDE_VAR: &str = "DANLISP_PRELUDE";
const HISTORY_VAR: &str = "DANLISP_HISTORY";
const HISTORY_NAME: &str = ".danlisp_history";

/// Source file to evaluate before user input, if configured.
pub fn findPrelude() -> Option<String>
{
    env::var(PRELUDE_VAR).ok().filter(|path| !path.is_empty())
}

/// Where the REPL keeps its line history.
pub fn findHistory() -> PathBuf
{
    if let Ok(path) = env::var(HISTORY_VAR)
    {
        PathBuf::from(path)
    }
    else if let Ok(home) = env::var("HOME")
    {
        PathBuf::from(home).join(HISTORY_NAME)
    }
    else
    {
        PathBuf::from(HISTORY_NAME)
    }
}

/// Serializes tests that read or write process environment variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
