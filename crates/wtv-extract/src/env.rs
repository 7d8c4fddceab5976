//! `.env` file loading.
//!
//! `.env` is read first and `.env.local` second, so local values override
//! shared ones. Missing files are skipped.

use camino::Utf8Path;
use indexmap::IndexMap;
use tracing::debug;

use crate::error::ExtractError;

/// Environment files read from the project root, in override order.
pub const ENV_FILES: &[&str] = &[".env", ".env.local"];

/// Loads the project's environment files.
///
/// # Errors
///
/// Returns [`ExtractError::Read`] if a file exists but cannot be read.
pub async fn load_env(root: &Utf8Path) -> Result<IndexMap<String, String>, ExtractError> {
    let mut env = IndexMap::new();
    for name in ENV_FILES {
        let path = root.join(name);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(ExtractError::read(path, e)),
        };
        let vars = parse_dotenv(&content);
        debug!(file = %path, count = vars.len(), "Loaded env file");
        env.extend(vars);
    }
    Ok(env)
}

/// Parses the contents of a dotenv file.
///
/// Supports `KEY=value`, an optional `export ` prefix, single and double
/// quotes (`\n` is expanded inside double quotes), and `#` comments.
///
/// # Examples
///
/// ```
/// use wtv_extract::env::parse_dotenv;
///
/// let vars = parse_dotenv("# comment\nNODE_ENV=production\nexport VUE_APP_TITLE=\"My App\"\n");
/// assert_eq!(vars["NODE_ENV"], "production");
/// assert_eq!(vars["VUE_APP_TITLE"], "My App");
/// ```
pub fn parse_dotenv(content: &str) -> IndexMap<String, String> {
    let mut vars = IndexMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        vars.insert(key.to_owned(), parse_value(value.trim()));
    }
    vars
}

fn parse_value(value: &str) -> String {
    if let Some(inner) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        return inner.replace("\\n", "\n").replace("\\\"", "\"");
    }
    if let Some(inner) = value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')) {
        return inner.to_owned();
    }
    match value.find(" #") {
        Some(index) => value[..index].trim_end().to_owned(),
        None => value.to_owned(),
    }
}
