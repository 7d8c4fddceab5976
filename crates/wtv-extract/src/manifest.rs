//! `package.json` reading and framework detection.

use camino::Utf8Path;
use semver::VersionReq;
use serde_json::Value;
use tracing::debug;
use wtv_core::{FrameworkVersion, ManifestInfo};

use crate::error::ExtractError;

/// Reads the manifest at `root/package.json`.
///
/// A missing manifest is not an error: the result has `exists == false` and
/// an [`Unknown`](FrameworkVersion::Unknown) framework.
///
/// # Errors
///
/// - Returns [`ExtractError::Read`] if the file exists but cannot be read
/// - Returns [`ExtractError::Manifest`] if it is not valid JSON
pub async fn read_manifest(root: &Utf8Path) -> Result<ManifestInfo, ExtractError> {
    let path = root.join("package.json");
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path, "No manifest");
            return Ok(ManifestInfo {
                path,
                ..ManifestInfo::default()
            });
        }
        Err(e) => return Err(ExtractError::read(path, e)),
    };

    let json: Value = serde_json::from_str(&content).map_err(|source| ExtractError::Manifest {
        path: path.clone(),
        source,
    })?;
    let framework = detect_framework(&json);
    debug!(path = %path, %framework, "Read manifest");

    Ok(ManifestInfo {
        name: json.get("name").and_then(Value::as_str).map(str::to_owned),
        framework,
        exists: true,
        path,
    })
}

/// Infers the UI framework from the dependency maps of a manifest.
///
/// `vue` decides between Vue 2 and Vue 3 by the major version of its range.
/// A range that names no major (`latest`, a git URL) counts as Vue 3 unless
/// `vue-template-compiler`, which only exists for Vue 2, is present.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use wtv_core::FrameworkVersion;
/// use wtv_extract::manifest::detect_framework;
///
/// let manifest = json!({ "dependencies": { "vue": "^2.6.14" } });
/// assert_eq!(detect_framework(&manifest), FrameworkVersion::Vue2);
/// ```
pub fn detect_framework(manifest: &Value) -> FrameworkVersion {
    let dependency = |name: &str| {
        ["dependencies", "devDependencies", "peerDependencies"]
            .iter()
            .find_map(|section| manifest.get(section)?.get(name)?.as_str())
    };

    if let Some(range) = dependency("vue") {
        return match vue_major(range) {
            Some(2) => FrameworkVersion::Vue2,
            Some(_) => FrameworkVersion::Vue3,
            None if dependency("vue-template-compiler").is_some() => FrameworkVersion::Vue2,
            None => FrameworkVersion::Vue3,
        };
    }
    if dependency("react").is_some() {
        return FrameworkVersion::React;
    }
    FrameworkVersion::Unknown
}

/// Major version named by a dependency range.
fn vue_major(range: &str) -> Option<u64> {
    let req = VersionReq::parse(range.trim()).ok()?;
    req.comparators.first().map(|comparator| comparator.major)
}
