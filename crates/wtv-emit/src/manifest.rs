//! `package.json`.
//!
//! An existing manifest is edited in place: keys keep their order and only
//! dependencies the project does not already declare are added to
//! `devDependencies`. The `serve-vite` and `build-vite` scripts are added
//! next to the project's own scripts. Without a manifest a minimal one is
//! written.

use camino::Utf8Path;
use indexmap::IndexMap;
use serde_json::{Map, Value as Json};
use tracing::{debug, info};
use wtv_core::AstParsingResult;
use wtv_transform::Transformed;

use crate::error::EmitError;

const DEPENDENCY_SECTIONS: [&str; 2] = ["devDependencies", "dependencies"];

/// Scripts added to `scripts` unless the project already defines them.
const VITE_SCRIPTS: [(&str, &str); 2] = [("serve-vite", "vite"), ("build-vite", "vite build")];

/// Merges `dependencies` into a manifest and returns the new document text.
///
/// `existing` is the current manifest text, if any. A package already listed
/// under `dependencies` or `devDependencies` keeps its declared version, and
/// a script the project already defines is left as it is.
///
/// # Errors
///
/// Returns [`EmitError::Manifest`] when `existing` is not JSON and
/// [`EmitError::ManifestShape`] when it, its `scripts` or its
/// `devDependencies` is not a JSON object. Both name `path`.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use indexmap::IndexMap;
/// use wtv_emit::merge_manifest;
///
/// let deps: IndexMap<String, String> = [("vite".to_owned(), "^4.0.0".to_owned())].into();
/// let out = merge_manifest(Utf8Path::new("package.json"), None, "shop", &deps).unwrap();
/// assert!(out.contains(r#""vite": "^4.0.0""#));
/// ```
pub fn merge_manifest(
    path: &Utf8Path,
    existing: Option<&str>,
    name: &str,
    dependencies: &IndexMap<String, String>,
) -> Result<String, EmitError> {
    let mut manifest = match existing {
        Some(text) => {
            let parsed: Json = serde_json::from_str(text).map_err(|source| EmitError::Manifest {
                path: path.to_owned(),
                source,
            })?;
            match parsed {
                Json::Object(map) => map,
                _ => {
                    return Err(EmitError::ManifestShape {
                        path: path.to_owned(),
                    });
                }
            }
        }
        None => {
            let mut map = Map::new();
            map.insert("name".to_owned(), Json::String(name.to_owned()));
            map.insert("private".to_owned(), Json::Bool(true));
            map
        }
    };

    let scripts = manifest
        .entry("scripts")
        .or_insert_with(|| Json::Object(Map::new()));
    let Json::Object(scripts) = scripts else {
        return Err(EmitError::ManifestShape {
            path: path.to_owned(),
        });
    };
    for (script, command) in VITE_SCRIPTS {
        if !scripts.contains_key(script) {
            debug!(script, command, "Adding script");
            scripts.insert(script.to_owned(), Json::String(command.to_owned()));
        }
    }

    let missing: Vec<(&String, &String)> = dependencies
        .iter()
        .filter(|(package, _)| !is_declared(&manifest, package))
        .collect();

    if !missing.is_empty() {
        let section = manifest
            .entry("devDependencies")
            .or_insert_with(|| Json::Object(Map::new()));
        if !section.is_object() {
            return Err(EmitError::ManifestShape {
                path: path.to_owned(),
            });
        }
        if let Json::Object(section) = section {
            for (package, version) in missing {
                debug!(package = %package, version = %version, "Adding dev dependency");
                section.insert(package.clone(), Json::String(version.clone()));
            }
        }
    }

    let mut text = serde_json::to_string_pretty(&Json::Object(manifest)).map_err(|source| {
        EmitError::Manifest {
            path: path.to_owned(),
            source,
        }
    })?;
    text.push('\n');
    Ok(text)
}

fn is_declared(manifest: &Map<String, Json>, package: &str) -> bool {
    DEPENDENCY_SECTIONS.iter().any(|section| {
        manifest
            .get(*section)
            .and_then(Json::as_object)
            .is_some_and(|deps| deps.contains_key(package))
    })
}

/// Updates (or creates) the manifest at `path` with the dependencies the
/// converted configuration needs.
///
/// The package name of a new manifest is the project's declared name, else
/// the project directory name.
pub async fn emit_manifest(
    path: &Utf8Path,
    parsed: &AstParsingResult,
    transformed: &Transformed,
) -> Result<(), EmitError> {
    let existing = match tokio::fs::read_to_string(path).await {
        Ok(text) => Some(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => return Err(EmitError::read(path, err)),
    };

    let name = parsed
        .manifest
        .name
        .as_deref()
        .or_else(|| parsed.root().file_name())
        .unwrap_or("app");

    let text = merge_manifest(path, existing.as_deref(), name, &transformed.dependencies)?;
    crate::write_file(path, &text).await?;
    info!(
        path = %path,
        created = existing.is_none(),
        dependencies = transformed.dependencies.len(),
        "Wrote manifest"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(entries: &[(&str, &str)]) -> IndexMap<String, String> {
        entries
            .iter()
            .map(|(name, version)| ((*name).to_owned(), (*version).to_owned()))
            .collect()
    }

    const PATH: &str = "/app/package.json";

    #[test]
    fn test_new_manifest() {
        let out = merge_manifest(
            Utf8Path::new(PATH),
            None,
            "shop",
            &deps(&[("vite", "^4.0.0"), ("@vitejs/plugin-vue", "^4.0.0")]),
        )
        .expect("merge");
        insta::assert_snapshot!(out, @r#"
        {
          "name": "shop",
          "private": true,
          "scripts": {
            "serve-vite": "vite",
            "build-vite": "vite build"
          },
          "devDependencies": {
            "vite": "^4.0.0",
            "@vitejs/plugin-vue": "^4.0.0"
          }
        }
        "#);
    }

    #[test]
    fn test_existing_keys_keep_their_order() {
        let existing = r#"{
  "name": "shop",
  "scripts": { "serve": "vue-cli-service serve" },
  "dependencies": { "vue": "^3.2.0" },
  "devDependencies": { "sass": "^1.32.0" }
}"#;
        let out = merge_manifest(
            Utf8Path::new(PATH),
            Some(existing),
            "ignored",
            &deps(&[("vite", "^4.0.0"), ("sass", "^1.57.1"), ("vue", "^3.3.0")]),
        )
        .expect("merge");
        let json: Json = serde_json::from_str(&out).expect("json");

        let keys: Vec<_> = json.as_object().expect("object").keys().cloned().collect();
        assert_eq!(keys, ["name", "scripts", "dependencies", "devDependencies"]);
        let scripts: Vec<_> = json["scripts"]
            .as_object()
            .expect("scripts")
            .keys()
            .cloned()
            .collect();
        assert_eq!(scripts, ["serve", "serve-vite", "build-vite"]);
        assert_eq!(json["scripts"]["serve"], "vue-cli-service serve");
        assert_eq!(json["devDependencies"]["sass"], "^1.32.0", "declared version wins");
        assert_eq!(json["devDependencies"]["vite"], "^4.0.0");
        assert!(json["devDependencies"].get("vue").is_none());
        assert_eq!(json["dependencies"]["vue"], "^3.2.0");
    }

    #[test]
    fn test_nothing_missing_adds_no_dev_dependencies() {
        let existing = r#"{ "name": "shop", "dependencies": { "vite": "^3.0.0" } }"#;
        let out = merge_manifest(
            Utf8Path::new(PATH),
            Some(existing),
            "shop",
            &deps(&[("vite", "^4.0.0")]),
        )
        .expect("merge");
        let json: Json = serde_json::from_str(&out).expect("json");
        assert!(json.get("devDependencies").is_none());
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn test_existing_vite_scripts_are_kept() {
        let existing = r#"{ "scripts": { "build": "webpack", "serve-vite": "vite --port 3000" } }"#;
        let out = merge_manifest(Utf8Path::new(PATH), Some(existing), "shop", &deps(&[]))
            .expect("merge");
        let json: Json = serde_json::from_str(&out).expect("json");
        assert_eq!(json["scripts"]["build"], "webpack");
        assert_eq!(json["scripts"]["serve-vite"], "vite --port 3000");
        assert_eq!(json["scripts"]["build-vite"], "vite build");
    }

    #[test]
    fn test_scripts_of_wrong_type() {
        let err = merge_manifest(
            Utf8Path::new(PATH),
            Some(r#"{ "scripts": ["build"] }"#),
            "shop",
            &deps(&[]),
        )
        .expect_err("wrong type");
        assert!(matches!(err, EmitError::ManifestShape { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let err = merge_manifest(Utf8Path::new(PATH), Some("{ nope"), "shop", &deps(&[]))
            .expect_err("invalid");
        assert!(matches!(err, EmitError::Manifest { .. }));
        assert_eq!(err.path(), PATH);
    }

    #[test]
    fn test_non_object_manifest() {
        let err = merge_manifest(Utf8Path::new(PATH), Some("[1, 2]"), "shop", &deps(&[]))
            .expect_err("array");
        assert!(matches!(err, EmitError::ManifestShape { .. }));
    }

    #[test]
    fn test_dev_dependencies_of_wrong_type() {
        let err = merge_manifest(
            Utf8Path::new(PATH),
            Some(r#"{ "devDependencies": "none" }"#),
            "shop",
            &deps(&[("vite", "^4.0.0")]),
        )
        .expect_err("wrong type");
        assert!(matches!(err, EmitError::ManifestShape { .. }));
    }
}
