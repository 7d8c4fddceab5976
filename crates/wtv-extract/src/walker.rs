//! JSX usage scan.
//!
//! This module provides [`JsxScanner`], which uses the `ignore` crate to walk
//! the project and decide whether any source uses JSX: `.jsx`/`.tsx` files,
//! or `.vue` single-file components with `lang="jsx"` or `lang="tsx"`.

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;
use tracing::debug;

use crate::error::ExtractError;

/// Extensions that always mean JSX.
const JSX_EXTENSIONS: &[&str] = &["jsx", "tsx"];

/// `lang` attributes that make a `.vue` block JSX.
const JSX_LANG_ATTRIBUTES: &[&str] = &[
    "lang=\"jsx\"",
    "lang=\"tsx\"",
    "lang='jsx'",
    "lang='tsx'",
];

/// Walks a project looking for JSX sources.
///
/// # Examples
///
/// ```ignore
/// use wtv_extract::JsxScanner;
/// use camino::Utf8Path;
///
/// let scanner = JsxScanner::new(Utf8Path::new("./app"))
///     .with_skip_dirs(&["node_modules".to_owned()]);
/// let uses_jsx = scanner.scan()?;
/// ```
#[derive(Debug, Clone)]
pub struct JsxScanner {
    /// The root directory to walk.
    root: Utf8PathBuf,
    /// Directory names never descended into.
    skip_dirs: Vec<String>,
}

impl JsxScanner {
    /// Creates a scanner for the given project root.
    #[must_use]
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
            skip_dirs: Vec::new(),
        }
    }

    /// Adds directory names to skip during traversal.
    #[must_use]
    pub fn with_skip_dirs(mut self, dirs: &[String]) -> Self {
        self.skip_dirs.extend(dirs.iter().cloned());
        self
    }

    /// Walks the project and stops at the first JSX source.
    ///
    /// Blocking; run it on `spawn_blocking` from async code.
    ///
    /// # Errors
    ///
    /// - Returns [`ExtractError::Walk`] if directory traversal fails
    /// - Returns [`ExtractError::NonUtf8Path`] if a non-UTF-8 path is encountered
    pub fn scan(&self) -> Result<bool, ExtractError> {
        let skip_dirs = self.skip_dirs.clone();
        let walker = WalkBuilder::new(&self.root)
            .standard_filters(true)
            .require_git(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                !(is_dir
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| skip_dirs.iter().any(|d| d == name)))
            })
            .build();

        for result in walker {
            let entry = result?;
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.path();
            let path =
                Utf8Path::from_path(path).ok_or_else(|| ExtractError::NonUtf8Path(path.to_owned()))?;

            if is_jsx_file(path) {
                debug!(path = %path, "Found JSX source");
                return Ok(true);
            }
            if path.extension() == Some("vue") && vue_uses_jsx(path) {
                debug!(path = %path, "Found JSX single-file component");
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn is_jsx_file(path: &Utf8Path) -> bool {
    path.extension().is_some_and(|ext| JSX_EXTENSIONS.contains(&ext))
}

/// Unreadable components count as not using JSX.
fn vue_uses_jsx(path: &Utf8Path) -> bool {
    match std::fs::read_to_string(path) {
        Ok(content) => JSX_LANG_ATTRIBUTES.iter().any(|attr| content.contains(attr)),
        Err(e) => {
            debug!(path = %path, error = %e, "Skipping unreadable component");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).expect("utf8");
        std::fs::create_dir_all(root.join("src")).expect("mkdir");
        (dir, root)
    }

    #[test]
    fn test_is_jsx_file() {
        assert!(is_jsx_file(Utf8Path::new("src/App.jsx")));
        assert!(is_jsx_file(Utf8Path::new("src/App.tsx")));
        assert!(!is_jsx_file(Utf8Path::new("src/App.js")));
        assert!(!is_jsx_file(Utf8Path::new("src/App.vue")));
    }

    #[test]
    fn test_plain_project_has_no_jsx() {
        let (_dir, root) = project();
        std::fs::write(root.join("src/main.js"), "console.log(1)").expect("write");
        std::fs::write(root.join("src/App.vue"), "<script>\nexport default {}\n</script>")
            .expect("write");
        assert!(!JsxScanner::new(&root).scan().expect("scan"));
    }

    #[test]
    fn test_tsx_file_is_found() {
        let (_dir, root) = project();
        std::fs::write(root.join("src/Button.tsx"), "export const B = () => <b/>;").expect("write");
        assert!(JsxScanner::new(&root).scan().expect("scan"));
    }

    #[test]
    fn test_vue_lang_jsx_is_found() {
        let (_dir, root) = project();
        std::fs::write(
            root.join("src/App.vue"),
            "<script lang=\"jsx\">\nexport default { render() { return <div/> } }\n</script>",
        )
        .expect("write");
        assert!(JsxScanner::new(&root).scan().expect("scan"));
    }

    #[test]
    fn test_skip_dirs_are_not_walked() {
        let (_dir, root) = project();
        std::fs::create_dir_all(root.join("node_modules/lib")).expect("mkdir");
        std::fs::write(root.join("node_modules/lib/index.jsx"), "").expect("write");
        let scanner = JsxScanner::new(&root).with_skip_dirs(&["node_modules".to_owned()]);
        assert!(!scanner.scan().expect("scan"));
    }
}
