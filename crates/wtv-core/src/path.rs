//! Lexical path helpers.
//!
//! Configuration files describe paths with `path.resolve`/`path.join` calls that
//! must be evaluated without touching the filesystem, so everything here works
//! on path text only (no canonicalization, no symlink resolution).

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Collapses `.` and `..` components without consulting the filesystem.
///
/// Leading `..` components of a relative path are kept; `..` directly under
/// the root is dropped, matching Node's `path.normalize`.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use wtv_core::path::normalize;
///
/// assert_eq!(normalize(Utf8Path::new("/a/b/../c/./d")), "/a/c/d");
/// assert_eq!(normalize(Utf8Path::new("../x/./y")), "../x/y");
/// ```
#[must_use]
pub fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut parts: Vec<Utf8Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match parts.last() {
                Some(Utf8Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    let mut out = Utf8PathBuf::new();
    for part in parts {
        out.push(part.as_str());
    }
    out
}

/// Evaluates `path.resolve(base, ...segments)`.
///
/// Segments are applied left to right; an absolute segment restarts
/// resolution from itself. The result is normalized.
#[must_use]
pub fn resolve<S: AsRef<str>>(base: &Utf8Path, segments: &[S]) -> Utf8PathBuf {
    let mut out = base.to_owned();
    for segment in segments {
        let segment = segment.as_ref();
        if segment.is_empty() {
            continue;
        }
        let segment = Utf8Path::new(segment);
        if segment.is_absolute() {
            out = segment.to_owned();
        } else {
            out.push(segment);
        }
    }
    normalize(&out)
}

/// Evaluates `path.join(...segments)`: plain concatenation, then normalization.
#[must_use]
pub fn join<S: AsRef<str>>(segments: &[S]) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for segment in segments {
        let segment = segment.as_ref().trim_start_matches('/');
        if out.as_str().is_empty() && segments.first().is_some_and(|s| s.as_ref().starts_with('/'))
        {
            out.push("/");
        }
        if !segment.is_empty() {
            out.push(segment);
        }
    }
    normalize(&out)
}

/// Computes `path` relative to `base`, lexically.
///
/// Returns `.` when both are the same directory. When the two paths share no
/// root (different Windows prefixes) `path` is returned unchanged.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use wtv_core::path::relative_to;
///
/// assert_eq!(relative_to(Utf8Path::new("/p/src/utils"), Utf8Path::new("/p")), "src/utils");
/// assert_eq!(relative_to(Utf8Path::new("/p/lib"), Utf8Path::new("/p/src")), "../lib");
/// assert_eq!(relative_to(Utf8Path::new("/p"), Utf8Path::new("/p")), ".");
/// ```
#[must_use]
pub fn relative_to(path: &Utf8Path, base: &Utf8Path) -> Utf8PathBuf {
    let path = normalize(path);
    let base = normalize(base);

    if path.is_absolute() != base.is_absolute() {
        return path;
    }

    let path_parts: Vec<_> = path.components().collect();
    let base_parts: Vec<_> = base.components().collect();

    if let (Some(Utf8Component::Prefix(a)), Some(Utf8Component::Prefix(b))) =
        (path_parts.first(), base_parts.first())
    {
        if a.as_str() != b.as_str() {
            return path;
        }
    }

    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = Utf8PathBuf::new();
    for _ in common..base_parts.len() {
        out.push("..");
    }
    for part in &path_parts[common..] {
        out.push(part.as_str());
    }

    if out.as_str().is_empty() {
        Utf8PathBuf::from(".")
    } else {
        out
    }
}

/// Rewrites Windows separators to the forward slashes vite expects.
#[must_use]
pub fn to_forward_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Returns `true` when a specifier names a file-system path rather than a module.
///
/// `./x`, `../x`, `/x`, `.`/`..` and drive-letter paths are paths; `vue`,
/// `@scope/pkg` and `lodash/fp` are modules.
#[must_use]
pub fn is_path_like(specifier: &str) -> bool {
    let bytes = specifier.as_bytes();
    let has_drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/');

    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with(".\\")
        || specifier.starts_with("..\\")
        || specifier.starts_with('/')
        || has_drive
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Utf8Path::new("/a/./b/../c")), "/a/c");
        assert_eq!(normalize(Utf8Path::new("/../a")), "/a");
        assert_eq!(normalize(Utf8Path::new("a/../../b")), "../b");
        assert_eq!(normalize(Utf8Path::new("./src")), "src");
    }

    #[test]
    fn test_resolve() {
        let base = Utf8Path::new("/project");
        assert_eq!(resolve(base, &["src"]), "/project/src");
        assert_eq!(resolve(base, &["./src", "../lib"]), "/project/lib");
        assert_eq!(resolve(base, &["/abs", "x"]), "/abs/x");
        assert_eq!(resolve(base, &[""]), "/project");
    }

    #[test]
    fn test_join() {
        assert_eq!(join(&["/project", "src"]), "/project/src");
        assert_eq!(join(&["/project/build", "..", "src"]), "/project/src");
        assert_eq!(join(&["a", "/b"]), "a/b");
    }

    #[test]
    fn test_relative_to() {
        let root = Utf8Path::new("/project");
        assert_eq!(relative_to(Utf8Path::new("/project/src"), root), "src");
        assert_eq!(
            relative_to(Utf8Path::new("/project/src/utils"), root),
            "src/utils"
        );
        assert_eq!(relative_to(Utf8Path::new("/other/lib"), root), "../other/lib");
        assert_eq!(relative_to(root, root), ".");
    }

    #[test]
    fn test_to_forward_slashes() {
        assert_eq!(to_forward_slashes("src\\utils\\x"), "src/utils/x");
        assert_eq!(to_forward_slashes("src/utils"), "src/utils");
    }

    #[test]
    fn test_is_path_like() {
        assert!(is_path_like("./src"));
        assert!(is_path_like("../lib"));
        assert!(is_path_like("/abs/path"));
        assert!(is_path_like("C:\\project\\src"));
        assert!(!is_path_like("vue/dist/vue.esm.js"));
        assert!(!is_path_like("@scope/pkg"));
    }
}
