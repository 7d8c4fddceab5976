//! Copying a project next to itself before converting it.

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;
use tracing::{debug, info, warn};
use wtv_core::{ConfigError, OutputConfig};

use crate::error::ConvertError;

/// Returns the directory a project is copied to: a sibling named after the
/// project with `suffix` appended.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use wtv_cli::copy::copy_destination;
///
/// let dest = copy_destination(Utf8Path::new("/work/shop"), "-toVite").unwrap();
/// assert_eq!(dest, "/work/shop-toVite");
/// ```
pub fn copy_destination(root: &Utf8Path, suffix: &str) -> Result<Utf8PathBuf, ConfigError> {
    let name = root.file_name().ok_or_else(|| ConfigError::InvalidPath {
        path: root.to_owned(),
        reason: "cannot name a copy of a directory without a name".to_owned(),
    })?;
    let copy_name = format!("{name}{suffix}");
    Ok(root
        .parent()
        .map_or_else(|| Utf8PathBuf::from(&copy_name), |parent| parent.join(&copy_name)))
}

/// Copies `root` into its sibling copy directory and returns that directory.
///
/// Directories named in `output.copy_skip_dirs` are not copied. An existing copy
/// is reused as is. When copying fails the new directory is removed.
pub async fn copy_project(root: &Utf8Path, output: &OutputConfig) -> Result<Utf8PathBuf, ConvertError> {
    let destination = copy_destination(root, &output.copy_suffix)?;
    if tokio::fs::try_exists(&destination).await.unwrap_or(false) {
        info!(destination = %destination, "Reusing existing copy");
        return Ok(destination);
    }

    info!(from = %root, to = %destination, "Copying project");
    match copy_tree(root, &destination, &output.copy_skip_dirs).await {
        Ok(files) => {
            info!(files, destination = %destination, "Project copied");
            Ok(destination)
        }
        Err(err) => {
            if let Err(cleanup) = tokio::fs::remove_dir_all(&destination).await {
                warn!(destination = %destination, error = %cleanup, "Failed to remove partial copy");
            }
            Err(err)
        }
    }
}

async fn copy_tree(root: &Utf8Path, destination: &Utf8Path, skip_dirs: &[String]) -> Result<usize, ConvertError> {
    let entries = {
        let root = root.to_owned();
        let skip_dirs = skip_dirs.to_vec();
        tokio::task::spawn_blocking(move || list_entries(&root, &skip_dirs)).await??
    };

    tokio::fs::create_dir_all(destination)
        .await
        .map_err(|err| ConvertError::copy(root, destination, err))?;

    let mut files = 0;
    for entry in entries {
        let from = root.join(&entry.relative);
        let to = destination.join(&entry.relative);
        match entry.kind {
            EntryKind::Dir => tokio::fs::create_dir_all(&to)
                .await
                .map_err(|err| ConvertError::copy(&from, &to, err))?,
            EntryKind::File => {
                tokio::fs::copy(&from, &to)
                    .await
                    .map_err(|err| ConvertError::copy(&from, &to, err))?;
                files += 1;
            }
        }
    }
    Ok(files)
}

#[derive(Debug)]
enum EntryKind {
    Dir,
    File,
}

#[derive(Debug)]
struct Entry {
    relative: Utf8PathBuf,
    kind: EntryKind,
}

/// Lists everything under `root` in walk order (parents before children).
fn list_entries(root: &Utf8Path, skip_dirs: &[String]) -> Result<Vec<Entry>, ConvertError> {
    let skip = skip_dirs.to_vec();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_name(std::cmp::Ord::cmp)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir && entry.depth() > 0 && skip.iter().any(|dir| entry.file_name() == dir.as_str()))
        })
        .build();

    let mut entries = Vec::new();
    for result in walker {
        let entry = result.map_err(|source| ConvertError::Walk {
            root: root.to_owned(),
            source,
        })?;
        if entry.depth() == 0 {
            continue;
        }
        let path = Utf8Path::from_path(entry.path())
            .ok_or_else(|| ConvertError::NonUtf8Path(entry.path().to_path_buf()))?;
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let kind = match entry.file_type() {
            Some(ft) if ft.is_dir() => EntryKind::Dir,
            Some(ft) if ft.is_file() => EntryKind::File,
            _ => {
                debug!(path = %path, "Skipping non-regular file");
                continue;
            }
        };
        entries.push(Entry {
            relative: relative.to_owned(),
            kind,
        });
    }
    Ok(entries)
}
