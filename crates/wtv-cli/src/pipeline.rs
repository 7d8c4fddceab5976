//! One conversion, start to finish.

use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, instrument};
use wtv_core::{Config, ConfigError, RunConfig, path};
use wtv_emit::{emit_index_html, emit_manifest, emit_vite_config};
use wtv_extract::Extractor;
use wtv_transform::{Progress, TransformContext, Transformer};

use crate::copy::copy_project;
use crate::error::ConvertError;
use crate::report::{ConversionSummary, PackageManager};

/// Converts the project `config.run` points at.
///
/// Unless `cover` is set the project is first copied next to itself and the
/// copy is converted. The copy is then read, mapped by the full rule catalog
/// (reporting each rule to `progress`), and the vite config, the manifest and
/// the HTML entry are written in that order.
///
/// # Errors
///
/// Fails on the first fatal error. Nothing is written when extraction or a
/// rule fails; a failed copy removes the half-copied directory.
#[instrument(skip_all, fields(root = %config.run.root_dir, cover = config.run.cover))]
pub async fn convert(config: &Config, progress: &mut impl Progress) -> Result<ConversionSummary, ConvertError> {
    let started = Instant::now();
    config.run.validate()?;

    let project_root = if config.run.cover {
        config.run.root_dir.clone()
    } else {
        let source = canonical(&config.run.root_dir).await?;
        copy_project(&source, &config.output).await?
    };

    let run = RunConfig {
        root_dir: project_root,
        ..config.run.clone()
    };
    let parsed = Extractor::new(&run)
        .with_skip_dirs(&config.output.skip_dirs)
        .extract()
        .await?;

    let ctx = TransformContext::from_parsed(&parsed).with_vite_version(&config.output.vite_version);
    let transformed = Transformer::new().run(&parsed, ctx, progress)?;

    let root = parsed.root();
    let config_path = root.join(&config.output.config_file);
    let manifest_path = root.join(&config.output.manifest_file);
    let html_path = path::normalize(
        &root
            .join(transformed.config.root_dir())
            .join(&config.output.html_file),
    );

    emit_vite_config(&config_path, &transformed).await?;
    emit_manifest(&manifest_path, &parsed, &transformed).await?;
    let html_warnings = emit_index_html(&html_path, &parsed, &transformed).await?;

    let mut warnings = parsed.config.unsupported.clone();
    warnings.extend(transformed.warnings.iter().cloned());
    warnings.extend(html_warnings);

    let summary = ConversionSummary {
        project_root: root.to_owned(),
        files_written: vec![config_path, manifest_path, html_path],
        elapsed: started.elapsed(),
        warnings,
        package_manager: PackageManager::detect(root).await,
    };
    info!(
        root = %summary.project_root,
        files = summary.files_written.len(),
        warnings = summary.warnings.len(),
        elapsed_ms = u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
        "Conversion complete"
    );
    Ok(summary)
}

async fn canonical(root: &Utf8Path) -> Result<Utf8PathBuf, ConvertError> {
    let resolved = tokio::fs::canonicalize(root)
        .await
        .map_err(|err| ConfigError::InvalidPath {
            path: root.to_owned(),
            reason: err.to_string(),
        })?;
    Utf8PathBuf::from_path_buf(resolved).map_err(ConvertError::NonUtf8Path)
}
