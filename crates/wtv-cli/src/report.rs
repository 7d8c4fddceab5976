//! The completion summary.

use std::fmt::Write;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use wtv_core::UnsupportedConstructWarning;
use wtv_core::path::{relative_to, to_forward_slashes};

/// Package manager the converted project is set up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageManager {
    /// npm.
    #[default]
    Npm,
    /// Yarn, detected from a `yarn.lock`.
    Yarn,
}

impl PackageManager {
    /// Picks yarn when `root` has a `yarn.lock`, npm otherwise.
    pub async fn detect(root: &Utf8Path) -> Self {
        if tokio::fs::try_exists(root.join("yarn.lock")).await.unwrap_or(false) {
            Self::Yarn
        } else {
            Self::Npm
        }
    }

    /// Command installing the new dependencies.
    #[must_use]
    pub const fn install_command(self) -> &'static str {
        match self {
            Self::Npm => "npm install",
            Self::Yarn => "yarn",
        }
    }

    /// Command running the `serve-vite` script added to the manifest.
    #[must_use]
    pub const fn dev_command(self) -> &'static str {
        match self {
            Self::Npm => "npm run serve-vite",
            Self::Yarn => "yarn serve-vite",
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
        })
    }
}

/// What a finished conversion did.
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    /// Directory that was converted (the copy, unless converting in place).
    pub project_root: Utf8PathBuf,
    /// Files written, in order.
    pub files_written: Vec<Utf8PathBuf>,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
    /// Everything that needs porting by hand.
    pub warnings: Vec<UnsupportedConstructWarning>,
    /// Package manager for the follow-up commands.
    pub package_manager: PackageManager,
}

impl ConversionSummary {
    /// Commands the user runs next, starting from `cwd`.
    #[must_use]
    pub fn next_steps(&self, cwd: &Utf8Path) -> Vec<String> {
        let mut steps = Vec::with_capacity(3);
        if self.project_root != cwd {
            let target = relative_to(&self.project_root, cwd);
            steps.push(format!("cd {}", to_forward_slashes(target.as_str())));
        }
        steps.push(self.package_manager.install_command().to_owned());
        steps.push(self.package_manager.dev_command().to_owned());
        steps
    }

    /// Renders the summary printed at the end of a run.
    #[must_use]
    pub fn render(&self, cwd: &Utf8Path) -> String {
        let mut out = String::new();
        let _ = writeln!(out);
        let _ = writeln!(out, "Conversion Summary");
        let _ = writeln!(out, "==================");
        let _ = writeln!(out);
        let _ = writeln!(out, "Project:  {}", self.project_root);
        let _ = writeln!(out, "Duration: {:.2}s", self.elapsed.as_secs_f64());
        let _ = writeln!(out, "Files written ({}):", self.files_written.len());
        for file in &self.files_written {
            let _ = writeln!(out, "  {}", relative_to(file, &self.project_root));
        }

        if !self.warnings.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Needs manual attention ({}):", self.warnings.len());
            for warning in &self.warnings {
                let _ = writeln!(out, "  - {warning}");
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Now run:");
        for step in self.next_steps(cwd) {
            let _ = writeln!(out, "  {step}");
        }
        out
    }
}
