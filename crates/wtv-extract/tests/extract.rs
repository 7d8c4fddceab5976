//! Extraction of whole projects on disk.

use camino::{Utf8Path, Utf8PathBuf};
use wtv_core::{AliasTarget, FrameworkVersion, Mode, ProjectType, RunConfig};
use wtv_extract::{ExtractError, extract_project};

struct Project {
    _dir: tempfile::TempDir,
    root: Utf8PathBuf,
}

impl Project {
    fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).expect("utf8");
        for (path, content) in files {
            let path = root.join(path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("mkdir");
            }
            std::fs::write(path, content).expect("write");
        }
        Self { _dir: dir, root }
    }

    fn run(&self, project_type: ProjectType) -> RunConfig {
        RunConfig::new(self.root.clone(), project_type)
    }
}

const WEBPACK_CONFIG: &str = r"
const path = require('path');
const HtmlWebpackPlugin = require('html-webpack-plugin');

module.exports = {
  mode: 'production',
  entry: './src/main.js',
  resolve: {
    alias: { '@': path.resolve(__dirname, 'src') },
  },
  plugins: [new HtmlWebpackPlugin({ template: './public/index.html' })],
};
";

#[tokio::test]
async fn test_webpack_project() {
    let project = Project::new(&[
        ("webpack.config.js", WEBPACK_CONFIG),
        ("src/main.js", "import './app';"),
        ("public/index.html", "<html><body></body></html>"),
        ("package.json", r#"{ "name": "demo", "dependencies": { "vue": "^2.6.14" } }"#),
        (".env", "VUE_APP_TITLE=Demo\n"),
    ]);

    let parsed = extract_project(&project.run(ProjectType::Webpack))
        .await
        .expect("extract");

    assert_eq!(parsed.config.mode, Mode::Production);
    assert_eq!(parsed.config.entry["main"], Utf8Path::new("src/main.js"));
    let canonical_src = parsed.root.join("src");
    assert_eq!(parsed.config.aliases["@"], AliasTarget::Path(canonical_src));
    assert_eq!(parsed.config.plugins.len(), 1);
    assert_eq!(parsed.manifest.framework, FrameworkVersion::Vue2);
    assert_eq!(parsed.manifest.name.as_deref(), Some("demo"));
    assert_eq!(parsed.env["VUE_APP_TITLE"], "Demo");
    assert!(parsed.html.path.is_some());
    assert!(!parsed.uses_jsx);
    assert!(parsed.config_path.is_some());
}

#[tokio::test]
async fn test_bare_alias_naming_a_project_directory_is_a_path() {
    let project = Project::new(&[
        (
            "webpack.config.js",
            "module.exports = { entry: './src/main.js', resolve: { alias: { '@': 'src', vue$: 'vue/dist/vue.esm.js' } } };",
        ),
        ("src/main.js", ""),
    ]);

    let parsed = extract_project(&project.run(ProjectType::Webpack))
        .await
        .expect("extract");

    assert_eq!(parsed.config.aliases["@"], AliasTarget::Path(parsed.root.join("src")));
    assert_eq!(
        parsed.config.aliases["vue$"],
        AliasTarget::Module("vue/dist/vue.esm.js".to_owned())
    );
}

#[tokio::test]
async fn test_webpack_project_without_config() {
    let project = Project::new(&[("src/index.js", "")]);
    let err = extract_project(&project.run(ProjectType::Webpack))
        .await
        .expect_err("should fail");
    assert!(matches!(err, ExtractError::MissingConfig { .. }));
}

#[tokio::test]
async fn test_missing_entry_is_fatal() {
    let project = Project::new(&[(
        "webpack.config.js",
        "module.exports = { entry: './src/app.js' };",
    )]);
    let err = extract_project(&project.run(ProjectType::Webpack))
        .await
        .expect_err("should fail");
    match err {
        ExtractError::MissingEntry { path } => assert!(path.as_str().ends_with("src/app.js")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_entry_override_wins() {
    let project = Project::new(&[
        ("webpack.config.js", "module.exports = { entry: makeEntries() };"),
        ("src/boot.ts", ""),
    ]);
    let mut run = project.run(ProjectType::Webpack);
    run.entry = Some(Utf8PathBuf::from("src/boot"));

    let parsed = extract_project(&run).await.expect("extract");
    assert_eq!(parsed.config.entry["main"], Utf8Path::new("src/boot.ts"));
}

#[tokio::test]
async fn test_unresolved_entry_without_override() {
    let project = Project::new(&[("webpack.config.js", "module.exports = { entry: makeEntries() };")]);
    let err = extract_project(&project.run(ProjectType::Webpack))
        .await
        .expect_err("should fail");
    assert!(matches!(err, ExtractError::UnresolvedEntry { .. }));
}

#[tokio::test]
async fn test_syntax_error_names_the_file() {
    let project = Project::new(&[("webpack.config.js", "module.exports = {\n  entry: ,\n};")]);
    let err = extract_project(&project.run(ProjectType::Webpack))
        .await
        .expect_err("should fail");
    assert!(matches!(err, ExtractError::Parse { .. }));
    assert!(err.to_string().contains("webpack.config.js"));
}

#[tokio::test]
async fn test_vue_cli_project_without_config() {
    let project = Project::new(&[
        ("src/main.js", ""),
        ("src/App.vue", "<template><div/></template>"),
        ("public/index.html", "<title><%= htmlWebpackPlugin.options.title %></title>"),
        ("package.json", r#"{ "dependencies": { "vue": "^3.2.13" } }"#),
    ]);

    let parsed = extract_project(&project.run(ProjectType::VueCli))
        .await
        .expect("extract");

    assert!(parsed.config_path.is_none());
    assert_eq!(parsed.config.entry["app"], Utf8Path::new("src/main.js"));
    assert!(parsed.config.aliases.contains_key("@"));
    assert_eq!(parsed.manifest.framework, FrameworkVersion::Vue3);
    assert!(parsed.html.path.is_some_and(|p| p.ends_with("public/index.html")));
}

#[tokio::test]
async fn test_vue_cli_prefers_main_ts_and_detects_jsx() {
    let project = Project::new(&[
        ("src/main.ts", ""),
        ("src/main.js", ""),
        ("src/components/Hello.tsx", ""),
    ]);
    let parsed = extract_project(&project.run(ProjectType::VueCli))
        .await
        .expect("extract");
    assert_eq!(parsed.config.entry["app"], Utf8Path::new("src/main.ts"));
    assert!(parsed.uses_jsx);
    assert_eq!(parsed.manifest.framework, FrameworkVersion::Unknown);
}
