use aem::core::runtime::RuntimeKind;
use aem::core::setup::{apply_project, ProjectFile};
use aem::error::{AemError, AemResult, ApiStage};
use aem::infrastructure::remote::{HttpTransport, Platform};
use aem::infrastructure::settings::SettingsStore;
use aem::{Config, JavaProvider, NodeProvider, Provider, ProviderRegistry, RuntimeService};
use async_trait::async_trait;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use zip::write::FileOptions;

const NODE_MIRROR: &str = "https://mirror.test/dist";
const JAVA_MIRROR: &str = "https://api.test/zulu/packages/";

const NODE_INDEX: &str = r#"[
    {"version": "v20.11.1", "files": ["win-x64-zip"]},
    {"version": "v18.0.0", "files": ["win-x64-zip"]},
    {"version": "v18.1.0", "files": ["win-x64-zip"]},
    {"version": "v18.20.4", "files": ["win-x64-zip"]},
    {"version": "v180.0.0", "files": ["win-x64-zip"]}
]"#;

const JAVA_PACKAGES: &str = r#"[
    {"java_version": [17, 0, 9], "name": "zulu17-9.zip", "download_url": "https://cdn.test/zulu17.0.9-win_x64.zip"},
    {"java_version": [17, 0, 11], "name": "zulu17-11.zip", "download_url": "https://cdn.test/zulu17.0.11-win_x64.zip"},
    {"java_version": [17, 0, 2], "name": "zulu17-2.zip", "download_url": "https://cdn.test/zulu17.0.2-win_x64.zip"}
]"#;

/// 压缩包内容布局
#[derive(Clone, Copy)]
enum Layout {
    SingleRoot,
    TwoRoots,
    Flat,
    Traversal,
}

/// 提供固定目录数据并按需生成 ZIP 的传输实现
struct FakeTransport {
    layout: Layout,
    catalog_calls: AtomicUsize,
    downloads: AtomicUsize,
}

impl FakeTransport {
    fn new(layout: Layout) -> Arc<Self> {
        Arc::new(Self {
            layout,
            catalog_calls: AtomicUsize::new(0),
            downloads: AtomicUsize::new(0),
        })
    }

    fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get_text(&self, url: &str) -> AemResult<String> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        if url.starts_with(NODE_MIRROR) {
            Ok(NODE_INDEX.to_string())
        } else if url.starts_with(JAVA_MIRROR) {
            Ok(JAVA_PACKAGES.to_string())
        } else {
            Err(AemError::api(url, ApiStage::Status(404), "Not Found"))
        }
    }

    async fn download(&self, url: &str, dest: &Path) -> AemResult<u64> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let root = url
            .rsplit('/')
            .next()
            .unwrap_or("archive.zip")
            .trim_end_matches(".zip")
            .to_string();

        let mut writer = zip::ZipWriter::new(fs::File::create(dest).unwrap());
        let options = FileOptions::default().unix_permissions(0o755);
        let files: Vec<String> = match self.layout {
            Layout::SingleRoot => vec![format!("{root}/bin/tool"), format!("{root}/README")],
            Layout::TwoRoots => vec![format!("{root}/bin/tool"), "extra/README".to_string()],
            Layout::Flat => vec!["tool".to_string()],
            Layout::Traversal => vec![format!("{root}/bin/tool"), "../escaped.txt".to_string()],
        };
        for name in files {
            writer.start_file(name, options).unwrap();
            writer.write_all(url.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        Ok(fs::metadata(dest).unwrap().len())
    }
}

struct Harness {
    _temp: TempDir,
    config: Config,
    transport: Arc<FakeTransport>,
    settings: Arc<SettingsStore>,
    node: RuntimeService,
    java: RuntimeService,
}

impl Harness {
    fn new(layout: Layout) -> Self {
        let temp = TempDir::new().unwrap();
        let mut config = Config::with_home(temp.path().join("home"));
        config.mirrors.node = NODE_MIRROR.to_string();
        config.mirrors.java = JAVA_MIRROR.to_string();
        config.symlinks.node = Some(temp.path().join("links").join("node"));
        config.symlinks.java = Some(temp.path().join("links").join("java"));

        let transport = FakeTransport::new(layout);
        let platform = Platform::new("windows", "x86_64");
        let settings = Arc::new(SettingsStore::new(config.settings_path()));

        let node_provider: Arc<dyn Provider> =
            Arc::new(NodeProvider::new(NODE_MIRROR, platform.clone(), transport.clone()));
        let java_provider: Arc<dyn Provider> =
            Arc::new(JavaProvider::new(JAVA_MIRROR, platform, transport.clone()));

        let node = RuntimeService::new(
            RuntimeKind::Node,
            &config,
            node_provider,
            transport.clone(),
            settings.clone(),
        );
        let java = RuntimeService::new(
            RuntimeKind::Java,
            &config,
            java_provider,
            transport.clone(),
            settings.clone(),
        );

        Self {
            _temp: temp,
            config,
            transport,
            settings,
            node,
            java,
        }
    }

    fn node_link(&self) -> Option<&Path> {
        self.config.symlink_for(RuntimeKind::Node)
    }

    fn node_dir(&self, name: &str) -> PathBuf {
        self.config.install_root().join("node").join(name)
    }

    fn temp_entries(&self) -> usize {
        fs::read_dir(self.config.temp_root())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

#[test]
fn scenario_a_empty_install_root_lists_nothing_and_creates_root() {
    let h = Harness::new(Layout::SingleRoot);
    let root = h.config.install_root().join("node");
    assert!(!root.exists());

    assert!(h.node.list().unwrap().is_empty());
    assert!(h.node.list_marked().unwrap().is_empty());
    assert!(root.is_dir());
    assert_eq!(h.node.current().unwrap(), None);
}

#[tokio::test]
async fn scenario_b_major_version_installs_latest_match() {
    let h = Harness::new(Layout::SingleRoot);

    let installed = h.node.install("18").await.unwrap();

    assert_eq!(installed, "v18.20.4");
    let dir = h.node_dir("v18.20.4");
    assert!(dir.join("bin").join("tool").is_file());
    assert_eq!(
        fs::read_to_string(dir.join("README")).unwrap(),
        "https://mirror.test/dist/v18.20.4/node-v18.20.4-win-x64.zip"
    );
    assert!(!h.node_dir("v180.0.0").exists());
    assert_eq!(h.transport.downloads(), 1);
    assert_eq!(h.temp_entries(), 0);
}

#[tokio::test]
async fn install_is_idempotent() {
    let h = Harness::new(Layout::SingleRoot);

    assert_eq!(h.node.install("18.20.4").await.unwrap(), "v18.20.4");
    let calls_after_first = h.transport.catalog_calls();

    assert_eq!(h.node.install("v18.20.4").await.unwrap(), "v18.20.4");
    assert_eq!(h.node.install("18.20.4").await.unwrap(), "v18.20.4");

    assert_eq!(h.transport.downloads(), 1);
    assert_eq!(h.transport.catalog_calls(), calls_after_first);
}

#[tokio::test]
async fn scenario_c_use_creates_symlink_and_records_bare_version() {
    let h = Harness::new(Layout::SingleRoot);
    h.node.install("18.20.4").await.unwrap();

    let active = h.node.use_version("18.20.4", h.node_link()).unwrap();

    assert_eq!(active, "18.20.4");
    let link = h.node_link().unwrap();
    assert_eq!(
        fs::read_link(link).unwrap(),
        fs::canonicalize(h.node_dir("v18.20.4")).unwrap()
    );
    assert_eq!(h.settings.current(RuntimeKind::Node).unwrap().as_deref(), Some("18.20.4"));

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(h.config.settings_path()).unwrap()).unwrap();
    assert_eq!(raw["node"], "18.20.4");
    assert!(raw.get("java").is_none());
}

#[tokio::test]
async fn list_marks_exactly_the_active_version() {
    let h = Harness::new(Layout::SingleRoot);
    h.node.install("18.1.0").await.unwrap();
    h.node.install("18.20.4").await.unwrap();
    h.node.install("20").await.unwrap();

    h.node.use_version("v18.20.4", h.node_link()).unwrap();

    let listed = h.node.list().unwrap();
    assert_eq!(listed.len(), 3);
    let active: Vec<_> = listed.iter().filter(|v| v.active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].version, "v18.20.4");

    let marked = h.node.list_marked().unwrap();
    assert!(marked.contains(&"*  v18.20.4".to_string()));
    assert!(marked.contains(&"   v18.1.0".to_string()));
    assert!(marked.contains(&"   v20.11.1".to_string()));
}

#[tokio::test]
async fn scenario_d_active_version_cannot_be_uninstalled() {
    let h = Harness::new(Layout::SingleRoot);
    h.node.install("18.20.4").await.unwrap();
    h.node.install("18.1.0").await.unwrap();
    h.node.use_version("18.20.4", h.node_link()).unwrap();
    let settings_before = fs::read_to_string(h.config.settings_path()).unwrap();

    for attempt in ["18.20.4", "v18.20.4"] {
        let err = h.node.uninstall(attempt).unwrap_err();
        assert!(matches!(
            err,
            AemError::UninstallRefused {
                kind: RuntimeKind::Node,
                ..
            }
        ));
    }
    assert!(h.node_dir("v18.20.4").is_dir());
    assert_eq!(
        fs::read_to_string(h.config.settings_path()).unwrap(),
        settings_before
    );

    h.node.use_version("18.1.0", h.node_link()).unwrap();
    assert!(h.node.uninstall("18.20.4").unwrap());

    assert!(!h.node_dir("v18.20.4").exists());
    assert_eq!(h.node.current().unwrap().as_deref(), Some("18.1.0"));
}

#[test]
fn uninstall_of_absent_version_is_noop_success() {
    let h = Harness::new(Layout::SingleRoot);
    assert!(!h.node.uninstall("16.20.2").unwrap());
}

#[test]
fn uninstall_clears_stale_active_selection() {
    let h = Harness::new(Layout::SingleRoot);
    fs::create_dir_all(h.node_dir("v16.20.2")).unwrap();
    h.settings.set_current(RuntimeKind::Node, "14.21.3").unwrap();

    assert!(h.node.uninstall("16.20.2").unwrap());

    assert_eq!(h.node.current().unwrap(), None);
}

#[test]
fn uninstall_rejects_relative_escape_and_leaves_other_runtime() {
    let h = Harness::new(Layout::SingleRoot);
    let java_dir = h.config.install_root().join("java").join("v17.0.11");
    fs::create_dir_all(&java_dir).unwrap();
    fs::create_dir_all(h.node_dir("v18.20.4")).unwrap();

    for attempt in ["..", ".", "v18.20.4/..", "../java/v17.0.11"] {
        let err = h.node.uninstall(attempt).unwrap_err();
        assert!(matches!(err, AemError::Validation { .. }), "{attempt}: {err}");
    }

    assert!(java_dir.is_dir());
    assert!(h.node_dir("v18.20.4").is_dir());
    assert!(h.node.find_installed("..").is_none());
}

#[test]
fn uninstall_rejects_absolute_path() {
    let h = Harness::new(Layout::SingleRoot);
    let outside = h.config.home.join("outside");
    fs::create_dir_all(outside.join("keep")).unwrap();

    let err = h
        .node
        .uninstall(outside.to_str().unwrap())
        .unwrap_err();

    assert!(matches!(err, AemError::Validation { .. }));
    assert!(outside.join("keep").is_dir());
    assert!(h.node.find_installed(outside.to_str().unwrap()).is_none());
}

#[test]
fn use_rejects_install_root_itself() {
    let h = Harness::new(Layout::SingleRoot);
    fs::create_dir_all(h.node_dir("v18.20.4")).unwrap();

    for attempt in [".", "..", "v18.20.4/.."] {
        let err = h.node.use_version(attempt, h.node_link()).unwrap_err();
        assert!(matches!(err, AemError::Validation { .. }), "{attempt}: {err}");
    }

    assert!(fs::symlink_metadata(h.node_link().unwrap()).is_err());
    assert_eq!(h.node.current().unwrap(), None);
}

#[test]
fn use_succeeds_when_settings_cannot_be_written() {
    let h = Harness::new(Layout::SingleRoot);
    fs::create_dir_all(h.node_dir("v18.20.4")).unwrap();
    fs::create_dir_all(h.config.settings_path()).unwrap();

    let active = h.node.use_version("18.20.4", h.node_link()).unwrap();

    assert_eq!(active, "18.20.4");
    assert_eq!(
        fs::read_link(h.node_link().unwrap()).unwrap(),
        fs::canonicalize(h.node_dir("v18.20.4")).unwrap()
    );
    assert!(h.config.settings_path().is_dir());
}

#[test]
fn use_requires_installed_version_and_configured_link() {
    let h = Harness::new(Layout::SingleRoot);

    let err = h.node.use_version("18.20.4", h.node_link()).unwrap_err();
    assert!(matches!(err, AemError::Validation { .. }));

    fs::create_dir_all(h.node_dir("v18.20.4")).unwrap();
    assert!(matches!(
        h.node.use_version("18.20.4", None),
        Err(AemError::Validation { .. })
    ));
    assert!(matches!(
        h.node.use_version("18.20.4", Some(Path::new(""))),
        Err(AemError::Validation { .. })
    ));
    assert_eq!(h.node.current().unwrap(), None);
}

#[tokio::test]
async fn unknown_version_is_not_found_without_download() {
    let h = Harness::new(Layout::SingleRoot);

    let err = h.node.install("99").await.unwrap_err();

    assert!(matches!(err, AemError::NotFound { .. }));
    assert_eq!(h.transport.downloads(), 0);
}

#[tokio::test]
async fn malformed_version_request_is_rejected_before_network() {
    let h = Harness::new(Layout::SingleRoot);

    assert!(matches!(
        h.node.install("../../etc").await,
        Err(AemError::Validation { .. })
    ));
    assert_eq!(h.transport.catalog_calls(), 0);
}

#[tokio::test]
async fn multi_root_and_flat_archives_are_rejected_and_cleaned_up() {
    for layout in [Layout::TwoRoots, Layout::Flat] {
        let h = Harness::new(layout);

        let err = h.node.install("18.20.4").await.unwrap_err();

        assert!(matches!(err, AemError::Extraction { .. }));
        assert!(!h.node_dir("v18.20.4").exists());
        assert_eq!(h.temp_entries(), 0);
    }
}

#[tokio::test]
async fn traversal_entries_never_escape_the_extraction_root() {
    let h = Harness::new(Layout::Traversal);

    let err = h.node.install("18.20.4").await.unwrap_err();

    assert!(matches!(err, AemError::Extraction { .. }));
    assert!(!h.config.temp_root().join("escaped.txt").exists());
    assert!(!h.config.home.join("escaped.txt").exists());
    assert!(!h.node_dir("v18.20.4").exists());
    assert_eq!(h.temp_entries(), 0);
}

#[tokio::test]
async fn java_prefix_install_sorts_numerically() {
    let h = Harness::new(Layout::SingleRoot);

    let installed = h.java.install("17").await.unwrap();

    assert_eq!(installed, "17.0.11");
    assert!(h.config.install_root().join("java").join("v17.0.11").is_dir());

    let active = h
        .java
        .use_version("17.0.11", h.config.symlink_for(RuntimeKind::Java))
        .unwrap();
    assert_eq!(active, "17.0.11");
    assert_eq!(
        h.java.list_marked().unwrap(),
        vec!["*  v17.0.11".to_string()]
    );
    assert_eq!(h.settings.current(RuntimeKind::Node).unwrap(), None);
}

#[tokio::test]
async fn registry_lists_remote_versions() {
    let h = Harness::new(Layout::SingleRoot);
    let registry = ProviderRegistry::with_defaults(
        &h.config,
        h.transport.clone(),
        Platform::new("windows", "x86_64"),
    );

    let node = registry.get("node").unwrap();
    assert_eq!(
        node.list_versions(Some("18")).await.unwrap(),
        vec!["v18.0.0", "v18.1.0", "v18.20.4", "v180.0.0"]
    );
    assert!(node.list_versions(Some("v99")).await.unwrap().is_empty());
    assert!(node.check_version("18.20.4").await.unwrap());

    let java = registry.get("java").unwrap();
    assert_eq!(
        java.download_url("17.0.2").await.unwrap(),
        "https://cdn.test/zulu17.0.2-win_x64.zip"
    );
}

#[tokio::test]
async fn project_setup_installs_and_activates_each_runtime() {
    let h = Harness::new(Layout::SingleRoot);
    let project = ProjectFile {
        node: Some("18".to_string()),
        jdk: Some("17.0.2".to_string()),
    };

    let applied = apply_project(&project, &[&h.node, &h.java], &h.config)
        .await
        .unwrap();

    assert_eq!(
        applied,
        vec![
            (RuntimeKind::Node, "18.20.4".to_string()),
            (RuntimeKind::Java, "17.0.2".to_string()),
        ]
    );
    let settings = h.settings.load().unwrap();
    assert_eq!(settings.node.as_deref(), Some("18.20.4"));
    assert_eq!(settings.java.as_deref(), Some("17.0.2"));
    assert!(fs::read_link(h.config.symlink_for(RuntimeKind::Java).unwrap()).is_ok());
}
