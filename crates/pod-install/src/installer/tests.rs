use super::*;
use crate::download::FetchResult;
use crate::project::{SourceListWriter, SOURCE_LIST_FILE};
use camino::Utf8PathBuf;
use pod_core::types::SourceReference;
use pod_resolver::{InMemorySource, Resolver};
use std::sync::Mutex;
use tempfile::TempDir;

/// Records fetches and writes one header per destination
#[derive(Default)]
struct RecordingDownloader {
    fetched: Mutex<Vec<PathBuf>>,
}

impl Downloader for RecordingDownloader {
    fn fetch(&self, _source: &SourceReference, destination: &Path) -> FetchResult {
        fs::create_dir_all(destination)?;
        fs::write(destination.join("Header.h"), "")?;
        self.fetched.lock().unwrap().push(destination.to_path_buf());
        Ok(())
    }

    fn clean(&self, _destination: &Path) -> FetchResult {
        Ok(())
    }
}

struct Fixture {
    temp_dir: TempDir,
    source: InMemorySource,
}

impl Fixture {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
            source: InMemorySource::new(),
        }
    }

    fn definition_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join("specs").join(format!("{name}.podspec.toml"))
    }

    fn package(&self, name: &str, version: &str) -> Specification {
        let path = self.definition_path(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("name = \"{name}\"\nversion = \"{version}\"\n")).unwrap();

        let mut spec = Specification::new();
        spec.set_name(name);
        spec.set_version(version.parse().unwrap());
        spec.set_source(SourceReference::path(self.temp_dir.path().join("src").join(name), None));
        spec.set_source_files(vec!["*.h".to_string()]);
        spec.set_defined_in_file(path);
        spec
    }

    fn resolve(&self, deps: &[&str]) -> Resolution {
        let mut root = Specification::new();
        for dep in deps {
            root.add_dependency(*dep, Vec::new());
        }
        Resolver::new(Arc::new(self.source.clone())).resolve(&root).unwrap()
    }

    fn installer(&self, downloader: Arc<dyn Downloader>) -> Installer {
        let project_dir = Utf8PathBuf::from_path_buf(self.temp_dir.path().to_path_buf()).unwrap();
        let settings = InstallSettings::defaults(&project_dir);
        Installer::new(&settings, downloader, Arc::new(SourceListWriter::new()))
    }
}

#[test]
fn test_child_and_owner_share_one_fetch() {
    let mut fixture = Fixture::new();
    let owner = fixture.package("ASIHTTPRequest", "1.8");
    let mut child = fixture.package("ASIWebPageRequest", "1.8");
    child.set_part_of_dependency("ASIHTTPRequest", Vec::new());
    fixture.source.add(owner).add(child);

    let resolution = fixture.resolve(&["ASIWebPageRequest"]);
    let downloader = Arc::new(RecordingDownloader::default());
    let installer = fixture.installer(downloader.clone());
    let summary = installer.install(&resolution).unwrap();

    assert_eq!(summary.packages_installed, 2);
    assert_eq!(summary.downloads, 1);
    assert_eq!(
        *downloader.fetched.lock().unwrap(),
        vec![installer.build_root().join("ASIHTTPRequest-1.8")]
    );
    // both patterns resolve inside the shared destination
    assert_eq!(summary.source_files, 1);
}

#[test]
fn test_empty_resolution_still_writes_outputs() {
    let fixture = Fixture::new();
    let resolution = fixture.resolve(&[]);
    let installer = fixture.installer(Arc::new(RecordingDownloader::default()));

    let summary = installer.install(&resolution).unwrap();

    assert_eq!(summary, InstallSummary { install_time_ms: summary.install_time_ms, ..Default::default() });
    assert!(installer.build_root().join(XCCONFIG_FILE).is_file());
    assert!(installer.build_root().join(SOURCE_LIST_FILE).is_file());
}

#[test]
fn test_missing_definition_file_is_reported() {
    let mut fixture = Fixture::new();
    let mut spec = Specification::new();
    spec.set_name("Inline");
    spec.set_version("1.0".parse().unwrap());
    spec.set_source(SourceReference::path(fixture.temp_dir.path(), None));
    fixture.source.add(spec);

    let resolution = fixture.resolve(&["Inline"]);
    let err = fixture
        .installer(Arc::new(RecordingDownloader::default()))
        .install(&resolution)
        .unwrap_err();

    assert!(matches!(err, PodError::ConfigValidation { ref field, .. } if field == "defined_in_file"));
}

#[test]
fn test_owner_without_source_fails_download() {
    let mut fixture = Fixture::new();
    let mut spec = Specification::new();
    spec.set_name("NoSource");
    spec.set_version("0.1".parse().unwrap());
    fixture.source.add(spec);

    let resolution = fixture.resolve(&["NoSource"]);
    let err = fixture
        .installer(Arc::new(RecordingDownloader::default()))
        .install(&resolution)
        .unwrap_err();

    match err {
        PodError::Download { package, version, message, .. } => {
            assert_eq!(package, "NoSource");
            assert_eq!(version, "0.1");
            assert_eq!(message, "no source declared");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_summary_fetches() {
    let summary = InstallSummary {
        downloads: 2,
        refetched: 1,
        already_present: 4,
        ..Default::default()
    };
    assert_eq!(summary.fetches(), 3);
}
