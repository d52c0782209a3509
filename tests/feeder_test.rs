use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use container_feeder::{
    parse_whitelist, Engine, Feeder, FeederConfig, FeederError, FeederLoadResponse,
};

/// Engine double that serves a fixed image list and records every load and
/// tag call. Clones share the recorded calls.
#[derive(Clone, Default)]
struct MockEngine {
    known_images: Vec<String>,
    failing_archives: Vec<String>,
    calls: Arc<Mutex<Calls>>,
}

#[derive(Default)]
struct Calls {
    loads: Vec<PathBuf>,
    tags: Vec<(String, Vec<String>)>,
}

impl MockEngine {
    fn with_images(known_images: &[&str]) -> Self {
        MockEngine {
            known_images: known_images.iter().map(|i| i.to_string()).collect(),
            ..MockEngine::default()
        }
    }

    fn failing_on(mut self, archive_name: &str) -> Self {
        self.failing_archives.push(archive_name.to_string());
        self
    }

    fn loads(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().loads.clone()
    }

    fn tags(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().tags.clone()
    }
}

impl Engine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn images(&self) -> Result<Vec<String>, FeederError> {
        Ok(self.known_images.clone())
    }

    fn load_image(&self, archive: &Path) -> Result<String, FeederError> {
        self.calls.lock().unwrap().loads.push(archive.to_path_buf());

        let name = archive.file_name().unwrap().to_str().unwrap().to_string();
        if self.failing_archives.contains(&name) {
            return Err(FeederError::CommandFailed {
                program: "mock".to_string(),
                stderr: format!("cannot load {name}"),
            });
        }
        Ok(format!("loaded:{name}"))
    }

    fn tag_image(&self, image: &str, tags: &[String]) -> Result<(), FeederError> {
        self.calls
            .lock()
            .unwrap()
            .tags
            .push((image.to_string(), tags.to_vec()));
        Ok(())
    }
}

fn write_descriptor(dir: &Path, stem: &str, name: &str, tags: &[&str], file: &str) {
    let body = serde_json::json!({
        "image": { "name": name, "tags": tags, "file": file }
    });
    fs::write(
        dir.join(format!("{stem}.metadata")),
        serde_json::to_string_pretty(&body).unwrap(),
    )
    .unwrap();
    File::create(dir.join(file)).unwrap();
}

fn import_with(engine: &MockEngine, config: FeederConfig, dir: &Path) -> FeederLoadResponse {
    let feeder = Feeder::with_engine(config, Box::new(engine.clone()), None);
    feeder.import(dir).unwrap()
}

#[test]
fn test_missing_images_are_loaded_and_tagged() {
    let dir = TempDir::new().unwrap();
    write_descriptor(
        dir.path(),
        "salt-api",
        "opensuse/salt-api",
        &["13", "13.0.1", "latest"],
        "salt-api.tar.xz",
    );

    let engine = MockEngine::default();
    let response = import_with(&engine, FeederConfig::default(), dir.path());

    assert_eq!(
        response.successful_imports,
        vec!["docker.io/opensuse/salt-api:13"]
    );
    assert!(response.failed_imports.is_empty());

    assert_eq!(engine.loads(), vec![dir.path().join("salt-api.tar.xz")]);
    assert_eq!(
        engine.tags(),
        vec![(
            "loaded:salt-api.tar.xz".to_string(),
            vec![
                "docker.io/opensuse/salt-api:13.0.1".to_string(),
                "docker.io/opensuse/salt-api:latest".to_string()
            ]
        )]
    );
}

#[test]
fn test_fully_present_images_are_not_reimported() {
    let dir = TempDir::new().unwrap();
    write_descriptor(
        dir.path(),
        "salt-api",
        "opensuse/salt-api",
        &["13", "latest"],
        "salt-api.tar.xz",
    );

    let engine = MockEngine::with_images(&[
        "docker.io/opensuse/salt-api:13",
        "docker.io/opensuse/salt-api:latest",
    ]);
    let response = import_with(&engine, FeederConfig::default(), dir.path());

    assert!(response.successful_imports.is_empty());
    assert!(response.failed_imports.is_empty());
    assert!(engine.loads().is_empty());
}

#[test]
fn test_one_missing_tag_reimports_the_whole_image() {
    let dir = TempDir::new().unwrap();
    write_descriptor(
        dir.path(),
        "salt-api",
        "opensuse/salt-api",
        &["13", "13.0.1", "latest"],
        "salt-api.tar.xz",
    );

    // 13.0.1 is missing from the engine
    let engine = MockEngine::with_images(&[
        "docker.io/opensuse/salt-api:13",
        "docker.io/opensuse/salt-api:latest",
    ]);
    let response = import_with(&engine, FeederConfig::default(), dir.path());

    assert_eq!(
        response.successful_imports,
        vec!["docker.io/opensuse/salt-api:13"]
    );
    assert_eq!(engine.loads().len(), 1);
}

#[test]
fn test_failures_do_not_abort_the_run() {
    let dir = TempDir::new().unwrap();
    write_descriptor(dir.path(), "first", "first", &["1.0"], "first.tar.xz");
    write_descriptor(dir.path(), "second", "second", &["2.0"], "second.tar.xz");

    let engine = MockEngine::default().failing_on("first.tar.xz");
    let response = import_with(&engine, FeederConfig::default(), dir.path());

    assert_eq!(
        response.successful_imports,
        vec!["docker.io/library/second:2.0"]
    );
    assert_eq!(response.failed_imports.len(), 1);
    assert_eq!(response.failed_imports[0].image, "docker.io/library/first:1.0");
    assert_eq!(engine.loads().len(), 2);
}

#[test]
fn test_whitelist_limits_what_gets_imported() {
    let dir = TempDir::new().unwrap();
    write_descriptor(dir.path(), "wanted", "opensuse", &["42.3"], "wanted.tar.xz");
    write_descriptor(dir.path(), "unwanted", "sles12/foo", &["1.0"], "unwanted.tar.xz");

    let config = FeederConfig {
        whitelist: parse_whitelist(&["opensuse".to_string()]).unwrap(),
        ..FeederConfig::default()
    };

    let engine = MockEngine::default();
    let response = import_with(&engine, config, dir.path());

    assert_eq!(
        response.successful_imports,
        vec!["docker.io/library/opensuse:42.3"]
    );
    assert!(response.failed_imports.is_empty());
    assert_eq!(engine.loads(), vec![dir.path().join("wanted.tar.xz")]);
}

#[test]
fn test_descriptor_without_archive_is_ignored() {
    let dir = TempDir::new().unwrap();
    write_descriptor(dir.path(), "present", "present", &["1.0"], "present.tar.xz");
    // metadata without its payload
    let body = serde_json::json!({
        "image": { "name": "absent", "tags": ["1.0"], "file": "absent.tar.xz" }
    });
    fs::write(dir.path().join("absent.metadata"), body.to_string()).unwrap();

    let engine = MockEngine::default();
    let response = import_with(&engine, FeederConfig::default(), dir.path());

    assert_eq!(
        response.successful_imports,
        vec!["docker.io/library/present:1.0"]
    );
    assert!(response.failed_imports.is_empty());
}

#[test]
fn test_malformed_descriptor_fails_the_run() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.metadata"), "{ not json").unwrap();

    let engine = MockEngine::default();
    let feeder = Feeder::with_engine(FeederConfig::default(), Box::new(engine), None);

    assert!(matches!(
        feeder.import(dir.path()),
        Err(FeederError::Metadata { .. })
    ));
}

#[test]
fn test_missing_directory_fails_the_run() {
    let dir = TempDir::new().unwrap();
    let engine = MockEngine::default();
    let feeder = Feeder::with_engine(FeederConfig::default(), Box::new(engine), None);

    assert!(matches!(
        feeder.import(&dir.path().join("gone")),
        Err(FeederError::Scan { .. })
    ));
}

#[test]
fn test_images_without_additional_tags_apply_no_tags() {
    let dir = TempDir::new().unwrap();
    write_descriptor(dir.path(), "single", "single", &["1.0"], "single.tar.xz");

    let engine = MockEngine::default();
    let response = import_with(&engine, FeederConfig::default(), dir.path());

    assert_eq!(
        response.successful_imports,
        vec!["docker.io/library/single:1.0"]
    );
    assert_eq!(
        engine.tags(),
        vec![("loaded:single.tar.xz".to_string(), Vec::new())]
    );
}
