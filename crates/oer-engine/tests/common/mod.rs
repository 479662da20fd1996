// Shared fixture: a seeded file database with the seed source plugins registered

#![allow(dead_code)]

use std::fs;

use oer_core::model::{Element, LicenseRegistry};
use oer_core::{OerConfig, PluginRegistry, RequestContext};
use oer_store::seed::{boxed_plugins, external_identifier, file_identifier, import_seed};
use rusqlite::Connection;
use tempfile::TempDir;

pub const SEED: &str = r#"
schema_version: 0
courses:
  - id: 5
    fullname: Physics
    summary: Mechanics and optics
    lecturers: [Ada Lovelace]
  - id: 6
    fullname: Optics
  - id: 7
    fullname: Archive
files:
  - contenthash: ab12
    course_id: 5
    filename: Light notes.pdf
    mimetype: application/pdf
    filesize: 2048
    license: cc-4.0
    author: Ada Lovelace
  - contenthash: ab12
    course_id: 6
    filename: copy.pdf
    mimetype: application/pdf
    filesize: 2048
  - contenthash: cd34
    course_id: 5
    filename: lenses.pdf
    mimetype: application/pdf
    filesize: 512
    license: cc-4.0
    author: Ada Lovelace
externals:
  - course_id: 5
    origin: oerexternal
    value: vid42
    title: Refraction video
    url: https://videos.example.org/42
"#;

pub struct Fixture {
    pub dir: TempDir,
    pub conn: Connection,
    pub registry: PluginRegistry,
    pub ctx: RequestContext,
}

pub fn config() -> OerConfig {
    OerConfig {
        instance_host: "lms.example.org".into(),
        public_base_url: "https://lms.example.org".into(),
        ..OerConfig::default()
    }
}

pub fn fixture() -> Fixture {
    fixture_with(config())
}

pub fn fixture_with(config: OerConfig) -> Fixture {
    let dir = TempDir::new().unwrap();
    let seed_path = dir.path().join("seed.yaml");
    fs::write(&seed_path, SEED).unwrap();

    let mut conn = oer_store::db::open_ready(dir.path().join("oer.db")).unwrap();
    import_seed(&seed_path, &mut conn, &config).unwrap();

    let registry = registry_for(&conn, &config);
    let ctx = RequestContext::new(config).with_user(42);
    Fixture {
        dir,
        conn,
        registry,
        ctx,
    }
}

pub fn registry_for(conn: &Connection, config: &OerConfig) -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    for plugin in boxed_plugins(conn, config, &LicenseRegistry::default()).unwrap() {
        registry.register_source(plugin).unwrap();
    }
    registry
}

pub fn file_id(hash: &str) -> String {
    file_identifier(&config(), hash).unwrap()
}

pub fn external_id(value: &str) -> String {
    external_identifier(&config(), value).unwrap()
}

/// The element `identifier` as course `course_id` lists it
pub fn element_in(f: &Fixture, course_id: i64, identifier: &str) -> Element {
    oer_engine::list_course_elements(&f.conn, &f.registry, &f.ctx, course_id)
        .unwrap()
        .elements
        .iter()
        .find(|e| e.identifier() == identifier)
        .cloned()
        .unwrap()
}

/// Open a second connection on the fixture database
pub fn second_connection(f: &Fixture) -> Connection {
    oer_store::db::open_ready(f.dir.path().join("oer.db")).unwrap()
}
