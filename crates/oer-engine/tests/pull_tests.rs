// Release pull API responses in both application profiles

mod common;

use serde_json::{json, Value};

use oer_core::model::{Element, MetadataEdit, ReleaseState};
use oer_core::plugin::ReleaseDataContributor;
use oer_core::OerConfig;
use oer_engine::commands::{edit_metadata, pull, run_release, sync_course, PullQuery};
use oer_engine::ReleaseOptions;

use common::*;

struct Rating;

impl ReleaseDataContributor for Rating {
    fn key(&self) -> &str {
        "oerrating"
    }

    fn release_data(&self, _course_id: i64, _element: &Element) -> Option<Value> {
        Some(json!({"stars": 4}))
    }
}

fn released_fixture(config: OerConfig) -> Fixture {
    let mut f = fixture_with(config);
    f.registry.register_contributor(Box::new(Rating)).unwrap();
    sync_course(&mut f.conn, &f.registry, &f.ctx, 5).unwrap();
    for hash in ["ab12", "cd34"] {
        let element = element_in(&f, 5, &file_id(hash));
        let edit = MetadataEdit {
            description: Some(format!("About {}", hash)),
            release_state: Some(ReleaseState::Release),
            ..MetadataEdit::default()
        };
        edit_metadata(&f.conn, &f.ctx, &element, 5, &edit).unwrap();
    }
    run_release(&mut f.conn, &f.registry, &f.ctx, &ReleaseOptions::default()).unwrap();
    f
}

#[test]
fn test_latest_in_current_profile() {
    let f = released_fixture(config());
    let response = pull(&f.conn, &f.ctx, &PullQuery::Latest, None).unwrap();

    assert_eq!(response["applicationprofile"], "v2.0.0");
    let elements = response["elements"].as_array().unwrap();
    assert_eq!(elements.len(), 2);

    let doc = &elements[0];
    assert_eq!(doc["identifier"], file_id("ab12").as_str());
    assert_eq!(doc["type"], "moodlefile");
    assert_eq!(doc["metadata"]["title"], "Light notes.pdf");
    assert_eq!(doc["metadata"]["description"], "About ab12");
    assert_eq!(doc["metadata"]["license"]["shortname"], "cc-4.0");
    assert_eq!(doc["metadata"]["persons"][0]["fullname"], "Ada Lovelace");
    assert_eq!(doc["metadata"]["courses"][0]["coursecode"], "moodlecourse-5");
    assert_eq!(doc["metadata"]["oerrating"]["stars"], 4);
    assert_eq!(doc["release"]["releasenumber"], 1);
}

#[test]
fn test_latest_in_legacy_profile_from_header() {
    let f = released_fixture(config());
    let response = pull(
        &f.conn,
        &f.ctx,
        &PullQuery::Latest,
        Some("application/json; applicationprofile=v1.0.0"),
    )
    .unwrap();

    assert_eq!(response["applicationprofile"], "v1.0.0");
    let files = response["files"].as_array().unwrap();
    let hashes: Vec<&str> = files.iter().map(|d| d["contenthash"].as_str().unwrap()).collect();
    assert_eq!(hashes, vec!["ab12", "cd34"]);
    assert_eq!(files[0]["abstract"], "About ab12");
    assert!(files[0].get("metadata").is_none());
}

#[test]
fn test_license_replacement_applies_to_documents() {
    let config = OerConfig {
        license_replacement: "cc-4.0=>CC BY 4.0".into(),
        ..config()
    };
    let f = released_fixture(config);
    let response = pull(&f.conn, &f.ctx, &PullQuery::Release(1), None).unwrap();
    assert_eq!(response["elements"][0]["metadata"]["license"]["shortname"], "CC BY 4.0");
}

#[test]
fn test_identifier_history_and_unknowns() {
    let f = released_fixture(config());

    let history = pull(&f.conn, &f.ctx, &PullQuery::Identifier(file_id("cd34")), None).unwrap();
    assert_eq!(history["elements"].as_array().unwrap().len(), 1);

    let unknown = pull(&f.conn, &f.ctx, &PullQuery::Identifier(file_id("ffff")), None).unwrap();
    assert!(unknown["error"].as_str().unwrap().contains("no release"));

    let malformed =
        pull(&f.conn, &f.ctx, &PullQuery::Identifier("not-an-identifier".into()), None).unwrap();
    assert!(malformed["error"].as_str().unwrap().contains("malformed"));

    let missing_release = pull(&f.conn, &f.ctx, &PullQuery::Release(9), None).unwrap();
    assert!(missing_release.get("error").is_some());
}

#[test]
fn test_latest_for_one_course() {
    let f = released_fixture(config());

    let own = pull(&f.conn, &f.ctx, &PullQuery::Course(5), None).unwrap();
    assert_eq!(own["elements"].as_array().unwrap().len(), 2);

    let other = pull(&f.conn, &f.ctx, &PullQuery::Course(6), None).unwrap();
    assert!(other["elements"].as_array().unwrap().is_empty());
}

#[test]
fn test_release_dates() {
    let f = released_fixture(config());
    let response = pull(&f.conn, &f.ctx, &PullQuery::Dates, Some("v1.0.0")).unwrap();

    assert_eq!(response["applicationprofile"], "v1.0.0");
    let releases = response["releases"].as_array().unwrap();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0]["releasenumber"], 1);
    assert_eq!(releases[0]["count"], 2);
}
