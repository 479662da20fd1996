//! Release document assembly.
//!
//! One code path builds the fields of a published document; the
//! application profile only decides their names and nesting.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use super::profile::ApplicationProfile;
use crate::identifier;
use crate::model::{ElementType, LicenseRegistry, SnapshotRecord};

/// Lookups needed to turn a snapshot into a document
#[derive(Debug, Clone, Copy)]
pub struct AssemblyContext<'a> {
    pub profile: ApplicationProfile,
    pub licenses: &'a LicenseRegistry,
    pub license_replacements: &'a BTreeMap<String, String>,
}

/// Keep the newest snapshot of each identifier (by `time_created`, then id).
pub fn latest_per_identifier(snapshots: Vec<SnapshotRecord>) -> Vec<SnapshotRecord> {
    latest_by(snapshots, |s| s.identifier.clone())
}

/// Keep the newest snapshot of each (course, identifier) pair.
pub fn latest_per_course_identifier(snapshots: Vec<SnapshotRecord>) -> Vec<SnapshotRecord> {
    latest_by(snapshots, |s| (s.course_id, s.identifier.clone()))
}

fn latest_by<K: Ord>(
    snapshots: Vec<SnapshotRecord>,
    key: impl Fn(&SnapshotRecord) -> K,
) -> Vec<SnapshotRecord> {
    snapshots
        .into_iter()
        .fold(BTreeMap::<K, SnapshotRecord>::new(), |mut latest, snapshot| {
            let k = key(&snapshot);
            match latest.get(&k) {
                Some(existing) if existing.recency() >= snapshot.recency() => {}
                _ => {
                    latest.insert(k, snapshot);
                }
            }
            latest
        })
        .into_values()
        .collect()
}

pub fn context_label(context: i64) -> &'static str {
    match context {
        1 => "Higher education",
        2 => "Secondary education",
        3 => "Primary education",
        4 => "Vocational training",
        5 => "Further education",
        _ => "",
    }
}

pub fn resourcetype_label(resourcetype: i64) -> &'static str {
    match resourcetype {
        1 => "Image",
        2 => "Video",
        3 => "Audio",
        4 => "Text",
        5 => "Presentation",
        6 => "Interactive material",
        7 => "Course",
        8 => "Other",
        _ => "",
    }
}

/// One published document for `snapshot` in the context's profile.
pub fn assemble(snapshot: &SnapshotRecord, ctx: &AssemblyContext<'_>) -> Value {
    let mut metadata = Map::new();
    metadata.insert("title".into(), json!(snapshot.title));
    metadata.insert(description_key(ctx.profile).into(), json!(snapshot.description));
    metadata.insert("license".into(), license_object(&snapshot.license, ctx));
    metadata.insert("context".into(), json!(context_label(snapshot.context)));
    metadata.insert(
        "resourcetype".into(),
        json!(resourcetype_label(snapshot.resourcetype)),
    );
    metadata.insert("language".into(), json!(snapshot.language));
    metadata.insert(
        "persons".into(),
        Value::Array(
            snapshot
                .persons
                .iter()
                .map(|p| json!({"role": p.role, "fullname": p.name}))
                .collect(),
        ),
    );
    metadata.insert("tags".into(), json!(tag_array(&snapshot.tags)));
    metadata.insert("classification".into(), snapshot.classification.clone());
    metadata.insert("courses".into(), snapshot.course_metadata.clone());

    // Type data never replaces a core field
    for (key, value) in type_fields(snapshot) {
        metadata.entry(key).or_insert(value);
    }

    let mut release = Map::new();
    release.insert("releasedate".into(), json!(snapshot.time_created));
    release.insert("releasenumber".into(), json!(snapshot.release_number));

    let document = match ctx.profile {
        ApplicationProfile::Legacy => {
            let mut flat = Map::new();
            flat.insert(
                "contenthash".into(),
                json!(legacy_identifier(snapshot)),
            );
            flat.extend(metadata);
            flat.extend(release);
            flat
        }
        ApplicationProfile::Current => {
            let mut nested = Map::new();
            nested.insert("identifier".into(), json!(snapshot.identifier));
            nested.insert("type".into(), json!(snapshot.element_type.as_str()));
            nested.insert("metadata".into(), Value::Object(metadata));
            nested.insert("release".into(), Value::Object(release));
            nested
        }
    };

    Value::Object(with_additional_data(document, &snapshot.additional_data, ctx.profile))
}

/// A full release response: profile version plus the document list.
pub fn release_response(snapshots: &[SnapshotRecord], ctx: &AssemblyContext<'_>) -> Value {
    let documents: Vec<Value> = snapshots.iter().map(|s| assemble(s, ctx)).collect();
    let mut response = Map::new();
    response.insert("applicationprofile".into(), json!(ctx.profile.version()));
    response.insert(ctx.profile.list_key().into(), Value::Array(documents));
    Value::Object(response)
}

fn description_key(profile: ApplicationProfile) -> &'static str {
    match profile {
        ApplicationProfile::Legacy => "abstract",
        ApplicationProfile::Current => "description",
    }
}

/// Content hash for file elements; the full identifier otherwise.
fn legacy_identifier(snapshot: &SnapshotRecord) -> String {
    match snapshot.element_type {
        ElementType::MoodleFile => identifier::decompose(&snapshot.identifier)
            .map(|parts| parts.value)
            .unwrap_or_else(|_| snapshot.identifier.clone()),
        ElementType::External => snapshot.identifier.clone(),
    }
}

fn license_object(shortname: &str, ctx: &AssemblyContext<'_>) -> Value {
    let published = ctx
        .license_replacements
        .get(shortname)
        .cloned()
        .unwrap_or_else(|| shortname.to_string());
    let (fullname, source) = ctx
        .licenses
        .get(shortname)
        .map(|l| (l.fullname.clone(), l.source.clone()))
        .unwrap_or_default();
    json!({"shortname": published, "fullname": fullname, "source": source})
}

fn tag_array(tags: &str) -> Vec<&str> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

fn type_fields(snapshot: &SnapshotRecord) -> Vec<(String, Value)> {
    match snapshot.element_type {
        ElementType::MoodleFile => {
            let data = &snapshot.type_data;
            vec![
                ("fileurl".to_string(), data.get("source").cloned().unwrap_or(Value::Null)),
                ("mimetype".to_string(), data.get("mimetype").cloned().unwrap_or(Value::Null)),
                ("filesize".to_string(), data.get("filesize").cloned().unwrap_or(Value::Null)),
                (
                    "filecreationtime".to_string(),
                    data.get("filecreationtime").cloned().unwrap_or(Value::Null),
                ),
            ]
        }
        ElementType::External => snapshot
            .type_data
            .as_object()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default(),
    }
}

/// Add contributor data under keys the document does not already use.
fn with_additional_data(
    mut document: Map<String, Value>,
    additional: &Value,
    profile: ApplicationProfile,
) -> Map<String, Value> {
    let Some(extra) = additional.as_object() else {
        return document;
    };
    let target = match profile {
        ApplicationProfile::Legacy => Some(&mut document),
        ApplicationProfile::Current => document
            .get_mut("metadata")
            .and_then(Value::as_object_mut),
    };
    if let Some(target) = target {
        for (key, value) in extra {
            if !target.contains_key(key) {
                target.insert(key.clone(), value.clone());
            }
        }
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Person;

    fn snapshot(id: i64, identifier: &str, time: i64) -> SnapshotRecord {
        SnapshotRecord {
            id,
            course_id: 5,
            identifier: identifier.into(),
            title: format!("Title {}", id),
            description: "About light".into(),
            context: 1,
            license: "cc-4.0".into(),
            persons: vec![Person {
                role: "Author".into(),
                name: "Ada Lovelace".into(),
            }],
            tags: "optics, physics".into(),
            language: "en".into(),
            resourcetype: 4,
            classification: json!({}),
            course_metadata: json!([]),
            additional_data: json!({"title": "clash", "rating": 5}),
            element_type: ElementType::MoodleFile,
            type_data: json!({
                "source": "https://example.org/f.pdf",
                "mimetype": "application/pdf",
                "filesize": 10,
                "filecreationtime": 1
            }),
            release_hash: format!("h{}", id),
            release_number: 3,
            time_created: time,
        }
    }

    const ID_A: &str = "oer:moodle@example.org:file:contenthash:aa";
    const ID_B: &str = "oer:moodle@example.org:file:contenthash:bb";

    #[test]
    fn test_latest_per_identifier() {
        let latest = latest_per_identifier(vec![
            snapshot(1, ID_A, 100),
            snapshot(2, ID_A, 200),
            snapshot(3, ID_B, 150),
            snapshot(4, ID_A, 200),
        ]);
        let ids: Vec<i64> = latest.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![4, 3]);
    }

    #[test]
    fn test_latest_per_course_identifier_keeps_courses_apart() {
        let mut other_course = snapshot(9, ID_A, 50);
        other_course.course_id = 6;
        let latest = latest_per_course_identifier(vec![snapshot(1, ID_A, 100), other_course]);
        assert_eq!(latest.len(), 2);
    }

    #[test]
    fn test_current_profile_shape() {
        let licenses = LicenseRegistry::default();
        let replacements = BTreeMap::from([("cc-4.0".to_string(), "CC BY 4.0".to_string())]);
        let ctx = AssemblyContext {
            profile: ApplicationProfile::Current,
            licenses: &licenses,
            license_replacements: &replacements,
        };
        let doc = assemble(&snapshot(1, ID_A, 100), &ctx);
        assert_eq!(doc["identifier"], ID_A);
        assert_eq!(doc["type"], "moodlefile");
        assert_eq!(doc["metadata"]["title"], "Title 1");
        assert_eq!(doc["metadata"]["license"]["shortname"], "CC BY 4.0");
        assert_eq!(
            doc["metadata"]["license"]["fullname"],
            "Creative Commons - 4.0 International"
        );
        assert_eq!(doc["metadata"]["tags"], json!(["optics", "physics"]));
        assert_eq!(doc["metadata"]["fileurl"], "https://example.org/f.pdf");
        assert_eq!(doc["metadata"]["rating"], 5);
        assert_eq!(doc["release"]["releasenumber"], 3);
    }

    #[test]
    fn test_external_type_data_keeps_core_fields() {
        let mut external = snapshot(2, "oer:moodle@example.org:external:url:vid42", 100);
        external.element_type = ElementType::External;
        external.title = "Editor title".into();
        external.type_data = json!({"title": "Source title", "license": "x", "duration": "PT4M"});
        let licenses = LicenseRegistry::default();
        let replacements = BTreeMap::new();
        let ctx = AssemblyContext {
            profile: ApplicationProfile::Current,
            licenses: &licenses,
            license_replacements: &replacements,
        };
        let doc = assemble(&external, &ctx);
        assert_eq!(doc["metadata"]["title"], "Editor title");
        assert_eq!(doc["metadata"]["license"]["shortname"], "cc-4.0");
        assert_eq!(doc["metadata"]["duration"], "PT4M");
    }

    #[test]
    fn test_legacy_profile_shape() {
        let licenses = LicenseRegistry::default();
        let replacements = BTreeMap::new();
        let ctx = AssemblyContext {
            profile: ApplicationProfile::Legacy,
            licenses: &licenses,
            license_replacements: &replacements,
        };
        let doc = assemble(&snapshot(1, ID_A, 100), &ctx);
        assert_eq!(doc["contenthash"], "aa");
        assert_eq!(doc["abstract"], "About light");
        assert!(doc.get("description").is_none());
        assert_eq!(doc["title"], "Title 1");
        assert_eq!(doc["releasenumber"], 3);
        assert_eq!(doc["rating"], 5);

        let response = release_response(&[snapshot(1, ID_A, 100)], &ctx);
        assert_eq!(response["applicationprofile"], "v1.0.0");
        assert_eq!(response["files"].as_array().unwrap().len(), 1);
    }
}
