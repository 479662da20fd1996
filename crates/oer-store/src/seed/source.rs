//! Source plugins backed by imported seed data.
//!
//! Each distinct file component (`mod_resource`, `mod_folder`, ...) and each
//! external origin becomes one [`SeedSourcePlugin`]. Rows are read once at
//! construction; the plugin itself holds no connection.

#![allow(clippy::result_large_err)]

use std::collections::BTreeMap;

use crate::errors::Result;
use crate::repo::{CourseRepo, ExternalRow, FileUsageRow};
use oer_core::identifier;
use oer_core::model::{
    Element, ElementList, ElementType, Information, LicenseRegistry, StoredFileRef,
};
use oer_core::plugin::{Role, SourcePlugin};
use oer_core::OerConfig;
use rusqlite::Connection;

pub const AUTHOR_ROLE: &str = "Author";

/// Identifier of a stored file
pub fn file_identifier(config: &OerConfig, contenthash: &str) -> oer_core::Result<String> {
    identifier::compose(
        &config.platform,
        &config.instance_host,
        "file",
        "contenthash",
        contenthash,
    )
}

/// Identifier of an external resource
pub fn external_identifier(config: &OerConfig, value: &str) -> oer_core::Result<String> {
    identifier::compose(&config.platform, &config.instance_host, "external", "id", value)
}

enum Rows {
    Files(BTreeMap<i64, Vec<FileUsageRow>>),
    Externals(BTreeMap<i64, Vec<ExternalRow>>),
}

pub struct SeedSourcePlugin {
    key: String,
    config: OerConfig,
    licenses: LicenseRegistry,
    rows: Rows,
}

impl SeedSourcePlugin {
    /// Files registered under `component`, across all courses
    pub fn files(
        conn: &Connection,
        component: &str,
        config: &OerConfig,
        licenses: &LicenseRegistry,
    ) -> Result<Self> {
        let mut by_course: BTreeMap<i64, Vec<FileUsageRow>> = BTreeMap::new();
        for course in CourseRepo::list_courses(conn)? {
            let rows = CourseRepo::files_for_course(conn, course.id, Some(component))?;
            if !rows.is_empty() {
                by_course.insert(course.id, rows);
            }
        }
        Ok(Self {
            key: component.to_string(),
            config: config.clone(),
            licenses: licenses.clone(),
            rows: Rows::Files(by_course),
        })
    }

    /// External elements of `origin`, across all courses
    pub fn externals(
        conn: &Connection,
        origin: &str,
        config: &OerConfig,
        licenses: &LicenseRegistry,
    ) -> Result<Self> {
        let mut by_course: BTreeMap<i64, Vec<ExternalRow>> = BTreeMap::new();
        for course in CourseRepo::list_courses(conn)? {
            let rows = CourseRepo::externals_for_course(conn, course.id, Some(origin))?;
            if !rows.is_empty() {
                by_course.insert(course.id, rows);
            }
        }
        Ok(Self {
            key: origin.to_string(),
            config: config.clone(),
            licenses: licenses.clone(),
            rows: Rows::Externals(by_course),
        })
    }

    /// One plugin per stored component and origin, files first
    pub fn all_from_store(
        conn: &Connection,
        config: &OerConfig,
        licenses: &LicenseRegistry,
    ) -> Result<Vec<SeedSourcePlugin>> {
        let mut plugins = Vec::new();
        for component in CourseRepo::file_components(conn)? {
            plugins.push(Self::files(conn, &component, config, licenses)?);
        }
        for origin in CourseRepo::external_origins(conn)? {
            plugins.push(Self::externals(conn, &origin, config, licenses)?);
        }
        Ok(plugins)
    }

    fn file_element(&self, row: &FileUsageRow) -> oer_core::Result<Element> {
        let mut element = Element::new(ElementType::MoodleFile);
        element.set_title(row.filename.clone())?;
        element.set_identifier(file_identifier(&self.config, &row.contenthash)?)?;
        element.set_origin(self.key.clone())?;
        let source = format!(
            "{}/pluginfile.php/{}/{}/{}",
            self.config.public_base_url.trim_end_matches('/'),
            row.course_id,
            row.component,
            row.filename
        );
        element.set_source(source.clone())?;
        element.set_license(&row.license, &self.licenses);
        element.set_filesize(u64::try_from(row.filesize).unwrap_or_default());
        element.set_mimetype(row.mimetype.clone())?;
        if !row.author.is_empty() {
            element.add_person(AUTHOR_ROLE, row.author.clone());
        }
        element.add_information(Information::new(self.key.clone(), row.filename.clone()).with_url(source));
        element.set_stored_file(StoredFileRef {
            contenthash: row.contenthash.clone(),
            filename: row.filename.clone(),
            timecreated: row.timecreated,
        });
        Ok(element)
    }

    fn external_element(&self, row: &ExternalRow) -> oer_core::Result<Element> {
        let mut element = Element::new(ElementType::External);
        element.set_title(row.title.clone())?;
        element.set_identifier(external_identifier(&self.config, &row.value)?)?;
        element.set_origin(self.key.clone())?;
        element.set_source(row.url.clone())?;
        element.set_license(&row.license, &self.licenses);
        if !row.author.is_empty() {
            element.add_person(AUTHOR_ROLE, row.author.clone());
        }
        let information: Vec<Information> = serde_json::from_value(row.information.clone())?;
        for info in information {
            element.add_information(info);
        }
        Ok(element)
    }
}

impl SourcePlugin for SeedSourcePlugin {
    fn key(&self) -> &str {
        &self.key
    }

    fn load_elements(&self, course_id: i64) -> oer_core::Result<ElementList> {
        let mut list = ElementList::new();
        match &self.rows {
            Rows::Files(by_course) => {
                for row in by_course.get(&course_id).into_iter().flatten() {
                    list.add(self.file_element(row)?)?;
                }
            }
            Rows::Externals(by_course) => {
                for row in by_course.get(&course_id).into_iter().flatten() {
                    list.add(self.external_element(row)?)?;
                }
            }
        }
        Ok(list)
    }

    fn supported_licenses(&self) -> Vec<String> {
        self.licenses.shortnames().map(str::to_string).collect()
    }

    fn supported_roles(&self) -> Vec<Role> {
        vec![Role {
            shortname: AUTHOR_ROLE.to_string(),
            label: AUTHOR_ROLE.to_string(),
            required: true,
        }]
    }

    fn set_element_to_release(&self, element: &Element) -> bool {
        tracing::debug!(
            plugin = %self.key,
            identifier = element.identifier(),
            "Element marked as released"
        );
        true
    }
}

/// Box every seed plugin for registration
pub fn boxed_plugins(
    conn: &Connection,
    config: &OerConfig,
    licenses: &LicenseRegistry,
) -> Result<Vec<Box<dyn SourcePlugin>>> {
    Ok(SeedSourcePlugin::all_from_store(conn, config, licenses)?
        .into_iter()
        .map(|p| Box::new(p) as Box<dyn SourcePlugin>)
        .collect())
}

