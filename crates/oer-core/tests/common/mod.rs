use oer_core::errors::Result;
use oer_core::model::{Element, ElementList, ElementType, StoredFileRef};
use oer_core::plugin::{Role, SourcePlugin};

/// A source plugin serving a fixed set of file elements for every course
#[allow(dead_code)]
pub struct StaticFileSource {
    pub key: &'static str,
    /// (contenthash, title)
    pub files: Vec<(&'static str, &'static str)>,
}

impl SourcePlugin for StaticFileSource {
    fn key(&self) -> &str {
        self.key
    }

    fn load_elements(&self, course_id: i64) -> Result<ElementList> {
        let mut list = ElementList::new();
        for (hash, title) in &self.files {
            list.add(file_element(self.key, course_id, hash, title)?)?;
        }
        Ok(list)
    }

    fn supported_roles(&self) -> Vec<Role> {
        vec![Role {
            shortname: "author".to_string(),
            label: "Author".to_string(),
            required: true,
        }]
    }

    fn set_element_to_release(&self, _element: &Element) -> bool {
        true
    }
}

/// Build a complete file element
#[allow(dead_code)]
pub fn file_element(origin: &str, course_id: i64, hash: &str, title: &str) -> Result<Element> {
    let mut e = Element::new(ElementType::MoodleFile);
    e.set_title(title)?;
    e.set_identifier(format!("oer:moodle@lms.example.org:file:contenthash:{}", hash))?;
    e.set_origin(origin)?;
    e.set_source(format!(
        "https://lms.example.org/pluginfile.php/{}/{}",
        course_id, hash
    ))?;
    e.set_filesize(4096);
    e.set_mimetype("application/pdf")?;
    e.set_stored_file(StoredFileRef {
        contenthash: hash.to_string(),
        filename: format!("{}.pdf", title),
        timecreated: 1_700_000_000,
    });
    Ok(e)
}
