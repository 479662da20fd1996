use super::element::Element;
use crate::errors::Result;

/// Fields an `ElementList` can be searched by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementField {
    Identifier,
    Title,
    License,
    Origin,
    Source,
    Mimetype,
}

impl ElementField {
    fn read<'a>(&self, element: &'a Element) -> Option<&'a str> {
        match self {
            ElementField::Identifier => Some(element.identifier()),
            ElementField::Title => Some(element.title()),
            ElementField::License => Some(element.license()),
            ElementField::Origin => Some(element.origin()),
            ElementField::Source => Some(element.source()),
            ElementField::Mimetype => element.mimetype(),
        }
    }
}

/// Ordered, duplicate-tolerant collection of elements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementList {
    elements: Vec<Element>,
}

impl ElementList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element after checking its required fields.
    ///
    /// # Errors
    ///
    /// `RequiredFieldEmpty` if the element is incomplete.
    pub fn add(&mut self, element: Element) -> Result<()> {
        element.validate_required()?;
        self.elements.push(element);
        Ok(())
    }

    /// Remove and return the element at `index`; later elements shift down.
    pub fn remove(&mut self, index: usize) -> Option<Element> {
        (index < self.elements.len()).then(|| self.elements.remove(index))
    }

    /// Append every element of `other`
    pub fn merge(&mut self, other: ElementList) {
        self.elements.extend(other.elements);
    }

    /// Position of the first element whose `field` equals `value`
    pub fn find(&self, field: ElementField, value: &str) -> Option<usize> {
        self.elements
            .iter()
            .position(|e| field.read(e) == Some(value))
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.elements.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Element> {
        self.elements.iter_mut()
    }

    /// Collapse elements sharing an identifier.
    ///
    /// The first occurrence stays primary (its title, license, source win);
    /// information and origins of later duplicates are merged into it.
    pub fn merge_duplicates(self) -> ElementList {
        let elements = self
            .elements
            .into_iter()
            .fold(Vec::<Element>::new(), |mut kept, element| {
                match kept
                    .iter_mut()
                    .find(|k| k.identifier() == element.identifier())
                {
                    Some(primary) => primary.absorb(element),
                    None => kept.push(element),
                }
                kept
            });
        ElementList { elements }
    }
}

impl IntoIterator for ElementList {
    type Item = Element;
    type IntoIter = std::vec::IntoIter<Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a> IntoIterator for &'a ElementList {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::element::{ElementType, Information};

    fn external(id: &str, title: &str, origin: &str) -> Element {
        let mut e = Element::new(ElementType::External);
        e.set_title(title).unwrap();
        e.set_identifier(format!("oer:moodle@example.org:external:url:{}", id))
            .unwrap();
        e.set_origin(origin).unwrap();
        e.set_source("https://example.org").unwrap();
        e
    }

    #[test]
    fn test_add_rejects_incomplete() {
        let mut list = ElementList::new();
        assert!(list.add(Element::new(ElementType::External)).is_err());
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_repacks() {
        let mut list = ElementList::new();
        for id in ["a", "b", "c"] {
            list.add(external(id, id, "p")).unwrap();
        }
        let removed = list.remove(1).unwrap();
        assert_eq!(removed.title(), "b");
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(1).unwrap().title(), "c");
        assert!(list.remove(5).is_none());
    }

    #[test]
    fn test_find_by_field() {
        let mut list = ElementList::new();
        list.add(external("a", "First", "p1")).unwrap();
        list.add(external("b", "Second", "p2")).unwrap();
        assert_eq!(list.find(ElementField::Title, "Second"), Some(1));
        assert_eq!(list.find(ElementField::Origin, "p1"), Some(0));
        assert_eq!(list.find(ElementField::Mimetype, "text/plain"), None);
    }

    #[test]
    fn test_merge_appends() {
        let mut a = ElementList::new();
        a.add(external("a", "A", "p")).unwrap();
        let mut b = ElementList::new();
        b.add(external("b", "B", "p")).unwrap();
        a.merge(b);
        let titles: Vec<_> = a.iter().map(|e| e.title().to_string()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_merge_duplicates_keeps_first() {
        let mut list = ElementList::new();
        let mut first = external("x", "First title", "plugin_a");
        first.add_information(Information::new("Course", "Week 1"));
        let mut second = external("x", "Second title", "plugin_b");
        second.add_information(Information::new("Folder", "Handouts"));
        list.add(first).unwrap();
        list.add(external("y", "Other", "plugin_a")).unwrap();
        list.add(second).unwrap();

        let merged = list.merge_duplicates();
        assert_eq!(merged.len(), 2);
        let x = merged.get(0).unwrap();
        assert_eq!(x.title(), "First title");
        assert_eq!(x.origins().len(), 2);
        assert_eq!(x.information().len(), 2);
    }

    #[test]
    fn test_iteration_is_restartable() {
        let mut list = ElementList::new();
        list.add(external("a", "A", "p")).unwrap();
        assert_eq!(list.iter().count(), 1);
        assert_eq!(list.iter().count(), 1);
        assert_eq!((&list).into_iter().count(), 1);
    }
}
