//! Extended Data (XDATA) support
//!
//! Extended data is application-specific data that can be attached to any
//! entity or object. It is stored after all subclass data, one group per
//! registered application, each group starting with a `1001` tag followed
//! by tags in the 1000-1071 range.

use crate::io::dxf::tag::Tag;

/// Extended data of a single application
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedDataRecord {
    /// Application name (from group code 1001)
    pub application_name: String,
    /// Tags following the 1001 tag, in file order
    pub tags: Vec<Tag>,
}

impl ExtendedDataRecord {
    /// Create a new, empty record
    pub fn new(application_name: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            tags: Vec::new(),
        }
    }

    /// Append a tag
    pub fn add_tag(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Extended data collection of an entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtendedData {
    records: Vec<ExtendedDataRecord>,
}

impl ExtendedData {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Split XDATA tags into per-application records.
    ///
    /// `tags` must start with a `1001` tag; anything before it is ignored.
    pub fn from_tags(tags: impl IntoIterator<Item = Tag>) -> Self {
        let mut data = ExtendedData::new();
        for tag in tags {
            if tag.code == 1001 {
                let name = tag.as_str().unwrap_or("").to_string();
                data.records.push(ExtendedDataRecord::new(name));
            } else if let Some(record) = data.records.last_mut() {
                record.add_tag(tag);
            }
        }
        data
    }

    /// Render back into a tag list (1001 + data per application)
    pub fn to_tags(&self) -> Vec<Tag> {
        let mut tags = Vec::new();
        for record in &self.records {
            tags.push(Tag::text(1001, record.application_name.clone()));
            tags.extend(record.tags.iter().cloned());
        }
        tags
    }

    /// Add a record; replaces an existing record of the same application
    pub fn add_record(&mut self, record: ExtendedDataRecord) {
        match self.position(&record.application_name) {
            Some(index) => self.records[index] = record,
            None => self.records.push(record),
        }
    }

    /// Remove the record of an application
    pub fn remove_record(&mut self, application_name: &str) -> Option<ExtendedDataRecord> {
        self.position(application_name).map(|i| self.records.remove(i))
    }

    /// Get all records
    pub fn records(&self) -> &[ExtendedDataRecord] {
        &self.records
    }

    /// Get a record by application name (case-insensitive)
    pub fn get_record(&self, application_name: &str) -> Option<&ExtendedDataRecord> {
        self.position(application_name).map(|i| &self.records[i])
    }

    fn position(&self, application_name: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.application_name.eq_ignore_ascii_case(application_name))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
