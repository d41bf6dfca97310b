//! Section assembly: groups a tag stream into sections and records

use super::stream_reader::DxfStreamReader;
use crate::error::{DxfError, Result};
use crate::io::dxf::tag::Tag;
use indexmap::IndexMap;

/// One structure of a section, starting with its code 0 tag
/// (an entity, a table head, a table entry, an object, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Source line of the code 0 tag
    pub line: usize,
    pub tags: Vec<Tag>,
    /// Why the record is incomplete, set when a tag inside it was unreadable
    pub damage: Option<String>,
}

impl Record {
    pub fn new(line: usize, tags: Vec<Tag>) -> Self {
        Self {
            line,
            tags,
            damage: None,
        }
    }

    /// The structure name of the leading code 0 tag
    pub fn dxf_type(&self) -> &str {
        self.tags
            .first()
            .filter(|t| t.code == 0)
            .and_then(|t| t.as_str())
            .map(str::trim)
            .unwrap_or("")
    }
}

/// The content of one `SECTION` ... `ENDSEC` block
#[derive(Debug, Clone, PartialEq)]
pub struct RawSection {
    /// Section name as found in the file
    pub name: String,
    pub line: usize,
    /// Tags before the first code 0 tag (the HEADER variables)
    pub head: Vec<Tag>,
    pub records: Vec<Record>,
    /// Unreadable tags dropped while assembling
    pub skipped: usize,
}

impl RawSection {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            head: Vec::new(),
            records: Vec::new(),
            skipped: 0,
        }
    }

    fn push(&mut self, tag: Tag, line: usize) {
        if tag.code == 0 {
            self.records.push(Record::new(line, vec![tag]));
        } else if let Some(record) = self.records.last_mut() {
            record.tags.push(tag);
        } else {
            self.head.push(tag);
        }
    }

    fn merge(&mut self, other: RawSection) {
        self.head.extend(other.head);
        self.records.extend(other.records);
        self.skipped += other.skipped;
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_empty() && self.records.is_empty()
    }

    /// Tags were skipped and nothing readable is left: no variables in
    /// the HEADER, no records in any other section.
    pub fn is_unreadable(&self) -> bool {
        let empty = if self.name.eq_ignore_ascii_case("HEADER") {
            self.head.is_empty()
        } else {
            self.records.is_empty()
        };
        self.skipped > 0 && empty
    }
}

/// Sections of a DXF stream keyed by upper-case name, in file order.
#[derive(Debug, Clone, Default)]
pub struct SectionMap {
    sections: IndexMap<String, RawSection>,
    /// Was the `0/EOF` tag present?
    pub eof: bool,
}

impl SectionMap {
    pub fn get(&self, name: &str) -> Option<&RawSection> {
        self.sections.get(&name.to_ascii_uppercase())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut RawSection> {
        self.sections.get_mut(&name.to_ascii_uppercase())
    }

    /// Remove a section, keeping the order of the others
    pub fn take(&mut self, name: &str) -> Option<RawSection> {
        self.sections.shift_remove(&name.to_ascii_uppercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(&name.to_ascii_uppercase())
    }

    /// Section names in file order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Sections that lost all of their content to unreadable tags
    pub fn unreadable(&self) -> impl Iterator<Item = &RawSection> {
        self.sections.values().filter(|s| s.is_unreadable())
    }

    /// Remaining sections in file order
    pub fn into_sections(self) -> impl Iterator<Item = RawSection> {
        self.sections.into_values()
    }
}

/// Groups tags into sections.
///
/// In strict mode every structural problem is an error. In tolerant mode
/// the assembler keeps going and records what it did:
/// unterminated sections are closed, stray `ENDSEC` and tags outside of
/// sections are dropped, duplicate sections are merged and a missing EOF
/// is accepted. Out-of-order sections are accepted in both modes.
///
/// An unreadable tag inside a record marks that record as damaged; the
/// document builder drops it and reports the repair.
pub struct SectionAssembler {
    tolerant: bool,
    repairs: Vec<String>,
    pending: Option<Tag>,
    /// Errors of skipped tags not yet assigned to a record
    skipped: Vec<String>,
}

impl SectionAssembler {
    pub fn new(tolerant: bool) -> Self {
        Self {
            tolerant,
            repairs: Vec::new(),
            pending: None,
            skipped: Vec::new(),
        }
    }

    /// Repair actions taken so far
    pub fn repairs(&self) -> &[String] {
        &self.repairs
    }

    pub fn into_repairs(self) -> Vec<String> {
        self.repairs
    }

    fn repair(&mut self, message: String) {
        tracing::debug!(%message, "section repair");
        self.repairs.push(message);
    }

    fn next<R: DxfStreamReader>(&mut self, reader: &mut R) -> Result<Option<Tag>> {
        if let Some(tag) = self.pending.take() {
            return Ok(Some(tag));
        }
        loop {
            match reader.read_tag() {
                Ok(tag) => return Ok(tag),
                Err(e) if self.tolerant && e.is_structural() => {
                    tracing::debug!(error = %e, "skipped unreadable tag");
                    self.skipped.push(e.to_string());
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Assign skipped tags to the record they were found in. Tags skipped
    /// before the first record of a section, or outside of any section,
    /// are reported right away.
    fn settle_skipped(&mut self, section: Option<&mut RawSection>) {
        if self.skipped.is_empty() {
            return;
        }
        let skipped = std::mem::take(&mut self.skipped);
        let Some(section) = section else {
            for message in skipped {
                self.repair(format!("skipped tag: {}", message));
            }
            return;
        };
        section.skipped += skipped.len();
        if let Some(record) = section.records.last_mut() {
            if record.damage.is_none() {
                record.damage = skipped.into_iter().next();
            }
            return;
        }
        for message in skipped {
            self.repair(format!("skipped tag in section {}: {}", section.name, message));
        }
    }

    fn store(&mut self, map: &mut SectionMap, section: RawSection) -> Result<()> {
        let key = section.name.to_ascii_uppercase();
        if let Some(existing) = map.sections.get_mut(&key) {
            if !self.tolerant {
                return Err(DxfError::DuplicateSection(section.name));
            }
            self.repairs.push(format!("merged duplicate section {}", section.name));
            existing.merge(section);
        } else {
            map.sections.insert(key, section);
        }
        Ok(())
    }

    fn close(&mut self, map: &mut SectionMap, section: RawSection) -> Result<()> {
        if !self.tolerant {
            return Err(DxfError::MissingSectionEnd(section.name));
        }
        self.repair(format!("closed section {} without ENDSEC", section.name));
        self.store(map, section)
    }

    /// Read the whole stream into a [`SectionMap`].
    pub fn assemble<R: DxfStreamReader>(&mut self, mut reader: R) -> Result<SectionMap> {
        let mut map = SectionMap::default();
        let mut current: Option<RawSection> = None;
        let mut skipping = false;
        let mut orphans = 0usize;

        while let Some(tag) = self.next(&mut reader)? {
            self.settle_skipped(current.as_mut());
            let line = reader.line();
            if tag.code == 0 {
                let kind = tag.as_str().map(|s| s.trim().to_ascii_uppercase()).unwrap_or_default();
                match kind.as_str() {
                    "SECTION" => {
                        if let Some(section) = current.take() {
                            self.close(&mut map, section)?;
                        }
                        skipping = false;
                        match self.next(&mut reader)? {
                            Some(name) if name.code == 2 => {
                                let name = name.as_str().map(str::trim).unwrap_or("").to_string();
                                tracing::trace!(section = %name, line, "section start");
                                current = Some(RawSection::new(name, line));
                            }
                            other => {
                                if !self.tolerant {
                                    return Err(DxfError::Structure(format!(
                                        "SECTION without name near line {}",
                                        line
                                    )));
                                }
                                self.repair(format!("dropped unnamed section near line {}", line));
                                self.pending = other;
                                skipping = true;
                            }
                        }
                        continue;
                    }
                    "ENDSEC" => {
                        match current.take() {
                            Some(section) => self.store(&mut map, section)?,
                            None if skipping => skipping = false,
                            None => {
                                if !self.tolerant {
                                    return Err(DxfError::UnexpectedSectionEnd { line });
                                }
                                self.repair(format!("ignored ENDSEC without SECTION near line {}", line));
                            }
                        }
                        continue;
                    }
                    "EOF" => {
                        if let Some(section) = current.take() {
                            self.close(&mut map, section)?;
                        }
                        map.eof = true;
                        break;
                    }
                    _ => {}
                }
            }

            match current.as_mut() {
                Some(section) => section.push(tag, line),
                None if skipping => {}
                None => orphans += 1,
            }
        }

        self.settle_skipped(current.as_mut());
        if let Some(section) = current.take() {
            self.close(&mut map, section)?;
        }
        if orphans > 0 {
            tracing::warn!(count = orphans, "tags outside of sections ignored");
            if self.tolerant {
                self.repair(format!("dropped {} tag(s) outside of sections", orphans));
            }
        }
        if !map.eof {
            if !self.tolerant {
                return Err(DxfError::MissingEof);
            }
            self.repair("stream ended without EOF".to_string());
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::reader::text_reader::DxfTextReader;

    fn assemble(data: &str, tolerant: bool) -> (Result<SectionMap>, Vec<String>) {
        let mut assembler = SectionAssembler::new(tolerant);
        let result = assembler.assemble(DxfTextReader::new(data.as_bytes()));
        (result, assembler.into_repairs())
    }

    const TWO_SECTIONS: &str = "0\nSECTION\n2\nHEADER\n9\n$ACADVER\n1\nAC1009\n0\nENDSEC\n\
0\nSECTION\n2\nENTITIES\n0\nLINE\n8\n0\n0\nPOINT\n8\n0\n0\nENDSEC\n0\nEOF\n";

    #[test]
    fn test_sections_and_records() {
        let (map, repairs) = assemble(TWO_SECTIONS, false);
        let map = map.unwrap();
        assert!(repairs.is_empty());
        assert!(map.eof);
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["HEADER", "ENTITIES"]);
        let header = map.get("header").unwrap();
        assert_eq!(header.head.len(), 2);
        let entities = map.get("ENTITIES").unwrap();
        assert_eq!(entities.records.len(), 2);
        assert_eq!(entities.records[0].dxf_type(), "LINE");
        assert_eq!(entities.records[0].line, 15);
    }

    #[test]
    fn test_strict_errors() {
        let (r, _) = assemble("0\nENDSEC\n0\nEOF\n", false);
        assert!(matches!(r, Err(DxfError::UnexpectedSectionEnd { line: 1 })));

        let (r, _) = assemble("0\nSECTION\n2\nENTITIES\n0\nEOF\n", false);
        assert!(matches!(r, Err(DxfError::MissingSectionEnd(name)) if name == "ENTITIES"));

        let (r, _) = assemble("0\nSECTION\n2\nENTITIES\n0\nENDSEC\n", false);
        assert!(matches!(r, Err(DxfError::MissingEof)));

        let dup = "0\nSECTION\n2\nBLOCKS\n0\nENDSEC\n0\nSECTION\n2\nBLOCKS\n0\nENDSEC\n0\nEOF\n";
        let (r, _) = assemble(dup, false);
        assert!(matches!(r, Err(DxfError::DuplicateSection(_))));

        let (r, _) = assemble("0\nSECTION\n0\nENDSEC\n0\nEOF\n", false);
        assert!(matches!(r, Err(DxfError::Structure(_))));
    }

    #[test]
    fn test_tolerant_repairs() {
        let data = "0\nSECTION\n2\nENTITIES\n0\nLINE\nxx\n1\n8\n0\n0\nSECTION\n2\nBLOCKS\n0\nENDSEC\n";
        let (map, repairs) = assemble(data, true);
        let map = map.unwrap();
        assert_eq!(map.len(), 2);
        let line = &map.get("ENTITIES").unwrap().records[0];
        assert_eq!(line.tags.len(), 2);
        assert!(line.damage.as_deref().unwrap().contains("invalid group code"));
        // closed ENTITIES, missing EOF; the damaged LINE is left to the builder
        assert_eq!(repairs.len(), 2);
        assert!(!map.eof);
    }

    #[test]
    fn test_damage_belongs_to_preceding_record() {
        let data = "0
SECTION
2
ENTITIES
0
POINT
8
0
1O
1.0
0
LINE
8
0
0
ENDSEC
0
EOF
";
        let (map, repairs) = assemble(data, true);
        let entities = map.unwrap().take("ENTITIES").unwrap();
        assert!(entities.records[0].damage.is_some());
        assert!(entities.records[1].damage.is_none());
        assert_eq!(entities.skipped, 1);
        assert!(!entities.is_unreadable());
        assert!(repairs.is_empty());
    }

    #[test]
    fn test_unreadable_section() {
        let data = "0
SECTION
2
ENTITIES
xx
yy
zz
ww
0
ENDSEC
0
EOF
";
        let (map, repairs) = assemble(data, true);
        let map = map.unwrap();
        let names: Vec<&str> = map.unreadable().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["ENTITIES"]);
        assert_eq!(repairs.len(), 2);
    }

    #[test]
    fn test_out_of_order_sections_accepted() {
        let data = "0\nSECTION\n2\nENTITIES\n0\nENDSEC\n0\nSECTION\n2\nHEADER\n0\nENDSEC\n0\nEOF\n";
        let (map, _) = assemble(data, false);
        let map = map.unwrap();
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["ENTITIES", "HEADER"]);
    }
}
