use crate::model::SectionKind;
use crate::parsing::lines::LogicalLine;
use crate::template::CompiledTemplate;

/// A run of logical lines under one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    /// The line that opened the section. Not data; `None` for the
    /// unsectioned bucket.
    pub header: Option<LogicalLine>,
    pub lines: Vec<LogicalLine>,
}

impl Section {
    fn open(kind: SectionKind, header: Option<LogicalLine>) -> Self {
        Section {
            kind,
            header,
            lines: Vec::new(),
        }
    }

    /// Page the section starts on.
    pub fn page_number(&self) -> Option<usize> {
        self.header
            .as_ref()
            .or_else(|| self.lines.first())
            .map(|l| l.page_number)
    }

    /// Lines this section accounts for, header included.
    pub fn covered_lines(&self) -> usize {
        self.lines.len() + usize::from(self.header.is_some())
    }

    /// A copy holding only the lines that pass `keep`.
    pub fn retain_lines(&self, keep: impl Fn(&LogicalLine) -> bool) -> Section {
        Section {
            kind: self.kind,
            header: self.header.clone(),
            lines: self.lines.iter().filter(|l| keep(l)).cloned().collect(),
        }
    }
}

/// Partition logical lines into sections.
///
/// Lines before the first header land in an `Unsectioned` section, emitted
/// only when non-empty. Every other header opens a section even if nothing
/// follows it, and the same kind may open more than once. Every input line
/// ends up in exactly one section, as data or as its header.
pub fn segment(lines: Vec<LogicalLine>, template: &CompiledTemplate) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = Section::open(SectionKind::Unsectioned, None);

    for line in lines {
        match template.match_header(&line.text) {
            Some(kind) => {
                let finished = std::mem::replace(&mut current, Section::open(kind, Some(line)));
                if finished.header.is_some() || !finished.lines.is_empty() {
                    sections.push(finished);
                }
            }
            None => current.lines.push(line),
        }
    }

    if current.header.is_some() || !current.lines.is_empty() {
        sections.push(current);
    }

    sections
}
