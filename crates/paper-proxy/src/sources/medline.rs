//! MEDLINE plain-text record parsing (efetch `rettype=medline`).
//!
//! Records are separated by blank lines. Each field line carries a tag
//! left-aligned in a four-character column followed by `"- "`; lines
//! indented by six spaces continue the previous field.

use crate::models::PaperSummary;
use crate::text::normalize;

/// Summary field a MEDLINE tag feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MedlineField {
    Id,
    Title,
    Author,
    Published,
    Summary,
}

/// Tags read from each record. `AU` repeats; the rest keep their last value.
pub const MEDLINE_TAGS: &[(&str, MedlineField)] = &[
    ("PMID", MedlineField::Id),
    ("TI", MedlineField::Title),
    ("AU", MedlineField::Author),
    ("DP", MedlineField::Published),
    ("AB", MedlineField::Summary),
];

const CONTINUATION: &str = "      ";

/// Split `(tag, value)` out of a field line such as `"TI  - A title"`.
fn split_field(line: &str) -> Option<(&str, &str)> {
    let tag = line.get(..4)?;
    let rest = line.get(4..)?;
    let value = rest.strip_prefix("- ").or_else(|| rest.strip_prefix('-'))?;
    Some((tag.trim_end(), value))
}

fn field_for(tag: &str) -> Option<MedlineField> {
    MEDLINE_TAGS.iter().find(|(t, _)| *t == tag).map(|(_, f)| *f)
}

#[derive(Default)]
struct RecordBuilder {
    id: String,
    title: String,
    authors: Vec<String>,
    published: String,
    summary: String,
    // Field the previous line wrote, for continuation lines.
    last: Option<MedlineField>,
}

impl RecordBuilder {
    fn slot(&mut self, field: MedlineField) -> &mut String {
        match field {
            MedlineField::Id => &mut self.id,
            MedlineField::Title => &mut self.title,
            MedlineField::Published => &mut self.published,
            MedlineField::Summary => &mut self.summary,
            MedlineField::Author => {
                if self.authors.is_empty() {
                    self.authors.push(String::new());
                }
                let last = self.authors.len() - 1;
                &mut self.authors[last]
            }
        }
    }

    fn line(&mut self, line: &str) {
        if let Some(more) = line.strip_prefix(CONTINUATION) {
            if let Some(field) = self.last {
                let slot = self.slot(field);
                slot.push(' ');
                slot.push_str(more);
            }
            return;
        }

        self.last = None;
        let Some((tag, value)) = split_field(line) else {
            return;
        };
        let Some(field) = field_for(tag) else {
            return;
        };

        if field == MedlineField::Author {
            self.authors.push(value.to_string());
        } else {
            *self.slot(field) = value.to_string();
        }
        self.last = Some(field);
    }

    fn finish(self) -> Option<PaperSummary> {
        let id = normalize(&self.id);
        let title = normalize(&self.title);
        if id.is_empty() && title.is_empty() {
            return None;
        }
        Some(PaperSummary {
            id,
            title,
            authors: self.authors.iter().map(|a| normalize(a)).filter(|a| !a.is_empty()).collect(),
            published: normalize(&self.published),
            summary: normalize(&self.summary),
        })
    }
}

/// Parse every record in a MEDLINE text payload.
///
/// Records with neither a PMID nor a title are dropped.
#[must_use]
pub fn parse_medline(text: &str) -> Vec<PaperSummary> {
    let mut records = Vec::new();
    let mut current: Option<RecordBuilder> = None;

    for line in text.lines() {
        if line.trim().is_empty() {
            records.extend(current.take().and_then(RecordBuilder::finish));
            continue;
        }
        current.get_or_insert_with(RecordBuilder::default).line(line);
    }
    records.extend(current.and_then(RecordBuilder::finish));

    records
}
