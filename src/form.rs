//! Form field mapping
//!
//! Turns the ordered field/value pairs decoded from the multipart body into a
//! [`ContactRecord`] plus the presentation options captured in the same pass.
//! Mapping is driven by an explicit field table; the record's shape is never
//! inspected dynamically.

use std::collections::HashSet;

use crate::card::{ContactRecord, EmailKind, PhoneKind};

/// Styling fields captured alongside the contact fields
///
/// These only affect how the QR symbol is drawn and never enter the
/// serialized card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleFields {
    /// Raw `color` value, passed through uninterpreted
    pub color: Option<String>,
    /// Raw `shape` value; anything unrecognized later falls back to squares
    pub shape: Option<String>,
}

/// Working state threaded through the field table while a submission is mapped
///
/// The name parts stay separate from the record until [`Capture::finish`]:
/// the composite name entry needs both parts at once, regardless of the order
/// they were submitted in.
#[derive(Debug, Default)]
struct Capture {
    first_name: Option<String>,
    last_name: Option<String>,
    record: ContactRecord,
    style: StyleFields,
}

impl Capture {
    fn finish(self) -> (ContactRecord, StyleFields) {
        let mut record = self.record;
        record.given_name = self.first_name;
        record.family_name = self.last_name;
        (record, self.style)
    }
}

type Setter = fn(&mut Capture, String);

/// Recognized field names and where each value lands. Names not listed here
/// are ignored, so added form fields never break older servers.
const FIELD_TABLE: &[(&str, Setter)] = &[
    ("first_name", |c, v| c.first_name = Some(v)),
    ("last_name", |c, v| c.last_name = Some(v)),
    ("formatted_name", |c, v| c.record.formatted_name = Some(v)),
    ("mobile", |c, v| c.record.phones.push((v, PhoneKind::Mobile))),
    ("office", |c, v| c.record.phones.push((v, PhoneKind::Office))),
    ("email", |c, v| c.record.emails.push((v, EmailKind::Work))),
    ("org", |c, v| c.record.organization = Some(v)),
    ("designation", |c, v| c.record.title = Some(v)),
    ("url", |c, v| c.record.url = Some(v)),
    ("color", |c, v| c.style.color = Some(v)),
    ("shape", |c, v| c.style.shape = Some(v)),
];

/// Map submitted field/value pairs into a record and style options
///
/// Pure transformation: no I/O, nothing fails. Empty values are dropped, a
/// repeated name keeps only its first non-empty value, and unknown names are
/// ignored.
pub fn map_fields(pairs: impl IntoIterator<Item = (String, String)>) -> (ContactRecord, StyleFields) {
    let mut capture = Capture::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (name, value) in pairs {
        if value.is_empty() {
            continue;
        }
        let Some((_, setter)) = FIELD_TABLE.iter().find(|(n, _)| *n == name) else {
            continue;
        };
        if !seen.insert(name) {
            continue;
        }
        setter(&mut capture, value);
    }

    capture.finish()
}
