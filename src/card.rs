//! Contact records and their vCard text serialization
//!
//! A [`ContactRecord`] is the structured form of the submitted contact
//! details. [`ContactRecord::to_vcard`] renders it as vCard 3.0 text, the
//! payload later encoded into the QR symbol.

use std::fmt::Write;

/// Role attached to a telephone entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneKind {
    /// Personal mobile number
    Mobile,
    /// Office desk number
    Office,
}

impl PhoneKind {
    /// The `TYPE=` parameter value carried on the TEL line
    fn type_param(self) -> &'static str {
        match self {
            PhoneKind::Mobile => "CELL,VOICE",
            PhoneKind::Office => "WORK,VOICE",
        }
    }
}

/// Role attached to an email entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    /// Work address
    Work,
}

impl EmailKind {
    fn type_param(self) -> &'static str {
        match self {
            EmailKind::Work => "WORK",
        }
    }
}

/// Structured contact details collected from the form
///
/// Every field is optional; a record with nothing set is valid and serializes
/// to a minimal card. List fields preserve capture order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactRecord {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    /// Display name distinct from the given/family parts
    pub formatted_name: Option<String>,
    pub phones: Vec<(String, PhoneKind)>,
    pub emails: Vec<(String, EmailKind)>,
    pub organization: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
}

impl ContactRecord {
    /// vCard format version emitted by [`Self::to_vcard`]
    pub const FORMAT_VERSION: &'static str = "3.0";

    /// Name shown on the FN line: the explicit formatted name when present,
    /// otherwise the given/family parts joined by a space.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.formatted_name {
            return name.clone();
        }
        let mut parts = Vec::new();
        if let Some(given) = self.given_name.as_deref() {
            parts.push(given);
        }
        if let Some(family) = self.family_name.as_deref() {
            parts.push(family);
        }
        parts.join(" ")
    }

    /// Serialize the record as vCard 3.0 text
    ///
    /// The output always carries the begin/end markers, the version line, and
    /// exactly one composite `N` line; empty name components render as empty
    /// positions, never get omitted. List entries keep capture order,
    /// single-valued fields appear in one fixed order. Serialization cannot
    /// fail: it only appends to an in-memory string.
    pub fn to_vcard(&self) -> String {
        let mut out = String::new();
        out.push_str("BEGIN:VCARD\r\n");
        let _ = write!(out, "VERSION:{}\r\n", Self::FORMAT_VERSION);
        let _ = write!(
            out,
            "N:{};{};;;\r\n",
            escape_text(self.family_name.as_deref().unwrap_or("")),
            escape_text(self.given_name.as_deref().unwrap_or("")),
        );
        let _ = write!(out, "FN:{}\r\n", escape_text(&self.display_name()));
        if let Some(org) = &self.organization {
            let _ = write!(out, "ORG:{}\r\n", escape_text(org));
        }
        if let Some(title) = &self.title {
            let _ = write!(out, "TITLE:{}\r\n", escape_text(title));
        }
        for (number, kind) in &self.phones {
            let _ = write!(out, "TEL;TYPE={}:{}\r\n", kind.type_param(), escape_text(number));
        }
        for (address, kind) in &self.emails {
            let _ = write!(out, "EMAIL;TYPE={}:{}\r\n", kind.type_param(), escape_text(address));
        }
        if let Some(url) = &self.url {
            let _ = write!(out, "URL:{}\r\n", escape_text(url));
        }
        out.push_str("END:VCARD\r\n");
        out
    }
}

/// Escape a property value per the vCard text grammar
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            _ => out.push(c),
        }
    }
    out
}
