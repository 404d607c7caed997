//! Rendering of an application into the HTML-formatted chat message.
//!
//! Templates only ever see `MessageFields`, whose text values are already
//! escaped, so no template can interpolate raw user input into the markup.

use std::str::FromStr;

use thiserror::Error;

use crate::application::models::ApplicationRecord;

/// Placeholder for optional fields the applicant left empty.
const NOT_PROVIDED: &str = "-";
/// Separator of the `spaced` layout: a line holding a single space, since
/// Telegram collapses truly empty lines.
const SPACED_SEPARATOR: &str = "\n \n";

/// Escapes the characters that carry meaning in Telegram's HTML parse mode.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Escaped view of an `ApplicationRecord`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFields {
    pub full_name: String,
    pub phone: String,
    pub age: u8,
    pub experience_years: u8,
    pub address: String,
    pub camera: String,
    pub laptop: String,
    pub skills: String,
    pub advantages: String,
}

impl MessageFields {
    pub fn from_record(record: &ApplicationRecord) -> Self {
        Self {
            full_name: escape_html(&record.full_name),
            phone: escape_html(&record.phone),
            age: record.age,
            experience_years: record.experience_years,
            address: escape_html(&record.address),
            camera: escape_or_placeholder(&record.camera),
            laptop: escape_or_placeholder(&record.laptop),
            skills: escape_html(&record.skills),
            advantages: escape_html(&record.advantages),
        }
    }
}

fn escape_or_placeholder(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        escape_html(value)
    }
}

/// Produces the ordered message lines from escaped fields.
pub type LineTemplate = fn(&MessageFields) -> Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLayout {
    /// One line per entry.
    Compact,
    /// A spacer line between entries.
    Spaced,
}

#[derive(Debug, Error)]
#[error("unknown message layout '{0}' (expected 'compact' or 'spaced')")]
pub struct UnknownLayout(String);

impl FromStr for MessageLayout {
    type Err = UnknownLayout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(MessageLayout::Compact),
            "spaced" => Ok(MessageLayout::Spaced),
            _ => Err(UnknownLayout(s.to_string())),
        }
    }
}

/// A line template plus the layout used to join its lines.
#[derive(Clone, Copy)]
pub struct MessageTemplate {
    lines: LineTemplate,
    layout: MessageLayout,
}

impl std::fmt::Debug for MessageTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageTemplate")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl MessageTemplate {
    pub fn new(lines: LineTemplate, layout: MessageLayout) -> Self {
        Self { lines, layout }
    }

    /// The standard application template in the given layout.
    pub fn standard(layout: MessageLayout) -> Self {
        Self::new(application_lines, layout)
    }

    pub fn render(&self, record: &ApplicationRecord) -> String {
        let lines = (self.lines)(&MessageFields::from_record(record));
        match self.layout {
            MessageLayout::Compact => lines.join("\n"),
            MessageLayout::Spaced => lines.join(SPACED_SEPARATOR),
        }
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self::standard(MessageLayout::Compact)
    }
}

/// Title, then name, phone, age, experience, address, equipment, skills and
/// advantages, in that order.
pub fn application_lines(f: &MessageFields) -> Vec<String> {
    vec![
        "<b>Yangi reklama kadr arizasi</b>".to_string(),
        format!("👤 <b>Ism Familiya:</b> {}", f.full_name),
        format!("📞 <b>Telefon:</b> {}", f.phone),
        format!("🎂 <b>Yosh:</b> {}", f.age),
        format!("💼 <b>Ish staji:</b> {} yil", f.experience_years),
        format!("📍 <b>Manzil:</b> {}", f.address),
        format!("📷 <b>Kamera:</b> {}", f.camera),
        format!("💻 <b>Montaj noutbuk:</b> {}", f.laptop),
        format!("🛠️ <b>Biladigan dasturlar:</b>\n{}", f.skills),
        format!("🌟 <b>Afzalliklar:</b>\n{}", f.advantages),
    ]
}
