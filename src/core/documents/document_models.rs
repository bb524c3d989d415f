// Domain model for a rich-text document.
// These types know nothing about the Google Docs JSON shape - the infra layer
// maps API responses into them so the flattener can match exhaustively.

use std::fmt;

/// Opaque identifier naming one external document.
///
/// IDs are case-sensitive, so we never normalise them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fetched document: its title plus the ordered top-level blocks of the body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RichDocument {
    pub title: String,
    pub blocks: Vec<Block>,
}

/// A top-level structural unit of a document.
///
/// Anything the document service returns that is neither a paragraph nor a
/// table (section breaks, tables of contents) is dropped during mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// A paragraph is just its text runs, in order.
/// Runs carry their own whitespace, including the trailing newline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<String>,
}

impl Paragraph {
    pub fn new<S: Into<String>>(runs: impl IntoIterator<Item = S>) -> Self {
        Self {
            runs: runs.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
}
