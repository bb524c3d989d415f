// Turns a RichDocument into the plain text we write into the sheet.
//
// **Layout rules:**
// - Runs inside a paragraph are concatenated as-is (they carry their own newlines)
// - Two paragraphs in a row get a single '\n' between them
// - Tables are rendered in place: cells joined by '\t', one line per row
// - A table never gets a paragraph separator; it only starts on a fresh line
// - Three or more newlines collapse to two, then the whole thing is trimmed

use once_cell::sync::Lazy;
use regex::Regex;

use super::document_models::{Block, Paragraph, RichDocument, Table, TableCell};

static RE_EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Which kind of block we emitted last. Only paragraph-after-paragraph
/// needs an explicit separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastBlock {
    Nothing,
    Paragraph,
    Table,
}

/// Flattens a document into normalised plain text.
pub fn flatten(document: &RichDocument) -> String {
    let mut output = String::new();
    let mut last = LastBlock::Nothing;

    for block in &document.blocks {
        match block {
            Block::Paragraph(paragraph) => {
                if last == LastBlock::Paragraph {
                    output.push('\n');
                }
                push_paragraph(paragraph, &mut output);
                last = LastBlock::Paragraph;
            }
            Block::Table(table) => {
                if !output.is_empty() && !output.ends_with('\n') {
                    output.push('\n');
                }
                push_table(table, &mut output);
                last = LastBlock::Table;
            }
        }
    }

    normalize(&output)
}

fn push_paragraph(paragraph: &Paragraph, output: &mut String) {
    for run in &paragraph.runs {
        output.push_str(run);
    }
}

fn push_table(table: &Table, output: &mut String) {
    for row in &table.rows {
        if row.cells.is_empty() {
            continue;
        }

        let cells: Vec<String> = row.cells.iter().map(cell_text).collect();
        output.push_str(&cells.join("\t"));
        output.push('\n');
    }
}

/// All run texts of every paragraph in the cell, space-joined and trimmed.
fn cell_text(cell: &TableCell) -> String {
    let runs: Vec<&str> = cell
        .paragraphs
        .iter()
        .flat_map(|p| p.runs.iter().map(String::as_str))
        .collect();
    runs.join(" ").trim().to_string()
}

fn normalize(text: &str) -> String {
    RE_EXCESS_NEWLINES
        .replace_all(text, "\n\n")
        .trim()
        .to_string()
}
