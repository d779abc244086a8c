pub mod entries;
pub mod table;

use entries::GridEntry;

/// Two-pass pipeline: document text → table rows → grid entries.
pub fn decode_document(text: &str) -> Vec<GridEntry> {
    let rows = table::read_rows(text);
    entries::extract_entries(&rows)
}
