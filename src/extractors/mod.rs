// src/extractors/mod.rs
pub mod cbe;
pub mod telebirr;

/// Collapses line breaks and runs of whitespace into single spaces.
///
/// Receipt text comes out of the decoders with the document's line
/// structure intact; the anchor patterns rely on the fields sitting on one
/// flat line.
pub(crate) fn flatten_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
