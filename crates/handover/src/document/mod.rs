//! Printable handover documents.
//!
//! Rendering happens in two steps: [`compose`] turns a record into a
//! [`Layout`] of positioned text and table cells, and [`render`] paints that
//! layout into PDF bytes. The built-in Helvetica fonts only cover Latin-1;
//! other characters are stored and mailed intact but may print as
//! placeholders.

mod layout;
mod pdf;

use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::record::HandoverRecord;

pub use layout::{
    compose, text_width, wrap, Element, Font, Layout, Page, PAGE_HEIGHT, PAGE_WIDTH,
};

/// MIME type of rendered documents.
pub const CONTENT_TYPE: &str = "application/pdf";

/// A rendered PDF together with its download name.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// Suggested file name, e.g. `handover_7.pdf`.
    pub filename: String,
    /// The PDF file contents.
    pub bytes: Vec<u8>,
}

impl RenderedDocument {
    /// Write the document to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Download name for the document of record `id`.
#[must_use]
pub fn filename(id: i64) -> String {
    format!("handover_{id}.pdf")
}

/// Render the handover form for one record.
///
/// # Errors
///
/// Returns [`Error::Render`] if the PDF cannot be produced.
pub fn render(record: &HandoverRecord) -> Result<RenderedDocument> {
    let layout = compose(record);
    let bytes = pdf::paint(&layout)?;

    if !bytes.starts_with(b"%PDF") {
        return Err(Error::render("PDF writer produced no PDF header"));
    }

    debug!(
        id = record.id,
        pages = layout.pages.len(),
        size = bytes.len(),
        "Rendered handover document"
    );

    Ok(RenderedDocument {
        filename: filename(record.id),
        bytes,
    })
}
