//! PDF text extraction, isolated behind a narrow trait so the backend crate
//! can be swapped without touching cleaning or segmentation.

use crate::error::{Error, Result};
use std::path::Path;

/// A source of page-indexed raw text. Index 0 is the first page.
pub trait PageTextSource {
    /// Raw text for every page that could be extracted, in document order.
    /// A page with no extractable text layer yields an empty string rather
    /// than terminating extraction.
    fn pages(&mut self) -> Result<Vec<String>>;
}

/// [`PageTextSource`] backed by `pdf_oxide`.
pub struct PdfOxideSource {
    doc: pdf_oxide::document::PdfDocument,
}

impl PdfOxideSource {
    pub fn open(path: &Path) -> Result<Self> {
        let doc = pdf_oxide::document::PdfDocument::open(path)
            .map_err(|e| Error::IngestError(format!("{}: {e}", path.display())))?;
        Ok(Self { doc })
    }
}

impl PageTextSource for PdfOxideSource {
    fn pages(&mut self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        let mut index = 0usize;
        loop {
            match self.doc.extract_spans(index) {
                Ok(spans) => {
                    let text = spans
                        .into_iter()
                        .map(|span| span.text)
                        .collect::<Vec<_>>()
                        .join(" ");
                    out.push(text);
                    index += 1;
                }
                Err(_) => break,
            }
        }
        if out.is_empty() {
            return Err(Error::IngestError(
                "no pages could be extracted from document".to_string(),
            ));
        }
        Ok(out)
    }
}

#[cfg(test)]
pub(crate) struct FixedPageSource(pub Vec<String>);

#[cfg(test)]
impl PageTextSource for FixedPageSource {
    fn pages(&mut self) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}
