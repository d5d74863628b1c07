//! Document Processor (component A): PDF -> cleaned, relevance-filtered
//! sentences with page attribution.

mod cleaning;
mod pdf;
mod relevance;
mod segmentation;

pub use cleaning::CleaningStats;
pub use pdf::{PageTextSource, PdfOxideSource};

use crate::error::Result;
use std::path::Path;

/// A sentence that passed the relevance filter, with the page it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RelevantSentence {
    pub text: String,
    pub page: u32,
}

/// Output of a full document pass: relevant sentences plus the counts that
/// feed `ExtractionStats`/`IngestReport`.
#[derive(Debug, Clone, Default)]
pub struct ProcessedDocument {
    pub sentences: Vec<RelevantSentence>,
    pub sentences_total: u64,
    pub sentences_astrological: u64,
    pub cleaning_stats: CleaningStats,
}

pub struct DocumentProcessor;

impl DocumentProcessor {
    /// Process a PDF at `path` into relevance-filtered sentences with page numbers.
    pub fn process_path(path: &Path) -> Result<ProcessedDocument> {
        let mut source = PdfOxideSource::open(path)?;
        Self::process_source(&mut source)
    }

    /// Process any [`PageTextSource`] (used directly in tests with a fixed
    /// set of pages, bypassing the PDF backend).
    pub fn process_source(source: &mut dyn PageTextSource) -> Result<ProcessedDocument> {
        let raw_pages = source.pages()?;
        let (header_footer_stripped, removed) = cleaning::strip_headers_and_footers(&raw_pages);

        let mut stats = CleaningStats {
            header_footer_lines_removed: removed,
            ..Default::default()
        };

        let mut output = ProcessedDocument::default();

        for (page_index, page_text) in header_footer_stripped.iter().enumerate() {
            let cleaned = cleaning::clean_page(page_text, &mut stats);
            let page_number = (page_index + 1) as u32;

            for sentence in segmentation::segment_sentences(&cleaned) {
                output.sentences_total += 1;
                if relevance::is_astrological(&sentence) {
                    output.sentences_astrological += 1;
                    output.sentences.push(RelevantSentence {
                        text: sentence,
                        page: page_number,
                    });
                }
            }
        }

        output.cleaning_stats = stats;
        Ok(output)
    }
}
