//! PDF to markdown
//!
//! Extracts the text layer of every page with lopdf. Each page becomes a
//! `## Page N` section and every image on the page is marked with an
//! `<!-- image -->` placeholder so the model knows a figure was there.

use crate::types::{AppError, AppResult};
use lopdf::Document;
use tracing::{debug, warn};

const IMAGE_PLACEHOLDER: &str = "<!-- image -->";

pub fn to_markdown(content: &[u8]) -> AppResult<String> {
    let document = Document::load_mem(content)
        .map_err(|e| AppError::Conversion(format!("failed to parse PDF: {}", e)))?;

    let pages = document.get_pages();
    debug!("PDF has {} pages", pages.len());

    let mut sections = Vec::with_capacity(pages.len());
    for (page_number, page_id) in pages {
        // A page with an unreadable font still gets its heading and image markers.
        let text = match document.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to extract text from page {}: {}", page_number, e);
                String::new()
            }
        };
        // Pages whose image dictionaries cannot be read still contribute their text.
        let images = document
            .get_page_images(page_id)
            .map(|images| images.len())
            .unwrap_or(0);

        sections.push(render_page(page_number, &text, images));
    }

    Ok(sections.join("\n\n"))
}

fn render_page(page_number: u32, text: &str, images: usize) -> String {
    let mut section = format!("## Page {}", page_number);

    let cleaned = clean_text(text);
    if !cleaned.is_empty() {
        section.push_str("\n\n");
        section.push_str(&cleaned);
    }
    for _ in 0..images {
        section.push_str("\n\n");
        section.push_str(IMAGE_PLACEHOLDER);
    }

    section
}

/// Trim lines and collapse runs of blank lines into one paragraph break.
fn clean_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .fold(Vec::new(), |mut acc: Vec<&str>, line| {
            if !line.is_empty() || acc.last().is_some_and(|prev| !prev.is_empty()) {
                acc.push(line);
            }
            acc
        })
        .join("\n")
        .trim()
        .to_string()
}
