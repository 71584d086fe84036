//! Candidate feedback report rendered as a PDF.
//!
//! Single base-14 font (Helvetica, WinAnsiEncoding), so nothing is embedded
//! and text stays extractable. Lines that do not fit continue on a new page.

pub mod metrics;

use std::collections::BTreeMap;

use bytes::Bytes;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;
use tracing::info;

use crate::report::metrics::{sanitize, wrap_text};

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 56;
const FONT_SIZE: i64 = 12;
const LEADING: i64 = 16;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("PDF encoding failed: {0}")]
    Encode(#[from] lopdf::Error),

    #[error("PDF write failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct FeedbackReport {
    pub candidate_name: String,
    pub summary: String,
    pub scores: BTreeMap<String, f64>,
}

impl FeedbackReport {
    /// Every line of the report, wrapped to the text width. Empty strings are
    /// blank separator lines.
    fn lines(&self) -> Vec<String> {
        let font_size = FONT_SIZE as f32;
        let text_width = (PAGE_WIDTH - 2 * MARGIN) as f32;

        let mut lines = wrap_text(
            &sanitize(&format!(
                "Candidate Feedback Report: {}",
                self.candidate_name
            )),
            font_size,
            text_width,
        );
        lines.push(String::new());
        lines.extend(wrap_text(
            &sanitize(&format!("Summary: {}", self.summary)),
            font_size,
            text_width,
        ));
        lines.push(String::new());
        for (name, score) in &self.scores {
            lines.extend(wrap_text(
                &sanitize(&format!("{name}: {score}")),
                font_size,
                text_width,
            ));
        }
        lines
    }
}

fn lines_per_page() -> usize {
    ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize
}

fn page_content(lines: &[String]) -> Content {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new(
            "Td",
            vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN - FONT_SIZE).into()],
        ),
    ];
    for line in lines {
        if !line.is_empty() {
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(line.as_str())],
            ));
        }
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Renders the report and returns the encoded PDF file.
pub fn render_feedback_report(report: &FeedbackReport) -> Result<Bytes, ReportError> {
    let lines = report.lines();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut page_ids: Vec<ObjectId> = Vec::new();
    for chunk in lines.chunks(lines_per_page()) {
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            page_content(chunk).encode()?,
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    let page_count = page_ids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.into_iter().map(Object::from).collect::<Vec<_>>(),
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![0_i64.into(), 0_i64.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;

    info!(
        "Rendered feedback report: {} pages, {} bytes",
        page_count,
        buffer.len()
    );
    Ok(Bytes::from(buffer))
}
