//! services/api/src/adapters/pdf.rs
//!
//! Renders a `ScheduleDocument` as an A4 PDF using `printpdf` built-in fonts.
//! The text of each block is written verbatim so the download matches the
//! on-screen view.

use std::io::BufWriter;

use pill_schedule_core::ports::{DocumentRenderer, PortError, PortResult};
use pill_schedule_core::report::{Block, ScheduleDocument};
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const LEFT_MARGIN: Mm = Mm(20.0);
const INDENT: Mm = Mm(25.0);
const TOP: Mm = Mm(277.0);
const BOTTOM: Mm = Mm(20.0);

/// The `DocumentRenderer` used for `/schedule/pdf`.
#[derive(Clone, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn pdf_error(context: &str, e: impl std::fmt::Display) -> PortError {
    PortError::Unexpected(format!("PDF {context} error: {e}"))
}

/// Tracks the write position and opens a fresh page when the current one is full.
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: Mm,
}

impl Cursor<'_> {
    fn write(&mut self, text: &str, size: f32, x: Mm, font: &IndirectFontRef, advance: Mm) {
        if self.y.0 < BOTTOM.0 {
            let (page, layer) = self.doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP;
        }
        self.layer.use_text(text, size, x, self.y, font);
        self.y -= advance;
    }

    fn skip(&mut self, gap: Mm) {
        self.y -= gap;
    }
}

impl DocumentRenderer for PdfRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn render(&self, document: &ScheduleDocument) -> PortResult<Vec<u8>> {
        let (doc, page1, layer1) =
            PdfDocument::new(document.title(), PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| pdf_error("font", e))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| pdf_error("font", e))?;

        let mut cursor = Cursor {
            doc: &doc,
            layer: doc.get_page(page1).get_layer(layer1),
            y: TOP,
        };

        for (i, block) in document.blocks().iter().enumerate() {
            match block {
                Block::Title(text) => {
                    cursor.write(text, 16.0, LEFT_MARGIN, &bold, Mm(14.0));
                }
                Block::SectionHeading(text) => {
                    if i > 1 {
                        cursor.skip(Mm(6.0));
                    }
                    cursor.write(text, 13.0, LEFT_MARGIN, &bold, Mm(8.0));
                }
                Block::Line(text) | Block::Placeholder(text) => {
                    cursor.write(text, 11.0, INDENT, &font, Mm(6.0));
                }
            }
        }

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf).map_err(|e| pdf_error("save", e))?;
        buf.into_inner().map_err(|e| pdf_error("buffer", e))
    }
}
