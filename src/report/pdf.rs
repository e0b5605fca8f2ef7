use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::image_crate::ImageDecoder;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rect, Rgb,
};

use crate::error::TrackerError;

use super::document::{ReportDocument, Section};

/// Serializes an assembled report to a file.
pub trait DocumentWriter {
    fn write_document(&self, document: &ReportDocument, path: &Path) -> Result<(), TrackerError>;
}

/// US-Letter PDF output using the built-in Helvetica fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 20.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const FOOTER_SPACE: f32 = 15.0;

const TITLE_SIZE: f32 = 24.0;
const SUBTITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 10.0;
const SMALL_SIZE: f32 = 8.0;
const ROW_HEIGHT: f32 = 6.5;

/// Millimetres per point.
const PT_TO_MM: f32 = 0.352_778;

/// Approximate Helvetica advance width as a fraction of the font size.
const AVG_CHAR_WIDTH: f32 = 0.5;

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

/// Greedy word wrap for a font size and available width in millimetres.
pub(crate) fn wrap_text(text: &str, font_size: f32, width_mm: f32) -> Vec<String> {
    let char_mm = font_size * AVG_CHAR_WIDTH * PT_TO_MM;
    let max_chars = ((width_mm / char_mm).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn pdf_err<E: std::fmt::Display>(e: E) -> TrackerError {
    TrackerError::Pdf(e.to_string())
}

/// Top-down layout cursor over a growing set of pages.
struct PageCursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Distance from the bottom edge, in millimetres
    y: f32,
    pages: usize,
}

impl PageCursor {
    fn new(title: &str) -> Result<Self, TrackerError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
            pages: 1,
        })
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Layer {}", self.pages + 1));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
        self.pages += 1;
    }

    /// Start a new page unless `height` millimetres still fit on this one.
    fn reserve(&mut self, height: f32) {
        if self.y - height < MARGIN + FOOTER_SPACE {
            self.new_page();
        }
    }

    fn text(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn rule(&self, x0: f32, x1: f32, y: f32) {
        self.layer.set_outline_color(rgb(0.6, 0.6, 0.6));
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x0), Mm(y)), false),
                (Point::new(Mm(x1), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn paragraph(&mut self, text: &str, size: f32) {
        let line_height = size * PT_TO_MM * 1.4;
        for line in wrap_text(text, size, CONTENT_WIDTH) {
            self.reserve(line_height);
            self.y -= line_height;
            self.text(&line, size, MARGIN, false);
        }
        self.y -= line_height * 0.5;
    }

    fn title(&mut self, title: &str, subtitle: &str, generated: &str) {
        self.y -= TITLE_SIZE * PT_TO_MM;
        self.layer.set_fill_color(rgb(0.13, 0.4, 0.25));
        self.text(title, TITLE_SIZE, MARGIN, true);
        self.layer.set_fill_color(rgb(0.0, 0.0, 0.0));
        self.y -= SUBTITLE_SIZE * PT_TO_MM * 1.8;
        self.text(subtitle, SUBTITLE_SIZE, MARGIN, false);
        self.y -= BODY_SIZE * PT_TO_MM * 1.8;
        self.text(generated, BODY_SIZE, MARGIN, false);
        self.y -= 4.0;
        self.rule(MARGIN, PAGE_WIDTH - MARGIN, self.y);
        self.y -= 6.0;
    }

    fn heading(&mut self, text: &str) {
        let height = HEADING_SIZE * PT_TO_MM * 2.0;
        // keep a heading together with at least a few lines of what follows
        self.reserve(height + 3.0 * ROW_HEIGHT);
        self.y -= height;
        self.text(text, HEADING_SIZE, MARGIN, true);
        self.y -= 2.0;
    }

    fn table(&mut self, headers: &[String], rows: &[Vec<String>]) {
        let columns = headers.len().max(1);
        let col_width = CONTENT_WIDTH / columns as f32;
        let max_chars = ((col_width - 2.0) / (BODY_SIZE * AVG_CHAR_WIDTH * PT_TO_MM)) as usize;

        let draw_header = |cursor: &mut PageCursor| {
            cursor.y -= ROW_HEIGHT;
            cursor.layer.set_fill_color(rgb(0.88, 0.93, 0.89));
            cursor.layer.add_rect(Rect::new(
                Mm(MARGIN),
                Mm(cursor.y - 1.8),
                Mm(PAGE_WIDTH - MARGIN),
                Mm(cursor.y + ROW_HEIGHT - 1.8),
            ));
            cursor.layer.set_fill_color(rgb(0.0, 0.0, 0.0));
            for (i, header) in headers.iter().enumerate() {
                let x = MARGIN + 1.0 + i as f32 * col_width;
                cursor.text(&truncate(header, max_chars), BODY_SIZE, x, true);
            }
        };

        self.reserve(2.0 * ROW_HEIGHT);
        draw_header(self);
        for row in rows {
            if self.y - ROW_HEIGHT < MARGIN + FOOTER_SPACE {
                self.new_page();
                draw_header(self);
            }
            self.y -= ROW_HEIGHT;
            for (i, cell) in row.iter().enumerate().take(columns) {
                let x = MARGIN + 1.0 + i as f32 * col_width;
                self.text(&truncate(cell, max_chars), BODY_SIZE, x, false);
            }
            self.rule(MARGIN, PAGE_WIDTH - MARGIN, self.y - 1.8);
        }
        self.y -= ROW_HEIGHT;
    }

    fn image(&mut self, path: &Path, caption: &str) -> Result<(), TrackerError> {
        let file = File::open(path)
            .map_err(|e| TrackerError::Pdf(format!("cannot open chart {}: {e}", path.display())))?;
        let decoder = PngDecoder::new(BufReader::new(file)).map_err(pdf_err)?;
        let (px_width, px_height) = decoder.dimensions();
        let image = Image::try_from(decoder).map_err(pdf_err)?;

        // Scale to the content width, then shrink further if taller than a page
        let max_height = PAGE_HEIGHT - 2.0 * MARGIN - FOOTER_SPACE - 10.0;
        let mut width_mm = CONTENT_WIDTH;
        let mut height_mm = width_mm * px_height as f32 / px_width.max(1) as f32;
        if height_mm > max_height {
            width_mm *= max_height / height_mm;
            height_mm = max_height;
        }
        // printpdf sizes images at one pixel per dot at the given dpi
        let dpi = px_width as f32 * 25.4 / width_mm;

        self.reserve(height_mm + 8.0);
        self.y -= height_mm;
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN + (CONTENT_WIDTH - width_mm) / 2.0)),
                translate_y: Some(Mm(self.y)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        self.y -= SMALL_SIZE * PT_TO_MM * 1.8;
        self.text(caption, SMALL_SIZE, MARGIN, false);
        self.y -= 4.0;
        Ok(())
    }

    fn footer(&mut self, text: &str) {
        self.reserve(FOOTER_SPACE);
        self.y -= 6.0;
        self.rule(MARGIN, PAGE_WIDTH - MARGIN, self.y + 3.0);
        self.text(text, SMALL_SIZE, MARGIN, false);
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars || max_chars < 4 {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars - 3).collect();
    format!("{kept}...")
}

impl DocumentWriter for PdfWriter {
    fn write_document(&self, document: &ReportDocument, path: &Path) -> Result<(), TrackerError> {
        let mut cursor = PageCursor::new(&document.title)?;

        for section in &document.sections {
            match section {
                Section::Title {
                    title,
                    subtitle,
                    generated,
                } => cursor.title(title, subtitle, generated),
                Section::Heading(text) => cursor.heading(text),
                Section::Paragraph(text) => cursor.paragraph(text, BODY_SIZE),
                Section::Table { headers, rows } => cursor.table(headers, rows),
                Section::Image { path, caption } => cursor.image(path, caption)?,
                Section::Footer(text) => cursor.footer(text),
            }
        }

        let pages = cursor.pages;
        let file = File::create(path)?;
        cursor.doc.save(&mut BufWriter::new(file))?;
        tracing::debug!(path = %path.display(), pages, "pdf written");
        Ok(())
    }
}
