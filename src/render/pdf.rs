//! PDF layout of a cleaned report
//!
//! A4 portrait, builtin Helvetica/Courier fonts. Text is laid out line by line
//! from the top margin; a block that does not fit starts a new page. Widths
//! are estimated from average glyph widths, which is enough for word wrap with
//! a safety margin on the right.

use chrono::{DateTime, Local};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};

use crate::error::{InterviewError, Result};

use super::markdown::{Block, Span};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 18.0;
const MARGIN_RIGHT: f32 = 18.0;
const MARGIN_TOP: f32 = 22.0;
/// Lowest baseline for body text; the footer lives below it
const BODY_BOTTOM: f32 = 24.0;
const FOOTER_RULE_Y: f32 = 17.0;
const FOOTER_TEXT_Y: f32 = 11.0;

const PT_TO_MM: f32 = 0.3528;
const LEADING: f32 = 1.4;

const TITLE_SIZE: f32 = 24.0;
const SUBTITLE_SIZE: f32 = 15.0;
const SECTION_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 15.0;
const SUBHEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 12.0;
const FOOTER_SIZE: f32 = 9.0;

const LIST_INDENT: f32 = 7.0;
const BLANK_GAP: f32 = 2.5;

pub(super) const REPORT_TITLE: &str = "PSYCHIATRIC REPORT";
const REPORT_SUBTITLE: &str = "Clinical summary generated by PsyChat";
const SECTION_TITLE: &str = "Final assessment";
const CONFIDENTIAL: &str = "Confidential document";

fn accent() -> Color {
    Color::Rgb(Rgb::new(0.169, 0.424, 0.690, None))
}

fn dark_text() -> Color {
    Color::Rgb(Rgb::new(0.067, 0.094, 0.153, None))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Regular,
    Bold,
    Italic,
    Mono,
}

impl Style {
    /// Average glyph width as a fraction of the font size
    const fn width_factor(self) -> f32 {
        match self {
            Self::Regular | Self::Italic => 0.5,
            Self::Bold => 0.55,
            Self::Mono => 0.6,
        }
    }
}

fn text_width(text: &str, style: Style, size: f32) -> f32 {
    text.chars().count() as f32 * size * style.width_factor() * PT_TO_MM
}

fn line_height(size: f32) -> f32 {
    size * LEADING * PT_TO_MM
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    mono: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        let font = |f| doc.add_builtin_font(f).map_err(pdf_error);
        Ok(Self {
            regular: font(BuiltinFont::Helvetica)?,
            bold: font(BuiltinFont::HelveticaBold)?,
            italic: font(BuiltinFont::HelveticaOblique)?,
            mono: font(BuiltinFont::Courier)?,
        })
    }

    fn get(&self, style: Style) -> &IndirectFontRef {
        match style {
            Style::Regular => &self.regular,
            Style::Bold => &self.bold,
            Style::Italic => &self.italic,
            Style::Mono => &self.mono,
        }
    }
}

fn pdf_error(e: printpdf::Error) -> InterviewError {
    InterviewError::rendering(e.to_string())
}

/// Words of a styled line, each tagged with its style
fn words(spans: &[Span], base: Style) -> Vec<(Style, String)> {
    spans
        .iter()
        .flat_map(|span| {
            let style = match span {
                Span::Plain(_) => base,
                Span::Bold(_) => Style::Bold,
                Span::Italic(_) => Style::Italic,
                Span::Code(_) => Style::Mono,
            };
            span.text()
                .split_whitespace()
                .map(move |w| (style, w.to_string()))
        })
        .collect()
}

/// Greedy word wrap into lines of same-style runs
fn wrap(words: Vec<(Style, String)>, size: f32, width: f32) -> Vec<Vec<(Style, String)>> {
    let space = size * Style::Regular.width_factor() * PT_TO_MM;
    let mut lines: Vec<Vec<(Style, String)>> = Vec::new();
    let mut current: Vec<(Style, String)> = Vec::new();
    let mut used = 0.0_f32;

    for (style, word) in words {
        let w = text_width(&word, style, size);
        let needed = if current.is_empty() { w } else { used + space + w };

        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            used = 0.0;
        }

        match current.last_mut() {
            Some((last_style, run)) if *last_style == style => {
                run.push(' ');
                run.push_str(&word);
                used += space + w;
            }
            Some(_) => {
                // Separator belongs to the previous run
                if let Some((_, run)) = current.last_mut() {
                    run.push(' ');
                }
                current.push((style, word));
                used += space + w;
            }
            None => {
                current.push((style, word));
                used = w;
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

struct PageWriter {
    doc: PdfDocumentReference,
    fonts: Fonts,
    layer: PdfLayerReference,
    y: f32,
    page_number: u32,
    footer: String,
}

impl PageWriter {
    fn new(generated_at: DateTime<Local>) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(
            "Psychiatric report",
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Layer 1",
        );
        let fonts = Fonts::load(&doc)?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            fonts,
            layer,
            y: PAGE_HEIGHT - MARGIN_TOP,
            page_number: 1,
            footer: format!(
                "Generated on {} - {CONFIDENTIAL}",
                generated_at.format("%d/%m/%Y at %H:%M")
            ),
        })
    }

    fn content_width() -> f32 {
        PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn draw_footer(&self) {
        self.rule(FOOTER_RULE_Y, 0.5);
        self.layer.set_fill_color(dark_text());
        self.layer.use_text(
            self.footer.as_str(),
            FOOTER_SIZE,
            Mm(MARGIN_LEFT),
            Mm(FOOTER_TEXT_Y),
            &self.fonts.regular,
        );
        let label = format!("Page {}", self.page_number);
        let x = PAGE_WIDTH - MARGIN_RIGHT - text_width(&label, Style::Regular, FOOTER_SIZE);
        self.layer.use_text(
            label,
            FOOTER_SIZE,
            Mm(x),
            Mm(FOOTER_TEXT_Y),
            &self.fonts.regular,
        );
    }

    fn new_page(&mut self) {
        self.draw_footer();
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Page {}", self.page_number + 1),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page_number += 1;
        self.y = PAGE_HEIGHT - MARGIN_TOP;
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < BODY_BOTTOM {
            self.new_page();
        }
    }

    fn rule(&self, y: f32, thickness: f32) {
        self.layer.set_outline_color(accent());
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN_LEFT), Mm(y)), false),
                (Point::new(Mm(PAGE_WIDTH - MARGIN_RIGHT), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn single_line(&mut self, text: &str, style: Style, size: f32, color: Color) {
        let height = line_height(size);
        self.ensure_space(height);
        self.y -= height;
        self.layer.set_fill_color(color);
        self.layer
            .use_text(text, size, Mm(MARGIN_LEFT), Mm(self.y), self.fonts.get(style));
    }

    /// Wrapped text, optionally with a list marker hanging in the indent
    fn text_block(
        &mut self,
        spans: &[Span],
        base: Style,
        size: f32,
        color: Color,
        marker: Option<&str>,
    ) {
        let indent = if marker.is_some() { LIST_INDENT } else { 0.0 };
        let lines = wrap(words(spans, base), size, Self::content_width() - indent);
        let height = line_height(size);

        for (idx, line) in lines.iter().enumerate() {
            self.ensure_space(height);
            self.y -= height;
            self.layer.set_fill_color(color.clone());

            if idx == 0
                && let Some(marker) = marker
            {
                self.layer.use_text(
                    marker,
                    size,
                    Mm(MARGIN_LEFT + 1.0),
                    Mm(self.y),
                    &self.fonts.regular,
                );
            }

            let mut x = MARGIN_LEFT + indent;
            for (style, run) in line {
                self.layer
                    .use_text(run.as_str(), size, Mm(x), Mm(self.y), self.fonts.get(*style));
                x += text_width(run, *style, size);
            }
        }
        self.gap(height * 0.25);
    }

    fn title_block(&mut self) {
        self.single_line(REPORT_TITLE, Style::Bold, TITLE_SIZE, dark_text());
        self.gap(1.5);
        self.single_line(REPORT_SUBTITLE, Style::Regular, SUBTITLE_SIZE, accent());
        self.gap(3.0);
        self.rule(self.y, 1.2);
        self.gap(4.0);
        self.single_line(SECTION_TITLE, Style::Bold, SECTION_SIZE, accent());
        self.gap(2.0);
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Heading { level, spans } => {
                let size = if *level == 1 { HEADING_SIZE } else { SUBHEADING_SIZE };
                // Keep a heading with at least one body line
                self.ensure_space(line_height(size) + line_height(BODY_SIZE) + 2.0);
                self.gap(2.0);
                self.text_block(spans, Style::Bold, size, accent(), None);
            }
            Block::Bullet(spans) => {
                self.text_block(spans, Style::Regular, BODY_SIZE, dark_text(), Some("-"));
            }
            Block::Numbered { number, spans } => {
                let marker = format!("{number}.");
                self.text_block(spans, Style::Regular, BODY_SIZE, dark_text(), Some(&marker));
            }
            Block::Paragraph(spans) => {
                self.text_block(spans, Style::Regular, BODY_SIZE, dark_text(), None);
            }
            Block::Blank => self.gap(BLANK_GAP),
        }
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.draw_footer();
        self.doc.save_to_bytes().map_err(pdf_error)
    }
}

fn layout(blocks: &[Block], generated_at: DateTime<Local>) -> Result<PageWriter> {
    let mut writer = PageWriter::new(generated_at)?;
    writer.title_block();
    for block in blocks {
        writer.block(block);
    }
    Ok(writer)
}

/// Lay out report blocks and return the PDF bytes
pub(super) fn render_pdf(blocks: &[Block], generated_at: DateTime<Local>) -> Result<Vec<u8>> {
    layout(blocks, generated_at)?.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width() {
        let spans = vec![Span::Plain("word ".repeat(60))];
        let width = 80.0;
        let lines = wrap(words(&spans, Style::Regular), BODY_SIZE, width);
        assert!(lines.len() > 1);
        for line in &lines {
            let used: f32 = line
                .iter()
                .map(|(style, run)| text_width(run, *style, BODY_SIZE))
                .sum();
            assert!(used <= width + 0.01);
        }
    }

    #[test]
    fn wrap_merges_same_style_runs() {
        let spans = vec![
            Span::Plain("plain words".into()),
            Span::Bold("bold part".into()),
        ];
        let lines = wrap(words(&spans, Style::Regular), BODY_SIZE, 500.0);
        assert_eq!(
            lines,
            vec![vec![
                (Style::Regular, "plain words ".to_string()),
                (Style::Bold, "bold part".to_string()),
            ]]
        );
    }

    #[test]
    fn long_report_spans_pages() {
        let blocks: Vec<Block> = (0..200)
            .map(|i| Block::Paragraph(vec![Span::Plain(format!("Line {i} of the report"))]))
            .collect();
        let writer = layout(&blocks, Local::now()).unwrap();
        // ~7.4mm per paragraph over ~250mm of body
        assert!(writer.page_number >= 4, "got {} pages", writer.page_number);
        let bytes = writer.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn short_report_fits_one_page() {
        let blocks = vec![Block::Paragraph(vec![Span::Plain("Brief note".into())])];
        let writer = layout(&blocks, Local::now()).unwrap();
        assert_eq!(writer.page_number, 1);
    }
}
