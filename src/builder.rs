//! Assembles a [`ReportDocument`] into PDF bytes with `genpdf`.

use std::cell::Cell;
use std::rc::Rc;

use genpdf::elements::{Break, FrameCellDecorator, PageBreak, Paragraph, TableLayout};
use genpdf::error::{Error as PdfError, ErrorKind};
use genpdf::style::{Color, Style};
use genpdf::{
    Alignment, Context, Element, Margins, Mm, PageDecorator, PaperSize, Position, RenderResult,
};
use log::debug;

use crate::elements::BarChart;
use crate::error::Result;
use crate::fonts;
use crate::model::{MetricsTable, ReportDocument, SectionBody};

/// Turns a finished [`ReportDocument`] into complete file contents.
///
/// [`PdfRenderer`] is the production implementation; tests substitute fakes
/// so pipeline behavior can be checked without fonts installed.
pub trait DocumentBuilder {
    /// Renders the document into a byte buffer.
    fn build(&self, document: &ReportDocument) -> Result<Vec<u8>>;
}

/// A rendered PDF plus the start page recorded for every section.
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    /// 1-indexed start page of each section, in section order.
    pub section_pages: Vec<usize>,
}

/// `genpdf`-based renderer with the crate's page layout defaults: Letter
/// paper, uniform margins and a page-number footer.
pub struct PdfRenderer {
    margins: Margins,
    footer_height: Mm,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self {
            margins: Margins::trbl(15, 15, 12, 15),
            footer_height: Mm::from(10),
        }
    }
}

impl PdfRenderer {
    /// Creates a renderer with the default page layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the document fully in memory and records where each section
    /// starts.
    ///
    /// Every section after the first begins on a fresh page, so the
    /// recorded start pages are exact.
    pub fn render(&self, document: &ReportDocument) -> Result<RenderedPdf> {
        let font_family = fonts::default_font_family()?;
        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(document.title());
        doc.set_paper_size(PaperSize::Letter);
        doc.set_font_size(11);

        let page_counter = Rc::new(Cell::new(0usize));
        doc.set_page_decorator(ReportPageDecorator {
            page: Rc::clone(&page_counter),
            margins: self.margins,
            footer_height: self.footer_height,
        });

        doc.push(
            Paragraph::new(document.title())
                .aligned(Alignment::Center)
                .styled(Style::new().bold().with_font_size(18)),
        );
        doc.push(Break::new(1.0));

        let mut section_slots = Vec::with_capacity(document.sections().len());
        for (index, section) in document.sections().iter().enumerate() {
            if index > 0 {
                doc.push(PageBreak::new());
            }

            let slot = Rc::new(Cell::new(0usize));
            doc.push(SectionStart {
                page: Rc::clone(&page_counter),
                slot: Rc::clone(&slot),
            });
            section_slots.push(slot);

            doc.push(
                Paragraph::new(section.heading()).styled(Style::new().bold().with_font_size(14)),
            );
            doc.push(Break::new(0.5));

            match section.body() {
                SectionBody::Notice(text) => {
                    doc.push(Paragraph::new(text.as_str()));
                }
                SectionBody::Metrics { chart, table } => {
                    doc.push(BarChart::new(chart));
                    doc.push(Break::new(1.0));
                    doc.push(metrics_table(table)?);
                }
            }
        }

        let mut bytes = Vec::new();
        doc.render(&mut bytes)?;

        let section_pages: Vec<usize> = section_slots.iter().map(|slot| slot.get()).collect();
        debug!(
            "rendered {} sections across {} pages ({} bytes)",
            section_pages.len(),
            page_counter.get(),
            bytes.len()
        );

        Ok(RenderedPdf {
            bytes,
            section_pages,
        })
    }

    /// Renders the document and adds one outline entry per section.
    #[cfg(feature = "bookmarks")]
    pub fn render_with_bookmarks(&self, document: &ReportDocument) -> Result<Vec<u8>> {
        let pdf = self.render(document)?;
        let bytes = crate::bookmarks::apply_section_bookmarks(
            &pdf.bytes,
            document.sections(),
            &pdf.section_pages,
        )?;
        Ok(bytes)
    }
}

impl DocumentBuilder for PdfRenderer {
    fn build(&self, document: &ReportDocument) -> Result<Vec<u8>> {
        self.render(document).map(|pdf| pdf.bytes)
    }
}

fn metrics_table(table: &MetricsTable) -> Result<TableLayout> {
    let mut layout = TableLayout::new(vec![2, 1, 1]);
    layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let header_style = Style::new().bold().with_font_size(12);
    layout
        .row()
        .element(cell("Metric", header_style))
        .element(cell("Value", header_style))
        .element(cell("Percentage", header_style))
        .push()?;

    let body_style = Style::new().with_font_size(11);
    for row in table.rows() {
        layout
            .row()
            .element(cell(row.label(), body_style))
            .element(cell(&row.value().to_string(), body_style))
            .element(cell(row.percentage(), body_style))
            .push()?;
    }

    Ok(layout)
}

fn cell(text: &str, style: Style) -> impl Element {
    Paragraph::new(text)
        .aligned(Alignment::Center)
        .styled(style)
        .padded(Margins::vh(1, 2))
}

/// Zero-size marker that records the page it lands on.
struct SectionStart {
    page: Rc<Cell<usize>>,
    slot: Rc<Cell<usize>>,
}

impl Element for SectionStart {
    fn render(
        &mut self,
        _context: &Context,
        _area: genpdf::render::Area<'_>,
        _style: Style,
    ) -> std::result::Result<RenderResult, PdfError> {
        self.slot.set(self.page.get());
        Ok(RenderResult::default())
    }
}

struct ReportPageDecorator {
    page: Rc<Cell<usize>>,
    margins: Margins,
    footer_height: Mm,
}

impl PageDecorator for ReportPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &Context,
        mut area: genpdf::render::Area<'a>,
        style: Style,
    ) -> std::result::Result<genpdf::render::Area<'a>, PdfError> {
        self.page.set(self.page.get() + 1);
        area.add_margins(self.margins);

        let available = area.size().height;
        if self.footer_height > available {
            return Err(PdfError::new(
                "Footer height exceeds available space",
                ErrorKind::PageSizeExceeded,
            ));
        }

        let mut footer_area = area.clone();
        footer_area.add_offset(Position::new(0, available - self.footer_height));
        let mut footer = Paragraph::new(format!("Page {}", self.page.get()));
        footer.set_alignment(Alignment::Right);
        let footer_style = style.with_font_size(9).with_color(Color::Greyscale(120));
        let result = footer.render(context, footer_area, footer_style)?;
        if result.has_more {
            return Err(PdfError::new(
                "Footer element does not fit into the reserved space",
                ErrorKind::PageSizeExceeded,
            ));
        }

        area.set_height(available - self.footer_height);
        Ok(area)
    }
}
