//! Custom chart element built on top of `genpdf` primitives.
//!
//! The bar chart is drawn entirely with vector operations (line strokes and
//! text sections), so rendered documents stay small and crisp at any zoom
//! level.

use genpdf::error::Error;
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Element, Mm, Position, RenderResult, Size};

use crate::model::ChartSpec;

/// Bar fill for regular campaign sections (sky blue).
const CAMPAIGN_BAR_COLOR: Color = Color::Rgb(135, 206, 235);
/// Bar fill for the aggregate section (light coral).
const AGGREGATE_BAR_COLOR: Color = Color::Rgb(240, 128, 128);
const AXIS_COLOR: Color = Color::Greyscale(60);
const GRID_COLOR: Color = Color::Greyscale(200);

/// Width reserved for the metric labels left of the axis.
const LABEL_COLUMN_MM: f64 = 52.0;
/// Width reserved for the value labels right of the bars.
const VALUE_COLUMN_MM: f64 = 20.0;
const ROW_HEIGHT_MM: f64 = 6.4;
const BAR_HEIGHT_MM: f64 = 4.0;
/// Stroke spacing used to fill bars; below the default stroke width, so the
/// fill reads as solid.
const FILL_STEP_MM: f64 = 0.3;
const LABEL_GAP_MM: f64 = 2.0;
const TITLE_GAP_MM: f64 = 2.0;
const TICK_LABEL_GAP_MM: f64 = 1.2;
const CAPTION_GAP_MM: f64 = 1.0;

const AXIS_CAPTION: &str = "Percentage of Total Calls";

fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Horizontal bar chart of call-outcome percentages.
///
/// Bars run horizontally so the long metric labels stay legible without
/// rotated text. The value axis is scaled to the largest bar, rounded up to
/// a multiple of twenty so the quarter ticks land on whole percentages.
pub struct BarChart {
    title: String,
    bars: Vec<(&'static str, f64)>,
    fill: Color,
    axis_max: f64,
}

impl BarChart {
    /// Builds the chart element for one section.
    pub fn new(spec: &ChartSpec) -> Self {
        let fill = if spec.is_aggregate() {
            AGGREGATE_BAR_COLOR
        } else {
            CAMPAIGN_BAR_COLOR
        };

        let bars: Vec<(&'static str, f64)> = spec
            .bars()
            .iter()
            .map(|bar| (bar.label(), bar.percentage()))
            .collect();

        let largest = bars.iter().map(|(_, value)| *value).fold(0.0, f64::max);
        let axis_max = ((largest / 20.0).ceil() * 20.0).max(20.0);

        Self {
            title: spec.title().to_owned(),
            bars,
            fill,
            axis_max,
        }
    }

    fn print_text(
        &self,
        context: &genpdf::Context,
        area: &render::Area<'_>,
        x: f64,
        y: f64,
        text: &str,
        style: Style,
    ) -> Result<bool, Error> {
        let position = Position::new(mm_from_f64(x), mm_from_f64(y));
        if let Some(mut section) = area.text_section(&context.font_cache, position, style) {
            section.print_str(text, style)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn draw_horizontal(&self, area: &render::Area<'_>, x0: f64, x1: f64, y: f64, style: Style) {
        area.draw_line(
            vec![
                Position::new(mm_from_f64(x0), mm_from_f64(y)),
                Position::new(mm_from_f64(x1), mm_from_f64(y)),
            ],
            style,
        );
    }

    fn draw_vertical(&self, area: &render::Area<'_>, x: f64, y0: f64, y1: f64, style: Style) {
        area.draw_line(
            vec![
                Position::new(mm_from_f64(x), mm_from_f64(y0)),
                Position::new(mm_from_f64(x), mm_from_f64(y1)),
            ],
            style,
        );
    }
}

impl Element for BarChart {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();

        let title_style = style.bold().with_font_size(12);
        let text_style = style.with_font_size(9);

        let title_height = mm_to_f64(title_style.line_height(&context.font_cache));
        let text_height = mm_to_f64(text_style.line_height(&context.font_cache));

        let bars_top = title_height + TITLE_GAP_MM;
        let bars_height = self.bars.len() as f64 * ROW_HEIGHT_MM;
        let axis_y = bars_top + bars_height;
        let ticks_y = axis_y + TICK_LABEL_GAP_MM;
        let caption_y = ticks_y + text_height + CAPTION_GAP_MM;
        let total_height = caption_y + text_height;

        // All-or-nothing: if the chart does not fit, defer it to a fresh
        // page instead of splitting it mid-bar.
        if mm_to_f64(area.size().height) < total_height {
            result.has_more = true;
            return Ok(result);
        }

        let width = mm_to_f64(area.size().width);
        let plot_width = width - LABEL_COLUMN_MM - VALUE_COLUMN_MM;

        let title_width = mm_to_f64(
            StyledString::new(self.title.clone(), title_style).width(&context.font_cache),
        );
        let title_x = ((width - title_width) / 2.0).max(0.0);
        if !self.print_text(context, &area, title_x, 0.0, &self.title, title_style)? {
            result.has_more = true;
            return Ok(result);
        }

        let grid_style = Style::new().with_color(GRID_COLOR);
        let axis_style = Style::new().with_color(AXIS_COLOR);
        let fill_style = Style::new().with_color(self.fill);

        // Quarter gridlines with their tick labels underneath.
        for quarter in 1..=4 {
            let fraction = quarter as f64 / 4.0;
            let x = LABEL_COLUMN_MM + fraction * plot_width;
            self.draw_vertical(&area, x, bars_top, axis_y, grid_style);

            let label = format!("{:.0}%", fraction * self.axis_max);
            let label_width =
                mm_to_f64(StyledString::new(label.clone(), text_style).width(&context.font_cache));
            let label_x = (x - label_width / 2.0).max(0.0);
            self.print_text(context, &area, label_x, ticks_y, &label, text_style)?;
        }
        let zero_width =
            mm_to_f64(StyledString::new("0%".to_owned(), text_style).width(&context.font_cache));
        self.print_text(
            context,
            &area,
            (LABEL_COLUMN_MM - zero_width / 2.0).max(0.0),
            ticks_y,
            "0%",
            text_style,
        )?;

        for (index, (label, value)) in self.bars.iter().enumerate() {
            let row_top = bars_top + index as f64 * ROW_HEIGHT_MM;
            let text_y = row_top + (ROW_HEIGHT_MM - text_height) / 2.0;

            let label_width =
                mm_to_f64(StyledString::new((*label).to_owned(), text_style).width(&context.font_cache));
            let label_x = (LABEL_COLUMN_MM - LABEL_GAP_MM - label_width).max(0.0);
            self.print_text(context, &area, label_x, text_y, label, text_style)?;

            let bar_length = (value / self.axis_max) * plot_width;
            if bar_length > 0.0 {
                let bar_center = row_top + ROW_HEIGHT_MM / 2.0;
                let strokes = (BAR_HEIGHT_MM / FILL_STEP_MM) as usize;
                for stroke in 0..=strokes {
                    let y = bar_center - BAR_HEIGHT_MM / 2.0 + stroke as f64 * FILL_STEP_MM;
                    self.draw_horizontal(
                        &area,
                        LABEL_COLUMN_MM,
                        LABEL_COLUMN_MM + bar_length,
                        y,
                        fill_style,
                    );
                }
            }

            let value_label = format!("{value:.2}%");
            let value_x = LABEL_COLUMN_MM + bar_length + LABEL_GAP_MM;
            self.print_text(context, &area, value_x, text_y, &value_label, text_style)?;
        }

        // Axis frame on top of the gridlines.
        self.draw_vertical(&area, LABEL_COLUMN_MM, bars_top, axis_y, axis_style);
        self.draw_horizontal(
            &area,
            LABEL_COLUMN_MM,
            LABEL_COLUMN_MM + plot_width,
            axis_y,
            axis_style,
        );

        let caption_width =
            mm_to_f64(StyledString::new(AXIS_CAPTION.to_owned(), text_style).width(&context.font_cache));
        let caption_x = LABEL_COLUMN_MM + ((plot_width - caption_width) / 2.0).max(0.0);
        self.print_text(context, &area, caption_x, caption_y, AXIS_CAPTION, text_style)?;

        result.size = Size::new(area.size().width, mm_from_f64(total_height));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{ReportRow, TOTAL_LABEL};
    use crate::model::{ReportDocument, SectionBody};
    use chrono::NaiveDate;

    fn chart_for(calls: u64, machines: u64) -> BarChart {
        let row = ReportRow {
            campaign: TOTAL_LABEL.to_owned(),
            calls,
            machines,
            connects: 0,
            leads: 0,
            calls_to_connects_ratio: 0,
            answered_percentage: 0,
            not_interested: 0,
            do_not_call: 0,
            wrong_number: 0,
            dead_call: 0,
            voicemail: 0,
            not_available: 0,
            spanish_speaker: 0,
            callback: 0,
        };
        let document = ReportDocument::new(
            &[row],
            NaiveDate::from_ymd_opt(2024, 8, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 8, 11).unwrap(),
        );
        let SectionBody::Metrics { chart, .. } = document.sections()[0].body() else {
            panic!("expected chart content");
        };
        BarChart::new(chart)
    }

    #[test]
    fn axis_scales_to_the_largest_bar_in_twenty_point_steps() {
        assert_eq!(chart_for(100, 37).axis_max, 40.0);
        assert_eq!(chart_for(100, 61).axis_max, 80.0);
    }

    #[test]
    fn axis_never_drops_below_twenty_percent() {
        assert_eq!(chart_for(100, 0).axis_max, 20.0);
        assert_eq!(chart_for(100, 3).axis_max, 20.0);
    }

    #[test]
    fn charts_carry_all_thirteen_bars() {
        let chart = chart_for(100, 10);
        assert_eq!(chart.bars.len(), 13);
        assert_eq!(chart.bars[0].0, "Machines");
        assert_eq!(chart.bars[0].1, 10.0);
    }
}
