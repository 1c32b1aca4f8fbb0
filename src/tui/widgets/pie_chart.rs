//! Terminal pie chart for the stock distribution.
//!
//! The disc is rasterised cell by cell: each cell's centre is mapped to an
//! angle measured clockwise from twelve o'clock, and the slice whose
//! cumulative share covers that angle paints it. Terminal cells are about
//! twice as tall as wide, so the disc is drawn twice as wide as it is tall.
//! A legend with one `"<label>: <value> pieces"` line per slice sits to the
//! right of the disc (or below it in narrow areas).

use std::f64::consts::TAU;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

use crate::core::analytics::PieVisualization;
use crate::tui::theme;

const FILL_SYMBOL: &str = "█";
/// Legend column width when placed beside the disc.
const LEGEND_WIDTH: u16 = 32;

pub struct PieChart<'a> {
    pie: &'a PieVisualization,
    block: Option<Block<'a>>,
    highlighted: Option<usize>,
}

impl<'a> PieChart<'a> {
    pub fn new(pie: &'a PieVisualization) -> Self {
        Self {
            pie,
            block: None,
            highlighted: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Slice whose legend entry is emphasised (the terminal's hover tooltip).
    pub fn highlighted(mut self, idx: Option<usize>) -> Self {
        self.highlighted = idx;
        self
    }

    fn render_disc(&self, area: Rect, buf: &mut Buffer) {
        if area.width < 2 || area.height < 1 {
            return;
        }
        let shares: Vec<f64> = (0..self.pie.slices.len()).map(|i| self.pie.share(i)).collect();

        let width = area.width.min(area.height.saturating_mul(2));
        let height = (width / 2).max(1).min(area.height);
        let half_w = f64::from(width) / 2.0;
        let half_h = f64::from(height) / 2.0;

        for row in 0..height {
            for col in 0..width {
                let dx = (f64::from(col) + 0.5 - half_w) / half_w;
                let dy = (f64::from(row) + 0.5 - half_h) / half_h;
                if dx * dx + dy * dy > 1.0 {
                    continue;
                }
                let Some(idx) = slice_at(&shares, clockwise_fraction(dx, dy)) else {
                    continue;
                };
                let mut color = theme::blend(self.pie.slices[idx].fill);
                if self.highlighted == Some(idx) {
                    color = theme::blend(self.pie.slices[idx].fill.opaque());
                }
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol(FILL_SYMBOL).set_fg(color);
                }
            }
        }
    }

    fn legend(&self) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(
            self.pie.dataset_label.to_string(),
            theme::heading(),
        ))];

        for (idx, slice) in self.pie.slices.iter().enumerate() {
            let text = self.pie.tooltip(idx).unwrap_or_default();
            let focused = self.highlighted == Some(idx);
            let text_style = if focused {
                Style::default()
                    .fg(theme::TEXT)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(theme::TEXT)
            };
            lines.push(Line::from(vec![
                Span::styled(
                    if focused { "▸" } else { " " },
                    Style::default().fg(theme::ACCENT),
                ),
                Span::styled("■ ", Style::default().fg(theme::blend(slice.fill.opaque()))),
                Span::styled(text, text_style),
            ]));
        }
        lines
    }
}

impl Widget for PieChart<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let inner = match self.block.take() {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let (disc, legend) = if inner.width >= LEGEND_WIDTH * 2 {
            let [disc, legend] =
                Layout::horizontal([Constraint::Min(8), Constraint::Length(LEGEND_WIDTH)])
                    .areas(inner);
            (disc, legend)
        } else {
            let rows = (self.pie.slices.len() as u16 + 1).min(inner.height / 2);
            let [disc, legend] =
                Layout::vertical([Constraint::Min(1), Constraint::Length(rows)]).areas(inner);
            (disc, legend)
        };

        self.render_disc(disc, buf);
        Paragraph::new(self.legend())
            .wrap(Wrap { trim: true })
            .render(legend, buf);
    }
}

/// Angle of the offset `(dx, dy)` as a fraction of a full turn, clockwise
/// from straight up. `dy` grows downwards.
pub fn clockwise_fraction(dx: f64, dy: f64) -> f64 {
    let angle = dx.atan2(-dy);
    let angle = if angle < 0.0 { angle + TAU } else { angle };
    (angle / TAU).clamp(0.0, 1.0)
}

/// Index of the slice covering `fraction`, given each slice's share of the
/// whole. Zero-share slices never match.
pub fn slice_at(shares: &[f64], fraction: f64) -> Option<usize> {
    let mut acc = 0.0;
    let mut last_visible = None;
    for (idx, &share) in shares.iter().enumerate() {
        if share <= 0.0 {
            continue;
        }
        acc += share;
        last_visible = Some(idx);
        if fraction < acc {
            return Some(idx);
        }
    }
    // rounding at the very end of the turn
    last_visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::StockLevels;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pie(items: &[(&str, f64)]) -> PieVisualization {
        let levels = StockLevels {
            products: items.iter().map(|(n, _)| n.to_string()).collect(),
            quantities: items.iter().map(|(_, v)| *v).collect(),
        };
        PieVisualization::from_stock_levels(&levels, &mut StdRng::seed_from_u64(11))
    }

    fn render_to_string(widget: PieChart<'_>, width: u16, height: u16) -> Vec<String> {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        buf.cell((x, y))
                            .map_or(' ', |c| c.symbol().chars().next().unwrap_or(' '))
                    })
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_clockwise_fraction_quadrants() {
        assert!(clockwise_fraction(0.0, -1.0).abs() < 1e-9);
        assert!((clockwise_fraction(1.0, 0.0) - 0.25).abs() < 1e-9);
        assert!((clockwise_fraction(0.0, 1.0) - 0.5).abs() < 1e-9);
        assert!((clockwise_fraction(-1.0, 0.0) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_slice_at_uses_cumulative_shares() {
        let shares = [0.25, 0.0, 0.75];
        assert_eq!(slice_at(&shares, 0.1), Some(0));
        assert_eq!(slice_at(&shares, 0.3), Some(2));
        assert_eq!(slice_at(&shares, 1.0), Some(2));
        assert_eq!(slice_at(&[0.0, 0.0], 0.5), None);
    }

    #[test]
    fn test_legend_lists_every_slice() {
        let p = pie(&[("Rice", 40.0), ("Dal", 12.0)]);
        let output = render_to_string(PieChart::new(&p), 80, 12).join("\n");
        assert!(output.contains("Orders"));
        assert!(output.contains("Rice: 40 pieces"));
        assert!(output.contains("Dal: 12 pieces"));
    }

    #[test]
    fn test_disc_is_painted() {
        let p = pie(&[("Rice", 1.0)]);
        let output = render_to_string(PieChart::new(&p), 80, 12);
        assert!(output.iter().any(|l| l.contains('█')));
    }

    #[test]
    fn test_zero_area_does_not_panic() {
        let p = pie(&[("Rice", 1.0)]);
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        PieChart::new(&p).render(area, &mut buf);
    }
}
