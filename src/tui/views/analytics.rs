//! Inventory analytics: date range controls, the stock distribution pie
//! and the supplier bar chart.
//!
//! Every refresh goes through the [`ChartBoard`]: charts are disposed when
//! the fetch starts and rebuilt from the report when it lands. Reports for
//! superseded refreshes are dropped by generation.

use chrono::{Local, NaiveDate};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Paragraph},
    Frame,
};
use tokio::sync::mpsc;

use super::super::layout::DashboardLayout;
use super::super::theme;
use super::super::widgets::input_buffer::{CharFilter, InputBuffer};
use super::super::widgets::pie_chart::PieChart;
use crate::core::analytics::{
    format_value, BarVisualization, ChartBoard, PieVisualization, RefreshOutcome,
};
use crate::core::api::{DateRange, InventoryReport};
use crate::core::error::Result;
use crate::tui::events::NotificationLevel;
use crate::tui::services::Services;

/// Days covered by the initial range, ending today.
const DEFAULT_RANGE_DAYS: u32 = 30;

// ── Data types ─────────────────────────────────────────────────────────────

struct ReportMessage {
    generation: u64,
    result: Result<InventoryReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateField {
    Start,
    End,
}

impl DateField {
    fn other(self) -> Self {
        match self {
            DateField::Start => DateField::End,
            DateField::End => DateField::Start,
        }
    }
}

// ── State ──────────────────────────────────────────────────────────────────

pub struct AnalyticsViewState {
    board: ChartBoard,
    start_input: InputBuffer,
    end_input: InputBuffer,
    /// Field being edited; `None` in normal mode.
    editing: Option<DateField>,
    /// Range of the last refresh that was started.
    range: DateRange,
    loading: bool,
    highlighted_slice: Option<usize>,
    data_rx: mpsc::UnboundedReceiver<ReportMessage>,
    data_tx: mpsc::UnboundedSender<ReportMessage>,
}

impl AnalyticsViewState {
    pub fn new() -> Self {
        Self::with_board(ChartBoard::new(), Local::now().date_naive())
    }

    /// State with an explicit board and "today", for deterministic rendering.
    pub fn with_board(board: ChartBoard, today: NaiveDate) -> Self {
        let (data_tx, data_rx) = mpsc::unbounded_channel();
        let range = DateRange::last_days(today, DEFAULT_RANGE_DAYS);
        let mut state = Self {
            board,
            start_input: date_input(),
            end_input: date_input(),
            editing: None,
            range,
            loading: false,
            highlighted_slice: None,
            data_rx,
            data_tx,
        };
        state.reset_inputs();
        state
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn board(&self) -> &ChartBoard {
        &self.board
    }

    /// Fetch for the current range (view opened).
    pub fn load(&mut self, services: &Services) {
        self.refresh(services);
    }

    /// Leaving the view: release both charts and ignore in-flight reports.
    pub fn unload(&mut self) {
        self.board.teardown();
        self.loading = false;
        self.editing = None;
    }

    /// Validate the date inputs and start a fetch. Invalid input leaves the
    /// charts untouched and raises a warning.
    pub fn refresh(&mut self, services: &Services) {
        let range = match DateRange::parse(self.start_input.text(), self.end_input.text()) {
            Ok(range) => range,
            Err(e) => {
                log::warn!("Refresh skipped: {e}");
                services.notify(NotificationLevel::Warning, e.to_string());
                return;
            }
        };

        self.range = range;
        let generation = self.board.begin_refresh();
        self.loading = true;
        self.highlighted_slice = None;
        log::info!("Loading inventory report for {range} (generation {generation})");

        let tx = self.data_tx.clone();
        let api = services.api.clone();
        tokio::spawn(async move {
            let result = api.inventory_report(range).await;
            let _ = tx.send(ReportMessage { generation, result });
        });
    }

    pub fn poll(&mut self, services: &Services) {
        while let Ok(msg) = self.data_rx.try_recv() {
            let outcome = match &msg.result {
                Ok(report) => self.board.apply_report(msg.generation, report),
                Err(e) => self.board.apply_failure(msg.generation, e),
            };
            if outcome == RefreshOutcome::Stale {
                continue;
            }
            self.loading = false;
            for message in outcome.messages() {
                services.notify(NotificationLevel::Error, message);
            }
        }
    }

    fn reset_inputs(&mut self) {
        self.start_input.set_text(&self.range.start().format("%Y-%m-%d").to_string());
        self.end_input.set_text(&self.range.end().format("%Y-%m-%d").to_string());
    }

    fn input_mut(&mut self, field: DateField) -> &mut InputBuffer {
        match field {
            DateField::Start => &mut self.start_input,
            DateField::End => &mut self.end_input,
        }
    }

    fn slice_count(&self) -> usize {
        self.board.pie().current().map_or(0, |p| p.slices.len())
    }

    fn step_highlight(&mut self, forward: bool) {
        let n = self.slice_count();
        if n == 0 {
            self.highlighted_slice = None;
            return;
        }
        self.highlighted_slice = Some(match (self.highlighted_slice, forward) {
            (None, true) => 0,
            (None, false) => n - 1,
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
        });
    }

    // ── Input ──────────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event, services: &Services) -> bool {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        if let Some(field) = self.editing {
            self.handle_edit_key(field, *code, services);
            return true;
        }

        match (*modifiers, *code) {
            (KeyModifiers::NONE, KeyCode::Char('s')) => {
                self.editing = Some(DateField::Start);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('e')) => {
                self.editing = Some(DateField::End);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => {
                self.refresh(services);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
                self.step_highlight(true);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
                self.step_highlight(false);
                true
            }
            (KeyModifiers::NONE, KeyCode::Esc) if self.highlighted_slice.is_some() => {
                self.highlighted_slice = None;
                true
            }
            _ => false,
        }
    }

    fn handle_edit_key(&mut self, field: DateField, code: KeyCode, services: &Services) {
        match code {
            KeyCode::Enter => {
                self.editing = None;
                self.refresh(services);
            }
            KeyCode::Esc => {
                self.editing = None;
                self.reset_inputs();
            }
            KeyCode::Tab | KeyCode::BackTab => self.editing = Some(field.other()),
            KeyCode::Char(c) => {
                self.input_mut(field).insert_char(c);
            }
            KeyCode::Backspace => self.input_mut(field).backspace(),
            KeyCode::Delete => self.input_mut(field).delete(),
            KeyCode::Left => self.input_mut(field).move_left(),
            KeyCode::Right => self.input_mut(field).move_right(),
            KeyCode::Home => self.input_mut(field).move_home(),
            KeyCode::End => self.input_mut(field).move_end(),
            _ => {}
        }
    }

    // ── Rendering ──────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = DashboardLayout::compute(area);
        self.render_controls(frame, layout.controls);
        self.render_pie(frame, layout.pie);
        self.render_bar(frame, layout.bar);
    }

    fn render_controls(&self, frame: &mut Frame, area: Rect) {
        let block = if self.is_editing() {
            theme::block_focused("Date Range")
        } else {
            theme::block_default("Date Range")
        };
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let field_style = |field: DateField| {
            if self.editing == Some(field) {
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default().fg(theme::TEXT)
            }
        };

        let start_label = " Start: ";
        let end_label = "   End: ";
        let mut spans = vec![
            Span::styled(start_label, theme::muted()),
            Span::styled(format!("{:<10}", self.start_input.text()), field_style(DateField::Start)),
            Span::styled(end_label, theme::muted()),
            Span::styled(format!("{:<10}", self.end_input.text()), field_style(DateField::End)),
            Span::raw("   "),
        ];
        if self.loading {
            spans.push(Span::styled("Loading…", Style::default().fg(theme::INFO)));
        } else if self.is_editing() {
            spans.push(Span::styled("[Enter] apply  [Esc] cancel  [Tab] switch", theme::key_hint()));
        } else {
            spans.push(Span::styled("[s/e] edit dates  [r] refresh  [j/k] slice", theme::key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), inner);

        if let Some(field) = self.editing {
            let (offset, input) = match field {
                DateField::Start => (start_label.len(), &self.start_input),
                DateField::End => (start_label.len() + 10 + end_label.len(), &self.end_input),
            };
            let x = inner.x + (offset + input.cursor_column()) as u16;
            frame.set_cursor_position(Position::new(x.min(inner.right().saturating_sub(1)), inner.y));
        }
    }

    fn placeholder(&self, frame: &mut Frame, area: Rect, title: &str) {
        let block = theme::block_default(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let text = if self.loading {
            " Loading..."
        } else {
            " No data for the selected range"
        };
        frame.render_widget(Paragraph::new(Span::styled(text, theme::muted())), inner);
    }

    fn render_pie(&self, frame: &mut Frame, area: Rect) {
        match self.board.pie().current() {
            Some(pie) => frame.render_widget(
                PieChart::new(pie)
                    .block(theme::block_focused(pie.title))
                    .highlighted(self.highlighted_slice),
                area,
            ),
            None => self.placeholder(frame, area, PieVisualization::TITLE),
        }
    }

    fn render_bar(&self, frame: &mut Frame, area: Rect) {
        let Some(viz) = self.board.bar().current() else {
            self.placeholder(frame, area, BarVisualization::TITLE);
            return;
        };

        let block = theme::block_focused(viz.title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [legend, chart, x_axis] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(inner);

        let fill = theme::blend(viz.fill);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("■ ", Style::default().fg(theme::blend(viz.fill.opaque()))),
                Span::styled(viz.dataset_label, Style::default().fg(theme::TEXT)),
                Span::styled(format!("   y: {}", viz.y_axis_title), theme::muted()),
            ])),
            legend,
        );

        frame.render_widget(bar_chart(viz, chart.width, fill), chart);

        frame.render_widget(
            Paragraph::new(Span::styled(format!("x: {}", viz.x_axis_title), theme::muted()))
                .alignment(Alignment::Center),
            x_axis,
        );
    }
}

impl Default for AnalyticsViewState {
    fn default() -> Self {
        Self::new()
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn date_input() -> InputBuffer {
    InputBuffer::new()
        .with_filter(CharFilter::Date)
        .with_max_chars(10)
}

/// Bars scaled from zero; labels are the supplier names.
fn bar_chart(viz: &BarVisualization, width: u16, fill: Color) -> BarChart<'_> {
    let bars: Vec<Bar> = viz
        .bars
        .iter()
        .map(|(supplier, value)| {
            Bar::default()
                .value(value.max(0.0).round() as u64)
                .text_value(format_value(*value))
                .label(Line::from(supplier.as_str()))
        })
        .collect();

    let n = bars.len().max(1) as u16;
    let bar_width = (width.saturating_sub(n) / n).clamp(3, 14);
    let max = viz.max_value().max(1.0).ceil() as u64;

    BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .max(max)
        .bar_style(Style::default().fg(fill))
        .value_style(
            Style::default()
                .fg(theme::BG_BASE)
                .bg(fill)
                .add_modifier(Modifier::BOLD),
        )
        .label_style(theme::muted())
}

// ── Tests ──────────────────────────────────────────────────────────────────
