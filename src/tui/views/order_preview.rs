//! Read-only review of an accepted order draft.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use super::super::theme;
use crate::core::analytics::format_value;
use crate::core::order::OrderDraft;

/// What the preview asks the app to do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewResult {
    Consumed,
    /// Return to the order form.
    Back,
}

pub struct OrderPreviewState {
    draft: Option<OrderDraft>,
    /// Courier display name, resolved when the draft is shown.
    courier_name: Option<String>,
    scroll: usize,
}

impl OrderPreviewState {
    pub fn new() -> Self {
        Self {
            draft: None,
            courier_name: None,
            scroll: 0,
        }
    }

    pub fn show(&mut self, draft: OrderDraft, courier_name: Option<String>) {
        match serde_json::to_string(&draft) {
            Ok(json) => log::info!("Reviewing order draft: {json}"),
            Err(e) => log::warn!("Could not serialise order draft: {e}"),
        }
        self.draft = Some(draft);
        self.courier_name = courier_name;
        self.scroll = 0;
    }

    pub fn draft(&self) -> Option<&OrderDraft> {
        self.draft.as_ref()
    }

    pub fn handle_input(&mut self, event: &Event) -> Option<PreviewResult> {
        let Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };

        match code {
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace => Some(PreviewResult::Back),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                Some(PreviewResult::Consumed)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                Some(PreviewResult::Consumed)
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(draft) = &self.draft else {
            let block = theme::block_default("Order Preview");
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new(Span::styled(
                    " No order to review yet. Fill in the order form and choose Place Order.",
                    theme::muted(),
                )),
                inner,
            );
            return;
        };

        let items_height = (draft.items().len() as u16 + 4).min(area.height / 2).max(5);
        let [items_area, details_area] =
            Layout::vertical([Constraint::Length(items_height), Constraint::Min(8)]).areas(area);

        let header = Row::new(["Product", "Quantity", "Unit Price", "Weight", "Line Total"])
            .style(theme::heading());
        let rows = draft.items().iter().skip(self.scroll).map(|item| {
            Row::new(vec![
                Cell::from(item.product_name.clone()),
                Cell::from(item.quantity.to_string()),
                Cell::from(format!("${:.2}", item.price)),
                Cell::from(format_value(item.line_weight())),
                Cell::from(format!("${:.2}", item.line_total())),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Min(16),
                Constraint::Length(9),
                Constraint::Length(11),
                Constraint::Length(8),
                Constraint::Length(12),
            ],
        )
        .header(header)
        .block(theme::block_focused("Order Preview"));
        frame.render_widget(table, items_area);

        self.render_details(frame, details_area, draft);
    }

    fn render_details(&self, frame: &mut Frame, area: Rect, draft: &OrderDraft) {
        let block = theme::block_default("Delivery");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let row = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("  {label:<18}"), theme::muted()),
                Span::styled(value, Style::default().fg(theme::TEXT)),
            ])
        };

        let courier = match (&self.courier_name, draft.courier_service_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("#{id}"),
            (None, None) => "-".to_string(),
        };

        let lines = vec![
            row("Customer:", format!("#{}", draft.customer_id)),
            row("Delivery Address:", draft.shipping_address.trim().to_string()),
            row("Pin Code:", draft.pin_code.trim().to_string()),
            row(
                "Location Type:",
                draft
                    .location_type
                    .map(|l| l.label().to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            row("Courier Service:", courier),
            row("Phone Number:", draft.phone_number.trim().to_string()),
            Line::raw(""),
            Line::from(vec![
                Span::styled("  Total: ", theme::muted()),
                Span::styled(format!("${:.2}", draft.total_price()), theme::title()),
                Span::styled("   Weight: ", theme::muted()),
                Span::styled(format_value(draft.total_weight()), Style::default().fg(theme::TEXT)),
                Span::styled("   Units: ", theme::muted()),
                Span::styled(draft.total_units().to_string(), Style::default().fg(theme::TEXT)),
            ]),
            Line::raw(""),
            Line::from(Span::styled("  [Esc/b] back to form  [j/k] scroll items", theme::key_hint())),
        ];

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Default for OrderPreviewState {
    fn default() -> Self {
        Self::new()
    }
}
