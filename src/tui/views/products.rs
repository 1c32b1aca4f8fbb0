//! Products overview and draft-order form.
//!
//! The catalog and courier list are fetched together when the view opens.
//! Quantities are edited per product row; the delivery fields below the
//! table are edited vim-style (Normal/Insert). Submitting runs
//! [`submit_order`] on a task; an accepted draft is handed back from
//! [`ProductsViewState::poll`] so the app can open the review screen.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use tokio::sync::mpsc;

use super::super::theme;
use super::super::widgets::input_buffer::{CharFilter, InputBuffer};
use crate::core::analytics::format_value;
use crate::core::api::{CourierService, Product};
use crate::core::error::Result;
use crate::core::order::{submit_order, LocationType, OrderDraft, SubmitBlocked, SubmitOutcome};
use crate::tui::events::NotificationLevel;
use crate::tui::services::Services;

const LABEL_WIDTH: usize = 18;

// ── Data types ─────────────────────────────────────────────────────────────

struct CatalogMessage {
    generation: u64,
    products: Result<Vec<Product>>,
    couriers: Result<Vec<CourierService>>,
}

struct SubmitMessage {
    generation: u64,
    outcome: SubmitOutcome,
}

/// Focusable sections, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Catalog,
    Address,
    PinCode,
    LocationType,
    Courier,
    Phone,
    Submit,
}

impl FormFocus {
    const ORDER: [FormFocus; 7] = [
        FormFocus::Catalog,
        FormFocus::Address,
        FormFocus::PinCode,
        FormFocus::LocationType,
        FormFocus::Courier,
        FormFocus::Phone,
        FormFocus::Submit,
    ];

    fn next(self) -> Self {
        let idx = Self::ORDER.iter().position(|&f| f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        let idx = Self::ORDER.iter().position(|&f| f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    fn is_text(self) -> bool {
        matches!(self, FormFocus::Address | FormFocus::PinCode | FormFocus::Phone)
    }

    fn label(self) -> &'static str {
        match self {
            FormFocus::Catalog => "Products",
            FormFocus::Address => "Delivery Address:",
            FormFocus::PinCode => "Pin Code:",
            FormFocus::LocationType => "Location Type:",
            FormFocus::Courier => "Courier Service:",
            FormFocus::Phone => "Phone Number:",
            FormFocus::Submit => "Place Order",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into a text field.
    Insert,
    /// Typing a quantity for the selected product.
    Quantity,
}

// ── State ──────────────────────────────────────────────────────────────────

pub struct ProductsViewState {
    products: Vec<Product>,
    couriers: Vec<CourierService>,
    draft: OrderDraft,
    selected: usize,
    focus: FormFocus,
    mode: InputMode,
    address_input: InputBuffer,
    pin_input: InputBuffer,
    phone_input: InputBuffer,
    quantity_input: InputBuffer,
    courier_idx: Option<usize>,
    /// Inline message under the PIN field.
    pin_error: Option<String>,
    loading: bool,
    submitting: bool,
    catalog_generation: u64,
    submit_generation: u64,
    catalog_rx: mpsc::UnboundedReceiver<CatalogMessage>,
    catalog_tx: mpsc::UnboundedSender<CatalogMessage>,
    submit_rx: mpsc::UnboundedReceiver<SubmitMessage>,
    submit_tx: mpsc::UnboundedSender<SubmitMessage>,
}

impl ProductsViewState {
    pub fn new(customer_id: i64) -> Self {
        let (catalog_tx, catalog_rx) = mpsc::unbounded_channel();
        let (submit_tx, submit_rx) = mpsc::unbounded_channel();
        Self {
            products: Vec::new(),
            couriers: Vec::new(),
            draft: OrderDraft::new(customer_id),
            selected: 0,
            focus: FormFocus::Catalog,
            mode: InputMode::Normal,
            address_input: InputBuffer::new().with_max_chars(200),
            pin_input: InputBuffer::new()
                .with_filter(CharFilter::Digits)
                .with_max_chars(6),
            phone_input: InputBuffer::new()
                .with_filter(CharFilter::Phone)
                .with_max_chars(20),
            quantity_input: InputBuffer::new()
                .with_filter(CharFilter::Digits)
                .with_max_chars(6),
            courier_idx: None,
            pin_error: None,
            loading: false,
            submitting: false,
            catalog_generation: 0,
            submit_generation: 0,
            catalog_rx,
            catalog_tx,
            submit_rx,
            submit_tx,
        }
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn couriers(&self) -> &[CourierService] {
        &self.couriers
    }

    pub fn pin_error(&self) -> Option<&str> {
        self.pin_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn input_mode(&self) -> InputMode {
        self.mode
    }

    /// Courier name for an id, if the list has it.
    pub fn courier_name(&self, id: i64) -> Option<&str> {
        self.couriers
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    // ── Loading ────────────────────────────────────────────────────────────

    /// Fetch the catalog and couriers concurrently.
    pub fn load(&mut self, services: &Services) {
        self.catalog_generation += 1;
        self.loading = true;
        let generation = self.catalog_generation;
        let tx = self.catalog_tx.clone();
        let api = services.api.clone();

        tokio::spawn(async move {
            let (products, couriers) = tokio::join!(api.products(), api.courier_services());
            let _ = tx.send(CatalogMessage {
                generation,
                products,
                couriers,
            });
        });
    }

    /// Drain task results. Returns the draft once a submission is accepted.
    pub fn poll(&mut self, services: &Services) -> Option<OrderDraft> {
        while let Ok(msg) = self.catalog_rx.try_recv() {
            if msg.generation != self.catalog_generation {
                continue;
            }
            self.apply_catalog(msg, services);
        }

        let mut accepted = None;
        while let Ok(msg) = self.submit_rx.try_recv() {
            if msg.generation != self.submit_generation || !self.submitting {
                log::debug!("Dropping stale submission result");
                continue;
            }
            self.submitting = false;
            match msg.outcome {
                Ok(draft) => {
                    self.pin_error = None;
                    log::info!(
                        "Order draft accepted: {} item(s), total {:.2}",
                        draft.items().len(),
                        draft.total_price()
                    );
                    accepted = Some(draft);
                }
                Err(blocked @ SubmitBlocked::Incomplete(_)) => {
                    services.notify(NotificationLevel::Warning, blocked.to_string());
                }
                Err(blocked @ SubmitBlocked::InvalidPinCode) => {
                    self.pin_error = Some(blocked.to_string());
                }
            }
        }
        accepted
    }

    fn apply_catalog(&mut self, msg: CatalogMessage, services: &Services) {
        self.loading = false;

        match msg.products {
            Ok(products) => {
                log::info!("Loaded {} product(s)", products.len());
                self.products = products;
            }
            Err(e) => {
                log::error!("Product fetch failed: {e}");
                self.products.clear();
                services.notify(
                    NotificationLevel::Error,
                    format!("Failed to load products: {}", e.user_message()),
                );
            }
        }
        self.selected = self.selected.min(self.products.len().saturating_sub(1));

        match msg.couriers {
            Ok(couriers) => {
                let keep = self.draft.courier_service_id;
                self.couriers = couriers;
                self.courier_idx = keep.and_then(|id| self.couriers.iter().position(|c| c.id == id));
            }
            Err(e) => {
                log::error!("Courier fetch failed: {e}");
                self.couriers.clear();
                self.courier_idx = None;
                services.notify(
                    NotificationLevel::Error,
                    format!("Failed to load courier services: {}", e.user_message()),
                );
            }
        }
        self.draft.courier_service_id = self.courier_idx.map(|i| self.couriers[i].id);
    }

    // ── Draft editing ──────────────────────────────────────────────────────

    /// Any edit makes an in-flight submission stale.
    fn draft_changed(&mut self) {
        if self.submitting {
            self.submitting = false;
            self.submit_generation += 1;
        }
    }

    fn adjust_quantity(&mut self, delta: i64) {
        let Some(product) = self.products.get(self.selected) else {
            return;
        };
        let current = self.draft.quantity_of(product.id);
        let product = product.clone();
        self.draft.set_quantity(&product, current + delta);
        self.draft_changed();
    }

    fn commit_quantity(&mut self) {
        let text = self.quantity_input.text().to_string();
        self.quantity_input.clear();
        self.mode = InputMode::Normal;

        let Some(product) = self.products.get(self.selected).cloned() else {
            return;
        };
        let requested = text.trim().parse::<i64>().unwrap_or(0);
        let applied = self.draft.set_quantity(&product, requested);
        if applied != requested {
            log::debug!(
                "Quantity for {} clamped from {requested} to {applied}",
                product.name
            );
        }
        self.draft_changed();
    }

    fn text_input_mut(&mut self, field: FormFocus) -> Option<&mut InputBuffer> {
        match field {
            FormFocus::Address => Some(&mut self.address_input),
            FormFocus::PinCode => Some(&mut self.pin_input),
            FormFocus::Phone => Some(&mut self.phone_input),
            _ => None,
        }
    }

    fn sync_text_fields(&mut self) {
        self.draft.shipping_address = self.address_input.text().to_string();
        self.draft.pin_code = self.pin_input.text().to_string();
        self.draft.phone_number = self.phone_input.text().to_string();
        self.draft_changed();
    }

    fn cycle_location(&mut self, forward: bool) {
        self.draft.location_type = LocationType::cycle(self.draft.location_type, forward);
        self.draft_changed();
    }

    fn cycle_courier(&mut self, forward: bool) {
        let n = self.couriers.len();
        if n == 0 {
            return;
        }
        self.courier_idx = match (self.courier_idx, forward) {
            (None, true) => Some(0),
            (None, false) => Some(n - 1),
            (Some(i), true) if i + 1 < n => Some(i + 1),
            (Some(i), false) if i > 0 => Some(i - 1),
            (Some(_), _) => None,
        };
        self.draft.courier_service_id = self.courier_idx.map(|i| self.couriers[i].id);
        self.draft_changed();
    }

    /// Validate and look up the PIN on a task; the result lands in `poll`.
    pub fn submit(&mut self, services: &Services) {
        if self.submitting {
            return;
        }
        self.sync_text_fields();
        self.submit_generation += 1;
        self.submitting = true;

        let generation = self.submit_generation;
        let draft = self.draft.clone();
        let postal = services.postal.clone();
        let tx = self.submit_tx.clone();
        tokio::spawn(async move {
            let outcome = submit_order(&draft, postal.as_ref()).await;
            let _ = tx.send(SubmitMessage {
                generation,
                outcome,
            });
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

        if *modifiers == KeyModifiers::CONTROL && *code == KeyCode::Char('s') {
            if self.mode == InputMode::Quantity {
                self.commit_quantity();
            }
            self.mode = InputMode::Normal;
            self.submit(services);
            return true;
        }

        match self.mode {
            InputMode::Insert => {
                self.handle_insert_key(*code);
                true
            }
            InputMode::Quantity => {
                self.handle_quantity_key(*code);
                true
            }
            InputMode::Normal => self.handle_normal_key(*modifiers, *code, services),
        }
    }

    fn handle_insert_key(&mut self, code: KeyCode) {
        let field = self.focus;
        match code {
            KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Enter => {
                self.mode = InputMode::Normal;
                self.focus = self.focus.next();
            }
            other => {
                if let Some(input) = self.text_input_mut(field) {
                    match other {
                        KeyCode::Char(c) => {
                            input.insert_char(c);
                        }
                        KeyCode::Backspace => input.backspace(),
                        KeyCode::Delete => input.delete(),
                        KeyCode::Left => input.move_left(),
                        KeyCode::Right => input.move_right(),
                        KeyCode::Home => input.move_home(),
                        KeyCode::End => input.move_end(),
                        _ => return,
                    }
                }
            }
        }
        self.sync_text_fields();
    }

    fn handle_quantity_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.commit_quantity(),
            KeyCode::Esc => {
                self.quantity_input.clear();
                self.mode = InputMode::Normal;
            }
            KeyCode::Char(c) => {
                self.quantity_input.insert_char(c);
            }
            KeyCode::Backspace => self.quantity_input.backspace(),
            _ => {}
        }
    }

    fn handle_normal_key(
        &mut self,
        modifiers: KeyModifiers,
        code: KeyCode,
        services: &Services,
    ) -> bool {
        match (modifiers, code) {
            (KeyModifiers::NONE, KeyCode::Tab) => {
                self.focus = self.focus.next();
                return true;
            }
            (KeyModifiers::SHIFT, KeyCode::BackTab) | (KeyModifiers::NONE, KeyCode::BackTab) => {
                self.focus = self.focus.prev();
                return true;
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) if self.focus == FormFocus::Catalog => {
                self.load(services);
                return true;
            }
            _ => {}
        }

        match self.focus {
            FormFocus::Catalog => match code {
                KeyCode::Char('j') | KeyCode::Down => {
                    if self.selected + 1 < self.products.len() {
                        self.selected += 1;
                    }
                    true
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.selected = self.selected.saturating_sub(1);
                    true
                }
                KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char('l') | KeyCode::Right => {
                    self.adjust_quantity(1);
                    true
                }
                KeyCode::Char('-') | KeyCode::Char('h') | KeyCode::Left => {
                    self.adjust_quantity(-1);
                    true
                }
                KeyCode::Char('0') => {
                    if let Some(product) = self.products.get(self.selected).cloned() {
                        self.draft.set_quantity(&product, 0);
                        self.draft_changed();
                    }
                    true
                }
                KeyCode::Enter | KeyCode::Char('i') if !self.products.is_empty() => {
                    self.quantity_input.clear();
                    self.mode = InputMode::Quantity;
                    true
                }
                _ => false,
            },
            field if field.is_text() => match code {
                KeyCode::Enter | KeyCode::Char('i') | KeyCode::Char('a') => {
                    self.mode = InputMode::Insert;
                    true
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    self.focus = self.focus.next();
                    true
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.focus = self.focus.prev();
                    true
                }
                _ => false,
            },
            FormFocus::LocationType | FormFocus::Courier => {
                let forward = match code {
                    KeyCode::Char('l') | KeyCode::Right | KeyCode::Char(' ') | KeyCode::Enter => {
                        true
                    }
                    KeyCode::Char('h') | KeyCode::Left => false,
                    KeyCode::Char('j') | KeyCode::Down => {
                        self.focus = self.focus.next();
                        return true;
                    }
                    KeyCode::Char('k') | KeyCode::Up => {
                        self.focus = self.focus.prev();
                        return true;
                    }
                    _ => return false,
                };
                if self.focus == FormFocus::LocationType {
                    self.cycle_location(forward);
                } else {
                    self.cycle_courier(forward);
                }
                true
            }
            FormFocus::Submit => match code {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.submit(services);
                    true
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.focus = self.focus.prev();
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    // ── Rendering ──────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let table_height = (self.products.len() as u16 + 4)
            .min(area.height / 2)
            .max(6);
        let [table_area, form_area] =
            Layout::vertical([Constraint::Length(table_height), Constraint::Min(10)]).areas(area);

        self.render_catalog(frame, table_area);
        self.render_form(frame, form_area);
    }

    fn render_catalog(&self, frame: &mut Frame, area: Rect) {
        let title = if self.loading {
            "Products Overview (loading…)"
        } else {
            "Products Overview"
        };
        let block = if self.focus == FormFocus::Catalog {
            theme::block_focused(title)
        } else {
            theme::block_default(title)
        };

        if self.products.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let text = if self.loading {
                " Loading..."
            } else {
                " No products available  [r] reload"
            };
            frame.render_widget(Paragraph::new(Span::styled(text, theme::muted())), inner);
            return;
        }

        let header = Row::new(["Product", "Price", "Weight", "Quantity Available", "Quantity to Order"])
            .style(theme::heading());

        let rows = self.products.iter().enumerate().map(|(i, p)| {
            let qty = self.draft.quantity_of(p.id);
            let qty_cell = if self.mode == InputMode::Quantity && i == self.selected {
                Cell::from(Span::styled(
                    format!("{}▏", self.quantity_input.text()),
                    Style::default().fg(theme::ACCENT),
                ))
            } else if qty > 0 {
                Cell::from(Span::styled(qty.to_string(), Style::default().fg(theme::SUCCESS)))
            } else {
                Cell::from(Span::styled("0", theme::dim()))
            };
            Row::new(vec![
                Cell::from(p.name.clone()),
                Cell::from(format!("${}", format_value(p.price))),
                Cell::from(format_value(p.weight)),
                Cell::from(p.available_quantity.to_string()),
                qty_cell,
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Min(16),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Length(19),
                Constraint::Length(18),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(theme::highlight())
        .highlight_symbol("▸ ");

        let mut state = TableState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn field_line(&self, field: FormFocus, value: Span<'static>) -> Line<'static> {
        let focused = self.focus == field;
        let label_style = if focused {
            theme::highlight()
        } else {
            theme::muted()
        };
        Line::from(vec![
            Span::styled(if focused { "▸ " } else { "  " }, Style::default().fg(theme::ACCENT)),
            Span::styled(format!("{:<width$}", field.label(), width = LABEL_WIDTH), label_style),
            value,
        ])
    }

    fn text_value(&self, input: &InputBuffer, field: FormFocus) -> Span<'static> {
        let editing = self.mode == InputMode::Insert && self.focus == field;
        if input.text().is_empty() && !editing {
            Span::styled("(required)", theme::dim())
        } else {
            let style = if editing {
                Style::default()
                    .fg(theme::TEXT)
                    .add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default().fg(theme::TEXT)
            };
            Span::styled(input.text().to_string(), style)
        }
    }

    fn choice_value(text: Option<String>, placeholder: &'static str) -> Span<'static> {
        match text {
            Some(t) => Span::styled(format!("‹ {t} ›"), Style::default().fg(theme::TEXT)),
            None => Span::styled(format!("‹ {placeholder} ›"), theme::dim()),
        }
    }

    /// Form lines plus the row each text field sits on.
    fn form_lines(&self) -> (Vec<Line<'static>>, Vec<(FormFocus, u16)>) {
        let mut lines = Vec::new();
        let mut rows = Vec::new();

        rows.push((FormFocus::Address, lines.len() as u16));
        lines.push(self.field_line(
            FormFocus::Address,
            self.text_value(&self.address_input, FormFocus::Address),
        ));

        rows.push((FormFocus::PinCode, lines.len() as u16));
        lines.push(self.field_line(
            FormFocus::PinCode,
            self.text_value(&self.pin_input, FormFocus::PinCode),
        ));
        if let Some(err) = &self.pin_error {
            lines.push(Line::from(vec![
                Span::raw(" ".repeat(LABEL_WIDTH + 2)),
                Span::styled(err.clone(), theme::error_text()),
            ]));
        }

        lines.push(self.field_line(
            FormFocus::LocationType,
            Self::choice_value(
                self.draft.location_type.map(|l| l.label().to_string()),
                "Select Location Type",
            ),
        ));
        lines.push(self.field_line(
            FormFocus::Courier,
            Self::choice_value(
                self.courier_idx
                    .and_then(|i| self.couriers.get(i))
                    .map(|c| c.name.clone()),
                "Select Courier Service",
            ),
        ));

        rows.push((FormFocus::Phone, lines.len() as u16));
        lines.push(self.field_line(
            FormFocus::Phone,
            self.text_value(&self.phone_input, FormFocus::Phone),
        ));

        lines.push(Line::raw(""));
        let button_style = if self.focus == FormFocus::Submit {
            theme::brand_badge()
        } else {
            Style::default().fg(theme::ACCENT)
        };
        let button = if self.submitting {
            " Checking PIN code… "
        } else {
            " Place Order "
        };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("[{button}]"), button_style),
            Span::raw("   "),
            Span::styled(
                format!(
                    "Items {} · Units {} · Total ${:.2} · Weight {}",
                    self.draft.items().len(),
                    self.draft.total_units(),
                    self.draft.total_price(),
                    format_value(self.draft.total_weight()),
                ),
                theme::muted(),
            ),
        ]));

        lines.push(Line::raw(""));
        let hint = match self.mode {
            InputMode::Insert => "[Esc] done  [Enter] next field  [Ctrl+S] place order",
            InputMode::Quantity => "Type a quantity  [Enter] apply  [Esc] cancel",
            InputMode::Normal => {
                "[Tab] next section  [j/k] move  [+/-] quantity  [Enter] edit  [h/l] choose  [Ctrl+S] place order"
            }
        };
        lines.push(Line::from(Span::styled(format!("  {hint}"), theme::key_hint())));

        (lines, rows)
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let block = if self.focus == FormFocus::Catalog {
            theme::block_default("Delivery Details")
        } else {
            theme::block_focused("Delivery Details")
        };
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let (lines, rows) = self.form_lines();
        frame.render_widget(Paragraph::new(lines), inner);

        if self.mode == InputMode::Insert {
            let cursor = rows.iter().find(|(f, _)| *f == self.focus).and_then(|(f, row)| {
                let input = match f {
                    FormFocus::Address => &self.address_input,
                    FormFocus::PinCode => &self.pin_input,
                    FormFocus::Phone => &self.phone_input,
                    _ => return None,
                };
                Some((input.cursor_column(), *row))
            });
            if let Some((col, row)) = cursor {
                let x = inner.x + (LABEL_WIDTH + 2 + col) as u16;
                if row < inner.height {
                    frame.set_cursor_position(Position::new(
                        x.min(inner.right().saturating_sub(1)),
                        inner.y + row,
                    ));
                }
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
