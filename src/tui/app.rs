use std::io;
use std::time::Duration;

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use super::events::{Action, AppEvent, AreaFocus, Focus, Notification, NotificationLevel};
use super::layout::{centered_rect, AppLayout};
use super::services::Services;
use super::sidebar::SidebarState;
use super::theme;
use super::views::analytics::AnalyticsViewState;
use super::views::order_preview::{OrderPreviewState, PreviewResult};
use super::views::products::{InputMode, ProductsViewState};

/// Most notifications on screen at once.
const MAX_NOTIFICATIONS: usize = 3;

/// Central application state (Elm architecture).
pub struct AppState {
    pub running: bool,
    /// Currently focused top-level view.
    pub focus: Focus,
    /// Whether sidebar or main content has input focus.
    pub area_focus: AreaFocus,
    pub sidebar: SidebarState,
    pub analytics: AnalyticsViewState,
    pub products: ProductsViewState,
    pub preview: OrderPreviewState,
    /// Active notifications, oldest first.
    pub notifications: Vec<Notification>,
    pub show_help: bool,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    services: Services,
}

impl AppState {
    pub fn new(event_rx: mpsc::UnboundedReceiver<AppEvent>, services: Services) -> Self {
        Self {
            running: true,
            focus: Focus::Analytics,
            area_focus: AreaFocus::Main,
            sidebar: SidebarState::new(),
            analytics: AnalyticsViewState::new(),
            products: ProductsViewState::new(services.customer_id),
            preview: OrderPreviewState::new(),
            notifications: Vec::new(),
            show_help: false,
            event_rx,
            services,
        }
    }

    // ── Elm event loop ──────────────────────────────────────────────────

    /// Main event loop: render → select → update → loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        let mut tick_interval = tokio::time::interval(tick_rate);
        let mut event_stream = EventStream::new();

        self.on_focus_entered();

        while self.running {
            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                _ = tick_interval.tick() => {
                    self.on_tick();
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
                Some(Ok(crossterm_event)) = event_stream.next() => {
                    self.handle_event(AppEvent::Input(crossterm_event));
                }
            }
        }

        self.analytics.unload();
        Ok(())
    }

    // ── Event handling ──────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(input) => self.handle_input(input),
            AppEvent::Notification(notification) => {
                self.push_notification(notification.message, notification.level);
            }
        }
    }

    fn handle_input(&mut self, input: Event) {
        let input = match input {
            Event::Mouse(mouse) => match scroll_as_key(mouse) {
                Some(key) => key,
                None => return,
            },
            other => other,
        };

        // Priority 1: help modal
        if self.show_help {
            if let Event::Key(KeyEvent {
                code: KeyCode::Esc | KeyCode::Char('?'),
                kind: KeyEventKind::Press,
                ..
            }) = input
            {
                self.handle_action(Action::CloseHelp);
            }
            return;
        }

        // Priority 2: sidebar (when focused)
        if self.area_focus == AreaFocus::Sidebar && self.handle_sidebar_input(&input) {
            return;
        }

        // Priority 3: focused view
        if self.dispatch_view_input(&input) {
            return;
        }

        // Priority 4: global keybindings
        if let Some(action) = map_input_to_action(&input) {
            self.handle_action(action);
        }
    }

    /// Returns true if the focused view consumed the input.
    fn dispatch_view_input(&mut self, event: &Event) -> bool {
        match self.focus {
            Focus::Analytics => self.analytics.handle_input(event, &self.services),
            Focus::Products => self.products.handle_input(event, &self.services),
            Focus::OrderPreview => match self.preview.handle_input(event) {
                Some(PreviewResult::Consumed) => true,
                Some(PreviewResult::Back) => {
                    self.handle_action(Action::FocusProducts);
                    true
                }
                None => false,
            },
        }
    }

    fn handle_sidebar_input(&mut self, event: &Event) -> bool {
        let Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        match code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.sidebar.select_next();
                true
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.sidebar.select_prev();
                true
            }
            KeyCode::Enter | KeyCode::Char('l') => {
                let focus = self.sidebar.selected_focus();
                self.handle_action(focus.to_action());
                self.area_focus = AreaFocus::Main;
                true
            }
            KeyCode::Char('h') => {
                self.sidebar.user_collapsed = true;
                self.area_focus = AreaFocus::Main;
                true
            }
            KeyCode::Esc => {
                self.area_focus = AreaFocus::Main;
                true
            }
            _ => false,
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::FocusAnalytics => self.set_focus(Focus::Analytics),
            Action::FocusProducts => self.set_focus(Focus::Products),
            Action::FocusPreview => self.set_focus(Focus::OrderPreview),
            Action::TabNext => self.set_focus(self.focus.next()),
            Action::TabPrev => self.set_focus(self.focus.prev()),
            Action::ToggleSidebar => {
                self.sidebar.toggle_collapse();
                if !self.sidebar.user_collapsed {
                    self.area_focus = AreaFocus::Sidebar;
                    self.sidebar.sync_to_focus(self.focus);
                }
            }
            Action::ShowHelp => self.show_help = true,
            Action::CloseHelp => self.show_help = false,
        }
    }

    /// Switch views, tearing down the old one and loading the new one.
    fn set_focus(&mut self, focus: Focus) {
        self.area_focus = AreaFocus::Main;
        self.sidebar.sync_to_focus(focus);
        if focus == self.focus {
            return;
        }
        if self.focus == Focus::Analytics {
            self.analytics.unload();
        }
        self.focus = focus;
        self.on_focus_entered();
    }

    fn on_focus_entered(&mut self) {
        match self.focus {
            Focus::Analytics => self.analytics.load(&self.services),
            Focus::Products => self.products.load(&self.services),
            Focus::OrderPreview => {}
        }
    }

    // ── Notifications ───────────────────────────────────────────────────

    /// Push a notification (dedup by message, at most three visible).
    pub fn push_notification(&mut self, message: String, level: NotificationLevel) {
        if self.notifications.iter().any(|n| n.message == message) {
            return;
        }

        self.notifications.push(Notification::new(level, message));

        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
    }

    /// Tick: expire notifications, drain view channels.
    pub fn on_tick(&mut self) {
        for n in &mut self.notifications {
            n.ttl_ticks = n.ttl_ticks.saturating_sub(1);
        }
        self.notifications.retain(|n| n.ttl_ticks > 0);

        self.analytics.poll(&self.services);
        if let Some(draft) = self.products.poll(&self.services) {
            let courier = draft
                .courier_service_id
                .and_then(|id| self.products.courier_name(id))
                .map(str::to_string);
            self.preview.show(draft, courier);
            self.set_focus(Focus::OrderPreview);
        }
    }

    // ── Rendering ───────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let (layout, visibility) = AppLayout::compute(area, self.sidebar.user_collapsed);

        if let Some(sidebar_area) = layout.sidebar {
            self.sidebar
                .render(frame, sidebar_area, visibility, self.focus, self.area_focus);
        }

        match self.focus {
            Focus::Analytics => self.analytics.render(frame, layout.main),
            Focus::Products => self.products.render(frame, layout.main),
            Focus::OrderPreview => self.preview.render(frame, layout.main),
        }

        self.render_status_bar(frame, layout.status);
        self.render_notifications(frame, area);

        if self.show_help {
            render_help_modal(frame, area);
        }
    }

    fn is_typing(&self) -> bool {
        match self.focus {
            Focus::Analytics => self.analytics.is_editing(),
            Focus::Products => self.products.input_mode() != InputMode::Normal,
            Focus::OrderPreview => false,
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let busy = self.analytics.is_loading()
            || self.products.is_loading()
            || self.products.is_submitting();
        let activity = if busy {
            Span::styled("working", Style::default().fg(theme::PRIMARY_LIGHT))
        } else {
            Span::styled("ready", theme::muted())
        };

        let mode = if self.is_typing() {
            Span::styled(" INSERT ", theme::insert_badge())
        } else {
            Span::raw("")
        };

        let status = Line::from(vec![
            Span::styled(" STOCKDESK ", theme::brand_badge()),
            Span::raw(" "),
            mode,
            Span::raw(" "),
            Span::styled(
                self.focus.label(),
                Style::default()
                    .fg(theme::PRIMARY_LIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" │ "),
            activity,
            Span::raw(" │ "),
            Span::styled("1-3", theme::key_hint()),
            Span::raw(":view "),
            Span::styled("Ctrl+B", theme::key_hint()),
            Span::raw(":sidebar "),
            Span::styled("?", theme::key_hint()),
            Span::raw(":help "),
            Span::styled("q", theme::key_hint()),
            Span::raw(":quit"),
        ]);

        frame.render_widget(Paragraph::new(status), area);
    }

    fn render_notifications(&self, frame: &mut Frame, area: Rect) {
        if self.notifications.is_empty() {
            return;
        }

        let width = 70.min(area.width.saturating_sub(2));
        let height = (self.notifications.len() as u16).min(area.height);
        let x = area.width.saturating_sub(width + 1);
        let region = Rect::new(x, 1.min(area.height.saturating_sub(height)), width, height);

        let lines: Vec<Line> = self
            .notifications
            .iter()
            .map(|n| {
                let (prefix, color) = match n.level {
                    NotificationLevel::Info => ("ℹ", theme::INFO),
                    NotificationLevel::Success => ("✓", theme::SUCCESS),
                    NotificationLevel::Warning => ("⚠", theme::WARNING),
                    NotificationLevel::Error => ("✗", theme::ERROR),
                };
                Line::from(vec![
                    Span::styled(
                        format!(" {prefix} "),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(n.message.as_str()),
                ])
            })
            .collect();

        frame.render_widget(Clear, region);
        frame.render_widget(
            Paragraph::new(lines).style(Style::default().bg(theme::BG_SURFACE)),
            region,
        );
    }
}

fn map_input_to_action(event: &Event) -> Option<Action> {
    let Event::Key(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        ..
    }) = event
    else {
        return None;
    };

    match (*modifiers, *code) {
        (KeyModifiers::CONTROL, KeyCode::Char('b')) => Some(Action::ToggleSidebar),
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Action::Quit),
        (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => match code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('?') => Some(Action::ShowHelp),
            KeyCode::Tab => Some(Action::TabNext),
            KeyCode::BackTab => Some(Action::TabPrev),
            KeyCode::Char('1') => Some(Action::FocusAnalytics),
            KeyCode::Char('2') => Some(Action::FocusProducts),
            KeyCode::Char('3') => Some(Action::FocusPreview),
            _ => None,
        },
        _ => None,
    }
}

/// Mouse wheel scrolls like `j`/`k`.
fn scroll_as_key(mouse: MouseEvent) -> Option<Event> {
    let code = match mouse.kind {
        MouseEventKind::ScrollDown => KeyCode::Down,
        MouseEventKind::ScrollUp => KeyCode::Up,
        _ => return None,
    };
    Some(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

fn render_help_modal(frame: &mut Frame, area: Rect) {
    let modal = centered_rect(60, 80, area);

    let keybindings = [
        ("Global:", ""),
        ("q / Ctrl+C", "Quit"),
        ("?", "Toggle this help"),
        ("1 / 2 / 3", "Analytics / Products / Order Preview"),
        ("Tab / Shift+Tab", "Next / previous view (not on Products)"),
        ("Ctrl+B", "Toggle sidebar"),
        ("", ""),
        ("Analytics:", ""),
        ("s / e", "Edit start / end date"),
        ("Enter", "Apply dates and reload"),
        ("r", "Reload charts"),
        ("j / k", "Highlight pie slice"),
        ("", ""),
        ("Products:", ""),
        ("Tab / Shift+Tab", "Next / previous form section"),
        ("j / k", "Move through products"),
        ("+ / -", "Change quantity"),
        ("Enter", "Type quantity / edit field"),
        ("h / l", "Choose location type or courier"),
        ("Ctrl+S", "Place order"),
        ("r", "Reload catalog"),
        ("", ""),
        ("Order Preview:", ""),
        ("Esc / b", "Back to the order form"),
    ];

    let mut lines = vec![
        Line::raw(""),
        Line::from(Span::styled(" Keybindings", theme::title())),
        Line::raw(""),
    ];

    for (key, desc) in keybindings {
        if key.is_empty() {
            lines.push(Line::raw(""));
        } else if desc.is_empty() {
            lines.push(Line::from(Span::styled(format!("  {key}"), theme::title())));
        } else {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    format!("{key:<18}"),
                    Style::default()
                        .fg(theme::PRIMARY_LIGHT)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(desc),
            ]));
        }
    }

    let block = Block::default()
        .title(" Help ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT));

    frame.render_widget(Clear, modal);
    frame.render_widget(Paragraph::new(lines).block(block), modal);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::api::MockInventoryApi;
    use crate::core::postal::MockPinCodeValidator;

    fn app() -> AppState {
        let mut api = MockInventoryApi::new();
        api.expect_inventory_report()
            .returning(|_| Ok(Default::default()));
        api.expect_products().returning(|| Ok(Vec::new()));
        api.expect_courier_services().returning(|| Ok(Vec::new()));
        let (tx, rx) = mpsc::unbounded_channel();
        let services = Services::new(Arc::new(api), Arc::new(MockPinCodeValidator::new()), tx, 1);
        AppState::new(rx, services)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[test]
    fn test_notifications_dedup_and_cap() {
        let mut app = app();
        app.push_notification("a".into(), NotificationLevel::Info);
        app.push_notification("a".into(), NotificationLevel::Info);
        assert_eq!(app.notifications.len(), 1);

        for m in ["b", "c", "d"] {
            app.push_notification(m.into(), NotificationLevel::Warning);
        }
        let messages: Vec<&str> = app.notifications.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_notifications_expire() {
        let mut app = app();
        app.push_notification("gone soon".into(), NotificationLevel::Info);
        for _ in 0..Notification::DEFAULT_TTL {
            app.on_tick();
        }
        assert!(app.notifications.is_empty());
    }

    #[test]
    fn test_help_modal_swallows_keys() {
        let mut app = app();
        app.handle_event(key(KeyCode::Char('?')));
        assert!(app.show_help);
        app.handle_event(key(KeyCode::Char('q')));
        assert!(app.running);
        app.handle_event(key(KeyCode::Esc));
        assert!(!app.show_help);
    }

    #[tokio::test]
    async fn test_number_keys_switch_views() {
        let mut app = app();
        app.handle_event(key(KeyCode::Char('2')));
        assert_eq!(app.focus, Focus::Products);
        app.handle_event(key(KeyCode::Char('3')));
        assert_eq!(app.focus, Focus::OrderPreview);
        app.handle_event(key(KeyCode::Esc));
        assert_eq!(app.focus, Focus::Products);
    }

    #[tokio::test]
    async fn test_leaving_analytics_tears_down_charts() {
        let mut app = app();
        app.analytics.refresh(&app.services);
        app.handle_event(key(KeyCode::Char('2')));
        assert!(app.analytics.board().pie().is_empty());
        assert!(!app.analytics.is_loading());
    }

    #[tokio::test]
    async fn test_tab_on_products_stays_in_form() {
        let mut app = app();
        app.handle_event(key(KeyCode::Char('2')));
        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Products);

        app.handle_event(key(KeyCode::Char('1')));
        assert_eq!(app.focus, Focus::Analytics);
        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Products);
    }

    #[test]
    fn test_notification_event_is_shown() {
        let mut app = app();
        app.services.notify(NotificationLevel::Warning, "check the form");
        let event = app.event_rx.try_recv().unwrap();
        app.handle_event(event);
        assert_eq!(app.notifications.len(), 1);
        assert_eq!(app.notifications[0].level, NotificationLevel::Warning);
    }

    #[test]
    fn test_quit_key() {
        let mut app = app();
        app.handle_event(key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_scroll_maps_to_arrow_keys() {
        let mouse = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            scroll_as_key(mouse),
            Some(Event::Key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE)))
        );
    }
}
