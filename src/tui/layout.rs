//! Frame layout: sidebar, main content and status bar, plus the regions
//! the dashboard and order views split their content into.

use ratatui::layout::{Constraint, Layout, Rect};

/// Width of the expanded sidebar (group headers + labeled items).
pub const SIDEBAR_EXPANDED_WIDTH: u16 = 22;
/// Width of the collapsed sidebar (single-char icons).
pub const SIDEBAR_COLLAPSED_WIDTH: u16 = 3;
/// Auto-collapse sidebar below this terminal width.
pub const AUTO_COLLAPSE_THRESHOLD: u16 = 80;
/// Hide sidebar entirely below this terminal width.
pub const HIDE_SIDEBAR_THRESHOLD: u16 = 30;
/// Charts sit side by side from this content width up.
pub const SIDE_BY_SIDE_CHARTS_WIDTH: u16 = 100;

/// Computed layout regions for a single frame.
pub struct AppLayout {
    /// Sidebar area (None if hidden).
    pub sidebar: Option<Rect>,
    /// Main content area.
    pub main: Rect,
    /// Status bar (bottom row).
    pub status: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarVisibility {
    Expanded,
    Collapsed,
    Hidden,
}

impl AppLayout {
    /// `user_collapsed` is the Ctrl+B preference; narrow terminals override it.
    pub fn compute(area: Rect, user_collapsed: bool) -> (Self, SidebarVisibility) {
        let visibility = if area.width < HIDE_SIDEBAR_THRESHOLD {
            SidebarVisibility::Hidden
        } else if user_collapsed || area.width < AUTO_COLLAPSE_THRESHOLD {
            SidebarVisibility::Collapsed
        } else {
            SidebarVisibility::Expanded
        };

        let [content, status] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

        let sidebar_width = match visibility {
            SidebarVisibility::Hidden => 0,
            SidebarVisibility::Collapsed => SIDEBAR_COLLAPSED_WIDTH,
            SidebarVisibility::Expanded => SIDEBAR_EXPANDED_WIDTH,
        };

        let (sidebar, main) = if sidebar_width == 0 {
            (None, content)
        } else {
            let [side, main] =
                Layout::horizontal([Constraint::Length(sidebar_width), Constraint::Min(1)])
                    .areas(content);
            (Some(side), main)
        };

        (AppLayout { sidebar, main, status }, visibility)
    }
}

/// Regions of the analytics view.
pub struct DashboardLayout {
    /// Date range inputs.
    pub controls: Rect,
    pub pie: Rect,
    pub bar: Rect,
}

impl DashboardLayout {
    pub fn compute(area: Rect) -> Self {
        let [controls, charts] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(4)]).areas(area);

        let [pie, bar] = if charts.width >= SIDE_BY_SIDE_CHARTS_WIDTH {
            Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
                .areas(charts)
        } else {
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(charts)
        };

        Self { controls, pie, bar }
    }
}

/// Calculate a centered rect using percentage of parent area.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);

    center
}
