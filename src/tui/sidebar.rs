//! Collapsible left sidebar listing the dashboard's views by group.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::events::{AreaFocus, Focus, SidebarGroup};
use super::layout::SidebarVisibility;
use super::theme;

pub struct SidebarState {
    /// Whether the user has toggled collapse (Ctrl+B).
    pub user_collapsed: bool,
    /// Highlighted index into `Focus::ALL`.
    pub selected: usize,
}

impl SidebarState {
    pub fn new() -> Self {
        Self {
            user_collapsed: false,
            selected: 0,
        }
    }

    pub fn toggle_collapse(&mut self) {
        self.user_collapsed = !self.user_collapsed;
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % Focus::ALL.len();
    }

    pub fn select_prev(&mut self) {
        self.selected = (self.selected + Focus::ALL.len() - 1) % Focus::ALL.len();
    }

    pub fn selected_focus(&self) -> Focus {
        Focus::ALL[self.selected % Focus::ALL.len()]
    }

    /// Keep the highlight on the active view after Tab navigation.
    pub fn sync_to_focus(&mut self, focus: Focus) {
        if let Some(idx) = Focus::ALL.iter().position(|&f| f == focus) {
            self.selected = idx;
        }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        visibility: SidebarVisibility,
        current: Focus,
        area_focus: AreaFocus,
    ) {
        let lines = match visibility {
            SidebarVisibility::Hidden => return,
            SidebarVisibility::Collapsed => self.collapsed_lines(current),
            SidebarVisibility::Expanded => {
                self.expanded_lines(area.width as usize, current, area_focus)
            }
        };

        let lines: Vec<Line> = lines.into_iter().take(area.height as usize).collect();
        frame.render_widget(
            Paragraph::new(lines).style(Style::default().bg(theme::BG_SURFACE)),
            area,
        );
    }

    fn collapsed_lines(&self, current: Focus) -> Vec<Line<'static>> {
        Focus::ALL
            .iter()
            .map(|&view| {
                let style = if view == current {
                    theme::highlight()
                } else {
                    theme::muted()
                };
                Line::from(Span::styled(format!(" {}", view.icon()), style))
            })
            .collect()
    }

    fn expanded_lines(
        &self,
        width: usize,
        current: Focus,
        area_focus: AreaFocus,
    ) -> Vec<Line<'static>> {
        let sidebar_focused = area_focus == AreaFocus::Sidebar;
        let mut lines = Vec::new();

        for group in SidebarGroup::ALL {
            lines.push(Line::from(Span::styled(
                format!(" {}", group.label()),
                theme::heading(),
            )));

            for &view in group.views() {
                let idx = Focus::ALL.iter().position(|&f| f == view).unwrap_or(0);
                let is_selected = sidebar_focused && idx == self.selected;
                let is_current = view == current;

                let prefix = if is_selected { "▸ " } else { "  " };
                let style = match (is_selected, is_current) {
                    (_, true) => theme::highlight(),
                    (true, false) => Style::default()
                        .fg(theme::TEXT)
                        .add_modifier(Modifier::BOLD),
                    (false, false) => theme::muted(),
                };

                let label = format!("{prefix}{} {}", view.icon(), view.label());
                lines.push(Line::from(Span::styled(
                    format!("{label:<width$}"),
                    style,
                )));
            }
            lines.push(Line::raw(""));
        }

        lines
    }
}

impl Default for SidebarState {
    fn default() -> Self {
        Self::new()
    }
}
