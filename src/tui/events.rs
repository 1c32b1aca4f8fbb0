/// Events flowing through the Elm-architecture event loop.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Raw terminal input (keyboard/mouse).
    Input(crossterm::event::Event),
    /// Notification to display to the user.
    Notification(Notification),
}

/// High-level actions resolved from global keybindings and the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Navigation
    FocusAnalytics,
    FocusProducts,
    FocusPreview,
    TabNext,
    TabPrev,
    ToggleSidebar,

    // Modals
    ShowHelp,
    CloseHelp,

    // Application
    Quit,
}

/// Which top-level view has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Focus {
    Analytics,
    Products,
    OrderPreview,
}

impl Focus {
    pub const ALL: [Focus; 3] = [Focus::Analytics, Focus::Products, Focus::OrderPreview];

    pub fn label(self) -> &'static str {
        match self {
            Focus::Analytics => "Analytics",
            Focus::Products => "Products",
            Focus::OrderPreview => "Order Preview",
        }
    }

    /// Single-glyph icon for the collapsed sidebar.
    pub fn icon(self) -> &'static str {
        match self {
            Focus::Analytics => "◔",
            Focus::Products => "▤",
            Focus::OrderPreview => "✓",
        }
    }

    pub fn group(self) -> SidebarGroup {
        match self {
            Focus::Analytics => SidebarGroup::Reports,
            Focus::Products | Focus::OrderPreview => SidebarGroup::Orders,
        }
    }

    pub fn to_action(self) -> Action {
        match self {
            Focus::Analytics => Action::FocusAnalytics,
            Focus::Products => Action::FocusProducts,
            Focus::OrderPreview => Action::FocusPreview,
        }
    }

    pub fn next(self) -> Focus {
        let idx = Focus::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Focus::ALL[(idx + 1) % Focus::ALL.len()]
    }

    pub fn prev(self) -> Focus {
        let idx = Focus::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Focus::ALL[(idx + Focus::ALL.len() - 1) % Focus::ALL.len()]
    }
}

/// Sidebar sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarGroup {
    Reports,
    Orders,
}

impl SidebarGroup {
    pub const ALL: [SidebarGroup; 2] = [SidebarGroup::Reports, SidebarGroup::Orders];

    pub fn label(self) -> &'static str {
        match self {
            SidebarGroup::Reports => "REPORTS",
            SidebarGroup::Orders => "ORDERS",
        }
    }

    pub fn views(self) -> &'static [Focus] {
        match self {
            SidebarGroup::Reports => &[Focus::Analytics],
            SidebarGroup::Orders => &[Focus::Products, Focus::OrderPreview],
        }
    }
}

/// Whether the sidebar or the main content receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaFocus {
    Sidebar,
    Main,
}

/// Notification level for the overlay system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A timed notification shown in the overlay.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    /// Ticks remaining before auto-dismiss.
    pub ttl_ticks: u32,
}

impl Notification {
    /// Default on-screen lifetime, in ticks.
    pub const DEFAULT_TTL: u32 = 100;

    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            ttl_ticks: Self::DEFAULT_TTL,
        }
    }
}
