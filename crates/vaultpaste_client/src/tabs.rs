//! Create/history tab switching.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Create,
    History,
}

/// What the caller must do after a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabSwitch {
    /// Visibility changed (or stayed); nothing to load.
    Shown,
    /// The history tab became active and needs a fresh list.
    LoadHistory,
}

/// Two-state visibility switch. Exactly one tab is active.
#[derive(Debug, Clone, Default)]
pub struct TabController {
    active: Tab,
}

impl TabController {
    pub fn active(&self) -> Tab {
        self.active
    }

    /// Whether `tab` carries the "active" marker and its content is visible.
    pub fn is_active(&self, tab: Tab) -> bool {
        self.active == tab
    }

    /// Activate `tab`. Entering history always asks for a fresh load, even if
    /// it was already active.
    pub fn switch(&mut self, tab: Tab) -> TabSwitch {
        self.active = tab;
        match tab {
            Tab::Create => TabSwitch::Shown,
            Tab::History => TabSwitch::LoadHistory,
        }
    }
}
