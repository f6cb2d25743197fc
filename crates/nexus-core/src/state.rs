//! Shared state types used by the screen-level state holders.

/// Whether a refresh toggles the user-visible loading indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshMode {
    /// Update state without any indicator.
    Silent,
    /// Show the loading indicator for the duration of the fetch.
    Visible,
}

impl RefreshMode {
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }
}

/// Coarse load phase derived from a state holder's flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Refreshing,
    Failed,
}

impl LoadState {
    /// Loading wins over refreshing; an error only shows once both settle.
    pub const fn from_flags(is_loading: bool, is_refreshing: bool, has_error: bool) -> Self {
        if is_loading {
            Self::Loading
        } else if is_refreshing {
            Self::Refreshing
        } else if has_error {
            Self::Failed
        } else {
            Self::Idle
        }
    }

    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Loading | Self::Refreshing)
    }
}
