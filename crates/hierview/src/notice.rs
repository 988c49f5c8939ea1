//! Informational notices shown alongside a rendered view.

use std::fmt;

use crate::view::ViewMode;

/// A message for the user that accompanies a rendered design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// What the active view mode shows.
    ModeDescription(ViewMode),

    /// Signal and IO connectivity between instances is not drawn.
    ConnectivityOmitted,
}

impl Notice {
    /// Notices for a non-empty design shown in `mode`.
    pub fn for_mode(mode: ViewMode) -> Vec<Notice> {
        match mode {
            ViewMode::Tree => vec![Notice::ModeDescription(mode)],
            ViewMode::Nested => vec![
                Notice::ModeDescription(mode),
                Notice::ConnectivityOmitted,
            ],
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModeDescription(ViewMode::Tree) => {
                write!(f, "Tree View - Shows module instantiations as a hierarchy tree")
            }
            Self::ModeDescription(ViewMode::Nested) => write!(
                f,
                "Nested View - Shows modules contained inside their parent modules"
            ),
            Self::ConnectivityOmitted => write!(
                f,
                "IO connections between modules are not represented; \
                 the design parser does not report them"
            ),
        }
    }
}
