//! Sub-widgets composed by a [`Select`](crate::Select).
//!
//! The select renders through three sub-widgets, each backed by a custom
//! element that becomes ready asynchronously:
//!
//! - a [`SelectButton`] showing the current value in single mode
//! - an [`OptionsList`] mirroring the native options, inline in multiple mode
//!   and inside the dropdown in single mode
//! - a [`TetheredPanel`] that floats the dropdown next to its anchor
//!
//! A [`SubWidgetFactory`] creates them, so embedders can swap any of the
//! defaults. The select only calls a sub-widget once its element is ready.
//! Sub-widget methods run while the select is mid-update and must not call
//! back into the select synchronously.

mod button;
mod options;
mod tethered;

use std::sync::Arc;

use horizon_select_core::{Document, ElementId, Signal};

pub use button::DefaultButton;
pub use options::DefaultOptionsList;
pub use tethered::DefaultTetheredPanel;

use crate::native::NativeSelect;

/// Which side of its anchor a tethered panel opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalAlignment {
    /// Above the anchor.
    Top,
    /// Below the anchor.
    Bottom,
}

impl VerticalAlignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// Direction hint shown by the button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpeningPosition {
    Up,
    Down,
}

impl OpeningPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl From<VerticalAlignment> for OpeningPosition {
    fn from(alignment: VerticalAlignment) -> Self {
        match alignment {
            VerticalAlignment::Top => Self::Up,
            VerticalAlignment::Bottom => Self::Down,
        }
    }
}

/// The single-mode button.
pub trait SelectButton: Send + Sync {
    fn element(&self) -> ElementId;

    /// Bind the native control the button displays.
    fn set_select_element(&self, select: &NativeSelect);

    /// Reflect whether the dropdown is open.
    fn set_open(&self, open: bool);

    /// Reflect which way the dropdown opens.
    fn set_opening_position(&self, position: OpeningPosition);
}

/// A list mirroring the native control's options.
pub trait OptionsList: Send + Sync {
    fn element(&self) -> ElementId;

    /// Mirror `select` as the data source.
    fn set_options(&self, select: &NativeSelect);
}

/// A floating panel positioned relative to an anchor element.
pub trait TetheredPanel: Send + Sync {
    fn element(&self) -> ElementId;

    /// Bind the panel to `anchor` and position it.
    fn set_tether(&self, anchor: ElementId);

    /// The current anchor.
    fn tether(&self) -> Option<ElementId>;

    fn min_bottom_space(&self) -> f32;

    /// Space the panel wants below its anchor before it opens upward.
    fn set_min_bottom_space(&self, pixels: f32);

    fn vertical_alignment(&self) -> VerticalAlignment;

    /// Emitted when [`vertical_alignment`](Self::vertical_alignment) changes.
    fn vertical_alignment_changed(&self) -> &Signal<VerticalAlignment>;

    /// Re-run positioning against the anchor and viewport.
    fn update_position(&self);
}

/// Creates the sub-widgets of a select.
pub trait SubWidgetFactory: Send + Sync {
    fn create_button(&self, doc: &Document) -> Arc<dyn SelectButton>;

    fn create_options_list(&self, doc: &Document) -> Arc<dyn OptionsList>;

    fn create_tethered_panel(&self, doc: &Document) -> Arc<dyn TetheredPanel>;
}

/// Factory for the built-in sub-widgets.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSubWidgets;

impl SubWidgetFactory for DefaultSubWidgets {
    fn create_button(&self, doc: &Document) -> Arc<dyn SelectButton> {
        DefaultButton::new(doc)
    }

    fn create_options_list(&self, doc: &Document) -> Arc<dyn OptionsList> {
        DefaultOptionsList::new(doc)
    }

    fn create_tethered_panel(&self, doc: &Document) -> Arc<dyn TetheredPanel> {
        DefaultTetheredPanel::new(doc)
    }
}
