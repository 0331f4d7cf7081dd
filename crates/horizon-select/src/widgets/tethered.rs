//! Default tethered panel.

use std::sync::Arc;

use horizon_select_core::logging::targets;
use horizon_select_core::{Document, DocumentError, ElementId, Rect, Signal};
use parking_lot::Mutex;

use super::{TetheredPanel, VerticalAlignment};
use crate::config::DEFAULT_MIN_BOTTOM_SPACE;
use crate::names;

struct PanelState {
    tether: Option<ElementId>,
    min_bottom_space: f32,
    alignment: VerticalAlignment,
}

/// Floats below its anchor, flipping above it when the viewport leaves less
/// than the minimum bottom space underneath and more room above.
///
/// Placement is written as inline `left`, `width` and `top` (below) or
/// `bottom` (above) styles in viewport pixels.
pub struct DefaultTetheredPanel {
    doc: Document,
    element: ElementId,
    state: Mutex<PanelState>,
    alignment_changed: Signal<VerticalAlignment>,
}

impl DefaultTetheredPanel {
    pub fn new(doc: &Document) -> Arc<Self> {
        Arc::new(Self {
            doc: doc.clone(),
            element: doc.create_custom_element(names::TETHERED_TAG),
            state: Mutex::new(PanelState {
                tether: None,
                min_bottom_space: DEFAULT_MIN_BOTTOM_SPACE,
                alignment: VerticalAlignment::Bottom,
            }),
            alignment_changed: Signal::new(),
        })
    }

    /// Pick a side for a panel anchored at `anchor` in a viewport of
    /// `viewport_height`.
    pub fn choose_alignment(anchor: Rect, viewport_height: f32, min_bottom_space: f32) -> VerticalAlignment {
        let space_below = viewport_height - anchor.bottom();
        let space_above = anchor.top();
        if space_below < min_bottom_space && space_above > space_below {
            VerticalAlignment::Top
        } else {
            VerticalAlignment::Bottom
        }
    }

    fn place(&self, anchor: Rect, alignment: VerticalAlignment) -> Result<(), DocumentError> {
        let viewport = self.doc.viewport();
        self.doc
            .set_style(self.element, "left", &format!("{}px", anchor.left()))?;
        self.doc
            .set_style(self.element, "width", &format!("{}px", anchor.width()))?;
        match alignment {
            VerticalAlignment::Bottom => {
                self.doc.remove_style(self.element, "bottom")?;
                self.doc
                    .set_style(self.element, "top", &format!("{}px", anchor.bottom()))
            }
            VerticalAlignment::Top => {
                self.doc.remove_style(self.element, "top")?;
                self.doc.set_style(
                    self.element,
                    "bottom",
                    &format!("{}px", viewport.height - anchor.top()),
                )
            }
        }
    }
}

impl TetheredPanel for DefaultTetheredPanel {
    fn element(&self) -> ElementId {
        self.element
    }

    fn set_tether(&self, anchor: ElementId) {
        self.state.lock().tether = Some(anchor);
        self.update_position();
    }

    fn tether(&self) -> Option<ElementId> {
        self.state.lock().tether
    }

    fn min_bottom_space(&self) -> f32 {
        self.state.lock().min_bottom_space
    }

    fn set_min_bottom_space(&self, pixels: f32) {
        self.state.lock().min_bottom_space = pixels;
        self.update_position();
    }

    fn vertical_alignment(&self) -> VerticalAlignment {
        self.state.lock().alignment
    }

    fn vertical_alignment_changed(&self) -> &Signal<VerticalAlignment> {
        &self.alignment_changed
    }

    fn update_position(&self) {
        let (tether, min_bottom_space) = {
            let state = self.state.lock();
            (state.tether, state.min_bottom_space)
        };
        let Some(tether) = tether else {
            return;
        };
        if !self.doc.is_connected(self.element) || !self.doc.is_connected(tether) {
            return;
        }

        let anchor = self.doc.bounding_rect(tether);
        let alignment =
            Self::choose_alignment(anchor, self.doc.viewport().height, min_bottom_space);
        if let Err(err) = self.place(anchor, alignment) {
            tracing::warn!(target: targets::SELECT, %err, panel = ?self.element, "panel placement failed");
            return;
        }

        let changed = {
            let mut state = self.state.lock();
            std::mem::replace(&mut state.alignment, alignment) != alignment
        };
        if changed {
            tracing::debug!(target: targets::SELECT, alignment = alignment.as_str(), "panel alignment changed");
            if let Err(err) =
                self.doc
                    .set_attribute(self.element, names::VERTICAL_ALIGN, alignment.as_str())
            {
                tracing::warn!(target: targets::SELECT, %err, "panel alignment marker failed");
            }
            self.alignment_changed.emit(alignment);
        }
    }
}
