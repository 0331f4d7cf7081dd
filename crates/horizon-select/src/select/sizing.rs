//! Dropdown height reconciliation against the viewport.

use horizon_select_core::Rect;
use horizon_select_core::logging::targets;

use super::SelectInner;
use crate::widgets::VerticalAlignment;

/// Height the dropdown content should take.
///
/// A top-aligned panel grows upward and may use the space between the
/// viewport top and its bottom edge; a bottom-aligned one uses the space
/// between its top edge and the viewport bottom. Neither exceeds
/// `max_height`, the natural height of the options.
///
/// ```
/// use horizon_select::select::suggested_height;
/// use horizon_select::core::Rect;
///
/// let bounds = Rect::new(0.0, 500.0, 100.0, 200.0);
/// assert_eq!(suggested_height(400.0, bounds, false, 800.0), 300.0);
/// assert_eq!(suggested_height(400.0, bounds, true, 800.0), 400.0);
/// ```
pub fn suggested_height(max_height: f32, bounds: Rect, top_aligned: bool, viewport_height: f32) -> f32 {
    let available = if top_aligned {
        bounds.bottom()
    } else {
        viewport_height - bounds.top()
    };
    max_height.min(available).max(0.0)
}

impl SelectInner {
    /// Fit the dropdown content's height to the options and the viewport.
    ///
    /// Runs only while the panel is attached and both it and the options
    /// list are ready. Writes the `height` style only when it changes.
    pub(crate) fn update_dropdown_size(&self) {
        let (dropdown, options) = {
            let state = self.state.lock();
            match (state.dropdown.clone(), state.options.clone()) {
                (Some(dropdown), Some(options)) => (dropdown, options),
                _ => return,
            }
        };
        if !self.is_dropdown_attached()
            || !self.doc.is_ready(dropdown.element())
            || !self.doc.is_ready(options.element())
        {
            return;
        }

        let Some(layout) = self.doc.layout(options.element()) else {
            return;
        };
        let max_height = layout.scroll_height + layout.border_top + layout.border_bottom;
        let bounds = self.doc.bounding_rect(self.dropdown_content);
        let top_aligned = dropdown.vertical_alignment() == VerticalAlignment::Top;
        let height = suggested_height(max_height, bounds, top_aligned, self.doc.viewport().height);

        let current = self
            .doc
            .explicit_height(self.dropdown_content)
            .unwrap_or_else(|| bounds.bottom() - bounds.top());
        if height == current {
            return;
        }
        tracing::trace!(target: targets::DROPDOWN, height, current, top_aligned, "resizing dropdown");
        if let Err(err) = self
            .doc
            .set_style(self.dropdown_content, "height", &format!("{height}px"))
        {
            tracing::warn!(target: targets::DROPDOWN, %err, "resizing dropdown failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bottom_aligned_fits_below() {
        let bounds = Rect::new(0.0, 600.0, 100.0, 50.0);
        assert_eq!(suggested_height(500.0, bounds, false, 800.0), 200.0);
        assert_eq!(suggested_height(120.0, bounds, false, 800.0), 120.0);
    }

    #[test]
    fn test_top_aligned_fits_above() {
        let bounds = Rect::new(0.0, 100.0, 100.0, 50.0);
        assert_eq!(suggested_height(500.0, bounds, true, 800.0), 150.0);
    }

    #[test]
    fn test_never_negative() {
        let bounds = Rect::new(0.0, 900.0, 100.0, 50.0);
        assert_eq!(suggested_height(500.0, bounds, false, 800.0), 0.0);
    }
}
