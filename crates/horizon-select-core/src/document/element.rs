//! Element storage for the document tree.

use std::collections::BTreeMap;

use slotmap::new_key_type;

use crate::geometry::Rect;

new_key_type! {
    /// A unique identifier for an element in a [`Document`](super::Document).
    ///
    /// IDs stay valid until the element is destroyed; a destroyed ID is never
    /// reused for a different element.
    pub struct ElementId;
}

/// Measured layout of an element, supplied by the host's layout pass.
///
/// The document does not compute layout. Hosts (and tests) write measured
/// values with [`Document::set_layout`](super::Document::set_layout).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Layout {
    /// Border box relative to the viewport.
    pub bounds: Rect,
    /// Natural height of the content, ignoring any height constraint.
    pub scroll_height: f32,
    /// Computed top border width.
    pub border_top: f32,
    /// Computed bottom border width.
    pub border_bottom: f32,
}

impl Layout {
    /// Layout with just a bounding box.
    pub fn with_bounds(bounds: Rect) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// Set the natural content height.
    pub fn with_scroll_height(mut self, scroll_height: f32) -> Self {
        self.scroll_height = scroll_height;
        self
    }

    /// Set the top and bottom border widths.
    pub fn with_borders(mut self, top: f32, bottom: f32) -> Self {
        self.border_top = top;
        self.border_bottom = bottom;
        self
    }
}

/// A node of the document tree.
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) tag: String,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) styles: BTreeMap<String, String>,
    pub(crate) text: String,
    pub(crate) children: Vec<ElementId>,
    pub(crate) parent: Option<ElementId>,
    pub(crate) custom: bool,
    pub(crate) layout: Layout,
}

impl Element {
    pub(crate) fn new(tag: impl Into<String>, custom: bool) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            text: String::new(),
            children: Vec::new(),
            parent: None,
            custom,
            layout: Layout::default(),
        }
    }

    /// Lower-case tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Attributes in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Inline style property value.
    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }

    /// The element's own text, excluding descendants.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Whether the element was created as a custom element that upgrades
    /// asynchronously and signals readiness.
    pub fn is_custom(&self) -> bool {
        self.custom
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Inline `height` in pixels, if one is set and parses.
    pub fn explicit_height(&self) -> Option<f32> {
        self.style("height")
            .and_then(|value| value.trim().strip_suffix("px"))
            .and_then(|value| value.trim().parse::<f32>().ok())
    }
}
