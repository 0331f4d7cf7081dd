//! Attribute, tag and event names the widget reads and writes.

/// Marks the UI container inside the widget root.
pub const UI_CONTAINER: &str = "data-select-ui";
/// Set on the root once the UI is built.
pub const READY: &str = "data-select-ready";
/// Set on the root in single mode, removed in multiple mode.
pub const SINGLE: &str = "data-select-single";
/// Opts the root into direct attribute writes instead of [`READY_EVENT`].
pub const STANDALONE: &str = "data-select-standalone";
/// Marks the dropdown content wrapper.
pub const DROPDOWN: &str = "data-select-dropdown";
/// Marks the element a tethered panel sizes and positions.
pub const TETHERED_CONTENT: &str = "data-tethered-content";
/// Focus marker on the button (single) or inline list (multiple).
pub const ACTIVE: &str = "data-select-active";

/// Cancelable, bubbling readiness notification dispatched on the root.
pub const READY_EVENT: &str = "select:ready";

/// Tag of the default button sub-widget.
pub const BUTTON_TAG: &str = "select-button";
/// Tag of the default options list sub-widget.
pub const OPTIONS_TAG: &str = "select-options";
/// Tag of a mirrored option inside the default options list.
pub const OPTION_TAG: &str = "select-option";
/// Tag of the default tethered panel sub-widget.
pub const TETHERED_TAG: &str = "select-tethered";

/// Button reflects the open state.
pub const OPEN: &str = "data-open";
/// Button reflects the opening direction (`up` / `down`).
pub const OPENING_POSITION: &str = "data-opening-position";
/// Tethered panel reflects its vertical alignment (`top` / `bottom`).
pub const VERTICAL_ALIGN: &str = "data-vertical-align";
/// Index of a mirrored option in the native option list.
pub const OPTION_INDEX: &str = "data-option-index";
/// Mirrored option is selected.
pub const SELECTED: &str = "data-selected";
/// Mirrored option or button's native control is disabled.
pub const DISABLED: &str = "data-disabled";

/// Native attributes the mutation watcher listens to.
pub const WATCHED_ATTRIBUTES: [&str; 3] = ["disabled", "multiple", "selected"];
