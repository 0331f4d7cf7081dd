//! Horizon Select - a styleable dropdown select that keeps the native control
//! authoritative.
//!
//! A [`Select`] binds to a root element containing a native `select` and a
//! `[data-select-ui]` container, then renders:
//!
//! - **single mode**: a button showing the current label and a floating
//!   dropdown panel tethered to the container
//! - **multiple mode**: an inline options list
//!
//! Value and validity always stay on the native control. Clicks and keys on
//! the overlay are turned into native selection changes followed by a
//! `change` event, and a subtree watcher rebuilds the overlay when the
//! control switches between single and multiple mode.
//!
//! The host environment (document tree, events, readiness, timers) lives in
//! [`horizon_select_core`], re-exported as [`core`].
//!
//! # Example
//!
//! ```
//! use horizon_select::{Select, SelectConfig, PickerStyle};
//! use horizon_select::core::{Document, Key, KeyboardModifiers};
//!
//! let doc = Document::new();
//! let root = doc.create_element("div");
//! let native = doc.create_element("select");
//! for label in ["Red", "Green", "Blue"] {
//!     let option = doc.create_element("option");
//!     doc.set_text(option, label).unwrap();
//!     doc.append_child(native, option).unwrap();
//! }
//! let ui = doc.create_element("span");
//! doc.set_attribute(ui, "data-select-ui", "").unwrap();
//! doc.append_child(root, native).unwrap();
//! doc.append_child(root, ui).unwrap();
//! doc.append_child(doc.body(), root).unwrap();
//!
//! let select = Select::builder(&doc, root)
//!     .config(SelectConfig::default().with_picker(PickerStyle::OsPopup))
//!     .build()
//!     .unwrap();
//! select.mount().unwrap();
//!
//! doc.key_down(native, Key::ArrowDown, KeyboardModifiers::NONE);
//! assert_eq!(select.native().unwrap().selected_label().as_deref(), Some("Green"));
//! ```

pub mod accessibility;
pub mod config;
pub mod error;
pub mod names;
pub mod native;
pub mod select;
pub mod widgets;

pub use horizon_select_core as core;

pub use accessibility::{AccessibilityStrategy, NoAccessibility};
pub use config::{OpenModifier, PickerStyle, SelectConfig};
pub use error::{ConfigError, Result, SelectError};
pub use native::{NativeOption, NativeSelect};
pub use select::{DropdownState, Select, SelectBuilder, SelectMode};
pub use widgets::{
    DefaultButton, DefaultOptionsList, DefaultSubWidgets, DefaultTetheredPanel, OpeningPosition,
    OptionsList, SelectButton, SubWidgetFactory, TetheredPanel, VerticalAlignment,
};

static_assertions::assert_impl_all!(Select: Send, Sync);
