//! Builder for [`Select`].

use std::sync::Arc;

use horizon_select_core::logging::targets;
use horizon_select_core::{Document, DocumentError, ElementId};
use parking_lot::Mutex;

use super::{Select, SelectInner, SelectState};
use crate::accessibility::{AccessibilityStrategy, NoAccessibility};
use crate::config::SelectConfig;
use crate::error::Result;
use crate::names;
use crate::widgets::{DefaultSubWidgets, SubWidgetFactory};

/// Configures and binds a [`Select`].
///
/// # Example
///
/// ```
/// use horizon_select::{Select, SelectConfig};
/// use horizon_select::core::Document;
///
/// let doc = Document::new();
/// let root = doc.create_element("div");
/// doc.append_child(doc.body(), root).unwrap();
///
/// let select = Select::builder(&doc, root)
///     .config(SelectConfig::default().with_min_bottom_space(240.0))
///     .build()
///     .unwrap();
/// assert_eq!(select.min_bottom_space(), 240.0);
/// assert_eq!(select.mode(), None);
/// ```
pub struct SelectBuilder {
    doc: Document,
    root: ElementId,
    config: SelectConfig,
    accessibility: Box<dyn AccessibilityStrategy>,
    factory: Arc<dyn SubWidgetFactory>,
    dropdown_container: Option<ElementId>,
}

impl SelectBuilder {
    pub(crate) fn new(doc: &Document, root: ElementId) -> Self {
        Self {
            doc: doc.clone(),
            root,
            config: SelectConfig::default(),
            accessibility: Box::new(NoAccessibility),
            factory: Arc::new(DefaultSubWidgets),
            dropdown_container: None,
        }
    }

    pub fn config(mut self, config: SelectConfig) -> Self {
        self.config = config;
        self
    }

    pub fn accessibility(mut self, strategy: impl AccessibilityStrategy + 'static) -> Self {
        self.accessibility = Box::new(strategy);
        self
    }

    /// Replace the sub-widgets the select renders through.
    pub fn sub_widgets(mut self, factory: impl SubWidgetFactory + 'static) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    /// Element the open dropdown is appended to. Defaults to the body.
    pub fn dropdown_container(mut self, container: ElementId) -> Self {
        self.dropdown_container = Some(container);
        self
    }

    /// Validate the configuration, resolve the native control and UI
    /// container, and build the UI for the current mode.
    pub fn build(self) -> Result<Select> {
        self.config.validate()?;
        if !self.doc.exists(self.root) {
            return Err(DocumentError::UnknownElement(self.root).into());
        }
        let dropdown_container = self.dropdown_container.unwrap_or_else(|| self.doc.body());
        if !self.doc.exists(dropdown_container) {
            return Err(DocumentError::UnknownElement(dropdown_container).into());
        }

        let dropdown_content = self.doc.create_element("div");
        self.doc
            .set_attribute(dropdown_content, names::DROPDOWN, "")?;
        self.doc
            .set_attribute(dropdown_content, names::TETHERED_CONTENT, "")?;

        let min_bottom_space = self.config.min_bottom_space;
        let inner = Arc::new_cyclic(|this| SelectInner {
            doc: self.doc.clone(),
            root: self.root,
            dropdown_content,
            dropdown_container,
            config: self.config,
            accessibility: self.accessibility,
            factory: self.factory,
            state: Mutex::new(SelectState {
                min_bottom_space,
                ..SelectState::default()
            }),
            this: this.clone(),
        });

        tracing::debug!(target: targets::SELECT, root = ?inner.root, "select created");
        let select = Select { inner };
        let inner = &select.inner;
        inner.doc.run_task(|| {
            inner.resolve();
            inner.rebuild()
        })?;
        Ok(select)
    }
}
