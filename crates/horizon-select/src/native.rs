//! A typed view of the native `<select>` control.
//!
//! The native control is never owned by the widget. [`NativeSelect`] reads
//! and writes its state through the document, so every change it makes is
//! visible to other observers exactly as an external script's change would be.

use horizon_select_core::{Document, ElementId, Event};

use crate::error::Result;

/// One entry of the native control's flattened option list.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeOption {
    pub element: ElementId,
    /// Enclosing `optgroup`, if any.
    pub group: Option<ElementId>,
    pub label: String,
    pub value: String,
    pub selected: bool,
    /// Disabled itself or through its group.
    pub disabled: bool,
}

/// Handle to a native selection control.
#[derive(Debug, Clone)]
pub struct NativeSelect {
    doc: Document,
    element: ElementId,
}

impl PartialEq for NativeSelect {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element && self.doc.ptr_eq(&other.doc)
    }
}

impl NativeSelect {
    pub fn new(doc: Document, element: ElementId) -> Self {
        Self { doc, element }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn is_disabled(&self) -> bool {
        self.doc.has_attribute(self.element, "disabled")
    }

    pub fn is_multiple(&self) -> bool {
        self.doc.has_attribute(self.element, "multiple")
    }

    /// Options in document order, including those inside `optgroup`s.
    pub fn options(&self) -> Vec<NativeOption> {
        let mut options = Vec::new();
        for child in self.doc.children(self.element) {
            match self.doc.tag(child).as_deref() {
                Some("option") => options.push(self.read_option(child, None)),
                Some("optgroup") => {
                    for grouped in self.doc.children(child) {
                        if self.doc.tag(grouped).as_deref() == Some("option") {
                            options.push(self.read_option(grouped, Some(child)));
                        }
                    }
                }
                _ => {}
            }
        }
        options
    }

    fn read_option(&self, element: ElementId, group: Option<ElementId>) -> NativeOption {
        let label = self
            .doc
            .attribute(element, "label")
            .unwrap_or_else(|| self.doc.text_content(element).trim().to_owned());
        let value = self
            .doc
            .attribute(element, "value")
            .unwrap_or_else(|| label.clone());
        let group_disabled = group.is_some_and(|g| self.doc.has_attribute(g, "disabled"));
        NativeOption {
            element,
            group,
            label,
            value,
            selected: self.doc.has_attribute(element, "selected"),
            disabled: group_disabled || self.doc.has_attribute(element, "disabled"),
        }
    }

    pub fn len(&self) -> usize {
        self.options().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the first selected option. A single-mode control with no
    /// explicit selection reports its first enabled option.
    pub fn selected_index(&self) -> Option<usize> {
        let options = self.options();
        options.iter().position(|o| o.selected).or_else(|| {
            if self.is_multiple() {
                None
            } else {
                options.iter().position(|o| !o.disabled)
            }
        })
    }

    /// Label of the option at [`selected_index`](Self::selected_index).
    pub fn selected_label(&self) -> Option<String> {
        let index = self.selected_index()?;
        self.options().into_iter().nth(index).map(|o| o.label)
    }

    /// Select exactly one option, deselecting every other. `None` clears the
    /// selection.
    pub fn set_selected_index(&self, index: Option<usize>) -> Result<()> {
        for (i, option) in self.options().into_iter().enumerate() {
            let selected = Some(i) == index;
            if selected != option.selected {
                self.doc
                    .toggle_attribute(option.element, "selected", selected)?;
            }
        }
        Ok(())
    }

    /// Flip the selection of one option, leaving the others alone.
    pub fn toggle_option(&self, index: usize) -> Result<()> {
        if let Some(option) = self.options().into_iter().nth(index) {
            self.doc
                .toggle_attribute(option.element, "selected", !option.selected)?;
        }
        Ok(())
    }

    /// Indices of all selected options.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.options()
            .iter()
            .enumerate()
            .filter(|(_, o)| o.selected)
            .map(|(i, _)| i)
            .collect()
    }

    /// Next enabled option from the current selection in direction `delta`.
    ///
    /// Each step clamps to the ends of the list. Reaching an end without
    /// finding an enabled option yields `None`; the scan never wraps.
    pub fn step_selection(&self, delta: isize) -> Option<usize> {
        let options = self.options();
        let last_index = options.len() as isize - 1;
        if last_index < 0 {
            return None;
        }

        let mut index = self.selected_index().map_or(-1, |i| i as isize);
        let mut previous = index;
        loop {
            index = (index + delta).clamp(0, last_index);
            if index == previous {
                return None;
            }
            previous = index;
            if !options[index as usize].disabled {
                return Some(index as usize);
            }
        }
    }

    pub fn focus(&self) -> Result<()> {
        Ok(self.doc.focus(self.element)?)
    }

    pub fn has_focus(&self) -> bool {
        self.doc.has_focus(self.element)
    }

    /// Dispatch a bubbling, cancelable `change` on the control.
    pub fn dispatch_change(&self) {
        self.doc.dispatch_event(self.element, Event::change());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(doc: &Document, spec: &[(&str, bool)]) -> NativeSelect {
        let select = doc.create_element("select");
        for (label, disabled) in spec {
            let option = doc.create_element("option");
            doc.set_text(option, label).unwrap();
            if *disabled {
                doc.set_attribute(option, "disabled", "").unwrap();
            }
            doc.append_child(select, option).unwrap();
        }
        doc.append_child(doc.body(), select).unwrap();
        NativeSelect::new(doc.clone(), select)
    }

    #[test]
    fn test_step_skips_disabled() {
        let doc = Document::new();
        let native = build(&doc, &[("A", false), ("B", true), ("C", false)]);
        native.set_selected_index(Some(0)).unwrap();
        assert_eq!(native.step_selection(1), Some(2));
    }

    #[test]
    fn test_step_does_not_wrap() {
        let doc = Document::new();
        let native = build(&doc, &[("A", false), ("B", true), ("C", false)]);
        native.set_selected_index(Some(2)).unwrap();
        assert_eq!(native.step_selection(1), None);
        assert_eq!(native.step_selection(-1), Some(0));
    }

    #[test]
    fn test_step_stops_at_disabled_edge() {
        let doc = Document::new();
        let native = build(&doc, &[("A", true), ("B", false)]);
        native.set_selected_index(Some(1)).unwrap();
        assert_eq!(native.step_selection(-1), None);
    }

    #[test]
    fn test_group_disables_options() {
        let doc = Document::new();
        let native = build(&doc, &[("A", false)]);
        let group = doc.create_element("optgroup");
        doc.set_attribute(group, "disabled", "").unwrap();
        let grouped = doc.create_element("option");
        doc.set_attribute(grouped, "value", "b").unwrap();
        doc.set_text(grouped, " B ").unwrap();
        doc.append_child(group, grouped).unwrap();
        doc.append_child(native.element(), group).unwrap();

        let options = native.options();
        assert_eq!(options.len(), 2);
        assert!(options[1].disabled);
        assert_eq!(options[1].group, Some(group));
        assert_eq!(options[1].label, "B");
        assert_eq!(options[1].value, "b");
        assert_eq!(native.step_selection(1), None);
    }

    #[test]
    fn test_single_selection_is_exclusive() {
        let doc = Document::new();
        let native = build(&doc, &[("A", false), ("B", false), ("C", false)]);
        assert_eq!(native.selected_index(), Some(0));
        native.set_selected_index(Some(1)).unwrap();
        native.set_selected_index(Some(2)).unwrap();
        assert_eq!(native.selected_indices(), vec![2]);
        assert_eq!(native.selected_label().as_deref(), Some("C"));
    }

    #[test]
    fn test_toggle_option_in_multiple_mode() {
        let doc = Document::new();
        let native = build(&doc, &[("A", false), ("B", false)]);
        doc.set_attribute(native.element(), "multiple", "").unwrap();
        assert_eq!(native.selected_index(), None);

        native.toggle_option(0).unwrap();
        native.toggle_option(1).unwrap();
        native.toggle_option(0).unwrap();
        assert_eq!(native.selected_indices(), vec![1]);
    }
}
