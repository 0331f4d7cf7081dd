//! Logging and debugging facilities for Horizon Select.
//!
//! This module provides:
//! - Target names for filtering `tracing` output by subsystem
//! - Debug visualization for document trees
//!
//! # Tracing Integration
//!
//! Horizon Select uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_select=debug,horizon_select_core=info")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! Use [`DocumentTreeDebug`] to dump a document subtree:
//!
//! ```
//! use horizon_select_core::Document;
//! use horizon_select_core::logging::DocumentTreeDebug;
//!
//! let doc = Document::new();
//! let select = doc.create_element("select");
//! doc.append_child(doc.body(), select).unwrap();
//!
//! let dump = DocumentTreeDebug::new().format_subtree(&doc, doc.document_element());
//! assert!(dump.contains("select"));
//! ```

use std::fmt::{self, Write as _};

use crate::document::{Document, ElementId};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_select_core";
    /// Document tree, dispatch and task queue.
    pub const DOCUMENT: &str = "horizon_select_core::document";
    /// Timer system target.
    pub const TIMER: &str = "horizon_select_core::timer";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_select_core::signal";
    /// Widget facade and UI builder.
    pub const SELECT: &str = "horizon_select::select";
    /// Dropdown lifecycle and size reconciliation.
    pub const DROPDOWN: &str = "horizon_select::dropdown";
    /// Input arbitration.
    pub const INPUT: &str = "horizon_select::input";
    /// Mutation watcher.
    pub const WATCHER: &str = "horizon_select::watcher";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show element IDs.
    pub show_ids: bool,
    /// Whether to show attributes.
    pub show_attributes: bool,
    /// Whether to show inline styles.
    pub show_styles: bool,
    /// Whether to show own text.
    pub show_text: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: false,
            show_attributes: true,
            show_styles: false,
            show_text: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_ids: true,
            show_styles: true,
            ..Default::default()
        }
    }

    /// Tags only.
    pub fn minimal() -> Self {
        Self {
            show_attributes: false,
            show_text: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing document trees.
#[derive(Debug, Clone, Default)]
pub struct DocumentTreeDebug {
    options: TreeFormatOptions,
}

impl DocumentTreeDebug {
    /// Create a visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the subtree rooted at `root`.
    pub fn format_subtree(&self, doc: &Document, root: ElementId) -> String {
        SubtreeDump {
            debug: self,
            doc,
            root,
        }
        .to_string()
    }

    fn write_node(
        &self,
        doc: &Document,
        id: ElementId,
        depth: usize,
        is_last: bool,
        out: &mut impl fmt::Write,
    ) -> fmt::Result {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        let Some(line) = doc.with_element(id, |element| {
            let mut line = format!("<{}", element.tag());
            if self.options.show_attributes {
                for (name, value) in element.attributes() {
                    if value.is_empty() {
                        let _ = write!(line, " {name}");
                    } else {
                        let _ = write!(line, " {name}=\"{value}\"");
                    }
                }
            }
            line.push('>');
            if self.options.show_text && !element.text().is_empty() {
                let _ = write!(line, " {:?}", element.text());
            }
            line
        }) else {
            return Ok(());
        };

        out.write_str(&self.build_prefix(depth, is_last))?;
        out.write_str(&line)?;
        if self.options.show_ids {
            write!(out, " [{id:?}]")?;
        }
        if self.options.show_styles {
            let styles = ["top", "bottom", "left", "width", "height"]
                .into_iter()
                .filter_map(|p| doc.style(id, p).map(|v| format!("{p}: {v}")))
                .collect::<Vec<_>>();
            if !styles.is_empty() {
                write!(out, " {{{}}}", styles.join("; "))?;
            }
        }
        out.write_char('\n')?;

        let children = doc.children(id);
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.write_node(doc, child, depth + 1, i + 1 == count, out)?;
        }
        Ok(())
    }

    /// Build the prefix string for a tree node.
    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            TreeStyle::Compact => ("", "- ", "- "),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix
    }
}

struct SubtreeDump<'a> {
    debug: &'a DocumentTreeDebug,
    doc: &'a Document,
    root: ElementId,
}

impl fmt::Display for SubtreeDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.debug.write_node(self.doc, self.root, 0, true, f)
    }
}
