//! Error types for Horizon Select core.

use crate::document::ElementId;
use crate::timer::TimerId;

/// Errors raised by document and timer operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// The element ID is unknown or the element has been destroyed.
    #[error("Unknown or destroyed element {0:?}")]
    UnknownElement(ElementId),

    /// Inserting the child would make an element its own ancestor.
    #[error("Cannot insert {child:?} into {parent:?}: would create a cycle")]
    HierarchyCycle { parent: ElementId, child: ElementId },

    /// The built-in document structure cannot be removed or re-parented.
    #[error("Element {0:?} is part of the document structure")]
    StructuralElement(ElementId),

    /// The timer ID is invalid or the timer has already fired.
    #[error("Invalid or expired timer {0:?}")]
    InvalidTimer(TimerId),
}

/// A specialized Result type for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;
