//! Error types for the select widget.

use horizon_select_core::DocumentError;

/// Errors raised while loading a [`SelectConfig`](crate::SelectConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML text could not be parsed into a configuration.
    #[error("Invalid select configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds a value outside its valid range.
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Errors raised by select widget operations.
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    /// A document operation failed, usually because an element was
    /// destroyed underneath the widget.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A specialized Result type for select widget operations.
pub type Result<T> = std::result::Result<T, SelectError>;
