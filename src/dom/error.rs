use thiserror::Error;

/// # Errors produced by the document model.
///
/// Raised by HTML parsing, selector parsing, and tree edits that would break
/// structural invariants (cycles, root removal, text-node parents).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DomError {
    /// The HTML input could not be parsed.
    #[error("html parse error: {message}")]
    Parse {
        /// What the parser choked on.
        message: String,
    },

    /// The selector string was empty (or whitespace only).
    #[error("empty selector")]
    EmptySelector,

    /// The selector uses syntax outside the supported compound subset
    /// (combinators, selector lists, pseudo-classes).
    #[error("unsupported selector: {selector:?}")]
    UnsupportedSelector {
        /// The offending selector text.
        selector: String,
    },

    /// The selector is within the supported subset but malformed
    /// (e.g. an unclosed attribute bracket or an empty class name).
    #[error("malformed selector: {selector:?}")]
    MalformedSelector {
        /// The offending selector text.
        selector: String,
    },

    /// The operation requires an element node.
    #[error("node is not an element")]
    NotAnElement,

    /// The operation requires an attached node (one with a parent).
    #[error("node is detached from the tree")]
    Detached,

    /// The insertion would make a node an ancestor of itself.
    #[error("insertion would create a cycle")]
    Cycle,

    /// The document root cannot be moved, removed, or re-parented.
    #[error("document root cannot be moved or removed")]
    RootImmovable,
}

impl DomError {
    /// Stable snake_case tag for this error, for log fields and metrics.
    ///
    /// # Example
    /// ```
    /// use scrollvisor::DomError;
    ///
    /// let err = DomError::EmptySelector;
    /// assert_eq!(err.as_label(), "dom_empty_selector");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DomError::Parse { .. } => "dom_parse",
            DomError::EmptySelector => "dom_empty_selector",
            DomError::UnsupportedSelector { .. } => "dom_unsupported_selector",
            DomError::MalformedSelector { .. } => "dom_malformed_selector",
            DomError::NotAnElement => "dom_not_an_element",
            DomError::Detached => "dom_detached",
            DomError::Cycle => "dom_cycle",
            DomError::RootImmovable => "dom_root_immovable",
        }
    }
}
