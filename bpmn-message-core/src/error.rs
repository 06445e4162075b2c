//! Typed failures of a message firing.
//!
//! Misconfigured associations (missing names, absent expressions, empty
//! assignment targets) are not errors: they contribute no writes. Only a
//! failing expression, an unusable store or a bad policy document surfaces
//! here.

/// Error raised while mapping data for a fired message event.
///
/// Positions are zero-based indexes into the association list of the pass
/// that failed, and into that association's assignment list.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// The transformation expression of an association failed.
    #[error("transformation of association {association} failed: {source}")]
    Transformation {
        association: usize,
        source: anyhow::Error,
    },

    /// An assignment's `from` expression failed.
    #[error("assignment {index} of association {association} failed: {source}")]
    Assignment {
        association: usize,
        index: usize,
        source: anyhow::Error,
    },

    /// An assignment's `to` expression could not be rendered to a path.
    #[error("target path of assignment {index} in association {association} could not be rendered: {source}")]
    RenderTarget {
        association: usize,
        index: usize,
        source: anyhow::Error,
    },

    /// A shared data store lock was poisoned by a panicking writer.
    #[error("{store} data store is unavailable (lock poisoned)")]
    StoreUnavailable { store: &'static str },

    /// A mapping policy document could not be parsed.
    #[error("invalid mapping policy: {0}")]
    Policy(#[from] serde_yaml::Error),
}
