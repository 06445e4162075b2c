use crate::error::MappingError;
use serde::{Deserialize, Serialize};

/// When a firing stages throw-side output in an intermediate buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferPolicy {
    /// Buffer whenever the catch side declares output associations, so the
    /// catch side only sees what the throw side produced.
    #[default]
    WhenCatchMapped,
    /// Never buffer: the throw side writes into the destination store and the
    /// catch side then re-maps that store in place.
    Never,
}

/// Tunables for message-event data mapping.
///
/// The default is the canonical behaviour; the alternatives exist for models
/// authored against the unbuffered, unguarded variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingPolicy {
    pub buffering: BufferPolicy,
    /// Skip assignments whose trimmed `to` path is empty. When false such an
    /// assignment writes to the empty key at the root.
    pub require_assignment_target: bool,
}

impl Default for MappingPolicy {
    fn default() -> Self {
        Self {
            buffering: BufferPolicy::WhenCatchMapped,
            require_assignment_target: true,
        }
    }
}

/// Parse a YAML policy document. Missing fields take their defaults.
pub fn parse_policy_yaml(yaml_str: &str) -> Result<MappingPolicy, MappingError> {
    let policy: MappingPolicy = serde_yaml::from_str(yaml_str)?;
    Ok(policy)
}
