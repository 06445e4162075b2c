use serde::{Deserialize, Serialize};

/// Which leg of a firing an evaluation pass belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingStage {
    /// Throw side straight into the destination store.
    Direct,
    /// Throw side into the intermediate buffer.
    ToBuffer,
    /// Catch side from the buffer into the destination store.
    FromBuffer,
    /// Catch side re-mapping the destination store onto itself (unbuffered policy).
    InPlace,
}

/// Audit trail of one message firing, in the order things happened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MappingEvent {
    PassStarted {
        stage: MappingStage,
        associations: usize,
    },
    WriteApplied {
        stage: MappingStage,
        path: String,
    },
    PassCompleted {
        stage: MappingStage,
        writes: usize,
    },
}

/// Outcome of a firing: the events it produced and the hash of the
/// destination store afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingReport {
    pub events: Vec<MappingEvent>,
    pub payload_hash: [u8; 32],
}

impl MappingReport {
    pub fn record(&mut self, event: MappingEvent) {
        self.events.push(event);
    }

    /// Stages in the order their passes started.
    pub fn stages(&self) -> Vec<MappingStage> {
        self.events
            .iter()
            .filter_map(|event| match event {
                MappingEvent::PassStarted { stage, .. } => Some(*stage),
                _ => None,
            })
            .collect()
    }

    pub fn used_buffer(&self) -> bool {
        self.stages().contains(&MappingStage::ToBuffer)
    }

    /// Paths written, in application order.
    pub fn written_paths(&self, stage: MappingStage) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                MappingEvent::WriteApplied { stage: s, path } if *s == stage => Some(path.as_str()),
                _ => None,
            })
            .collect()
    }
}
