use super::{EventDefinition, ExecutionInstance, FlowNode, Process, ThrowEvent, Token};
use crate::association::DataAssociation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A declared data input of a throw event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataInput {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub item_subject: Option<String>,
}

/// Groups the data inputs that must be available together.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSet {
    pub id: String,
    pub data_input_refs: Vec<String>,
}

/// Parts common to every throw event.
#[derive(Clone, Debug, Default)]
struct ThrowParts {
    data_inputs: Vec<DataInput>,
    data_input_associations: Vec<DataAssociation>,
    event_definitions: Vec<Arc<dyn EventDefinition>>,
    input_set: Option<InputSet>,
}

macro_rules! throw_event_builders {
    ($ty:ty) => {
        impl $ty {
            pub fn with_data_input(mut self, input: DataInput) -> Self {
                self.parts.data_inputs.push(input);
                self
            }

            pub fn with_data_input_association(mut self, association: DataAssociation) -> Self {
                self.parts.data_input_associations.push(association);
                self
            }

            pub fn with_event_definition(mut self, definition: Arc<dyn EventDefinition>) -> Self {
                self.parts.event_definitions.push(definition);
                self
            }

            pub fn with_input_set(mut self, input_set: InputSet) -> Self {
                self.parts.input_set = Some(input_set);
                self
            }

            pub fn data_inputs(&self) -> &[DataInput] {
                &self.parts.data_inputs
            }

            pub fn input_set(&self) -> Option<&InputSet> {
                self.parts.input_set.as_ref()
            }
        }

        impl ThrowEvent for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn data_input_associations(&self) -> &[DataAssociation] {
                &self.parts.data_input_associations
            }

            fn event_definitions(&self) -> &[Arc<dyn EventDefinition>] {
                &self.parts.event_definitions
            }
        }

        impl FlowNode for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

// ─── IntermediateThrowEvent ───────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct IntermediateThrowEvent {
    id: String,
    parts: ThrowParts,
}

impl IntermediateThrowEvent {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parts: ThrowParts::default(),
        }
    }
}

throw_event_builders!(IntermediateThrowEvent);

// ─── EndEvent ─────────────────────────────────────────────────

/// End event. Throws its event definitions when a token reaches it.
#[derive(Clone, Debug, Default)]
pub struct EndEvent {
    id: String,
    owner_process: Option<Arc<dyn Process>>,
    parts: ThrowParts,
}

impl EndEvent {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner_process: None,
            parts: ThrowParts::default(),
        }
    }

    pub fn with_owner_process(mut self, process: Arc<dyn Process>) -> Self {
        self.owner_process = Some(process);
        self
    }

    pub fn owner_process(&self) -> Option<&Arc<dyn Process>> {
        self.owner_process.as_ref()
    }

    /// Instances an event thrown here is delivered to: every running
    /// instance of the owning process.
    pub fn target_instances(
        &self,
        _event: &dyn EventDefinition,
        _token: &dyn Token,
    ) -> Vec<Arc<dyn ExecutionInstance>> {
        self.owner_process
            .as_ref()
            .map(|process| process.instances())
            .unwrap_or_default()
    }
}

throw_event_builders!(EndEvent);
