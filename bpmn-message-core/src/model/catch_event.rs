use super::{CatchEvent, EventDefinition, FlowNode};
use crate::association::DataAssociation;
use std::sync::Arc;

/// Intermediate catch event: waits for a matching event and maps its data
/// through data output associations.
#[derive(Clone, Debug, Default)]
pub struct IntermediateCatchEvent {
    id: String,
    data_output_associations: Vec<DataAssociation>,
    event_definitions: Vec<Arc<dyn EventDefinition>>,
}

impl IntermediateCatchEvent {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_data_output_association(mut self, association: DataAssociation) -> Self {
        self.data_output_associations.push(association);
        self
    }

    pub fn with_event_definition(mut self, definition: Arc<dyn EventDefinition>) -> Self {
        self.event_definitions.push(definition);
        self
    }
}

impl FlowNode for IntermediateCatchEvent {
    fn id(&self) -> &str {
        &self.id
    }

    fn data_output_associations(&self) -> Option<&[DataAssociation]> {
        Some(self.data_output_associations.as_slice())
    }
}

impl CatchEvent for IntermediateCatchEvent {
    fn event_definitions(&self) -> &[Arc<dyn EventDefinition>] {
        &self.event_definitions
    }
}
