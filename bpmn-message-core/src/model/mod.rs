//! The slice of the BPMN element graph a message firing touches.
//!
//! Routing, activity lifecycle and model loading live elsewhere; these traits
//! are what the mapping layer asks of them.

pub mod catch_event;
pub mod memory;
pub mod throw_event;

use crate::association::DataAssociation;
use crate::message::Message;
use crate::store::SharedDataStore;
use std::fmt;
use std::sync::Arc;

pub use catch_event::IntermediateCatchEvent;
pub use memory::{MemoryInstance, MemoryProcess, MemoryToken};
pub use throw_event::{DataInput, EndEvent, InputSet, IntermediateThrowEvent};

/// One running execution of a process definition.
pub trait ExecutionInstance: fmt::Debug + Send + Sync {
    fn id(&self) -> &str;
    fn data_store(&self) -> SharedDataStore;
}

/// A process definition and the instances currently running it.
pub trait Process: fmt::Debug + Send + Sync {
    fn id(&self) -> &str;
    fn instances(&self) -> Vec<Arc<dyn ExecutionInstance>>;
}

/// Unit of control flow, owned by an element and optionally by an instance.
pub trait Token {
    fn owner_element(&self) -> &dyn ThrowEvent;
    fn instance(&self) -> Option<&dyn ExecutionInstance>;
}

/// Any node a firing can target.
pub trait FlowNode {
    fn id(&self) -> &str;

    /// Output associations, for nodes that declare them.
    fn data_output_associations(&self) -> Option<&[DataAssociation]> {
        None
    }
}

/// An element that emits events and feeds them through data input associations.
pub trait ThrowEvent: Send + Sync {
    fn id(&self) -> &str;
    fn data_input_associations(&self) -> &[DataAssociation];
    fn event_definitions(&self) -> &[Arc<dyn EventDefinition>];
}

/// An element that reacts to matching events.
pub trait CatchEvent: FlowNode {
    fn event_definitions(&self) -> &[Arc<dyn EventDefinition>];

    /// True when any of this event's definitions reacts to `fired`.
    fn catches(&self, fired: &dyn EventDefinition) -> bool {
        self.event_definitions()
            .iter()
            .any(|definition| definition.should_catch_event_definition(fired))
    }
}

/// Behaviour shared by event definitions (message, signal, ...).
pub trait EventDefinition: fmt::Debug + Send + Sync {
    fn id(&self) -> &str;

    /// The message carried, if the definition declares one.
    fn payload(&self) -> Option<&Message>;

    /// Whether this definition, on a catch element, reacts to `event`.
    fn should_catch_event_definition(&self, event: &dyn EventDefinition) -> bool;

    /// Extra firing condition checked by the driver before `execute`.
    fn asserts_rule(
        &self,
        event: &dyn EventDefinition,
        target: &dyn FlowNode,
        instance: Option<&dyn ExecutionInstance>,
        token: Option<&dyn Token>,
    ) -> bool;
}
