//! Message-event data mapping for a BPMN runtime.
//!
//! Each process instance owns a [`DataStore`] addressed by dot paths. When a
//! message event fires, [`MessageEventDefinition::execute`] evaluates the
//! throw side's data input associations (and the catch side's data output
//! associations, through a buffer) and writes the result into the receiving
//! instance's store.

pub mod association;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod expression;
pub mod message;
pub mod model;
pub mod policy;
pub mod store;

pub use association::{Assignment, Association, AssociationKind, DataAssociation, ItemRef, Named};
pub use error::MappingError;
pub use evaluator::{AssociationEvaluator, PendingWrite, SOURCE_REF};
pub use events::{MappingEvent, MappingReport, MappingStage};
pub use expression::{Context, Evaluate, Expression, FormalExpression, Render};
pub use message::{Message, MessageEventDefinition, Operation};
pub use model::{CatchEvent, EventDefinition, ExecutionInstance, FlowNode, Process, ThrowEvent, Token};
pub use policy::{parse_policy_yaml, BufferPolicy, MappingPolicy};
pub use store::{DataStore, SharedDataStore};
