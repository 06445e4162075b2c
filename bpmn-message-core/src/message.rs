//! Message event definitions: correlation and data mapping on firing.

use crate::error::MappingError;
use crate::evaluator::AssociationEvaluator;
use crate::events::{MappingReport, MappingStage};
use crate::model::{EventDefinition, ExecutionInstance, FlowNode, Token};
use crate::policy::{BufferPolicy, MappingPolicy};
use crate::store::DataStore;
use serde::{Deserialize, Serialize};
use tracing::info;

/// The message a definition carries. Identity is the `id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub item_ref: Option<String>,
}

impl Message {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            item_ref: None,
        }
    }
}

/// Service operation a message is sent through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub implementation_ref: Option<String>,
}

// ─── MessageEventDefinition ───────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct MessageEventDefinition {
    id: String,
    payload: Option<Message>,
    operation: Option<Operation>,
    policy: MappingPolicy,
}

impl MessageEventDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_payload(mut self, message: Message) -> Self {
        self.payload = Some(message);
        self
    }

    pub fn with_policy(mut self, policy: MappingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_payload(&mut self, message: Message) -> &mut Self {
        self.payload = Some(message);
        self
    }

    pub fn operation(&self) -> Option<&Operation> {
        self.operation.as_ref()
    }

    pub fn set_operation(&mut self, operation: Operation) -> &mut Self {
        self.operation = Some(operation);
        self
    }

    pub fn policy(&self) -> &MappingPolicy {
        &self.policy
    }

    /// Fire the message: map the throw side's data into `instance`.
    ///
    /// Returns `self` unchanged. There is no fired-once guard, so calling it
    /// twice maps twice.
    pub fn execute(
        &self,
        event: &dyn EventDefinition,
        target: &dyn FlowNode,
        instance: &dyn ExecutionInstance,
        token: &dyn Token,
    ) -> Result<&Self, MappingError> {
        self.execute_with_report(event, target, instance, token)?;
        Ok(self)
    }

    /// Same as [`execute`](Self::execute), returning what the firing did.
    ///
    /// The source store is the store of the token's instance, or a fresh
    /// empty store when the token has none. The destination is `instance`'s
    /// store. When `target` declares output associations the throw side is
    /// first mapped into a fresh buffer and the catch side maps that buffer
    /// into the destination (under the default policy).
    pub fn execute_with_report(
        &self,
        _event: &dyn EventDefinition,
        target: &dyn FlowNode,
        instance: &dyn ExecutionInstance,
        token: &dyn Token,
    ) -> Result<MappingReport, MappingError> {
        let throw_event = token.owner_element();
        let source_maps = throw_event.data_input_associations();
        let target_maps = target.data_output_associations().unwrap_or_default();

        let destination = instance.data_store();
        let source = match token.instance() {
            Some(owner) => owner.data_store(),
            None => DataStore::new().into_shared(),
        };

        let evaluator = AssociationEvaluator::new(&self.policy);
        let mut report = MappingReport::default();

        if target_maps.is_empty() {
            evaluator.evaluate(source_maps, &source, &destination, MappingStage::Direct, &mut report)?;
        } else {
            match self.policy.buffering {
                BufferPolicy::WhenCatchMapped => {
                    let buffer = DataStore::new().into_shared();
                    evaluator.evaluate(source_maps, &source, &buffer, MappingStage::ToBuffer, &mut report)?;
                    evaluator.evaluate(target_maps, &buffer, &destination, MappingStage::FromBuffer, &mut report)?;
                }
                BufferPolicy::Never => {
                    evaluator.evaluate(source_maps, &source, &destination, MappingStage::Direct, &mut report)?;
                    evaluator.evaluate(target_maps, &destination, &destination, MappingStage::InPlace, &mut report)?;
                }
            }
        }

        report.payload_hash = destination
            .read()
            .map_err(|_| MappingError::StoreUnavailable { store: "destination" })?
            .payload_hash();

        info!(
            definition = %self.id,
            throw_event = throw_event.id(),
            target = target.id(),
            instance = instance.id(),
            stages = ?report.stages(),
            "message mapped"
        );
        Ok(report)
    }
}

impl EventDefinition for MessageEventDefinition {
    fn id(&self) -> &str {
        &self.id
    }

    fn payload(&self) -> Option<&Message> {
        self.payload.as_ref()
    }

    /// Untyped catches untyped; typed catches the same message id only.
    fn should_catch_event_definition(&self, event: &dyn EventDefinition) -> bool {
        match (self.payload(), event.payload()) {
            (None, None) => true,
            (Some(target), Some(source)) => target.id == source.id,
            _ => false,
        }
    }

    /// Message events have no firing condition beyond correlation.
    fn asserts_rule(
        &self,
        _event: &dyn EventDefinition,
        _target: &dyn FlowNode,
        _instance: Option<&dyn ExecutionInstance>,
        _token: Option<&dyn Token>,
    ) -> bool {
        true
    }
}
