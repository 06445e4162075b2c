use crate::association::{Association, Named};
use crate::error::MappingError;
use crate::events::{MappingEvent, MappingReport, MappingStage};
use crate::expression::Expression;
use crate::policy::MappingPolicy;
use crate::store::{DataStore, SharedDataStore};
use serde_json::Value;
use tracing::{debug, trace};

/// Context key holding the value found at the association's source path.
pub const SOURCE_REF: &str = "sourceRef";

/// A staged write. Several writes may share a path; the last one wins.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingWrite {
    pub path: String,
    pub value: Value,
}

impl PendingWrite {
    pub fn new(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }
}

/// Turns an ordered association list into writes against a target store.
///
/// All writes of a pass are staged first and flushed afterwards, so every
/// association reads the source as it was before the pass began.
#[derive(Clone, Debug)]
pub struct AssociationEvaluator {
    require_assignment_target: bool,
}

impl Default for AssociationEvaluator {
    fn default() -> Self {
        Self::new(&MappingPolicy::default())
    }
}

impl AssociationEvaluator {
    pub fn new(policy: &MappingPolicy) -> Self {
        Self {
            require_assignment_target: policy.require_assignment_target,
        }
    }

    /// Stage the writes `associations` produce when read against `source`.
    ///
    /// Per association: transformation (or direct copy) first, then each
    /// assignment in order. Nothing is written here.
    pub fn stage<A: Association>(
        &self,
        associations: &[A],
        source: &DataStore,
    ) -> Result<Vec<PendingWrite>, MappingError> {
        let mut writes = Vec::new();

        for (position, association) in associations.iter().enumerate() {
            let source_name = association.source().and_then(Named::name);
            let target_name = association.target().and_then(Named::name);

            let mut context = source.data().clone();
            let source_value = source_name.map(|name| source.get_dot(name, Value::Null));
            if let Some(value) = &source_value {
                context.insert(SOURCE_REF.to_string(), value.clone());
            }

            match (target_name, association.transformation(), source_value) {
                (Some(target), Expression::Invocable(transformation), _) => {
                    let value = transformation.evaluate(&context).map_err(|source| {
                        MappingError::Transformation {
                            association: position,
                            source,
                        }
                    })?;
                    writes.push(PendingWrite::new(target, value));
                }
                (Some(target), Expression::Absent, Some(value)) => {
                    writes.push(PendingWrite::new(target, value));
                }
                _ => {}
            }

            for (index, assignment) in association.assignments().iter().enumerate() {
                let rendered = match assignment.to() {
                    Some(to) => to.render().map_err(|source| MappingError::RenderTarget {
                        association: position,
                        index,
                        source,
                    })?,
                    None => String::new(),
                };
                let path = rendered.trim();

                let Expression::Invocable(from) = assignment.from() else {
                    debug!(association = position, index, "assignment has no from expression, skipped");
                    continue;
                };
                if path.is_empty() && self.require_assignment_target {
                    debug!(association = position, index, "assignment has no target path, skipped");
                    continue;
                }

                let value = from.evaluate(&context).map_err(|source| MappingError::Assignment {
                    association: position,
                    index,
                    source,
                })?;
                writes.push(PendingWrite::new(path, value));
            }
        }

        Ok(writes)
    }

    /// Apply staged writes to `target` in staging order.
    pub fn apply(writes: &[PendingWrite], target: &mut DataStore) {
        for write in writes {
            target.set_dot(&write.path, write.value.clone());
        }
    }

    /// Run one full pass from `source` into `target`, recording it in `report`.
    ///
    /// `source` and `target` may be the same store: the read lock is released
    /// before the write lock is taken.
    pub fn evaluate<A: Association>(
        &self,
        associations: &[A],
        source: &SharedDataStore,
        target: &SharedDataStore,
        stage: MappingStage,
        report: &mut MappingReport,
    ) -> Result<usize, MappingError> {
        report.record(MappingEvent::PassStarted {
            stage,
            associations: associations.len(),
        });

        let writes = {
            let source = source
                .read()
                .map_err(|_| MappingError::StoreUnavailable { store: "source" })?;
            self.stage(associations, &source)?
        };

        let mut target = target
            .write()
            .map_err(|_| MappingError::StoreUnavailable { store: "target" })?;
        for write in &writes {
            target.set_dot(&write.path, write.value.clone());
            trace!(?stage, path = %write.path, "write applied");
            report.record(MappingEvent::WriteApplied {
                stage,
                path: write.path.clone(),
            });
        }

        debug!(
            ?stage,
            associations = associations.len(),
            writes = writes.len(),
            "mapping pass completed"
        );
        report.record(MappingEvent::PassCompleted {
            stage,
            writes: writes.len(),
        });
        Ok(writes.len())
    }
}
