use crate::expression::{Expression, FormalExpression, Render};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ─── References ───────────────────────────────────────────────

/// Anything that exposes an optional name, such as an item-aware element.
pub trait Named {
    /// The name, or `None` when it is missing or empty.
    fn name(&self) -> Option<&str>;
}

/// Reference to an item-aware element (data object, property, data input).
/// Its name doubles as the dot path into the data store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ItemRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }
}

impl Named for ItemRef {
    fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

// ─── Assignment ───────────────────────────────────────────────

/// One `from` → `to` pair inside a data association.
#[derive(Clone, Debug, Default)]
pub struct Assignment {
    from: Expression,
    to: Option<Arc<dyn Render>>,
}

impl Assignment {
    pub fn new(from: Expression, to: impl Render + 'static) -> Self {
        Self {
            from,
            to: Some(Arc::new(to)),
        }
    }

    /// Assignment whose target path is a plain formal expression body.
    pub fn to_path(from: Expression, path: impl Into<String>) -> Self {
        Self::new(from, FormalExpression::new(path))
    }

    pub fn from(&self) -> &Expression {
        &self.from
    }

    pub fn to(&self) -> Option<&dyn Render> {
        self.to.as_deref()
    }
}

// ─── DataAssociation ──────────────────────────────────────────

/// Whether an association feeds an element (input) or drains it (output).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssociationKind {
    Input,
    Output,
}

/// Read-only view the evaluator needs of a data association.
pub trait Association {
    fn source(&self) -> Option<&dyn Named>;
    fn target(&self) -> Option<&dyn Named>;
    fn transformation(&self) -> &Expression;
    /// Evaluated in order.
    fn assignments(&self) -> &[Assignment];
}

/// Declarative source → target data link.
///
/// Built once with the `with_*` methods while the model is assembled and only
/// read afterwards.
#[derive(Clone, Debug)]
pub struct DataAssociation {
    kind: AssociationKind,
    source: Option<ItemRef>,
    target: Option<ItemRef>,
    transformation: Expression,
    assignments: Vec<Assignment>,
}

impl DataAssociation {
    fn new(kind: AssociationKind) -> Self {
        Self {
            kind,
            source: None,
            target: None,
            transformation: Expression::Absent,
            assignments: Vec::new(),
        }
    }

    /// A data input association (owned by throw events).
    pub fn input() -> Self {
        Self::new(AssociationKind::Input)
    }

    /// A data output association (owned by catch events).
    pub fn output() -> Self {
        Self::new(AssociationKind::Output)
    }

    pub fn with_source(mut self, source: ItemRef) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_target(mut self, target: ItemRef) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_transformation(mut self, transformation: Expression) -> Self {
        self.transformation = transformation;
        self
    }

    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn kind(&self) -> AssociationKind {
        self.kind
    }
}

impl Association for DataAssociation {
    fn source(&self) -> Option<&dyn Named> {
        self.source.as_ref().map(|s| s as &dyn Named)
    }

    fn target(&self) -> Option<&dyn Named> {
        self.target.as_ref().map(|t| t as &dyn Named)
    }

    fn transformation(&self) -> &Expression {
        &self.transformation
    }

    fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_names_are_unnamed() {
        assert_eq!(ItemRef::default().name(), None);
        assert_eq!(ItemRef::named("").name(), None);
        assert_eq!(ItemRef::named("amount").name(), Some("amount"));
    }

    #[test]
    fn test_builder_preserves_assignment_order() {
        let association = DataAssociation::input()
            .with_source(ItemRef::named("order"))
            .with_target(ItemRef::named("payload"))
            .with_assignment(Assignment::to_path(Expression::constant(json!(1)), "first"))
            .with_assignment(Assignment::to_path(Expression::constant(json!(2)), "second"));

        assert_eq!(association.kind(), AssociationKind::Input);
        assert_eq!(association.source().and_then(Named::name), Some("order"));
        assert_eq!(association.target().and_then(Named::name), Some("payload"));
        assert!(!association.transformation().is_invocable());

        let targets: Vec<String> = association
            .assignments()
            .iter()
            .filter_map(|a| a.to())
            .map(|to| to.render().unwrap())
            .collect();
        assert_eq!(targets, vec!["first", "second"]);
    }

    #[test]
    fn test_default_assignment_is_inert() {
        let assignment = Assignment::default();
        assert!(!assignment.from().is_invocable());
        assert!(assignment.to().is_none());
        assert_eq!(DataAssociation::output().kind(), AssociationKind::Output);
    }
}
