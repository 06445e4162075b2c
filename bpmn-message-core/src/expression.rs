use crate::store::lookup_path;
use anyhow::Result;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// The mapping handed to an expression: a snapshot of the source store,
/// optionally extended with `sourceRef`.
pub type Context = Map<String, Value>;

/// Something that can be invoked over a context to produce a value.
///
/// Implemented for plain closures, which is how compiled formal expressions
/// are handed to this crate.
pub trait Evaluate: Send + Sync {
    fn evaluate(&self, context: &Context) -> Result<Value>;
}

impl<F> Evaluate for F
where
    F: Fn(&Context) -> Result<Value> + Send + Sync,
{
    fn evaluate(&self, context: &Context) -> Result<Value> {
        self(context)
    }
}

// ─── Expression slot ──────────────────────────────────────────

/// A `from` or `transformation` slot: either empty or invocable.
#[derive(Clone, Default)]
pub enum Expression {
    #[default]
    Absent,
    Invocable(Arc<dyn Evaluate>),
}

impl Expression {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Context) -> Result<Value> + Send + Sync + 'static,
    {
        Expression::Invocable(Arc::new(f))
    }

    /// Always yields `value`.
    pub fn constant(value: Value) -> Self {
        Self::from_fn(move |_| Ok(value.clone()))
    }

    /// Reads a dot path out of the context, yielding null on a miss.
    pub fn path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::from_fn(move |context| Ok(lookup_path(context, &path).cloned().unwrap_or(Value::Null)))
    }

    pub fn is_invocable(&self) -> bool {
        matches!(self, Expression::Invocable(_))
    }

    /// Invoke the expression. `Ok(None)` when the slot is absent.
    pub fn invoke(&self, context: &Context) -> Result<Option<Value>> {
        match self {
            Expression::Absent => Ok(None),
            Expression::Invocable(f) => f.evaluate(context).map(Some),
        }
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Absent => f.write_str("Absent"),
            Expression::Invocable(_) => f.write_str("Invocable(..)"),
        }
    }
}

// ─── Rendered expressions ─────────────────────────────────────

/// An expression whose rendered body is used as text, e.g. the target path
/// of an assignment.
pub trait Render: fmt::Debug + Send + Sync {
    fn render(&self) -> Result<String>;
}

/// A formal expression carried verbatim from the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormalExpression {
    pub body: String,
    pub language: Option<String>,
}

impl FormalExpression {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            language: None,
        }
    }
}

impl Render for FormalExpression {
    fn render(&self) -> Result<String> {
        Ok(self.body.clone())
    }
}
