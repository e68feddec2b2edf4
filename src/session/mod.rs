//! The evaluation session: ties a tree and a registry together and serves
//! whole-tree and single-element evaluation over one value context.

pub mod autosave;

pub use autosave::*;

use crate::api::{EvaluationRequest, EvaluationResponse};
use crate::error::{AuthoringError, EvalError};
use crate::eval::{self, Outcome, Resolve, ValueContext};
use crate::formula::{validate_formula, FieldType, Value};
use crate::node::NodeTree;
use crate::registry::{Registry, SourceRef};
use crate::visibility::{condition_met, resolve_visibility, VisibleSet};
use ahash::{AHashMap, AHashSet};
use std::cell::RefCell;

/// The result of one whole-tree evaluation pass.
///
/// A formula that fails stays local: its error is carried in its own
/// [`NodeResult`] and the remaining nodes still evaluate.
#[derive(Debug)]
pub struct TreeEvaluation {
    pub visible: VisibleSet,
    pub results: Vec<NodeResult>,
}

#[derive(Debug)]
pub struct NodeResult {
    pub node_id: String,
    pub outcome: Result<Outcome, EvalError>,
}

/// One tree plus its registry, ready to evaluate.
pub struct Session<'a> {
    tree: &'a NodeTree,
    registry: &'a Registry,
}

impl<'a> Session<'a> {
    pub fn new(tree: &'a NodeTree, registry: &'a Registry) -> Self {
        Self { tree, registry }
    }

    pub fn tree(&self) -> &NodeTree {
        self.tree
    }

    pub fn registry(&self) -> &Registry {
        self.registry
    }

    /// Authoring-time validation of the whole session: registry key
    /// uniqueness, condition well-formedness, and formula field typing.
    /// Collects every finding rather than stopping at the first.
    pub fn validate(&self) -> Vec<AuthoringError> {
        let mut findings = Vec::new();

        if let Err(e) = self.registry.validate() {
            findings.push(e);
        }

        for node in self.tree.nodes() {
            let Some(condition) = &node.condition else {
                continue;
            };
            for rule in &condition.rules {
                if rule.field.trim().is_empty() {
                    findings.push(AuthoringError::MalformedCondition {
                        node_id: node.id.clone(),
                        message: "rule references an empty field".to_string(),
                    });
                }
            }
        }

        let field_types = self.field_type_map();
        for node in self.tree.nodes() {
            let Some(formula) = &node.formula else {
                continue;
            };
            for instance in &formula.instances {
                if let Err(e) = validate_formula(&instance.tokens, &field_types) {
                    findings.push(e);
                }
            }
        }

        findings
    }

    /// The key space formulas may reference: node ids of field-bearing nodes
    /// plus registered exposed keys, each mapped to its declared type.
    fn field_type_map(&self) -> AHashMap<String, FieldType> {
        let mut map = AHashMap::new();
        for node in self.tree.nodes() {
            if let Some(field) = &node.field {
                map.insert(node.id.clone(), field.field_type);
            }
        }
        for variable in self.registry.variables() {
            let declared = match &variable.source_ref {
                // Computed and condition-backed variables are numeric; so are
                // purely context-fed ones.
                None | Some(SourceRef::Formula(_) | SourceRef::Condition(_)) => FieldType::Number,
                Some(SourceRef::Node(id)) => self
                    .tree
                    .get(id)
                    .and_then(|n| n.field.as_ref())
                    .map(|f| f.field_type)
                    .unwrap_or(FieldType::Number),
            };
            map.insert(variable.exposed_key.clone(), declared);
        }
        map
    }

    /// Evaluates every visible formula-bearing node against the context.
    /// That covers dedicated formula nodes and calculation leaves carrying a
    /// formula config alike.
    pub fn evaluate_tree(&self, ctx: &ValueContext) -> TreeEvaluation {
        let visible = resolve_visibility(self.tree, ctx);
        let resolver = SessionResolver::new(self, ctx);
        let mut results = Vec::new();
        for node in self.tree.nodes().filter(|n| n.formula.is_some()) {
            if !visible.is_visible(&node.id) {
                continue;
            }
            results.push(NodeResult {
                node_id: node.id.clone(),
                outcome: self.evaluate_node(&node.id, &resolver),
            });
        }
        TreeEvaluation { visible, results }
    }

    /// Evaluates one node's effective formula instance. A node without a
    /// formula, or with every instance disabled, yields [`Outcome::Empty`].
    pub fn evaluate_node(
        &self,
        node_id: &str,
        resolver: &dyn Resolve,
    ) -> Result<Outcome, EvalError> {
        let Some(node) = self.tree.get(node_id) else {
            return Err(EvalError::Malformed(format!("unknown node '{}'", node_id)));
        };
        let Some(instance) = node.formula.as_ref().and_then(|f| f.effective()) else {
            return Ok(Outcome::Empty);
        };
        eval::evaluate(&instance.tokens, resolver)
    }

    /// Serves one evaluation request: the element id may be a node id or a
    /// registered exposed key, and the context travels with the call.
    pub fn evaluate_element(&self, request: &EvaluationRequest) -> EvaluationResponse {
        let ctx = ValueContext::from_json(&request.context_data);
        let resolver = SessionResolver::new(self, &ctx);

        if self.tree.get(&request.element_id).is_some() {
            return match self.evaluate_node(&request.element_id, &resolver) {
                Ok(outcome) => EvaluationResponse::ok(outcome.as_value().map(value_to_json)),
                Err(e) => EvaluationResponse::err(e.to_string()),
            };
        }

        // An exposed key goes through the full resolution chain, so
        // node-sourced and condition-sourced variables resolve too, not just
        // formula-backed ones.
        if self.registry.variable_by_key(&request.element_id).is_some() {
            let value = resolver.resolve(&request.element_id);
            return EvaluationResponse::ok(value.as_ref().map(value_to_json));
        }

        EvaluationResponse::err(format!("unknown element '{}'", request.element_id))
    }

    /// Runs one calculation mode, addressed by mode code or by a bare exposed
    /// key: checks the caller supplied every declared field, then resolves
    /// the mode's value through the registry.
    pub fn evaluate_mode(&self, code_or_key: &str, ctx: &ValueContext) -> Result<Outcome, EvalError> {
        let code = code_or_key;
        let Some(mode) = self.registry.mode_by_code(code) else {
            if self.registry.variable_by_key(code).is_some() {
                let resolver = SessionResolver::new(self, ctx);
                return Ok(match resolver.resolve(code) {
                    Some(value) => Outcome::Value(value),
                    None => Outcome::Empty,
                });
            }
            return Err(EvalError::Malformed(format!(
                "unknown calculation mode '{}'",
                code
            )));
        };

        let missing: Vec<&str> = mode
            .fields
            .iter()
            .filter(|f| ctx.get(&f.code).map(|v| v.is_null()).unwrap_or(true))
            .map(|f| f.code.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(EvalError::Malformed(format!(
                "mode '{}' is missing required fields: {}",
                code,
                missing.join(", ")
            )));
        }

        // The mode's result variable shares its code; older configurations
        // without one fall back to the first declared field.
        let key = self
            .registry
            .variable_by_key(&mode.code)
            .map(|v| v.exposed_key.as_str())
            .or_else(|| mode.fields.first().map(|f| f.code.as_str()));
        let Some(key) = key else {
            return Ok(Outcome::Empty);
        };

        let resolver = SessionResolver::new(self, ctx);
        match resolver.resolve(key) {
            Some(value) => Ok(Outcome::Value(value)),
            None => Ok(Outcome::Empty),
        }
    }
}

/// The session's resolution chain: direct context value first, then registry
/// variables (following their source into formulas and conditions), then
/// formula nodes referenced by id.
///
/// A self-referential variable chain resolves to zero instead of recursing
/// forever, matching the loose missing-value semantics of the engine.
pub struct SessionResolver<'a> {
    session: &'a Session<'a>,
    ctx: &'a ValueContext,
    resolving: RefCell<AHashSet<String>>,
}

impl<'a> SessionResolver<'a> {
    pub fn new(session: &'a Session<'a>, ctx: &'a ValueContext) -> Self {
        Self {
            session,
            ctx,
            resolving: RefCell::new(AHashSet::new()),
        }
    }

    fn resolve_source(&self, source: &SourceRef) -> Option<Value> {
        match source {
            SourceRef::Formula(id) => match self.session.evaluate_node(id, self) {
                Ok(outcome) => outcome.as_value().cloned(),
                Err(_) => None,
            },
            SourceRef::Condition(id) => {
                let condition = self.session.tree.get(id)?.condition.as_ref()?;
                Some(Value::Number(if condition_met(condition, self) {
                    1.0
                } else {
                    0.0
                }))
            }
            SourceRef::Node(id) => self.ctx.resolve(id),
        }
    }
}

impl Resolve for SessionResolver<'_> {
    fn resolve(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.ctx.resolve(key) {
            return Some(value);
        }

        if !self.resolving.borrow_mut().insert(key.to_string()) {
            return Some(Value::Number(0.0));
        }
        let resolved = if let Some(variable) = self.session.registry.variable_by_key(key) {
            variable
                .source_ref
                .as_ref()
                .and_then(|source| self.resolve_source(source))
        } else if let Some(node) = self.session.tree.get(key) {
            if node.formula.is_some() {
                match self.session.evaluate_node(key, self) {
                    Ok(outcome) => outcome.as_value().cloned(),
                    Err(_) => None,
                }
            } else {
                None
            }
        } else {
            None
        };
        self.resolving.borrow_mut().remove(key);
        resolved
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Null => serde_json::Value::Null,
    }
}
