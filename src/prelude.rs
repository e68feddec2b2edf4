//! Prelude module for convenient imports
//!
//! Re-exports the types most callers need: the node model, the evaluation
//! entry points, the registry, and the session layer.
//!
//! # Example
//!
//! ```rust,no_run
//! use formtree::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/tree.json")?;
//! let nodes: Vec<NodeDefinition> = serde_json::from_str(&json)?;
//! let tree = NodeTree::from_nodes(nodes)?;
//!
//! let registry = Registry::new(Vec::new(), Vec::new());
//! let session = Session::new(&tree, &registry);
//!
//! let ctx = ValueContext::new();
//! let evaluation = session.evaluate_tree(&ctx);
//! println!("{} nodes visible", evaluation.visible.len());
//! # Ok(())
//! # }
//! ```

// Node model and tree assembly
pub use crate::node::{
    ConditionConfig, ConditionOp, ConditionRule, FieldConfig, FormulaConfig, FormulaInstance,
    LeafKind, NodeDefinition, NodeKind, NodeTree, RepeaterConfig, TreeArtifact,
};

// Formula tokens and evaluation
pub use crate::eval::{evaluate, Outcome, Resolve, ValueContext};
pub use crate::formula::{normalize_tokens, validate_formula, FieldType, Op, Token, Value};

// Registry and session
pub use crate::registry::{CalculationMode, DisplayFormat, ModeField, Registry, SourceRef, Variable};
pub use crate::session::{SaveCoalescer, Session, SessionGuard, TreeEvaluation};

// Visibility, repeaters, product filtering
pub use crate::product::{ProductFilter, ProductVisibility};
pub use crate::repeater::RepeaterInstances;
pub use crate::visibility::{resolve_visibility, VisibleSet};

// Wire shapes
pub use crate::api::{EvaluationRequest, EvaluationResponse, ModeListing, NodePatch, VariableListing};

// Error types
pub use crate::error::{AuthoringError, EvalError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
