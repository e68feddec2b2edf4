//! # Formtree - Dynamic Form Tree Evaluation Engine
//!
//! **Formtree** models authored decision-tree forms as a typed node tree and
//! evaluates their token formulas, condition-driven visibility, and bounded
//! repeater sections against a flat value context.
//!
//! ## Core Workflow
//!
//! 1.  **Load the tree**: Deserialize the authored nodes (JSON or a saved
//!     [`node::TreeArtifact`]) and assemble them with [`node::NodeTree::from_nodes`],
//!     which validates ids, parents, and acyclicity up front.
//! 2.  **Load the registry**: Build a [`registry::Registry`] from the variable
//!     and calculation-mode configuration; either side may fail independently
//!     and is reported as a partial failure instead of aborting.
//! 3.  **Open a session**: A [`session::Session`] ties tree and registry
//!     together. `validate()` surfaces authoring errors; `evaluate_tree()`
//!     resolves visibility and runs every visible formula.
//! 4.  **Serve requests**: Single elements evaluate through
//!     [`session::Session::evaluate_element`] with the value context carried
//!     in the request; failures travel inside the response envelope.
//!
//! ## Quick Start
//!
//! ```rust
//! use formtree::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let raw = vec!["a".to_string(), "+".to_string(), "b".to_string()];
//!     let tokens = normalize_tokens(&raw)?;
//!
//!     let mut ctx = ValueContext::new();
//!     ctx.set("a", 3.0);
//!     ctx.set("b", 4.0);
//!
//!     let outcome = evaluate(&tokens, &ctx)?;
//!     assert_eq!(outcome, Outcome::Value(Value::Number(7.0)));
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod error;
pub mod eval;
pub mod formula;
pub mod node;
pub mod prelude;
pub mod product;
pub mod registry;
pub mod repeater;
pub mod session;
pub mod visibility;
