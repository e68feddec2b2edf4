//! The typed node model: definitions, the assembled tree, and the serialized
//! artifact form.

pub mod artifact;
pub mod definition;
pub mod tree;

pub use artifact::*;
pub use definition::*;
pub use tree::*;
