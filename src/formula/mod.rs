//! The token formula representation: typed tokens, glyph normalization, and
//! authoring-time type validation.

pub mod normalize;
pub mod token;
pub mod validate;
pub mod value;

pub use normalize::*;
pub use token::*;
pub use validate::*;
pub use value::*;

use itertools::Itertools;

/// Renders a token sequence back into a single human-readable line, for
/// authoring summaries and error reporting.
pub fn render_tokens(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.to_string()).join(" ")
}
