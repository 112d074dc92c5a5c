// Résumé intake: structural validation and the direct (session-less) export path.
// Validation never mutates the submitted data.

pub mod handlers;
pub mod validation;

pub use validation::{validate, ValidationReport};
