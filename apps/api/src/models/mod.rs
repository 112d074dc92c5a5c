pub mod registration;
pub mod resume;

pub use resume::{has_text, ResumeData};
