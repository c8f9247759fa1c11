//! Resume and portfolio document pipeline.
//!
//! Validated data is converted once into a [`ResumeDocument`]; the LaTeX,
//! DOCX and HTML renderers are pure functions over that model.

pub mod docx;
pub mod escape;
pub mod html;
pub mod latex;
pub mod model;
pub mod themes;

pub use model::ResumeDocument;
