//! Template context construction and rendering
//!
//! A [`TemplateContext`] is built once per worktree from the configuration and
//! branch identity, then every file of the selected template set is rendered
//! against it with Handlebars.

mod context;
mod render;
mod value;

pub use context::{ContextBuilder, TemplateContext};
pub use render::TemplateRenderer;
pub use value::TemplateValue;
