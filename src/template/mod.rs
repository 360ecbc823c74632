//! # Templates
//!
//! Logic-less Mustache: interpolation, sections, inverted sections, comments,
//! partials and set-delimiter tags. Nothing in a template can run code; the
//! only operations are lookups in the secret mapping and iteration over lists.

mod parser;
mod partials;
mod render;

pub use parser::{parse, Node};
pub use partials::{DirectoryPartials, NoPartials, PartialSource};
pub use render::Renderer;

use crate::error::RenderError;
use crate::loader::SecretMap;

/// Render `template` against `data` without partials
///
/// With `strict` set, any tag naming a key absent from `data` fails with
/// [`RenderError::MissingKey`]; otherwise it renders as empty text.
pub fn render(template: &str, data: &SecretMap, strict: bool) -> Result<String, RenderError> {
    Renderer::new(strict).render(template, data)
}
