//! # Partial Sources
//!
//! Where `{{> name}}` tags get their template text from.

use crate::constants::TEMPLATE_SUFFIX;
use std::collections::HashMap;
use std::path::{is_separator, Component, Path, PathBuf};
use tracing::debug;

/// Lookup of partial templates by name
pub trait PartialSource {
    /// Source of the partial called `name`, or `None` if there is none
    fn load(&self, name: &str) -> Option<String>;
}

/// Renders every partial as missing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPartials;

impl PartialSource for NoPartials {
    fn load(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Reads `<dir>/<name>.mustache`
///
/// Names must be a single plain path component, so a partial can never be
/// read from outside `dir`.
#[derive(Debug, Clone)]
pub struct DirectoryPartials {
    dir: PathBuf,
}

impl DirectoryPartials {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PartialSource for DirectoryPartials {
    fn load(&self, name: &str) -> Option<String> {
        if !is_plain_name(name) {
            debug!("Partial name {} rejected: not a plain file name", name);
            return None;
        }
        let path = self.dir.join(format!("{name}{TEMPLATE_SUFFIX}"));
        match std::fs::read_to_string(&path) {
            Ok(source) => Some(source),
            Err(e) => {
                debug!("Partial {} not loaded from {}: {}", name, path.display(), e);
                None
            }
        }
    }
}

fn is_plain_name(name: &str) -> bool {
    if name.contains(is_separator) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl PartialSource for HashMap<String, String> {
    fn load(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}
