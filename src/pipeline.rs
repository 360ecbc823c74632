//! # Pipeline
//!
//! One run: load secrets, then render either standard input or each template
//! file given on the command line.
//!
//! ```text
//! Start → LoadSecrets ─┬─ no secrets ─────────→ NoSecretsLoaded
//!                      ├─ no files ───────────→ Render(stdin) → stdout
//!                      └─ files ──────────────→ RenderEach(files) → siblings
//! ```
//!
//! Only an empty secret mapping or a failure on the standard-input template
//! ends the run with an error. Per-file failures are reported and skipped.

use crate::constants::TEMPLATE_SUFFIX;
use crate::error::{FileError, RunError};
use crate::loader::{load_secrets, SecretMap};
use crate::provider::SecretSource;
use crate::template::{DirectoryPartials, Renderer};
use std::fs;
use std::io::{Read, Write};
use std::path::{is_separator, Path, PathBuf};
use tracing::{error, info, warn};

/// What to do in one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Template files; empty means read one template from standard input
    pub files: Vec<PathBuf>,
    /// Secret identifiers, `name[:version]`, in merge order
    pub identifiers: Vec<String>,
    /// Fail on tags whose key is absent
    pub strict: bool,
    /// Where `{{> name}}` partials are read from, for every template
    pub partial_dir: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            identifiers: Vec::new(),
            strict: false,
            partial_dir: PathBuf::from("."),
        }
    }
}

/// A template rendered to its sibling output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub template: PathBuf,
    pub output: PathBuf,
}

/// Outcome of a run that got past secret loading
#[derive(Debug, Default)]
pub struct RunReport {
    /// Keys in the combined secret mapping
    pub keys_loaded: usize,
    /// Identifiers that failed to load
    pub failed_identifiers: Vec<String>,
    pub rendered: Vec<RenderedFile>,
    pub failed: Vec<FileError>,
    /// Files without the template suffix
    pub skipped: Vec<PathBuf>,
}

/// Execute one run against `source`
///
/// `input` is only read when no files are given; `output` receives the
/// rendered standard-input template or the per-file status lines.
pub async fn run<S, R, W>(
    options: &RunOptions,
    source: &S,
    input: R,
    output: &mut W,
) -> Result<RunReport, RunError>
where
    S: SecretSource + ?Sized,
    R: Read,
    W: Write,
{
    let load = load_secrets(source, &options.identifiers).await;
    if load.secrets.is_empty() {
        return Err(RunError::NoSecretsLoaded);
    }

    let failed_identifiers: Vec<String> = load.failures().map(|o| o.identifier.clone()).collect();
    info!("Loaded {} secret keys", load.secrets.len());

    let renderer = Renderer::new(options.strict)
        .with_partials(DirectoryPartials::new(&options.partial_dir));
    let mut report = if options.files.is_empty() {
        render_stdin(&renderer, &load.secrets, input, output)?;
        RunReport::default()
    } else {
        render_files(&renderer, &options.files, &load.secrets, output)
    };

    report.keys_loaded = load.secrets.len();
    report.failed_identifiers = failed_identifiers;
    Ok(report)
}

/// Render a single template read from `input` and write it to `output`
pub fn render_stdin<R, W>(
    renderer: &Renderer,
    secrets: &SecretMap,
    mut input: R,
    output: &mut W,
) -> Result<(), RunError>
where
    R: Read,
    W: Write,
{
    let mut template = String::new();
    input
        .read_to_string(&mut template)
        .map_err(|source| RunError::Io {
            context: "Failed to read template from standard input".to_string(),
            source,
        })?;

    let rendered = renderer.render(&template, secrets)?;

    output
        .write_all(rendered.as_bytes())
        .and_then(|()| output.flush())
        .map_err(|source| RunError::Io {
            context: "Failed to write rendered template".to_string(),
            source,
        })
}

/// Render each `*.mustache` file to its sibling with the suffix removed
///
/// Files are processed in order. A failure affects only its own file.
pub fn render_files<W>(
    renderer: &Renderer,
    files: &[PathBuf],
    secrets: &SecretMap,
    output: &mut W,
) -> RunReport
where
    W: Write,
{
    let mut report = RunReport::default();

    for path in files {
        let Some(target) = output_path(path) else {
            warn!(
                "{} does not have extension {} - ignored",
                path.display(),
                TEMPLATE_SUFFIX
            );
            report.skipped.push(path.clone());
            continue;
        };

        match render_file(renderer, path, &target, secrets) {
            Ok(()) => {
                if let Err(e) = writeln!(output, "Rendered {} to {}", path.display(), target.display()) {
                    warn!("Failed to report rendered file {}: {}", path.display(), e);
                }
                report.rendered.push(RenderedFile {
                    template: path.clone(),
                    output: target,
                });
            }
            Err(e) => {
                error!("{}", e);
                report.failed.push(e);
            }
        }
    }

    report
}

fn render_file(
    renderer: &Renderer,
    path: &Path,
    target: &Path,
    secrets: &SecretMap,
) -> Result<(), FileError> {
    let template = fs::read_to_string(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    // Render fully before touching the output file
    let rendered = renderer
        .render(&template, secrets)
        .map_err(|source| FileError::Render {
            path: path.to_path_buf(),
            source,
        })?;

    fs::write(target, rendered).map_err(|source| FileError::Write {
        path: target.to_path_buf(),
        source,
    })
}

/// Output path for a template: the path with a trailing `.mustache`
/// (any case) removed. `None` if the path does not carry the suffix.
pub fn output_path(path: &Path) -> Option<PathBuf> {
    let raw = path.to_str()?;
    let cut = raw.len().checked_sub(TEMPLATE_SUFFIX.len())?;
    let (stem, suffix) = (raw.get(..cut)?, raw.get(cut..)?);

    if !suffix.eq_ignore_ascii_case(TEMPLATE_SUFFIX) || stem.is_empty() || stem.ends_with(is_separator) {
        return None;
    }

    Some(PathBuf::from(stem))
}
