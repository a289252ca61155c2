//! Split run orchestration: input checks, output directory lifecycle and the
//! streaming pass itself.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::config::{default_output_dir, resolve_encoding, OutputFormat, DEFAULT_ENCODING};
use crate::error::{Result, SplitterError};
use crate::output::OutputLayout;
use crate::splitting::{
    CancelToken, DocumentSplitter, MarkupStrategy, OutputStrategy, RecordStrategy, SplitSummary,
};
use crate::xml::{peek_annotation, EventSource};

/// Hint printed when an overwrite is declined.
pub const OUTPUT_HINT: &str = "Try with -o/--output option to set proper output path";

/// Options for one split run.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Output directory; derived from the annotation when absent.
    pub output: Option<PathBuf>,

    /// Per-document output format.
    pub format: OutputFormat,

    /// Encoding label for markup output.
    pub encoding: String,

    /// 0 (silent, overwrite without asking), 1 or 2.
    pub verbosity: u8,

    /// Token checked after every finished document.
    pub cancel: Option<CancelToken>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            output: None,
            format: OutputFormat::Markup,
            encoding: DEFAULT_ENCODING.to_string(),
            verbosity: 1,
            cancel: None,
        }
    }
}

/// What happened to the output directory before splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDecision {
    /// The directory did not exist and was created.
    Created,
    /// The directory existed and was recreated empty.
    Overwritten,
    /// The directory existed and the user kept it; nothing was written.
    Declined,
}

/// Outcome of [`run_split`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    /// Output directory used (or left alone).
    pub dir: PathBuf,
    pub decision: OutputDecision,
    /// `None` when the overwrite was declined.
    pub summary: Option<SplitSummary>,
}

/// Fail with `InputNotFound` unless `input` is an existing file.
pub fn ensure_input(input: &Path) -> Result<()> {
    if input.is_file() {
        Ok(())
    } else {
        Err(SplitterError::InputNotFound(input.to_path_buf()))
    }
}

/// Determine the output directory.
///
/// An explicit `output` wins. Otherwise the name is derived from the
/// annotation's version and revision, e.g. `v.0.11.3709973`.
pub fn resolve_output_dir(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = output {
        return Ok(dir.to_path_buf());
    }

    ensure_input(input)?;
    let reader = BufReader::new(File::open(input)?);
    peek_annotation(reader)?
        .as_ref()
        .and_then(default_output_dir)
        .ok_or_else(|| SplitterError::MissingAnnotation(input.to_path_buf()))
}

/// Ask whether an existing output directory may be replaced.
///
/// At verbosity 0 the answer is always yes. Otherwise the question repeats
/// until the answer is empty, `y` or `n`; empty input and `n` decline. End
/// of input declines as well.
pub fn ask_for_overwrite<R: BufRead, W: Write>(
    dir: &Path,
    verbosity: u8,
    mut input: R,
    mut output: W,
) -> Result<bool> {
    if verbosity == 0 {
        return Ok(true);
    }

    loop {
        write!(
            output,
            "Output folder {} already exists. Overwrite it? [n]/y ",
            dir.display()
        )?;
        output.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;

        match answer.trim() {
            "y" => return Ok(true),
            "" | "n" => {
                writeln!(output, "{OUTPUT_HINT}")?;
                return Ok(false);
            }
            other => tracing::debug!(answer = %other, "Unrecognized answer, asking again"),
        }
    }
}

/// Make sure `dir` exists and is empty, asking before replacing it.
pub fn prepare_output_dir<R: BufRead, W: Write>(
    dir: &Path,
    verbosity: u8,
    input: R,
    output: W,
) -> Result<OutputDecision> {
    if !dir.exists() {
        create_dir(dir)?;
        return Ok(OutputDecision::Created);
    }

    if !ask_for_overwrite(dir, verbosity, input, output)? {
        return Ok(OutputDecision::Declined);
    }

    if dir.is_dir() {
        fs::remove_dir_all(dir)?;
    } else {
        fs::remove_file(dir)?;
    }
    create_dir(dir)?;
    tracing::debug!(dir = %dir.display(), "Recreated output directory");
    Ok(OutputDecision::Overwritten)
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| SplitterError::ResourceCreation {
        path: dir.to_path_buf(),
        source,
    })
}

/// Split `input` into `dir`, which must already exist.
///
/// `progress` is called with the path of every written document.
pub fn split_corpus<F>(
    input: &Path,
    dir: &Path,
    options: &SplitOptions,
    progress: F,
) -> Result<SplitSummary>
where
    F: FnMut(&Path) + 'static,
{
    ensure_input(input)?;
    // Record output is always UTF-8; the label is still checked up front
    resolve_encoding(&options.encoding)?;

    let layout = OutputLayout::new(dir, options.format);
    let events = EventSource::new(BufReader::new(File::open(input)?));

    tracing::debug!(
        input = %input.display(),
        dir = %dir.display(),
        format = %options.format,
        "Splitting corpus"
    );

    match options.format {
        OutputFormat::Markup => {
            let strategy = MarkupStrategy::new(&options.encoding)?;
            run_strategy(strategy, layout, events, options, progress)
        }
        OutputFormat::Record => {
            run_strategy(RecordStrategy::new(), layout, events, options, progress)
        }
    }
}

fn run_strategy<S, R, F>(
    strategy: S,
    layout: OutputLayout,
    events: EventSource<R>,
    options: &SplitOptions,
    progress: F,
) -> Result<SplitSummary>
where
    S: OutputStrategy,
    R: BufRead,
    F: FnMut(&Path) + 'static,
{
    let mut splitter = DocumentSplitter::new(strategy, layout).with_progress(progress);
    if let Some(token) = &options.cancel {
        splitter = splitter.with_cancel_token(token.clone());
    }
    splitter.run(events)
}

/// Run the whole lifecycle: check the input and options, settle the output
/// directory, then split.
///
/// Nothing on disk changes before the input and encoding are known to be
/// usable.
///
/// `answers` and `prompt` carry the overwrite question.
pub fn run_split<R, W, F>(
    input: &Path,
    options: &SplitOptions,
    answers: R,
    prompt: W,
    progress: F,
) -> Result<SplitOutcome>
where
    R: BufRead,
    W: Write,
    F: FnMut(&Path) + 'static,
{
    ensure_input(input)?;
    resolve_encoding(&options.encoding)?;
    let dir = resolve_output_dir(input, options.output.as_deref())?;

    let decision = prepare_output_dir(&dir, options.verbosity, answers, prompt)?;
    if decision == OutputDecision::Declined {
        return Ok(SplitOutcome {
            dir,
            decision,
            summary: None,
        });
    }

    let summary = split_corpus(input, &dir, options, progress)?;
    Ok(SplitOutcome {
        dir,
        decision,
        summary: Some(summary),
    })
}
