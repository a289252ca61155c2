//! Command-line interface for the corpus splitter.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{OutputFormat, DEFAULT_ENCODING};
use crate::error::Result;
use crate::splitter::{run_split, OutputDecision, SplitOptions};

/// Corpus Splitter - Split an OpenCorpora dump into one file per text.
#[derive(Parser, Debug)]
#[command(name = "corpus-splitter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// OpenCorpora annotation XML file
    pub corpus_file: PathBuf,

    /// Output directory (default: v.<version>.<revision> from the corpus)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 0: silent, overwrite without asking; 1: summary; 2: every document
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub verbosity: u8,

    /// Encoding of XML output files
    #[arg(short, long, default_value = DEFAULT_ENCODING)]
    pub encoding: String,

    /// Output format for texts
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markup)]
    pub format: OutputFormat,

    /// Print the elapsed time
    #[arg(short, long)]
    pub time: bool,
}

impl Cli {
    /// Options for the split run.
    #[must_use]
    pub fn options(&self) -> SplitOptions {
        SplitOptions {
            output: self.output.clone(),
            format: self.format,
            encoding: self.encoding.clone(),
            verbosity: self.verbosity,
            cancel: None,
        }
    }
}

/// Default log level for a verbosity setting.
#[must_use]
pub fn log_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "info",
        _ => "debug",
    }
}

/// Run the CLI.
pub fn run(cli: Cli) -> Result<()> {
    let started = Instant::now();
    let verbosity = cli.verbosity;

    // Stays invisible until the first document, so it never covers the prompt
    let pb = if verbosity == 0 {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {pos} texts {msg}")
            .expect("valid template"),
    );

    let progress = {
        let pb = pb.clone();
        move |path: &Path| {
            pb.inc(1);
            pb.set_message(path.display().to_string());
            if verbosity >= 2 {
                tracing::info!(path = %path.display(), "Wrote document");
            }
        }
    };

    let outcome = match run_split(
        &cli.corpus_file,
        &cli.options(),
        io::stdin().lock(),
        io::stdout(),
        progress,
    ) {
        Ok(outcome) => outcome,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    if let Some(summary) = &outcome.summary {
        if verbosity >= 1 {
            let action = match outcome.decision {
                OutputDecision::Overwritten => "Replaced",
                _ => "Created",
            };
            println!(
                "{} {} ({} {}, format {})",
                style(format!("{action}:")).green().bold(),
                outcome.dir.display(),
                style(summary.documents).cyan(),
                if summary.documents == 1 { "text" } else { "texts" },
                cli.format,
            );
            if summary.annotation.is_none() {
                println!("  {}", style("No annotation element found").yellow());
            }
        }
    }

    if cli.time {
        println!("Elapsed: {:.2?}", started.elapsed());
    }

    Ok(())
}
