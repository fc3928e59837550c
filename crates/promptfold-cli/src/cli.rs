//! promptfold command line
//!
//! Lists and folds the prompt-anchored blocks of a saved REPL or shell
//! transcript, using the same fold session an editor integration would.

mod logging;
mod view;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use promptfold_core::{
    Block, FoldRegistry, FoldSession, FoldSpec, HighlightScheme, PromptHost, TranscriptBuffer,
};
use promptfold_settings::PromptFoldSettings;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use view::FoldView;

/// Exit code when folding cannot be set up for the mode.
const EXIT_CONFIGURATION: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "promptfold",
    version,
    about = "Fold the prompt-anchored blocks of REPL and shell transcripts"
)]
struct Cli {
    #[command(flatten)]
    fold: FoldArgs,

    /// Log folding decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct FoldArgs {
    /// Transcript mode whose prompt pattern and settings apply
    #[arg(short, long, global = true, default_value = "shell", env = "PROMPTFOLD_MODE")]
    mode: String,

    /// Prompt pattern used instead of the mode's
    #[arg(short, long, global = true)]
    prompt: Option<String>,

    /// Blank lines before a prompt kept visible when a block is folded
    #[arg(short, long, global = true)]
    blank_lines: Option<usize>,

    /// Settings file to read instead of the user config
    #[arg(long, global = true, env = "PROMPTFOLD_SETTINGS")]
    settings: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the blocks of a transcript
    Blocks {
        /// Transcript file, `-` for stdin
        file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print a transcript with blocks folded
    Fold {
        /// Transcript file, `-` for stdin
        file: PathBuf,

        /// Fold only these blocks (1-based, as listed by `blocks`)
        #[arg(long = "block", value_name = "N")]
        blocks: Vec<usize>,

        /// Color the fold indicator
        #[arg(long)]
        color: bool,
    },
    /// Print the compiled end pattern for the mode
    EndPattern,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{e:#}");
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let settings = load_settings(cli.fold.settings.as_deref())?;
    let resolved = settings.resolve(&cli.fold.mode);

    let mut config = resolved.config;
    if let Some(prompt) = cli.fold.prompt {
        config.prompt_pattern = Some(prompt);
    }
    if let Some(blank_lines) = cli.fold.blank_lines {
        config.blank_lines = blank_lines;
    }

    let mut registry = FoldRegistry::new();
    let mut session = FoldSession::new(resolved.mode, config);
    let spec = match session.setup(&mut registry, resolved.host_prompt.as_deref()) {
        Ok(spec) => spec.clone(),
        Err(e) => {
            eprintln!("warning: folding is inactive for mode '{}': {e}", cli.fold.mode);
            return Ok(ExitCode::from(EXIT_CONFIGURATION));
        }
    };

    let result = match cli.command {
        Command::Blocks { file, json } => {
            let buffer = read_transcript(&file, &spec)?;
            list_blocks(&buffer, &spec.blocks(&buffer), json)
        }
        Command::Fold {
            file,
            blocks,
            color,
        } => {
            let buffer = read_transcript(&file, &spec)?;
            fold(&buffer, &spec, &session, &settings.highlight, &blocks, color)
        }
        Command::EndPattern => {
            println!("{}", spec.end);
            Ok(())
        }
    };

    session.teardown(&mut registry);
    result.map(|()| ExitCode::SUCCESS)
}

fn load_settings(path: Option<&Path>) -> Result<PromptFoldSettings> {
    match path {
        Some(path) => PromptFoldSettings::load_from(path),
        None => PromptFoldSettings::load(),
    }
}

fn read_transcript(path: &Path, spec: &FoldSpec) -> Result<TranscriptBuffer> {
    let text = if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read transcript from stdin")?;
        text
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript {:?}", path))?
    };
    tracing::debug!(bytes = text.len(), "Read transcript");
    Ok(TranscriptBuffer::new(text, spec.start.clone()))
}

#[derive(Debug, Serialize)]
struct BlockRow {
    index: usize,
    line: usize,
    input: String,
    lines: usize,
    foldable: bool,
}

fn block_rows(buffer: &TranscriptBuffer, blocks: &[Block]) -> Vec<BlockRow> {
    blocks
        .iter()
        .enumerate()
        .map(|(i, block)| BlockRow {
            index: i + 1,
            line: block.start_line + 1,
            input: buffer.slice(block.prompt.start..block.header_end),
            lines: block.line_count(),
            foldable: block.foldable,
        })
        .collect()
}

fn list_blocks(buffer: &TranscriptBuffer, blocks: &[Block], json: bool) -> Result<()> {
    let rows = block_rows(buffer, blocks);
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["#", "Line", "Input", "Lines", "Foldable"]);
    for row in &rows {
        table.add_row(vec![
            row.index.to_string(),
            row.line.to_string(),
            row.input.clone(),
            row.lines.to_string(),
            if row.foldable { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn fold(
    buffer: &TranscriptBuffer,
    spec: &FoldSpec,
    session: &FoldSession,
    highlight: &HighlightScheme,
    selected: &[usize],
    color: bool,
) -> Result<()> {
    let mut view = FoldView::new(spec.blocks(buffer));
    if selected.is_empty() {
        view.fold_all();
    } else {
        for index in fold_selected(&mut view, selected)? {
            eprintln!("note: block {index} cannot be folded, leaving it open");
        }
    }

    tracing::debug!(hidden = view.hidden_line_count(), "Folded transcript");
    let decorator = session.decorator(highlight);
    print!("{}", view.render(&buffer.text(), &decorator, color));
    Ok(())
}

/// Collapse the blocks numbered in `selected` (1-based).
///
/// Returns the numbers of blocks left open because they cannot be folded.
fn fold_selected(view: &mut FoldView, selected: &[usize]) -> Result<Vec<usize>> {
    let mut skipped = Vec::new();
    for &index in selected {
        let block = index
            .checked_sub(1)
            .and_then(|i| view.blocks().get(i))
            .with_context(|| format!("No block {index}"))?;
        let start_line = block.start_line;
        if !view.is_line_folded(start_line) && !view.toggle_fold(start_line) {
            tracing::warn!(index, "Block is not foldable");
            skipped.push(index);
        }
    }
    Ok(skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn shell_spec() -> FoldSpec {
        let settings = PromptFoldSettings::default();
        let resolved = settings.resolve("shell");
        resolved
            .config
            .build_spec(&resolved.mode, resolved.host_prompt.as_deref())
            .unwrap()
    }

    #[test]
    fn test_cli_parses_global_options() {
        let cli = Cli::try_parse_from([
            "promptfold",
            "fold",
            "session.log",
            "--mode",
            "python",
            "--block",
            "2",
            "--block",
            "3",
            "-b",
            "1",
        ])
        .unwrap();

        assert_eq!(cli.fold.mode, "python");
        assert_eq!(cli.fold.blank_lines, Some(1));
        match cli.command {
            Command::Fold { file, blocks, color } => {
                assert_eq!(file, PathBuf::from("session.log"));
                assert_eq!(blocks, vec![2, 3]);
                assert!(!color);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_block_rows() {
        let spec = shell_spec();
        let buffer = TranscriptBuffer::new(
            indoc! {"
                ~ $ echo hi
                hi
                ~ $ "},
            spec.start.clone(),
        );

        let rows = block_rows(&buffer, &spec.blocks(&buffer));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].line, 1);
        assert_eq!(rows[0].input, "~ $ echo hi");
        assert_eq!(rows[0].lines, 2);
        assert!(rows[0].foldable);
        assert_eq!(rows[1].line, 3);
        assert!(!rows[1].foldable);
    }

    #[test]
    fn test_fold_selected_reports_unfoldable_blocks() {
        let spec = shell_spec();
        let buffer = TranscriptBuffer::new("$ make
ok
$ make test
failed
$ ", spec.start.clone());
        let mut view = FoldView::new(spec.blocks(&buffer));

        let skipped = fold_selected(&mut view, &[2, 3, 2]).unwrap();
        assert_eq!(skipped, vec![3]);
        assert!(view.is_line_folded(2));
        assert!(!view.is_line_folded(4));

        let err = fold_selected(&mut view, &[0]).unwrap_err();
        assert_eq!(err.to_string(), "No block 0");
        assert!(fold_selected(&mut view, &[9]).is_err());
    }
}
