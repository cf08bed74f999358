use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use rediff_sdk::{ApplyPatchResult, CharDiff, DiffStats, LineDiff, OpKind, Rediff, RediffConfig};
use serde::Serialize;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => {
            let config = RediffConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            debug!(path = %path.display(), ?config, "loaded config");
            config
        }
        None => RediffConfig::default(),
    };
    let rediff = Rediff::new(config);

    match cli.command {
        Command::Chars(args) => cmd_chars(&rediff, args, &cli.format),
        Command::Lines(args) => cmd_lines(&rediff, args, &cli.format),
        Command::MakePatch(args) => cmd_make_patch(&rediff, args, &cli.format),
        Command::Apply(args) => cmd_apply(&rediff, args, &cli.format),
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn write(path: &Path, contents: &str) -> anyhow::Result<()> {
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_chars(rediff: &Rediff, args: PairArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let diff = rediff.char_diff(&read(&args.old)?, &read(&args.new)?);
    match format {
        OutputFormat::Json => print_json(&diff),
        OutputFormat::Text => {
            print_char_diff(&diff);
            print_stats(&diff.stats);
            Ok(())
        }
    }
}

fn print_char_diff(diff: &CharDiff) {
    let mut out = String::new();
    for op in &diff.operations {
        let piece = match op.kind {
            OpKind::Equal => op.text.normal(),
            OpKind::Delete => op.text.red().strikethrough(),
            OpKind::Insert => op.text.green().underline(),
        };
        out.push_str(&piece.to_string());
    }
    println!("{out}");
}

fn cmd_lines(rediff: &Rediff, args: PairArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let diff = rediff.line_diff(&read(&args.old)?, &read(&args.new)?);
    match format {
        OutputFormat::Json => print_json(&diff),
        OutputFormat::Text => {
            print_line_diff(&diff);
            print_stats(&diff.stats);
            Ok(())
        }
    }
}

fn print_line_diff(diff: &LineDiff) {
    let number = |n: Option<usize>| n.map_or_else(|| "    ".to_string(), |n| format!("{n:>4}"));
    for record in &diff.lines {
        let gutter = format!("{} {}", number(record.old_line), number(record.new_line));
        let body = format!("{}{}", record.kind.tag(), record.content);
        let body = match record.kind {
            OpKind::Equal => body.normal(),
            OpKind::Delete => body.red(),
            OpKind::Insert => body.green(),
        };
        println!("{} {}", gutter.dimmed(), body);
    }
}

fn print_stats(stats: &DiffStats) {
    if stats.is_unchanged() {
        println!("{}", "No changes.".dimmed());
        return;
    }
    println!(
        "{} added, {} removed, {} of {} operations changed",
        format!("+{}", stats.additions).green(),
        format!("-{}", stats.deletions).red(),
        stats.changes.to_string().bold(),
        stats.total,
    );
}

fn cmd_make_patch(rediff: &Rediff, args: MakePatchArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let patch = rediff.make_patch(&read(&args.old)?, &read(&args.new)?);
    if let Some(output) = &args.output {
        write(output, &patch)?;
        if *format == OutputFormat::Text {
            eprintln!("{} Wrote patch to {}", "✓".green().bold(), output.display());
        }
        return Ok(());
    }
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "patch": patch })),
        OutputFormat::Text => {
            print!("{patch}");
            Ok(())
        }
    }
}

fn cmd_apply(rediff: &Rediff, args: ApplyArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let result = rediff.apply_patch(&read(&args.file)?, &read(&args.patch)?);

    if *format == OutputFormat::Json {
        print_json(&result)?;
    }

    let hunks = match &result {
        ApplyPatchResult::Rejected { error } => {
            bail!("patch {} is malformed: {error}", args.patch.display())
        }
        ApplyPatchResult::Applied { text, hunks } => {
            match &args.output {
                Some(output) => write(output, text)?,
                None if *format == OutputFormat::Text => print!("{text}"),
                None => {}
            }
            hunks
        }
    };

    let applied = hunks.iter().filter(|&&applied| applied).count();
    if !result.is_clean() {
        let rejected: Vec<String> = hunks
            .iter()
            .enumerate()
            .filter_map(|(i, applied)| (!applied).then(|| (i + 1).to_string()))
            .collect();
        bail!(
            "applied {applied} of {} hunks; rejected hunk(s) {}",
            hunks.len(),
            rejected.join(", ")
        );
    }
    if *format == OutputFormat::Text {
        eprintln!("{} Applied {} hunk(s)", "✓".green().bold(), applied);
    }
    Ok(())
}
