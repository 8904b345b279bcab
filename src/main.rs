use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use theme_patcher::process::{process_file, FileOutcome, RunSummary};
use theme_patcher::rules::RuleSet;
use theme_patcher::walk::dart_files;

#[derive(Parser)]
#[command(name = "theme-patcher")]
#[command(about = "Migrate hardcoded white colors to theme references in Dart sources", long_about = None)]
#[command(version)]
struct Cli {
    /// Root directory to scan for .dart files
    directory: Option<PathBuf>,

    /// Dry run - show what would be changed without modifying files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff of changes
    #[arg(short, long)]
    diff: bool,

    /// Also report skipped and unchanged files
    #[arg(short, long)]
    verbose: bool,

    /// List the rewrite rules and exit
    #[arg(long)]
    list_rules: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let rules = RuleSet::white_to_theme()?;

    if cli.list_rules {
        cmd_list_rules(&rules);
        return Ok(());
    }

    let Some(directory) = cli.directory else {
        Cli::command().print_help()?;
        std::process::exit(1);
    };

    if !directory.exists() {
        println!(
            "{} Directory {} does not exist",
            "Error:".red(),
            directory.display()
        );
        std::process::exit(1);
    }

    println!(
        "Scanning {} for Dart files with white color literals...",
        directory.display()
    );
    if cli.dry_run {
        println!("{}", "[DRY RUN - no files will be modified]".cyan());
    }
    println!();

    let mut summary = RunSummary::default();

    for path in dart_files(&directory) {
        let result = process_file(&path, &rules, cli.dry_run);
        summary.record(&result);

        match result {
            Ok(FileOutcome::Fixed { old, new }) => {
                if cli.dry_run {
                    println!("{} Would fix: {}", "✓".green(), path.display());
                } else {
                    println!("{} Fixed: {}", "✓".green(), path.display());
                }
                if cli.diff {
                    display_diff(&path, &old, &new);
                }
            }
            Ok(FileOutcome::Skipped { marker }) => {
                if cli.verbose {
                    println!(
                        "{} Skipped: {} ({})",
                        "⊘".cyan(),
                        path.display(),
                        marker.dimmed()
                    );
                }
            }
            Ok(FileOutcome::Unchanged) => {
                if cli.verbose {
                    println!("{} Unchanged: {}", "⊙".yellow(), path.display());
                }
            }
            // Per-file failures are reported and the run continues
            Err(e) => {
                eprintln!("{} {}", "✗".red(), e);
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  Total files scanned: {}", summary.scanned);
    println!("  Files fixed: {}", format!("{}", summary.fixed).green());
    println!("  Files unchanged: {}", summary.unchanged());

    Ok(())
}

/// Helper: Show unified diff between original and fixed content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (fixed)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_list_rules(rules: &RuleSet) {
    println!("{}", "Rewrite rules (applied in order):".bold());
    println!();
    for rule in rules.rules() {
        println!("  {}", rule.name().green());
        println!("    pattern:     {}", rule.pattern());
        println!("    replacement: {}", rule.replacement());
    }
}
