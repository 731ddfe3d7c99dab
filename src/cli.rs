//! Command-line interface for the evaluator.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::batch::{
    compare_predictions, convert_directory, evaluate_table, format_comparison_report,
};
use crate::config::{DEFAULT_ANNOTATION_COLUMN, DEFAULT_CONTAINER_TAG};
use crate::consolidate::{consolidate, write_consolidated_csv, write_consolidated_json};
use crate::error::Result;
use crate::extract::Extractor;

/// bibtag-eval - Evaluate inline bibliographic tag annotations.
#[derive(Parser)]
#[command(name = "bibtag-eval")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert inline-annotated text files to standoff format.
    Convert {
        /// Directory of inline-annotated .txt files
        input: PathBuf,

        /// Output directory for standoff files (created if absent)
        output: PathBuf,

        /// Container tag delimiting record blocks
        #[arg(short, long, default_value = DEFAULT_CONTAINER_TAG)]
        container: String,
    },

    /// Score standoff prediction files against a ground-truth file.
    Compare {
        /// Ground-truth standoff file
        ground_truth: PathBuf,

        /// Directory of standoff prediction files
        predictions: PathBuf,

        /// Write the report to this file in addition to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze annotation quality in a TSV and append quality columns.
    Analyze {
        /// Input TSV file (annotation string in one column per row)
        input: PathBuf,

        /// Output TSV file with appended quality columns
        output: PathBuf,

        /// Zero-based index of the annotation column
        #[arg(short, long, default_value_t = DEFAULT_ANNOTATION_COLUMN)]
        column: usize,
    },

    /// Merge an analyzed TSV with correction files into one JSON dataset.
    Consolidate {
        /// Quality-evaluated TSV (output of `analyze`)
        table: PathBuf,

        /// Directory of line_{N}.json correction files
        corrections: PathBuf,

        /// Output JSON file
        output: PathBuf,

        /// Also write a flattened CSV of the records to this file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            container,
        } => convert_command(&input, &output, &container),
        Commands::Compare {
            ground_truth,
            predictions,
            output,
        } => compare_command(&ground_truth, &predictions, output.as_deref()),
        Commands::Analyze {
            input,
            output,
            column,
        } => analyze_command(&input, &output, column),
        Commands::Consolidate {
            table,
            corrections,
            output,
            csv,
        } => consolidate_command(&table, &corrections, &output, csv.as_deref()),
    }
}

/// Create the standard progress spinner.
fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Execute the convert command.
fn convert_command(
    input: &std::path::Path,
    output: &std::path::Path,
    container: &str,
) -> Result<()> {
    let extractor = Extractor::new(container)?;

    println!(
        "{} {} blocks from {}",
        style("Extracting").bold(),
        style(container).cyan(),
        style(input.display()).green()
    );

    let pb = spinner("Converting files...");
    let converted = match convert_directory(&extractor, input, output) {
        Ok(converted) => converted,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    println!(
        "{} {} file(s) to {}",
        style("Converted").green().bold(),
        converted,
        output.display()
    );

    Ok(())
}

/// Execute the compare command.
fn compare_command(
    ground_truth: &std::path::Path,
    predictions: &std::path::Path,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let results = compare_predictions(ground_truth, predictions)?;
    let report = format_comparison_report(&results);

    print!("{report}");

    if let Some(path) = output {
        fs::write(path, &report)?;
        println!(
            "{} {}",
            style("Report saved to:").green().bold(),
            path.display()
        );
    }

    Ok(())
}

/// Execute the analyze command.
fn analyze_command(input: &std::path::Path, output: &std::path::Path, column: usize) -> Result<()> {
    println!(
        "{} {}",
        style("Analyzing").bold(),
        style(input.display()).green()
    );

    let pb = spinner("Analyzing annotations...");
    let report = match evaluate_table(input, output, column) {
        Ok(report) => report,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    println!("  Rows: {}", report.rows);
    println!(
        "  Malformed: {}",
        if report.malformed > 0 {
            style(report.malformed).yellow().bold()
        } else {
            style(report.malformed)
        }
    );
    println!("  Overlapping: {}", report.overlapping);
    if report.row_errors > 0 {
        println!(
            "  Row errors: {}",
            style(report.row_errors).yellow().bold()
        );
    }
    println!();
    println!(
        "{} {}",
        style("Results saved to:").green().bold(),
        output.display()
    );

    Ok(())
}

/// Execute the consolidate command.
fn consolidate_command(
    table: &std::path::Path,
    corrections: &std::path::Path,
    output: &std::path::Path,
    csv: Option<&std::path::Path>,
) -> Result<()> {
    let records = consolidate(table, corrections)?;
    write_consolidated_json(&records, output)?;
    if let Some(path) = csv {
        write_consolidated_csv(&records, path)?;
    }

    let faulty = records.iter().filter(|r| r.is_faulty).count();
    let corrected = records.iter().filter(|r| r.has_correction).count();

    println!("  Records: {}", records.len());
    println!("  Faulty: {faulty}");
    println!("  With correction: {corrected}");
    println!();
    println!(
        "{} {}",
        style("Saved to:").green().bold(),
        output.display()
    );
    if let Some(path) = csv {
        println!(
            "{} {}",
            style("CSV saved to:").green().bold(),
            path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_convert_defaults() {
        let cli = Cli::parse_from(["bibtag-eval", "convert", "in", "out"]);

        let Commands::Convert {
            input,
            output,
            container,
        } = cli.command
        else {
            panic!("expected convert command");
        };
        assert_eq!(input, PathBuf::from("in"));
        assert_eq!(output, PathBuf::from("out"));
        assert_eq!(container, "BIBL");
    }

    #[test]
    fn test_cli_parse_convert_custom_container() {
        let cli = Cli::parse_from(["bibtag-eval", "convert", "in", "out", "--container", "REF"]);

        let Commands::Convert { container, .. } = cli.command else {
            panic!("expected convert command");
        };
        assert_eq!(container, "REF");
    }

    #[test]
    fn test_cli_parse_analyze_column() {
        let cli = Cli::parse_from(["bibtag-eval", "analyze", "in.tsv", "out.tsv", "--column", "3"]);

        let Commands::Analyze { column, .. } = cli.command else {
            panic!("expected analyze command");
        };
        assert_eq!(column, 3);
    }

    #[test]
    fn test_cli_parse_consolidate_csv_flag() {
        let cli = Cli::parse_from([
            "bibtag-eval",
            "consolidate",
            "evaluated.tsv",
            "corrections",
            "out.json",
            "--csv",
            "out.csv",
        ]);

        let Commands::Consolidate { csv, .. } = cli.command else {
            panic!("expected consolidate command");
        };
        assert_eq!(csv, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn test_cli_parse_compare_without_output() {
        let cli = Cli::parse_from(["bibtag-eval", "compare", "truth.txt", "predictions"]);

        let Commands::Compare { output, .. } = cli.command else {
            panic!("expected compare command");
        };
        assert!(output.is_none());
    }
}
