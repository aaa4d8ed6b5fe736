//! finjoin CLI
//!
//! Command-line tool for merging annual and quarterly financial statement tables.

use clap::{Parser, Subcommand, ValueEnum};
use finjoin_core::{
    delimiter_byte, merge, read_table, reconcile_columns, scan_directory, write_json,
    write_merged, write_merged_file, MergeConfig, MergeOptions, MergedTable, Source,
    StatementPair,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "finjoin")]
#[command(about = "Merge annual and quarterly financial statement tables", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads statement files
#[derive(clap::Args)]
struct InputArgs {
    /// JSON config file (delimiters, renames, row transforms)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input field delimiter (default ";")
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Row holding report dates, reformatted from dd.mm.yyyy to yyyy-mm-dd
    #[arg(long)]
    date_row: Option<String>,

    /// Rename a row in the output (FROM=TO, repeatable)
    #[arg(long, value_parser = parse_rename)]
    rename: Vec<(String, String)>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Delimited text
    Tsv,
    /// Pretty-printed JSON with column provenance
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge an annual and a quarterly file into one table
    Merge {
        /// Annual statement file
        annual: PathBuf,

        /// Quarterly statement file
        quarterly: PathBuf,

        /// Output file path ("-" for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Output field delimiter (default tab)
        #[arg(long)]
        output_delimiter: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "tsv")]
        format: OutputFormat,

        #[command(flatten)]
        input: InputArgs,
    },

    /// Show the merged column order and suppressed Q4 columns
    Plan {
        /// Annual statement file
        annual: PathBuf,

        /// Quarterly statement file
        quarterly: PathBuf,

        #[command(flatten)]
        input: InputArgs,
    },

    /// Print a merged table
    Show {
        /// Annual statement file
        annual: PathBuf,

        /// Quarterly statement file
        quarterly: PathBuf,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,

        /// Columns to display (comma-separated)
        #[arg(long)]
        columns: Option<String>,

        #[command(flatten)]
        input: InputArgs,
    },

    /// Merge every annual/quarterly pair found under the given roots
    Batch {
        /// Root directories to scan
        #[arg(short, long, required = true)]
        root: Vec<PathBuf>,

        /// Output directory for merged files
        #[arg(short, long)]
        output: PathBuf,

        /// Output field delimiter (default tab)
        #[arg(long)]
        output_delimiter: Option<String>,

        #[command(flatten)]
        input: InputArgs,
    },

    /// Create a config file template
    InitConfig {
        /// Output path for the config file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Commands) -> finjoin_core::Result<()> {
    match command {
        Commands::Merge {
            annual,
            quarterly,
            output,
            output_delimiter,
            format,
            input,
        } => cmd_merge(&annual, &quarterly, &output, output_delimiter, format, &input),
        Commands::Plan {
            annual,
            quarterly,
            input,
        } => cmd_plan(&annual, &quarterly, &input),
        Commands::Show {
            annual,
            quarterly,
            limit,
            columns,
            input,
        } => cmd_show(&annual, &quarterly, limit, columns, &input),
        Commands::Batch {
            root,
            output,
            output_delimiter,
            input,
        } => cmd_batch(&root, &output, output_delimiter, &input),
        Commands::InitConfig { output } => cmd_init_config(&output),
    }
}

/// Parse a `FROM=TO` rename argument
fn parse_rename(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((from, to)) if !from.is_empty() => Ok((from.to_string(), to.to_string())),
        _ => Err(format!("expected FROM=TO, got '{}'", s)),
    }
}

/// Resolve the config file plus command-line overrides
fn load_config(input: &InputArgs) -> finjoin_core::Result<MergeConfig> {
    let mut config = match &input.config {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            MergeConfig::load(path)?
        }
        None => MergeConfig::default(),
    };

    if let Some(delimiter) = &input.delimiter {
        delimiter_byte(delimiter)?;
        config.input_delimiter = delimiter.clone();
    }
    if let Some(row) = &input.date_row {
        config.date_row = Some(row.clone());
    }
    for (from, to) in &input.rename {
        config.renames.insert(from.clone(), to.clone());
    }

    Ok(config)
}

fn merge_files(
    annual: &Path,
    quarterly: &Path,
    config: &MergeConfig,
    options: &MergeOptions,
) -> finjoin_core::Result<MergedTable> {
    let delimiter = config.input_delimiter()?;
    let annual_table = read_table(annual, delimiter)?;
    let quarterly_table = read_table(quarterly, delimiter)?;
    info!(
        annual = %annual.display(),
        quarterly = %quarterly.display(),
        annual_rows = annual_table.row_count(),
        quarterly_rows = quarterly_table.row_count(),
        "loaded statement tables"
    );
    Ok(merge(&annual_table, &quarterly_table, options))
}

fn cmd_merge(
    annual: &Path,
    quarterly: &Path,
    output: &Path,
    output_delimiter: Option<String>,
    format: OutputFormat,
    input: &InputArgs,
) -> finjoin_core::Result<()> {
    let mut config = load_config(input)?;
    if let Some(delimiter) = output_delimiter {
        config.output_delimiter = delimiter;
    }
    let out_delimiter = config.output_delimiter()?;

    let merged = merge_files(annual, quarterly, &config, &config.merge_options())?;

    if output == Path::new("-") {
        return write_output(&merged, io::stdout().lock(), format, out_delimiter);
    }

    match format {
        OutputFormat::Tsv => write_merged_file(&merged, output, out_delimiter)?,
        OutputFormat::Json => {
            let file = File::create(output).map_err(|e| finjoin_core::Error::FileWrite {
                path: output.to_path_buf(),
                source: e,
            })?;
            write_output(&merged, BufWriter::new(file), format, out_delimiter)?;
        }
    }

    println!(
        "Joined {} rows x {} columns saved to {}",
        merged.row_count(),
        merged.column_count(),
        output.display()
    );

    Ok(())
}

/// Write a merged table in the requested format
fn write_output<W: Write>(
    merged: &MergedTable,
    writer: W,
    format: OutputFormat,
    delimiter: u8,
) -> finjoin_core::Result<()> {
    match format {
        OutputFormat::Tsv => write_merged(merged, writer, delimiter),
        OutputFormat::Json => write_json(merged, writer),
    }
}

fn cmd_plan(annual: &Path, quarterly: &Path, input: &InputArgs) -> finjoin_core::Result<()> {
    let config = load_config(input)?;
    let delimiter = config.input_delimiter()?;
    let annual_table = read_table(annual, delimiter)?;
    let quarterly_table = read_table(quarterly, delimiter)?;

    let plan = reconcile_columns(
        annual_table.columns.as_slice(),
        quarterly_table.columns.as_slice(),
    );

    println!("Columns ({}):", plan.columns.len());
    for column in &plan.columns {
        let source = match column.source {
            Source::Annual => "annual",
            Source::Quarterly => "quarterly",
        };
        println!("  {:<10} [{}]", column.label, source);
    }

    if !plan.suppressed.is_empty() {
        println!();
        println!("Suppressed Q4 columns (annual column used instead):");
        for label in &plan.suppressed {
            println!("  {}", label);
        }
    }

    Ok(())
}

fn cmd_show(
    annual: &Path,
    quarterly: &Path,
    limit: Option<usize>,
    columns: Option<String>,
    input: &InputArgs,
) -> finjoin_core::Result<()> {
    let config = load_config(input)?;
    let merged = merge_files(annual, quarterly, &config, &config.merge_options())?;

    // Filter columns if specified
    let col_filter: Option<Vec<&str>> = columns.as_ref().map(|c| c.split(',').collect());

    let display_cols: Vec<usize> = merged
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            col_filter
                .as_ref()
                .map_or(true, |filter| filter.contains(&c.label.as_str()))
        })
        .map(|(i, _)| i)
        .collect();

    // Print header
    let mut header = vec![merged.index_name.as_str()];
    header.extend(display_cols.iter().map(|&i| merged.columns[i].label.as_str()));
    println!("{}", header.join("\t"));
    println!("{}", "-".repeat(header.len() * 12));

    // Print rows
    let row_limit = limit.unwrap_or(merged.rows.len());
    for row in merged.rows.iter().take(row_limit) {
        let mut values = vec![row.name.as_str()];
        values.extend(display_cols.iter().map(|&i| row.cells[i].as_str()));
        println!("{}", values.join("\t"));
    }

    if merged.rows.len() > row_limit {
        println!("... ({} more rows)", merged.rows.len() - row_limit);
    }

    Ok(())
}

fn cmd_batch(
    roots: &[PathBuf],
    output_dir: &Path,
    output_delimiter: Option<String>,
    input: &InputArgs,
) -> finjoin_core::Result<()> {
    let mut config = load_config(input)?;
    if let Some(delimiter) = output_delimiter {
        config.output_delimiter = delimiter;
    }
    let out_delimiter = config.output_delimiter()?;
    let options = config.merge_options();

    let scan_result = scan_directory(roots)?;
    println!(
        "Found {} pair(s) under {} root(s)",
        scan_result.pairs.len(),
        scan_result.roots.len()
    );
    for path in &scan_result.unpaired {
        warn!(path = %path.display(), "no matching annual/quarterly file");
    }

    std::fs::create_dir_all(output_dir)?;

    let outcome = merge_pairs(&scan_result.pairs, output_dir, &config, &options, out_delimiter);

    println!();
    println!("Batch complete: {} file(s) written", outcome.written.len());

    if !outcome.errors.is_empty() {
        println!("\nErrors ({}):", outcome.errors.len());
        for (name, err) in &outcome.errors {
            println!("  {}: {}", name, err);
        }
    }

    Ok(())
}

/// Files written and per-pair failures of a batch run
#[derive(Debug, Default)]
struct BatchOutcome {
    written: Vec<PathBuf>,
    errors: Vec<(String, String)>,
}

/// Merge every pair into `<output_dir>/<name>.tsv`; a failing pair is
/// recorded and the remaining pairs still run.
fn merge_pairs(
    pairs: &[StatementPair],
    output_dir: &Path,
    config: &MergeConfig,
    options: &MergeOptions,
    out_delimiter: u8,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for pair in pairs {
        let output = output_dir.join(format!("{}.tsv", pair.name));
        let result = merge_files(&pair.annual, &pair.quarterly, config, options)
            .and_then(|merged| write_merged_file(&merged, &output, out_delimiter).map(|_| merged));

        match result {
            Ok(merged) => {
                println!(
                    "  {}: {} rows x {} columns -> {}",
                    pair.name,
                    merged.row_count(),
                    merged.column_count(),
                    output.display()
                );
                outcome.written.push(output);
            }
            Err(e) => {
                warn!(pair = %pair.name, error = %e, "failed to merge pair");
                outcome.errors.push((pair.name.clone(), e.to_string()));
            }
        }
    }

    outcome
}

fn cmd_init_config(output: &Path) -> finjoin_core::Result<()> {
    MergeConfig::template().save(output)?;
    println!("Created config file: {}", output.display());
    println!();
    println!("Edit the file to adjust delimiters and row names, then run:");
    println!(
        "  finjoin merge <annual> <quarterly> --config {} --output <file>",
        output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rename() {
        assert_eq!(
            parse_rename("Net profit=net_income").unwrap(),
            ("Net profit".to_string(), "net_income".to_string())
        );
        assert_eq!(
            parse_rename("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_rename("no-equals").is_err());
        assert!(parse_rename("=x").is_err());
    }

    #[test]
    fn test_cli_parses_merge() {
        let cli = Cli::try_parse_from([
            "finjoin",
            "merge",
            "annual.csv",
            "quarterly.csv",
            "-o",
            "out.tsv",
            "--date-row",
            "Report date",
            "--rename",
            "A=B",
        ])
        .unwrap();

        match cli.command {
            Commands::Merge { output, input, .. } => {
                assert_eq!(output, PathBuf::from("out.tsv"));
                assert_eq!(input.date_row.as_deref(), Some("Report date"));
                assert_eq!(input.rename, vec![("A".to_string(), "B".to_string())]);
            }
            _ => panic!("expected merge command"),
        }
    }

    #[test]
    fn test_load_config_overrides() {
        let input = InputArgs {
            config: None,
            delimiter: Some(",".to_string()),
            date_row: Some("Date".to_string()),
            rename: vec![("x".to_string(), "y".to_string())],
        };
        let config = load_config(&input).unwrap();
        assert_eq!(config.input_delimiter().unwrap(), b',');
        assert_eq!(config.date_row.as_deref(), Some("Date"));
        assert_eq!(config.renames.get("x").map(String::as_str), Some("y"));
    }

    fn merged_fixture() -> MergedTable {
        let annual = finjoin_core::parse_table_str(
            "Metric;2022;LTM\nRevenue;1 000,5;1 100\n",
            b';',
            "a.csv",
        )
        .unwrap();
        let quarterly =
            finjoin_core::parse_table_str("Metric;2022Q4\nRevenue;300\n", b';', "q.csv").unwrap();
        merge(&annual, &quarterly, &MergeOptions::new())
    }

    #[test]
    fn test_write_output_tsv() {
        let mut out = Vec::new();
        write_output(&merged_fixture(), &mut out, OutputFormat::Tsv, b'\t').unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Metric\t2022\tLTM", "Revenue\t1000.5\t1100"]);
    }

    #[test]
    fn test_write_output_json() {
        let mut out = Vec::new();
        write_output(&merged_fixture(), &mut out, OutputFormat::Json, b'\t').unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["columns"][0]["label"], "2022");
        assert_eq!(value["rows"][0]["cells"][0], "1000.5");
        assert_eq!(value["suppressed"][0], "2022Q4");
    }

    #[test]
    fn test_merge_pairs_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::create_dir_all(&output).unwrap();

        std::fs::write(input.join("GOOD_annual.csv"), "m;2022\nRevenue;10\n").unwrap();
        std::fs::write(input.join("GOOD_quarterly.csv"), "m;2023Q1\nRevenue;3\n").unwrap();
        std::fs::write(input.join("BAD_annual.csv"), "m;2022\nRevenue;10\n").unwrap();
        std::fs::write(input.join("BAD_quarterly.csv"), "").unwrap();

        let scan = scan_directory(&[&input]).unwrap();
        assert_eq!(scan.pairs.len(), 2);

        let config = MergeConfig::default();
        let outcome = merge_pairs(
            &scan.pairs,
            &output,
            &config,
            &config.merge_options(),
            b'\t',
        );

        assert_eq!(outcome.written, vec![output.join("GOOD.tsv")]);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].0, "BAD");
        assert!(!output.join("BAD.tsv").exists());

        let content = std::fs::read_to_string(output.join("GOOD.tsv")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["m\t2022\t2023Q1", "Revenue\t10\t3"]);
    }

    #[test]
    fn test_load_config_rejects_bad_delimiter() {
        let input = InputArgs {
            config: None,
            delimiter: Some("ab".to_string()),
            date_row: None,
            rename: Vec::new(),
        };
        assert!(load_config(&input).is_err());
    }
}
