//! sqlprune CLI - keep only the joins your chosen columns need

use sqlprune_cli::cli;
use sqlprune_cli::config;
use sqlprune_cli::input;
use sqlprune_cli::output;
use sqlprune_cli::prompt::{Prompt, PromptSelection};

use anyhow::{bail, Context, Result};
use clap::Parser;
use sqlprune_core::{
    list_output_columns, rewrite, ColumnCatalog, Dialect, RewriteOptions, RewriteRequest,
    RewriteResult, SelectionSet, Severity,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cli::{Args, OutputFormat};
use input::SqlSource;
use output::{format_json, format_table};

/// The rewrite reported error-level issues.
const EXIT_FAILURE: u8 = 1;
/// Configuration or input error (unreadable file, unparsable SQL, bad config).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();

    #[cfg(feature = "tracing")]
    init_tracing();

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("sqlprune: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

#[cfg(feature = "tracing")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(args: Args) -> Result<bool> {
    let config = config::load_config(args.config.as_deref())?;
    let mut options = config.options();
    if let Some(marker) = &args.marker {
        options.trailing_marker = Some(marker.clone());
    }
    let dialect: Dialect = args.dialect.into();

    let (source, selection) = if args.has_selection_flags() {
        let source = input::read_input(args.file.as_deref())?;
        let selection =
            selection_from_flags(&args, config.catalog.as_ref(), &source, dialect, &options)?;
        (source, selection)
    } else {
        select_interactively(&args, config.catalog.as_ref(), dialect, &options)?
    };

    let request = RewriteRequest::new(source.content, selection)
        .with_dialect(dialect)
        .with_options(options);
    let result =
        rewrite(&request).with_context(|| format!("Failed to rewrite {}", source.name))?;

    let output_str = match args.format {
        OutputFormat::Sql => result.sql.clone(),
        OutputFormat::Json => format_json(&result, args.compact)?,
        OutputFormat::Table => format_table(&result, args.quiet, !args.quiet),
    };

    write_output(&args.output, &output_str)?;

    if let Some(report) = &args.report {
        let json = format_json(&result, args.compact)?;
        fs::write(report, json)
            .with_context(|| format!("Failed to write report to {}", report.display()))?;
    }

    if !args.quiet && args.format == OutputFormat::Sql {
        print_issues_to_stderr(&result);
    }

    Ok(result.summary.has_errors)
}

/// Resolve `--select`, `--all` or `--defaults` into a selection set.
fn selection_from_flags(
    args: &Args,
    catalog: Option<&ColumnCatalog>,
    source: &SqlSource,
    dialect: Dialect,
    options: &RewriteOptions,
) -> Result<SelectionSet> {
    if args.all {
        return match catalog {
            Some(catalog) => Ok(catalog.select_all()),
            None => statement_aliases(&source.content, dialect, options),
        };
    }
    if args.defaults {
        return match catalog {
            Some(catalog) => Ok(catalog.select_defaults()),
            None => bail!("--defaults needs a column catalog (pass one with --config)"),
        };
    }
    Ok(SelectionSet::from_aliases(args.select.iter().cloned()))
}

/// Every effective output alias of the statement's select list.
fn statement_aliases(
    sql: &str,
    dialect: Dialect,
    options: &RewriteOptions,
) -> Result<SelectionSet> {
    let columns = list_output_columns(&column_request(sql, dialect, options))
        .context("Failed to list output columns")?;
    Ok(columns.into_iter().map(|column| column.alias).collect())
}

fn column_request(sql: &str, dialect: Dialect, options: &RewriteOptions) -> RewriteRequest {
    RewriteRequest::new(sql, SelectionSet::default())
        .with_dialect(dialect)
        .with_options(options.clone())
}

/// Run the column prompt on stdin, writing to stderr so stdout carries only
/// the rewritten output.
fn select_interactively(
    args: &Args,
    catalog: Option<&ColumnCatalog>,
    dialect: Dialect,
    options: &RewriteOptions,
) -> Result<(SqlSource, SelectionSet)> {
    let stdin = io::stdin();
    let mut prompt = Prompt::new(stdin.lock(), io::stderr());

    let (source, selection) = match catalog {
        Some(catalog) => {
            let labels: Vec<String> =
                catalog.columns.iter().map(|c| c.display_label()).collect();
            let selection = match prompt.choose_columns(&labels)? {
                PromptSelection::All => catalog.select_all(),
                PromptSelection::Defaults => catalog.select_defaults(),
                PromptSelection::Indices(indices) => catalog.select_indices(&indices)?,
            };
            let path = input_path(&mut prompt, args.file.as_deref())?;
            (input::read_from_file(&path)?, selection)
        }
        None => {
            // Without a catalog the choices come from the statement itself.
            let path = input_path(&mut prompt, args.file.as_deref())?;
            let source = input::read_from_file(&path)?;
            let columns = list_output_columns(&column_request(&source.content, dialect, options))
                .context("Failed to list output columns")?;
            let labels: Vec<String> = columns
                .iter()
                .map(|c| format!("{} ({})", c.alias, c.expression))
                .collect();
            let selection: SelectionSet = match prompt.choose_columns(&labels)? {
                PromptSelection::All => columns.into_iter().map(|c| c.alias).collect(),
                PromptSelection::Defaults => {
                    bail!("'default' needs a column catalog (pass one with --config)")
                }
                PromptSelection::Indices(mut indices) => {
                    indices.sort_unstable();
                    indices
                        .into_iter()
                        .filter_map(|index| columns.get(index))
                        .map(|c| c.alias.clone())
                        .collect()
                }
            };
            (source, selection)
        }
    };

    let chosen: Vec<&str> = selection.iter().collect();
    eprintln!("Selected columns: {}", chosen.join(", "));
    Ok((source, selection))
}

fn input_path<R: io::BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    file: Option<&Path>,
) -> Result<PathBuf> {
    match file {
        Some(path) => Ok(path.to_path_buf()),
        None => prompt.ask_filename(),
    }
}

fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, content)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    } else {
        io::stdout()
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure newline at end for terminal output
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

fn print_issues_to_stderr(result: &RewriteResult) {
    for issue in &result.issues {
        let level = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        eprintln!("sqlprune: {level}: {}", issue.message);
    }
}
