use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use gmtplot::{EngineConfig, Figure, Options, Table, HISTOGRAM};
use gmtplot_common::{OptionValue, Scalar};
use gmtplot_session::config::{GMT_PROGRAM_ENV, TEMP_DIR_ENV};
use gmtplot_session::{DataStager, RecordingEngine, StagedTable, StagingError, TempFileStager};
use tracing::info;
use tracing_subscriber::{fmt, fmt::format::FmtSpan, prelude::*, EnvFilter};

/// Plot with GMT modules from the command line
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plot a histogram of a data file or of values given inline
    Histogram {
        /// Data file read by the engine
        #[arg(required_unless_present = "values")]
        table: Option<PathBuf>,

        /// Comma-separated values to plot instead of a file
        #[arg(long, value_delimiter = ',', conflicts_with = "table")]
        values: Vec<f64>,

        /// Option as name=value, e.g. -o region=0/10/0/5. Repeat a name to pass a list
        #[arg(short = 'o', long = "option", value_parser = parse_option)]
        options: Vec<(String, OptionValue)>,

        /// Print the module call instead of running it. Tables given with --values are
        /// staged to a file that is kept, so the printed call can be rerun
        #[arg(long)]
        dry_run: bool,

        /// GMT executable
        #[arg(long, env = GMT_PROGRAM_ENV)]
        gmt: Option<PathBuf>,

        /// Directory for staged tables
        #[arg(long, env = TEMP_DIR_ENV)]
        temp_dir: Option<PathBuf>,
    },

    /// List the histogram option names and their GMT flags
    Aliases,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_span_events(FmtSpan::CLOSE),
        )
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Histogram {
            table,
            values,
            options,
            dry_run,
            gmt,
            temp_dir,
        } => {
            let mut config = EngineConfig::default();
            if let Some(gmt) = gmt {
                config.program = gmt;
            }
            config.temp_dir = temp_dir;

            let table = match table {
                Some(path) => Table::File(path),
                None => Table::Vectors(vec![values]),
            };
            let options = collect_options(options)?;

            if dry_run {
                let engine = Arc::new(RecordingEngine::new());
                let stager = match &config.temp_dir {
                    Some(dir) => TempFileStager::in_dir(dir.clone()),
                    None => TempFileStager::new(),
                };
                Figure::new(engine.clone(), Arc::new(KeepStaged(stager)))
                    .histogram(&table, &options)?;
                for (module, args) in engine.calls() {
                    println!("{} {module} {args}", config.program.display());
                }
            } else {
                Figure::from_config(&config)
                    .histogram(&table, &options)
                    .with_context(|| format!("{} {} failed", config.program.display(), HISTOGRAM.name))?;
                info!("histogram finished");
            }
        }
        Commands::Aliases => {
            print!("{}", HISTOGRAM.aliases_doc());
        }
    }
    Ok(())
}

/// Stages through the inner stager and keeps the result past the call.
struct KeepStaged<S>(S);

impl<S: DataStager> DataStager for KeepStaged<S> {
    fn stage(&self, table: &Table) -> Result<StagedTable, StagingError> {
        let reference = self.0.stage(table)?.persist()?;
        Ok(StagedTable::borrowed(reference))
    }
}

fn parse_option(text: &str) -> Result<(String, OptionValue), String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{text}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing option name in '{text}'"));
    }
    Ok((name.to_string(), parse_value(value)))
}

/// `true`/`false` are booleans, numbers are numbers, anything else is text.
fn parse_value(text: &str) -> OptionValue {
    match text {
        "true" => OptionValue::Bool(true),
        "false" => OptionValue::Bool(false),
        _ => OptionValue::from(parse_scalar(text)),
    }
}

fn parse_scalar(text: &str) -> Scalar {
    if let Ok(v) = text.parse::<i64>() {
        Scalar::Int(v)
    } else if let Some(v) = text.parse::<f64>().ok().filter(|v| v.is_finite()) {
        Scalar::Float(v)
    } else {
        Scalar::Text(text.to_string())
    }
}

/// Merge parsed options in order, turning repeated names into sequences.
fn collect_options(pairs: Vec<(String, OptionValue)>) -> anyhow::Result<Options> {
    let mut options = Options::new();
    for (name, value) in pairs {
        let Some(existing) = options.get_mut(&name) else {
            options.insert(name, value);
            continue;
        };
        let item = value
            .as_scalar()
            .ok_or_else(|| anyhow!("option '{name}' cannot repeat a boolean value"))?;
        match existing {
            OptionValue::Sequence(items) => items.push(item),
            other => {
                let Some(first) = other.as_scalar() else {
                    bail!("option '{name}' cannot repeat a boolean value");
                };
                *other = OptionValue::Sequence(vec![first, item]);
            }
        }
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("true"), OptionValue::Bool(true));
        assert_eq!(parse_value("1"), OptionValue::Int(1));
        assert_eq!(parse_value("0.5"), OptionValue::Float(0.5));
        assert_eq!(parse_value("inf"), OptionValue::Text("inf".to_string()));
        assert_eq!(parse_value("1p,black"), OptionValue::Text("1p,black".to_string()));
        assert_eq!(parse_value("0/10/0/5"), OptionValue::Text("0/10/0/5".to_string()));
    }

    #[test]
    fn test_parse_option() {
        assert_eq!(
            parse_option("fill=red").unwrap(),
            ("fill".to_string(), OptionValue::Text("red".to_string()))
        );
        assert_eq!(
            parse_option("label=a=b").unwrap(),
            ("label".to_string(), OptionValue::Text("a=b".to_string()))
        );
        assert!(parse_option("fill").is_err());
        assert!(parse_option("=red").is_err());
    }

    #[test]
    fn test_repeated_names_become_sequences() {
        let options = collect_options(vec![
            ("frame".to_string(), parse_value("af")),
            ("series".to_string(), parse_value("1")),
            ("frame".to_string(), parse_value("WSne")),
            ("frame".to_string(), parse_value("+tCounts")),
        ])
        .unwrap();
        let names: Vec<&str> = options.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["frame", "series"]);
        assert_eq!(
            options["frame"],
            OptionValue::Sequence(vec![
                Scalar::from("af"),
                Scalar::from("WSne"),
                Scalar::from("+tCounts"),
            ])
        );
    }

    #[test]
    fn test_repeated_boolean_rejected() {
        let result = collect_options(vec![
            ("step".to_string(), parse_value("true")),
            ("step".to_string(), parse_value("true")),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_dry_run_keeps_staged_values() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let engine = Arc::new(RecordingEngine::new());
        let stager = KeepStaged(TempFileStager::in_dir(dir.path()));
        Figure::new(engine.clone(), Arc::new(stager))
            .histogram(&Table::from(vec![1.0, 2.0]), &Options::new())?;

        let (_, reference) = engine.calls().remove(0);
        assert_eq!(std::fs::read_to_string(&reference)?, "1\n2\n");
        Ok(())
    }

    #[test]
    fn test_cli_parses_histogram() {
        let cli = Cli::try_parse_from([
            "gmtplot",
            "histogram",
            "data.txt",
            "-o",
            "region=0/10/0/5",
            "-o",
            "series=1",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Histogram {
                table,
                options,
                dry_run,
                ..
            } => {
                assert_eq!(table, Some(PathBuf::from("data.txt")));
                assert_eq!(options.len(), 2);
                assert!(dry_run);
            }
            Commands::Aliases => panic!("expected histogram"),
        }
    }
}
