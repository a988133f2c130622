use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rep_trainer::analysis::ExerciseKind;
use rep_trainer::config::EngineConfig;
use rep_trainer::fixtures::{ExpectationDiff, FixtureCatalog, FixtureProcessor, ReplaySummary};

#[derive(Parser, Debug)]
#[command(
    name = "rep_cli",
    about = "Deterministic fixture replay harness for Rep Trainer"
)]
struct Cli {
    /// Override directory containing fixture assets (defaults to fixtures/)
    #[arg(long)]
    fixtures_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a fixture and optionally compare against expectations
    Replay {
        #[arg(long)]
        fixture: String,
        #[arg(long)]
        expect: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "bicep")]
        exercise: ExerciseKind,
    },
    /// Stream per-frame results for a fixture to stdout
    Stream {
        #[arg(long)]
        fixture: String,
        #[arg(long, default_value = "bicep")]
        exercise: ExerciseKind,
    },
    /// List available fixtures on disk
    DumpFixtures,
}

fn main() -> ExitCode {
    // Reports go to stdout; diagnostics must stay off it
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let catalog = cli
        .fixtures_dir
        .map(FixtureCatalog::new)
        .unwrap_or_else(FixtureCatalog::default);

    match cli.command {
        Commands::Replay {
            fixture,
            expect,
            output,
            exercise,
        } => run_replay(&catalog, &fixture, expect, output, exercise),
        Commands::Stream { fixture, exercise } => run_stream(&catalog, &fixture, exercise),
        Commands::DumpFixtures => run_dump(&catalog),
    }
}

fn run_replay(
    catalog: &FixtureCatalog,
    fixture: &str,
    override_expect: Option<PathBuf>,
    output_path: Option<PathBuf>,
    exercise: ExerciseKind,
) -> Result<ExitCode> {
    let processor = FixtureProcessor::new(EngineConfig::load()).with_exercise(exercise);
    let data = catalog.load(fixture, override_expect)?;
    let summary = processor
        .run(&data)
        .with_context(|| format!("replaying fixture {}", fixture))?;

    emit_report(&summary, output_path)?;

    if let Some(expectations) = data.expectations {
        match expectations.verify(&summary) {
            Ok(()) => Ok(ExitCode::from(0)),
            Err(diff) => {
                emit_diff(&diff)?;
                Ok(ExitCode::from(2))
            }
        }
    } else {
        Ok(ExitCode::from(0))
    }
}

fn run_stream(catalog: &FixtureCatalog, fixture: &str, exercise: ExerciseKind) -> Result<ExitCode> {
    let processor = FixtureProcessor::new(EngineConfig::load()).with_exercise(exercise);
    let data = catalog.load(fixture, None)?;
    let frames = processor
        .run_frames(&data)
        .with_context(|| format!("replaying fixture {}", fixture))?;

    for frame in frames {
        println!("{}", serde_json::to_string(&frame)?);
    }

    Ok(ExitCode::from(0))
}

fn run_dump(catalog: &FixtureCatalog) -> Result<ExitCode> {
    let fixtures = catalog.discover()?;
    if fixtures.is_empty() {
        println!("No fixtures found under {}", catalog.root().display());
        return Ok(ExitCode::from(0));
    }

    for metadata in fixtures {
        if let Some(expect) = metadata.expect_path {
            println!("{} -> {}", metadata.name, expect.display());
        } else {
            println!("{}", metadata.name);
        }
    }
    Ok(ExitCode::from(0))
}

fn emit_report(summary: &ReplaySummary, output_path: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;

    if let Some(path) = output_path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    Ok(())
}

fn emit_diff(diff: &ExpectationDiff) -> Result<()> {
    let json = serde_json::to_string_pretty(&diff.to_json())?;
    eprintln!("{json}");
    Ok(())
}
