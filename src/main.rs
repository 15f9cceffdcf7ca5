use clap::{Parser, Subcommand};
use scrambler::{Engine, EngineConfig, PuzzleGeometry, PuzzleKind};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "scrambler", version, about = "Random-state scrambles for cubes and Square-1")]
struct Cli {
    /// -v for debug, -vv for trace.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding persisted pruning tables.
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// Seconds per scramble before giving up.
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every puzzle id.
    List,
    Generate {
        puzzle: String,
        #[arg(long)]
        seed: Option<String>,
        #[arg(long, default_value_t = 1)]
        count: usize,
        #[arg(long)]
        json: bool,
    },
    /// Faces, colors and grid size as JSON.
    Geometry { puzzle: String },
    /// Build every table and write it to --cache.
    BuildTables,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    simple_logger::SimpleLogger::new().with_level(level).init()?;

    let mut config = EngineConfig::default().with_timeout(Some(Duration::from_secs(cli.timeout)));
    if let Some(dir) = &cli.cache {
        config = config.with_table_cache(dir);
    }

    match cli.command {
        Command::List => {
            for kind in PuzzleKind::all() {
                let method = if kind.is_random_walk() {
                    "random moves"
                } else {
                    "random state"
                };
                println!("{:8} {:12} {}", kind.id(), kind.name(), method);
            }
        }
        Command::Generate {
            puzzle,
            seed,
            count,
            json,
        } => {
            let kind = PuzzleKind::from_id(&puzzle)?;
            let engine = Engine::new(config.with_puzzles([kind]))?;

            let seeds: Vec<Option<String>> = match (&seed, count) {
                (Some(seed), 1) => vec![Some(seed.clone())],
                (Some(seed), n) => (0..n).map(|i| Some(format!("{}#{}", seed, i))).collect(),
                (None, n) => vec![None; n],
            };
            for result in engine.generate_batch(&puzzle, &seeds) {
                let result = result?;
                if json {
                    println!("{}", serde_json::to_string(&result)?);
                } else {
                    println!("{}", result.text());
                }
            }
        }
        Command::Geometry { puzzle } => {
            let geometry = PuzzleGeometry::of(PuzzleKind::from_id(&puzzle)?);
            println!("{}", serde_json::to_string_pretty(&geometry)?);
        }
        Command::BuildTables => {
            if cli.cache.is_none() {
                anyhow::bail!("build-tables needs --cache <dir>");
            }
            let engine = Engine::new(config)?;
            log::info!("Wrote tables for {} puzzles", engine.list_puzzles().len());
        }
    }

    Ok(())
}
