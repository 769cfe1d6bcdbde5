//! GearForge command line.
//!
//! ```text
//! gearforge search problem.json --config search.toml --threads 8
//! gearforge search problem.json --cooperative
//! ```

mod console;
mod problem;
mod table;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use gearforge::GearSearch;

#[derive(Parser)]
#[command(name = "gearforge")]
#[command(about = "Find the best gear loadouts for a weapon and combo", long_about = None)]
#[command(version)]
struct Cli {
    /// Log progress at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a JSON problem file and print the top results
    Search {
        /// Problem file: weapon, items, sets, combo and restrictions
        problem: PathBuf,

        /// Search configuration (TOML, or YAML by extension)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of worker threads
        #[arg(long)]
        threads: Option<usize>,

        /// Search on the main thread without workers
        #[arg(long)]
        cooperative: bool,

        /// Print the result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    console::init(cli.verbose);

    match cli.command {
        Commands::Search {
            problem,
            config,
            threads,
            cooperative,
            json,
        } => {
            let request = problem::load_problem(&problem)?;
            let search_config = problem::resolve_config(config.as_deref(), threads, cooperative)?;
            let result = GearSearch::new(search_config).run(&request)?;

            if json {
                println!("{}", serde_json::to_string_pretty(result.top.as_slice())?);
            } else {
                print!("{}", table::render(&result));
            }
        }
    }
    Ok(())
}
