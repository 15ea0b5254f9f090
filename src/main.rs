use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use crossfill::backtracking_search::{find_fill_with_options, FillFailure, FillOptions, Propagation};
use crossfill::grid_config::{load_grid_config, render_grid};
use crossfill::word_list::WordList;

/// crossfill: fill a crossword structure with words from a list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the grid structure, with `_` or `.` for open cells and `#` for blocks
    structure: PathBuf,

    /// Path to the word list, one word per line
    words: PathBuf,

    /// Also write the filled grid to this file
    output: Option<PathBuf>,

    /// Which arcs to re-check after each tentative choice
    #[arg(long, value_enum, default_value_t = PropagationArg::Scoped)]
    propagation: PropagationArg,

    /// Log search progress
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PropagationArg {
    /// Only arcs touching the slot just filled
    Scoped,
    /// Every arc in the grid
    Global,
}

impl From<PropagationArg> for Propagation {
    fn from(arg: PropagationArg) -> Propagation {
        match arg {
            PropagationArg::Scoped => Propagation::Scoped,
            PropagationArg::Global => Propagation::Global,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    crossfill::logging::init_logger(args.debug);

    if let Err(e) = try_main(args) {
        eprintln!("Error: {e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let grid_config = load_grid_config(&args.structure)?;
    let word_list = WordList::load_from_path(&args.words)?;

    log::info!(
        "Filling {} slots from {} words",
        grid_config.slot_count(),
        word_list.len()
    );

    let options = FillOptions {
        propagation: args.propagation.into(),
    };

    let result = match find_fill_with_options(&grid_config, &word_list, options) {
        Ok(result) => result,
        Err(FillFailure::Unsatisfiable) => {
            println!("No solution.");
            return Ok(());
        }
    };

    log::info!("{:?}", result.statistics);

    let display_grid = render_grid(&grid_config, &word_list, &result.choices);
    println!("{display_grid}");

    if let Some(output) = &args.output {
        fs::write(output, display_grid + "\n")?;
        log::info!("Wrote filled grid to {}", output.display());
    }

    Ok(())
}
