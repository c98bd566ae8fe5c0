use clap::Parser;
use crossword_csp::{
    load_structure, load_words, render_grid, save_grid, solve, verify_assignment, FillFailure,
    Propagation, SolveOptions,
};
use env_logger::Env;
use log::info;
use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// crossword: fill a crossword structure from a word list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the structure file, with _ marking fillable cells
    structure: PathBuf,

    /// Path to the word list, one word per line
    words: PathBuf,

    /// Also write the filled grid to this file, as the same plain text that gets printed
    output: Option<PathBuf>,

    /// Re-establish arc consistency after every tentative choice
    #[arg(long)]
    maintain_arc_consistency: bool,

    /// Explore the first slot's options on multiple threads
    #[arg(long)]
    parallel: bool,

    /// Give up after this many seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// More logging (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct Error(String);

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0) // Print error unquoted
    }
}

fn main() -> Result<(), Error> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let time_limit = args
        .time_limit
        .map(Duration::try_from_secs_f64)
        .transpose()
        .map_err(|_| Error("Time limit must be a non-negative number of seconds".into()))?;

    let model = load_structure(&args.structure).map_err(|err| Error(err.to_string()))?;
    let vocabulary = load_words(&args.words).map_err(|err| Error(err.to_string()))?;

    if vocabulary.is_empty() {
        return Err(Error("Word list is empty".into()));
    }

    let options = SolveOptions {
        propagation: if args.maintain_arc_consistency {
            Propagation::Maintain
        } else {
            Propagation::Preprocess
        },
        parallel: args.parallel,
        abort: None,
        time_limit,
    };

    let result = match solve(&model, &vocabulary, &options) {
        Ok(result) => result,
        Err(FillFailure::NoSolution) => {
            println!("No solution.");
            return Ok(());
        }
        Err(FillFailure::Timeout) => return Err(Error("Timed out".into())),
        Err(FillFailure::Abort) => return Err(Error("Aborted".into())),
    };

    verify_assignment(&model, &vocabulary, &result.assignment)
        .map_err(|violation| Error(format!("Solver produced an invalid fill: {violation}")))?;

    println!("{}", render_grid(&model, &vocabulary, &result.assignment));

    if let Some(output) = args.output {
        save_grid(&output, &model, &vocabulary, &result.assignment)
            .map_err(|_| Error(format!("Couldn't write file '{}'", output.display())))?;
        info!("wrote {}", output.display());
    }

    Ok(())
}
