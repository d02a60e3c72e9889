//! Marble Tumble Solver
//!
//! Generates Marble Tumble puzzles, plays timing digits against them, and
//! computes the fastest press schedule that drops the marble out through
//! cylinder 0 without ever landing it on a trap.

use std::error::Error;
use std::sync::atomic::AtomicBool;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use marble_tumble::config::NUM_CYLINDERS;
use marble_tumble::{
    apply, generate_seeded, replay, solve_with_cancel, Digit, Outcome, Puzzle,
    PuzzleConfiguration, PuzzleState, ScheduleResult,
};

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Solves Marble Tumble puzzles.
#[derive(Parser)]
#[command(name = "marble-tumble")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a puzzle and print it.
    Generate {
        #[command(flatten)]
        puzzle: PuzzleArgs,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Compute the fastest safe press schedule and verify it by replay.
    Solve {
        #[command(flatten)]
        puzzle: PuzzleArgs,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Press the given digits in order, stopping at a strike or a solve.
    Play {
        #[command(flatten)]
        puzzle: PuzzleArgs,
        /// Timing digits to press, comma separated.
        #[arg(long, value_delimiter = ',', required = true)]
        digits: Vec<u8>,
    },
}

/// Selects the puzzle: a generator seed, or an explicit instance.
#[derive(Args, Clone, Default)]
struct PuzzleArgs {
    /// Seed for deterministic generation; random when omitted.
    #[arg(long, conflicts_with_all = ["colors", "traps", "rotations"])]
    seed: Option<u64>,
    /// Color index per cylinder (0 red, 1 yellow, 2 green, 3 blue, 4 silver).
    #[arg(long, value_delimiter = ',', requires_all = ["traps", "rotations"])]
    colors: Option<Vec<usize>>,
    /// Trap offset per cylinder.
    #[arg(long, value_delimiter = ',', requires = "colors")]
    traps: Option<Vec<i32>>,
    /// Start rotation per cylinder.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, requires = "colors")]
    rotations: Option<Vec<i32>>,
}

#[derive(Serialize)]
struct SolveReport<'a> {
    puzzle: &'a Puzzle,
    schedule: &'a ScheduleResult,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Command::Generate { puzzle, json }) => run_generate(&puzzle, json),
        Some(Command::Solve { puzzle, json }) => run_solve(&puzzle, json),
        Some(Command::Play { puzzle, digits }) => run_play(&puzzle, &digits),
        // default: solve a random puzzle
        None => run_solve(&PuzzleArgs::default(), false),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Builds the puzzle selected on the command line.
fn load_puzzle(args: &PuzzleArgs) -> CliResult<Puzzle> {
    if let (Some(colors), Some(traps), Some(rotations)) = (&args.colors, &args.traps, &args.rotations)
    {
        let config = PuzzleConfiguration::from_indices(
            to_cylinders(colors, "colors")?,
            to_cylinders(traps, "traps")?,
        )?;
        let start = PuzzleState::new(to_cylinders(rotations, "rotations")?);
        return Ok(Puzzle::new(config, start)?);
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("using seed {seed}");
    Ok(generate_seeded(seed)?)
}

/// Converts a parsed list into one value per cylinder.
fn to_cylinders<T: Copy>(values: &[T], name: &str) -> CliResult<[T; NUM_CYLINDERS]> {
    <[T; NUM_CYLINDERS]>::try_from(values).map_err(|_| {
        format!(
            "--{name} needs {NUM_CYLINDERS} values, got {}",
            values.len()
        )
        .into()
    })
}

fn parse_digits(values: &[u8]) -> CliResult<Vec<Digit>> {
    values
        .iter()
        .map(|&value| {
            Digit::new(value)
                .ok_or_else(|| -> Box<dyn Error> { format!("digit {value} is not in 0-9").into() })
        })
        .collect()
}

/// Prints a generated puzzle.
fn run_generate(args: &PuzzleArgs, json: bool) -> CliResult<()> {
    let puzzle = load_puzzle(args)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&puzzle)?);
    } else {
        print!("{}", format_puzzle(&puzzle));
    }
    Ok(())
}

/// Solves the puzzle, replays the schedule, and prints it.
fn run_solve(args: &PuzzleArgs, json: bool) -> CliResult<()> {
    let puzzle = load_puzzle(args)?;
    let cancel = AtomicBool::new(false);
    let schedule = solve_with_cancel(&puzzle.config, &puzzle.start, &cancel)?;
    verify(&puzzle, &schedule)?;

    if json {
        let report = SolveReport {
            puzzle: &puzzle,
            schedule: &schedule,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_puzzle(&puzzle));
        print!("{}", format_schedule(&schedule));
    }
    Ok(())
}

/// Plays digits one at a time, the way a player would.
fn run_play(args: &PuzzleArgs, digits: &[u8]) -> CliResult<()> {
    let puzzle = load_puzzle(args)?;
    let digits = parse_digits(digits)?;
    print!("{}", format_puzzle(&puzzle));

    let mut state = puzzle.start;
    for digit in digits {
        let step = apply(&puzzle.config, &state, digit)?;
        println!("press {}: {} => {}", digit, step.state, step.outcome);
        state = step.state;
        if step.outcome != Outcome::Continue {
            break;
        }
    }
    Ok(())
}

/// Replays the schedule through the transition engine and checks it is clean.
fn verify(puzzle: &Puzzle, schedule: &ScheduleResult) -> CliResult<()> {
    let steps = replay(&puzzle.config, &puzzle.start, &schedule.digits())?;
    let clean = steps
        .iter()
        .all(|step| !matches!(step.outcome, Outcome::Strike { .. }));
    let solved = steps.last().is_some_and(|step| step.outcome == Outcome::Solved);

    if clean && solved {
        Ok(())
    } else {
        Err("schedule does not replay to a solve".into())
    }
}

fn format_puzzle(puzzle: &Puzzle) -> String {
    format!("{}\nstart: {}\n", puzzle.config, puzzle.start)
}

fn format_schedule(schedule: &ScheduleResult) -> String {
    let mut output = String::new();
    for press in &schedule.presses {
        output.push_str(&format!(
            "press {} after {}s: marble {} -> {} (cost {})\n",
            press.digit, press.wait, press.from, press.to, press.cost
        ));
    }

    let count = schedule.presses.len();
    output.push_str(&format!(
        "total cost {} over {} press{} ({}s of waiting), {} states expanded\n",
        schedule.total_cost,
        count,
        if count == 1 { "" } else { "es" },
        schedule.total_wait(),
        schedule.explored
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explicit(colors: &[usize], traps: &[i32], rotations: &[i32]) -> PuzzleArgs {
        PuzzleArgs {
            seed: None,
            colors: Some(colors.to_vec()),
            traps: Some(traps.to_vec()),
            rotations: Some(rotations.to_vec()),
        }
    }

    #[test]
    fn test_one_press_schedule_snapshot() {
        let args = explicit(&[0, 1, 2, 3, 4], &[5, 5, 5, 5, 5], &[1, -1, 2, 0, -2]);
        let puzzle = load_puzzle(&args).unwrap();
        let cancel = AtomicBool::new(false);
        let schedule = solve_with_cancel(&puzzle.config, &puzzle.start, &cancel).unwrap();
        verify(&puzzle, &schedule).unwrap();

        let output = format!("{}{}", format_puzzle(&puzzle), format_schedule(&schedule));

        insta::assert_snapshot!(output, @r"
        colors: red, yellow, green, blue, silver; traps: 5, 5, 5, 5, 5
        start: rotations: 1, -1, 2, 0, -2; marble: 5
        press 0 after 1s: marble 5 -> 0 (cost 12)
        total cost 12 over 1 press (1s of waiting), 2 states expanded
        ");
    }

    #[test]
    fn test_seeded_schedule_verifies() {
        let args = PuzzleArgs {
            seed: Some(31),
            ..PuzzleArgs::default()
        };
        let puzzle = load_puzzle(&args).unwrap();
        let cancel = AtomicBool::new(false);
        let schedule = solve_with_cancel(&puzzle.config, &puzzle.start, &cancel).unwrap();
        assert!(verify(&puzzle, &schedule).is_ok());
    }

    #[test]
    fn test_explicit_start_on_trap_is_rejected() {
        let args = explicit(&[0, 1, 2, 3, 4], &[5, 5, 5, 5, 5], &[0, 0, 0, 0, 5]);
        assert!(load_puzzle(&args).is_err());
    }

    #[test]
    fn test_wrong_cylinder_count_is_rejected() {
        let args = explicit(&[0, 1, 2, 3], &[5, 5, 5, 5, 5], &[0, 0, 0, 0, 1]);
        let error = load_puzzle(&args).unwrap_err();
        assert_eq!(error.to_string(), "--colors needs 5 values, got 4");
    }

    #[test]
    fn test_digits_out_of_range_are_rejected() {
        assert!(parse_digits(&[0, 9]).is_ok());
        assert!(parse_digits(&[3, 10]).is_err());
    }

    #[test]
    fn test_cli_parses_explicit_puzzle() {
        let cli = Cli::try_parse_from([
            "marble-tumble",
            "play",
            "--colors",
            "4,3,2,1,0",
            "--traps",
            "3,2,1,1,9",
            "--rotations",
            "0,-2,0,0,1",
            "--digits",
            "1,2,3",
        ])
        .unwrap();

        let Some(Command::Play { puzzle, digits }) = cli.command else {
            panic!("expected play command");
        };
        assert_eq!(digits, vec![1, 2, 3]);
        assert_eq!(puzzle.rotations, Some(vec![0, -2, 0, 0, 1]));
        assert_eq!(puzzle.colors, Some(vec![4, 3, 2, 1, 0]));
    }

    #[test]
    fn test_cli_rejects_seed_with_explicit_puzzle() {
        let result = Cli::try_parse_from([
            "marble-tumble",
            "solve",
            "--seed",
            "3",
            "--colors",
            "0,1,2,3,4",
            "--traps",
            "5,5,5,5,5",
            "--rotations",
            "1,1,1,1,1",
        ]);
        assert!(result.is_err());
    }
}
