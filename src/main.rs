use clap::Parser;
use crossterm::style::Stylize;
use fifteen_puzzle::puzzle::{BLANK, WIDTH};
use fifteen_puzzle::{check_solvable, Board, Solution, Solver};
use log::LevelFilter;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::error::Error;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Finds a shortest solution to a 4x4 sliding puzzle", long_about = None)]
struct Args {
    /// Sixteen tiles in row-major order, 0 for the blank
    board: Vec<String>,

    /// Solve a random solvable board instead
    #[clap(short, long, conflicts_with = "board")]
    random: bool,

    /// Seed for --random
    #[clap(long, requires = "random")]
    seed: Option<u64>,

    /// Only report whether the board is solvable
    #[clap(short, long)]
    check: bool,

    /// Swap tiles 14 and 15 when the board is unsolvable
    #[clap(long)]
    repair: bool,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn read_board(args: &Args) -> Result<Board, Box<dyn Error>> {
    if args.random {
        let mut rng = match args.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        return Ok(Board::random(&mut rng));
    }
    if args.board.is_empty() {
        return Err("no board given (pass sixteen tiles or --random)".into());
    }
    Ok(args.board.join(" ").parse::<Board>()?)
}

/// Prints `board`, highlighting the tile at `moved`.
fn print_board(board: &Board, moved: Option<usize>) {
    for (i, &val) in board.cells().iter().enumerate() {
        let cell = if val == BLANK {
            "  ".to_string()
        } else {
            format!("{:2}", val)
        };
        if Some(i) == moved {
            print!("{} ", cell.as_str().black().on_yellow());
        } else {
            print!("{} ", cell);
        }
        if i % WIDTH == WIDTH - 1 {
            println!();
        }
    }
    println!();
}

fn print_replay(start: &Board, solution: &Solution) {
    let Some(boards) = solution.replay(start) else {
        println!("{}", "Solution does not fit this board".red());
        return;
    };

    for (step, (pair, mv)) in boards.windows(2).zip(&solution.moves).enumerate() {
        let tile = pair[0].tile_moved_by(*mv).unwrap_or(BLANK);
        // The tile now sits where the blank was.
        println!("{}. blank {} (tile {})", step + 1, mv, tile);
        print_board(&pair[1], Some(pair[0].blank()));
    }

    if boards.last().is_some_and(Board::is_goal) {
        println!("{}", "Solved!".green());
    } else {
        println!("{}", "Not Solved!".red());
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut board = read_board(args)?;

    if !check_solvable(&board) && args.repair {
        board.make_solvable();
        println!("Board was unsolvable; swapped tiles 14 and 15.");
    }

    println!("Initial board:");
    print_board(&board, None);

    if args.check {
        let verdict = if check_solvable(&board) {
            "solvable".green()
        } else {
            "unsolvable".red()
        };
        println!("Board is {}", verdict);
        return Ok(());
    }

    let mut solver = Solver::new();
    let solution = solver.solve(&board)?;
    println!("Goal depth: {}", solution.depth);
    println!(
        "Searched {} nodes over {} passes\n",
        solution.stats.expanded, solution.stats.iterations
    );

    print_replay(&board, &solution);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
