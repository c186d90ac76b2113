//! Stand-in for the tank battle simulator used by the end-to-end tests.
//!
//! Parses maps the way the real simulator does (positional header lines, grid
//! padding and truncation) and writes a short scripted transcript to
//! `output_<map file name>` in the working directory.
//!
//! Algorithms come from `algorithm_types.txt` beside the executable, or from
//! the file named by `FAKE_SIMULATOR_ALGORITHM_TYPES` when set. Two extra flags
//! fake misbehaving simulators: `--hang` sleeps before doing anything and
//! `--skip-output` exits without writing a transcript.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use tank_battle_harness::{Algorithm, AlgorithmBinding, Cell, HeaderKey};

const GRACE_STEPS: usize = 40;
const ALGORITHM_TYPES_ENV: &str = "FAKE_SIMULATOR_ALGORITHM_TYPES";
const HANG: Duration = Duration::from_secs(30);

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let Some(map_path) = args.next() else {
        eprintln!(
            "Usage: fake_simulator <game_board_input_file> [--algorithm1=<type>] [--algorithm2=<type>]"
        );
        return ExitCode::FAILURE;
    };

    let mut binding = shared_binding();
    let mut skip_output = false;
    for arg in args {
        if let Some(name) = arg.strip_prefix("--algorithm1=") {
            binding[0] = Algorithm::from(name.to_string());
        } else if let Some(name) = arg.strip_prefix("--algorithm2=") {
            binding[1] = Algorithm::from(name.to_string());
        } else if arg == "--hang" {
            thread::sleep(HANG);
        } else if arg == "--skip-output" {
            skip_output = true;
        } else {
            eprintln!("Warning: Unknown command line argument ignored: {arg}");
        }
    }

    let contents = match fs::read(&map_path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => {
            eprintln!("Error: Input file does not exist: {map_path} ({err})");
            return ExitCode::FAILURE;
        }
    };

    let output_path = output_path_for(Path::new(&map_path));
    let (transcript, code) = match parse_board(&contents) {
        Ok(board) => (play(&board, &binding), ExitCode::SUCCESS),
        Err(message) => {
            eprintln!("Error: {message}");
            (
                format!("Error parsing input file: {message}\n"),
                ExitCode::FAILURE,
            )
        }
    };
    if skip_output {
        println!("Game finished, output discarded");
        return code;
    }

    if let Err(err) = fs::write(&output_path, transcript) {
        eprintln!("Failed to write {}: {err}", output_path.display());
        return ExitCode::FAILURE;
    }
    println!("Game finished, output written to {}", output_path.display());
    code
}

/// Bindings from the algorithm-types file, chasing by default.
fn shared_binding() -> [Algorithm; 2] {
    let path = match env::var_os(ALGORITHM_TYPES_ENV) {
        Some(path) => Some(PathBuf::from(path)),
        None => env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("algorithm_types.txt"))),
    };
    let from_file = path
        .and_then(|path| fs::read_to_string(path).ok())
        .map(|text| AlgorithmBinding::parse(&text))
        .unwrap_or_else(|| AlgorithmBinding::new([]));

    let slot = |player| {
        from_file
            .for_player(player)
            .cloned()
            .unwrap_or(Algorithm::Chasing)
    };
    [slot(1), slot(2)]
}

fn output_path_for(map_path: &Path) -> PathBuf {
    match map_path.file_name() {
        Some(name) => PathBuf::from(format!("output_{}", name.to_string_lossy())),
        None => PathBuf::from("game_output_default.txt"),
    }
}

struct Board {
    num_shells: i64,
    tanks: [usize; 2],
}

fn parse_board(contents: &str) -> Result<Board, String> {
    let mut lines = contents.lines();
    if lines.next().is_none() {
        return Err("Empty map file".to_string());
    }

    // Header lines are positional; a key out of place is skipped, not searched for.
    let mut values: [Option<i64>; 4] = [None; 4];
    for (index, key) in HeaderKey::ALL.into_iter().enumerate() {
        let line = lines
            .next()
            .ok_or_else(|| "Missing required configuration parameters".to_string())?
            .trim();
        let (param, value) = line
            .split_once('=')
            .ok_or_else(|| format!("Invalid parameter format: {line}"))?;
        if param.trim() == key.as_str() {
            let parsed = leading_int(value.trim())
                .ok_or_else(|| format!("Invalid value in parameter: {line}"))?;
            values[index] = Some(parsed);
        }
    }

    let [Some(max_steps), Some(num_shells), Some(rows), Some(cols)] = values else {
        return Err("Missing required parameters".to_string());
    };
    if max_steps <= 0 || num_shells <= 0 || rows <= 0 || cols <= 0 {
        return Err("Invalid parameter values: all must be positive".to_string());
    }

    let cols = usize::try_from(cols).map_err(|err| err.to_string())?;
    let rows = usize::try_from(rows).map_err(|err| err.to_string())?;
    let mut tanks = [0usize; 2];
    // Missing rows are padded with empty cells and contribute nothing.
    for line in lines.take(rows) {
        let row = line.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
        for cell in row.chars().take(cols).map(Cell::from_char) {
            match cell {
                Cell::Tank(1) => tanks[0] += 1,
                Cell::Tank(2) => tanks[1] += 1,
                _ => {}
            }
        }
    }

    Ok(Board { num_shells, tanks })
}

/// Integer prefix parse: optional sign followed by at least one digit.
fn leading_int(text: &str) -> Option<i64> {
    let digits_start = usize::from(text.starts_with(['+', '-']));
    let digits_len = text[digits_start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    text[..digits_start + digits_len].parse().ok()
}

fn play(board: &Board, binding: &[Algorithm; 2]) -> String {
    let [p1, p2] = board.tanks;
    match (p1, p2) {
        (0, 0) => return "Tie, both players have zero tanks\n".to_string(),
        (_, 0) => return format!("Player 1 won with {p1} tanks still alive\n"),
        (0, _) => return format!("Player 2 won with {p2} tanks still alive\n"),
        _ => {}
    }

    let total = p1 + p2;
    let step = |action: &str| vec![action; total].join(", ");
    let mut lines = vec![step("Shoot")];

    if board.num_shells == 1 && binding[0] == binding[1] {
        lines.extend(std::iter::repeat(step("DoNothing")).take(GRACE_STEPS));
        lines.push(format!("Tie, both players have zero shells for {GRACE_STEPS} steps"));
    } else {
        let player_two_wins = binding[1] == Algorithm::Chasing && binding[0] != Algorithm::Chasing;
        let (winner, survivors) = if player_two_wins { (2, p2) } else { (1, p1) };
        let mut actions = Vec::with_capacity(total);
        for player in [1, 2] {
            let count = if player == 1 { p1 } else { p2 };
            let action = if player == winner { "Shoot" } else { "Shoot (killed)" };
            actions.extend(std::iter::repeat(action).take(count));
        }
        lines.push(actions.join(", "));
        lines.push(format!("Player {winner} won with {survivors} tanks still alive"));
    }

    let mut transcript = lines.join("\n");
    transcript.push('\n');
    transcript
}
