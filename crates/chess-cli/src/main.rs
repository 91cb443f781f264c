mod config;
mod input;

use anyhow::{bail, Context};
use chess_core::{BoardView, Color, Coord};
use chess_rules::{Game, GameError, MoveKind, MoveOutcome};
use clap::{Parser, Subcommand};
use config::CliConfig;
use input::{parse_input, Input};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess")]
#[command(about = "Play chess in the terminal or inspect a position")]
struct Cli {
    /// Configuration file (defaults to ./chess.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a two-player game, reading moves from stdin
    Play {
        /// Starting position
        #[arg(long)]
        fen: Option<String>,
    },
    /// List the legal destinations of the piece on a square
    Moves {
        /// Square of the piece, e.g. e2
        square: String,
        /// Position to inspect
        #[arg(long)]
        fen: Option<String>,
    },
    /// Show whether the side to move is in check, mated or stalemated
    Status {
        /// Position to inspect
        #[arg(long)]
        fen: Option<String>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    fen: String,
    side_to_move: Color,
    status: chess_rules::GameStatus,
    winner: Option<Color>,
}

#[derive(Serialize)]
struct MovesReport {
    square: String,
    piece: chess_core::Piece,
    moves: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_logging(&config);
    tracing::debug!(?config, "configuration loaded");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Play { fen } => {
            let game = load_game(fen.as_deref())?;
            let stdin = std::io::stdin();
            play(game, &config, cli.json, stdin.lock(), &mut out)?;
        }
        Commands::Moves { square, fen } => {
            let game = load_game(fen.as_deref())?;
            let at = input::parse_square(&square)?;
            let Some(piece) = game.board().piece_at(at) else {
                bail!("no piece on {}", square);
            };
            let moves: Vec<String> = game
                .legal_moves_for(piece.id)
                .into_iter()
                .map(square_name)
                .collect();
            if cli.json {
                let report = MovesReport {
                    square: square_name(at),
                    piece,
                    moves,
                };
                writeln!(out, "{}", serde_json::to_string(&report)?)?;
            } else if moves.is_empty() {
                writeln!(
                    out,
                    "{} {} on {} has no legal moves",
                    piece.color,
                    piece.kind,
                    square_name(at)
                )?;
            } else {
                writeln!(out, "{}", moves.join("\n"))?;
            }
        }
        Commands::Status { fen } => {
            let game = load_game(fen.as_deref())?;
            let report = StatusReport {
                fen: game.to_fen(),
                side_to_move: game.side_to_move(),
                status: game.status(),
                winner: game.winner(),
            };
            if cli.json {
                writeln!(out, "{}", serde_json::to_string(&report)?)?;
            } else {
                writeln!(out, "{}", status_line(&game))?;
            }
        }
    }
    Ok(())
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over the config file.
fn init_logging(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_game(fen: Option<&str>) -> anyhow::Result<Game> {
    match fen {
        Some(fen) => Game::from_fen(fen).with_context(|| format!("invalid position '{}'", fen)),
        None => Ok(Game::new()),
    }
}

fn square_name(at: Coord) -> String {
    at.to_algebraic().unwrap_or_else(|| at.to_string())
}

fn status_line(game: &Game) -> String {
    let side = game.side_to_move();
    match game.status() {
        chess_rules::GameStatus::Playing => format!("{} to move", side),
        chess_rules::GameStatus::Check => format!("{} to move, in check", side),
        chess_rules::GameStatus::Checkmate => format!("Checkmate, {} wins", side.opposite()),
        chess_rules::GameStatus::Stalemate => "Stalemate, draw".to_string(),
    }
}

fn describe(outcome: &MoveOutcome) -> String {
    let mut text = match outcome.kind {
        MoveKind::Castle { rook_from, .. } if rook_from.col == 0 => "O-O-O".to_string(),
        MoveKind::Castle { .. } => "O-O".to_string(),
        MoveKind::Capture { .. } => {
            format!("{}x{}", square_name(outcome.from), square_name(outcome.to))
        }
        MoveKind::EnPassant { .. } => {
            format!("{}x{} e.p.", square_name(outcome.from), square_name(outcome.to))
        }
        MoveKind::Quiet | MoveKind::DoublePush => {
            format!("{}-{}", square_name(outcome.from), square_name(outcome.to))
        }
    };
    if let Some(kind) = outcome.promoted_to {
        text.push('=');
        text.push(kind.to_fen_char(Color::White));
    }
    text
}

fn hints(game: &Game) -> String {
    let side = game.side_to_move();
    let mut lines = Vec::new();
    for piece in game.board().pieces_of(side) {
        let moves = game.legal_moves_for(piece.id);
        if moves.is_empty() {
            continue;
        }
        let targets: Vec<String> = moves.into_iter().map(square_name).collect();
        lines.push(format!("  {}: {}", square_name(piece.coord()), targets.join(" ")));
    }
    lines.sort();
    lines.join("\n")
}

const HELP: &str = "\
Enter moves as 'e2 e4' or 'e2e4'; add a piece letter to promote ('e7e8n').
Commands: moves <square>, board, help, quit";

/// Runs the interactive loop until the game ends, `quit`, or end of input.
fn play<R: BufRead, W: Write>(
    mut game: Game,
    config: &CliConfig,
    json: bool,
    input: R,
    out: &mut W,
) -> anyhow::Result<Game> {
    if !json {
        writeln!(out, "{}", game.board().diagram(config.unicode_pieces))?;
        writeln!(out, "{}", status_line(&game))?;
    }
    let mut lines = input.lines();
    while !game.is_over() {
        if !json {
            if config.show_hints {
                writeln!(out, "{}", hints(&game))?;
            }
            write!(out, "> ")?;
            out.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let command = match parse_input(&line) {
            Ok(command) => command,
            Err(input::InputError::Empty) => continue,
            Err(e) => {
                report_error(out, json, &e.to_string())?;
                continue;
            }
        };
        match command {
            Input::Quit => break,
            Input::Help => writeln!(out, "{}", HELP)?,
            Input::Board => writeln!(out, "{}", game.board().diagram(config.unicode_pieces))?,
            Input::Moves(at) => match game.board().piece_at(at) {
                Some(piece) => {
                    let targets: Vec<String> = game
                        .legal_moves_for(piece.id)
                        .into_iter()
                        .map(square_name)
                        .collect();
                    if json {
                        writeln!(out, "{}", serde_json::to_string(&targets)?)?;
                    } else {
                        writeln!(out, "{}", targets.join(" "))?;
                    }
                }
                None => report_error(out, json, &format!("no piece on {}", square_name(at)))?,
            },
            Input::Move { from, to, promotion } => {
                let Some(piece) = game.board().piece_at(from) else {
                    report_error(out, json, &format!("no piece on {}", square_name(from)))?;
                    continue;
                };
                let promotion = promotion.or(Some(config.default_promotion));
                match game.make_move(piece.id, to, promotion) {
                    Ok(outcome) if json => {
                        writeln!(out, "{}", serde_json::to_string(&outcome)?)?;
                    }
                    Ok(outcome) => {
                        writeln!(out, "{}", describe(&outcome))?;
                        writeln!(out, "{}", game.board().diagram(config.unicode_pieces))?;
                        writeln!(out, "{}", status_line(&game))?;
                    }
                    Err(e @ (GameError::IllegalMove { .. } | GameError::NotYourTurn { .. })) => {
                        report_error(out, json, &e.to_string())?;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }
    Ok(game)
}

fn report_error<W: Write>(out: &mut W, json: bool, message: &str) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", serde_json::json!({ "error": message }))?;
    } else {
        writeln!(out, "{}", message)?;
    }
    Ok(())
}
