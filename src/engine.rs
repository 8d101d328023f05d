//! The engine puts all pieces together: it keeps the current board, reads
//! line commands from the input stream and writes responses to the output
//! stream.
//!
//! [`Engine::run`] is the "main loop" of the engine. Supported commands:
//!
//! - `uci`, `isready`: identification and health check
//! - `position startpos [moves <move>...]`
//! - `position fen <fen> [moves <move>...]`
//! - `d`: print the board
//! - `moves`: list legal moves of the side to move
//! - `move <move>`: play a move
//! - `go [depth <plies>]`: search and print `bestmove`
//! - `perft <depth>`: count leaf nodes of the legal move tree
//! - `quit`
//!
//! Moves are written in UCI long algebraic notation ("e2e4", "e7e8q").

use std::io::{BufRead, Write};

use anyhow::bail;
use itertools::Itertools;
use tracing::debug;

use crate::chess::board::Board;
use crate::chess::moves::Move;
use crate::chess::perft::perft;
use crate::search::{Depth, MiniMax, MoveStrategy, DEFAULT_DEPTH};

/// Command driver around a [`Board`].
pub struct Engine {
    board: Board,
    depth: Depth,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Starts from the initial position and searches [`DEFAULT_DEPTH`] plies
    /// deep.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: Board::starting(),
            depth: DEFAULT_DEPTH,
        }
    }

    /// Current board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Continuously reads the input stream and executes commands until "quit"
    /// is sent or the input ends.
    ///
    /// Malformed commands are reported with `info string` lines and do not
    /// stop the loop.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the input or writing the output fails.
    pub fn run(
        &mut self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> anyhow::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            // EOF reached.
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            debug!(command = line.trim(), "received");

            match tokens.first() {
                Some(&"uci") => {
                    writeln!(
                        output,
                        "id name {} {}",
                        env!("CARGO_PKG_NAME"),
                        crate::engine_version()
                    )?;
                    writeln!(output, "id author {}", env!("CARGO_PKG_AUTHORS"))?;
                    writeln!(output, "uciok")?;
                },
                Some(&"isready") => {
                    writeln!(output, "readyok")?;
                },
                Some(&"position") => {
                    if let Err(e) = self.set_position(&tokens[1..]) {
                        writeln!(output, "info string {e:#}")?;
                    }
                },
                Some(&"d") => {
                    writeln!(output, "{:?}", self.board)?;
                    writeln!(output, "Fen: {}", self.board)?;
                },
                Some(&"moves") => {
                    writeln!(
                        output,
                        "{}",
                        self.board.current_player().legal_moves().iter().join(" ")
                    )?;
                },
                Some(&"move") => match tokens.get(1) {
                    Some(uci) => {
                        if let Err(e) = self.play(uci) {
                            writeln!(output, "info string {e:#}")?;
                        }
                    },
                    None => writeln!(output, "info string Missing move")?,
                },
                Some(&"go") => {
                    let depth = match &tokens[1..] {
                        [] => self.depth,
                        ["depth", plies] => match plies.parse::<Depth>() {
                            Ok(plies) if plies > 0 => plies,
                            _ => {
                                writeln!(output, "info string Invalid depth: {plies}")?;
                                continue;
                            },
                        },
                        _ => {
                            writeln!(
                                output,
                                "info string Expected go [depth <plies>], got: {}",
                                line.trim()
                            )?;
                            continue;
                        },
                    };
                    let best_move = MiniMax::new(depth).execute(&self.board);
                    writeln!(output, "bestmove {best_move}")?;
                },
                Some(&"perft") => match tokens.get(1).map(|plies| plies.parse::<Depth>()) {
                    Some(Ok(depth)) => {
                        writeln!(output, "{}", perft(&self.board, depth))?;
                    },
                    _ => writeln!(output, "info string Expected perft <depth>")?,
                },
                Some(&"quit") => break,
                Some(&command) => {
                    writeln!(output, "info string Unsupported command: {command}")?;
                },
                None => {},
            }
        }
        Ok(())
    }

    /// Handles the arguments of `position`. The board is only replaced when
    /// the position and all moves are valid.
    fn set_position(&mut self, arguments: &[&str]) -> anyhow::Result<()> {
        let (mut board, rest) = match arguments {
            ["startpos", rest @ ..] => (Board::starting(), rest),
            ["fen", rest @ ..] => {
                let fen_length = rest
                    .iter()
                    .position(|&token| token == "moves")
                    .unwrap_or(rest.len());
                let fen = rest[..fen_length].join(" ");
                (Board::try_from(fen.as_str())?, &rest[fen_length..])
            },
            _ => bail!(
                "Expected position [fen <fenstring> | startpos] moves <move1> ... <move_i>, got: {}",
                arguments.join(" ")
            ),
        };
        match rest {
            [] => {},
            ["moves", moves @ ..] => {
                for uci in moves {
                    board = Self::apply(&board, uci)?;
                }
            },
            _ => bail!("Expected moves <move1> ... <move_i>, got: {}", rest.join(" ")),
        }
        self.board = board;
        Ok(())
    }

    fn play(&mut self, uci: &str) -> anyhow::Result<()> {
        self.board = Self::apply(&self.board, uci)?;
        Ok(())
    }

    fn apply(board: &Board, uci: &str) -> anyhow::Result<Board> {
        let next_move = Move::from_uci(board, uci)?;
        let transition = board.current_player().make_move(&next_move);
        if !transition.status.is_done() {
            bail!("{uci} can not be played: {:?}", transition.status);
        }
        Ok(transition.board.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;
    use pretty_assertions::assert_eq;

    use super::*;

    fn run(commands: &str) -> (Engine, String) {
        let mut engine = Engine::new();
        let mut output = Vec::new();
        engine
            .run(&mut commands.as_bytes(), &mut output)
            .context("engine loop")
            .unwrap();
        (engine, String::from_utf8(output).unwrap())
    }

    #[test]
    fn position_with_moves() {
        let (engine, output) = run("position startpos moves e2e4 e7e5 g1f3\n");
        assert_eq!(output, "");
        assert_eq!(
            engine.board().to_string(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 0 1"
        );
    }

    #[test]
    fn position_fen_with_moves() {
        let (engine, _) = run("position fen 4k3/8/8/8/8/8/4P3/4K3 w - - 0 1 moves e2e4\n");
        assert_eq!(engine.board().to_string(), "4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1");
    }

    #[test]
    fn invalid_position_keeps_board() {
        let (engine, output) = run("position startpos moves e2e4 e2e4\nposition fen 8/8 w\n");
        assert_eq!(engine.board(), &Board::starting());
        assert_eq!(output.lines().count(), 2);
        assert!(output.lines().all(|line| line.starts_with("info string")));
    }

    #[test]
    fn moves_and_perft() {
        let (_, output) = run("moves\nperft 2\nperft x\n");
        let mut lines = output.lines();
        assert_eq!(lines.next().unwrap().split(' ').count(), 20);
        assert_eq!(lines.next(), Some("400"));
        assert_eq!(lines.next(), Some("info string Expected perft <depth>"));
    }

    #[test]
    fn play_moves() {
        let (engine, output) = run("move e2e4\nmove e2e4\nmove e7e5\n");
        assert_eq!(output.lines().count(), 1);
        assert_eq!(
            engine.board().to_string(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 1"
        );
    }

    #[test]
    fn go_finds_mate() {
        let (_, output) =
            run("position startpos moves f2f3 e7e5 g2g4\ngo depth 2\ngo depth 0\nquit\nd\n");
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("bestmove d8h4"));
        assert_eq!(lines.next(), Some("info string Invalid depth: 0"));
        // Nothing is processed after quit.
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn unsupported_command() {
        let (_, output) = run("\nisready\nfoo bar\n");
        assert_eq!(output, "readyok\ninfo string Unsupported command: foo\n");
    }
}
