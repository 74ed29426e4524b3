//! Turn-by-turn command loop.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use engine_core::Player;
use tracing::info;

use crate::session::GameSession;

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Drop a piece in this column
    Play(u8),
    /// Let the engine pick (`-1`)
    Best,
    /// Abandon the game and start over
    Reset,
    Quit,
}

impl Command {
    /// Parse a line. Returns `None` for anything unrecognised.
    pub fn parse(line: &str) -> Option<Command> {
        match line.trim() {
            "reset" => Some(Command::Reset),
            "quit" | "exit" => Some(Command::Quit),
            "-1" => Some(Command::Best),
            other => other.parse::<u8>().ok().map(Command::Play),
        }
    }
}

/// Format a count with `_` between thousands, e.g. `12_345`.
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('_');
        }
        out.push(ch);
    }
    out
}

/// Root-child win rates on one line, `0` for unvisited columns.
pub fn format_win_rates(rates: &[(u8, Option<f64>)]) -> String {
    rates
        .iter()
        .map(|(_, rate)| match rate {
            Some(r) => format!("{:.4}", r),
            None => "0".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn announce(winner: Option<Player>) -> String {
    match winner {
        Some(player) => format!("{} wins!", player),
        None => "No one wins!".to_string(),
    }
}

/// Read one line; `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let n = input.read_line(&mut line).context("failed to read input")?;
    Ok((n > 0).then_some(line))
}

/// Prompt until the user enters something actionable. `None` at end of input.
fn next_command<R: BufRead, W: Write>(
    session: &GameSession,
    input: &mut R,
    out: &mut W,
) -> Result<Option<Command>> {
    write!(out, "{}'s move: ", session.to_move())?;
    out.flush()?;

    loop {
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        match Command::parse(&line) {
            Some(Command::Play(column)) if !session.is_legal(column) => {}
            Some(command) => return Ok(Some(command)),
            None => {}
        }
        write!(out, "Invalid move. Enter move: ")?;
        out.flush()?;
    }
}

/// Play games until the user quits or input runs out.
pub fn run<R: BufRead, W: Write>(session: &mut GameSession, mut input: R, mut out: W) -> Result<()> {
    loop {
        while session.result().is_none() {
            let summary = session.think()?;
            writeln!(
                out,
                "{} visits to root, {:.4} more seconds",
                group_digits(summary.root_visits),
                summary.elapsed.as_secs_f64()
            )?;
            writeln!(out, "{}", session.board())?;
            writeln!(out, "{}", format_win_rates(&summary.win_rates))?;

            let Some(command) = next_command(session, &mut input, &mut out)? else {
                info!("End of input, exiting");
                return Ok(());
            };

            match command {
                Command::Quit => return Ok(()),
                Command::Reset => session.new_game(),
                Command::Play(column) => session.play(column)?,
                Command::Best => {
                    let best = session.play_best()?;
                    match best.win_rate {
                        Some(rate) => writeln!(
                            out,
                            "{} chosen with {:.4} win rate {} visits",
                            best.column,
                            rate,
                            group_digits(best.visits)
                        )?,
                        None => writeln!(out, "No visits {}", best.column)?,
                    }
                }
            }
        }

        if let Some(winner) = session.result() {
            writeln!(out, "{}", session.board())?;
            writeln!(out, "{}", announce(winner))?;
            info!(winner = ?winner, "Game over");
        }
        session.new_game();
    }
}
