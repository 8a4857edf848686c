use anyhow::Context;
use chrono::Utc;
use gauntlet_core::*;
use std::io::{BufRead, Write};
use std::time::Duration;
use web_time::Instant;

/// Cadence at which the timers are polled while waiting.
const TICK: Duration = Duration::from_millis(100);

/// Line-oriented presentation of the flow: one command per line, the active screen redrawn
/// after every command.
pub(crate) struct Terminal<N> {
    flow: FlowController<N>,
}

impl<N: Notifier> Terminal<N> {
    pub(crate) fn new(flow: FlowController<N>) -> Self {
        Self { flow }
    }

    pub(crate) fn run(&mut self, input: impl BufRead, mut out: impl Write) -> anyhow::Result<()> {
        let mut lines = input.lines();
        loop {
            self.flow.tick(Instant::now());
            self.render(&mut out)?;
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = lines.next() else {
                break;
            };
            let line = line.context("Could not read input")?;
            // CRLF input, only the line terminator goes
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if line.trim() == "quit" {
                let screen = self.flow.screen();
                if !screen.is_terminal() {
                    log::info!("quit midway, on the {} screen", screen);
                }
                break;
            }
            self.handle(line, &mut out)?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn handle(&mut self, line: &str, out: &mut impl Write) -> anyhow::Result<()> {
        use Screen::*;

        let command = line.trim();
        let now = Instant::now();
        let mut wait_gate = false;

        let outcome: Result<Option<String>> = match self.flow.screen() {
            Initial => match command {
                "yes" => self.flow.accept_initial().map(|_| None),
                "no" => self.flow.decline_initial().map(|_| None),
                _ => Ok(Some(unknown(command))),
            },
            // the code is compared as typed, no trimming
            Verify => self
                .flow
                .submit_verification(line, now)
                .map(|verification| match verification {
                    Verification::Accepted => None,
                    Verification::Rejected => {
                        Some("That does not match, try again.".to_owned())
                    }
                }),
            ConfirmPending => match command {
                "yes" if !self.flow.state().gate_open() => Ok(Some(format!(
                    "Not yet, {}s to go.",
                    self.flow.state().gate_seconds_left()
                ))),
                "yes" | "sure" => self.flow.confirm_after_gate().map(|_| None),
                "wait" => {
                    wait_gate = true;
                    Ok(None)
                }
                _ => Ok(Some(unknown(command))),
            },
            RevealGame => match command {
                "continue" => self.flow.continue_after_win().map(|_| None),
                "date" => self.flow.accept_loss().map(|_| None),
                "retry" => self.flow.retry().map(|_| None),
                _ => match parse_cell(command) {
                    Some(id) => self.flow.reveal(id).map(|outcome| {
                        (!outcome.has_update()).then(|| "Already revealed.".to_owned())
                    }),
                    None => Ok(Some(unknown(command))),
                },
            },
            MathChallenge => self
                .flow
                .submit_math_text(line)
                .map(|outcome| match outcome {
                    MathOutcome::Correct => Some("Correct!".to_owned()),
                    MathOutcome::Incorrect => Some("Wrong answer.".to_owned()),
                }),
            GenderPrompt => match command.parse::<Gender>() {
                Ok(gender) => self
                    .flow
                    .select_gender(gender, now)
                    .map(|deferred| match deferred {
                        Deferred::ToFinalQuestion => Some("Correct answer!".to_owned()),
                        Deferred::Reset => Some("Wrong answer, back to the start.".to_owned()),
                    }),
                Err(err) => Ok(Some(err.to_string())),
            },
            FinalQuestion => match command {
                "yes" => self.flow.accept_final_question().map(|_| None),
                "no" | "hover" => self.flow.hover_or_click_decoy().map(|decoy| {
                    Some(format!(
                        "The no button ran away to ({:.0}%, {:.0}%).",
                        decoy.x, decoy.y
                    ))
                }),
                _ => Ok(Some(unknown(command))),
            },
            DateSelect => match command {
                "yes" | "confirm" => self.flow.confirm_date().map(|_| None),
                _ => Ok(Some(unknown(command))),
            },
            FinalConfirm => match command {
                "restart" => self.flow.restart(Utc::now()).map(|_| None),
                _ => Ok(Some(unknown(command))),
            },
        };

        match outcome {
            Ok(Some(message)) => writeln!(out, "{}", message)?,
            Ok(None) => {}
            Err(err) => {
                log::debug!("ignored {:?}: {}", command, err);
                writeln!(out, "({})", err)?;
            }
        }

        if wait_gate {
            self.wait_for_gate(out)?;
        }
        if self.flow.pending_response().is_some() {
            self.wait_for_response()?;
        }
        Ok(())
    }

    fn wait_for_gate(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        let mut shown = None;
        // idle once the gate is open or the screen was left
        while self.flow.tick(Instant::now()).has_update() && !self.flow.state().gate_open() {
            let left = self.flow.state().gate_seconds_left();
            if shown != Some(left) && left > 0 {
                writeln!(out, "{}...", left)?;
                shown = Some(left);
            }
            std::thread::sleep(TICK);
        }
        Ok(())
    }

    fn wait_for_response(&mut self) -> anyhow::Result<()> {
        while self.flow.pending_response().is_some() {
            std::thread::sleep(TICK);
            if let TickOutcome::Fired(screen) = self.flow.tick(Instant::now()) {
                log::debug!("response landed on {}", screen);
            }
        }
        Ok(())
    }

    fn render(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let state = self.flow.state();
        writeln!(out)?;
        match state.screen() {
            Screen::Initial => {
                writeln!(out, "Will you go on a date with me?")?;
                writeln!(out, "[yes] [no]")?;
            }
            Screen::Verify => {
                writeln!(out, "Prove you are not a robot, type this code exactly:")?;
                writeln!(out, "    {}", self.flow.token())?;
            }
            Screen::ConfirmPending => {
                writeln!(out, "Are you sure?")?;
                if state.gate_open() {
                    writeln!(out, "[yes] [sure]")?;
                } else {
                    writeln!(
                        out,
                        "[yes in {}s] [sure] (type `wait` to wait)",
                        state.gate_seconds_left()
                    )?;
                }
            }
            Screen::RevealGame => {
                if let Some(game) = state.game() {
                    render_board(game, out)?;
                }
            }
            Screen::MathChallenge => {
                writeln!(
                    out,
                    "What is 1 + 2 + ... + {}?",
                    self.flow.config().challenge_n
                )?;
            }
            Screen::GenderPrompt => {
                if state.wrong_attempt() {
                    writeln!(out, "Wrong answer! Let's try something easier.")?;
                }
                writeln!(out, "Are you [female], [male] or [other]?")?;
            }
            Screen::FinalQuestion => {
                let decoy = state.decoy();
                writeln!(out, "So... will you go on a date with me?")?;
                writeln!(out, "[yes]   [no] at ({:.0}%, {:.0}%)", decoy.x, decoy.y)?;
            }
            Screen::DateSelect => {
                writeln!(out, "Pick a date: {}", self.flow.offered_date())?;
                writeln!(out, "[confirm]")?;
            }
            Screen::FinalConfirm => {
                writeln!(out, "See you on {}!", self.flow.offered_date())?;
                writeln!(out, "[restart]")?;
            }
        }
        Ok(())
    }
}

fn render_board(game: &RevealGame, out: &mut impl Write) -> anyhow::Result<()> {
    writeln!(
        out,
        "Find {} broken hearts. Found {}, revealed {}/{}.",
        WIN_TOKENS_TO_WIN,
        game.win_tokens(),
        game.revealed_count(),
        BOARD_SIZE
    )?;
    for row in game.cells().chunks(4) {
        let line: Vec<_> = row
            .iter()
            .map(|cell| match cell.visible_value() {
                None if game.can_reveal(cell.id()) => format!("{:>2}:?", cell.id() + 1),
                None => format!("{:>2}:-", cell.id() + 1),
                Some(CellValue::WinToken) => format!("{:>2}:💔", cell.id() + 1),
                Some(CellValue::Neutral) => format!("{:>2}:⭐", cell.id() + 1),
                Some(CellValue::LosingToken) => format!("{:>2}:💖", cell.id() + 1),
            })
            .collect();
        writeln!(out, "{}", line.join("  "))?;
    }
    match game.state() {
        GameState::Active => writeln!(out, "Pick a cell, 1-{}.", BOARD_SIZE)?,
        GameState::Won => writeln!(out, "You won! [continue]")?,
        GameState::Lost => writeln!(out, "You won a date instead! [date] [retry]")?,
    }
    Ok(())
}

/// Cells are numbered from 1 for people.
fn parse_cell(command: &str) -> Option<CellId> {
    let number: CellId = command.parse().ok()?;
    number.checked_sub(1)
}

fn unknown(command: &str) -> String {
    format!("Unknown command: {:?}", command)
}
