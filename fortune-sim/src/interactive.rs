//! Text prompts: wish selection and the interactive reveal/refresh loop.
use anyhow::{Result, bail};
use rand::Rng;
use std::fmt;
use std::io::{BufRead, Write};

use fortune_game::{
    CatalogData, EventState, FortuneError, RewardCatalog, RewardItem, initialize_round,
};

use crate::render::{board_view, collected_table};

const INVALID_CHOICE: &str = "Invalid choice. Please try again.";
const COMMAND_PROMPT: &str = "Enter 'r' to reveal a reward, 'f' to refresh the round, \
'c' to show collected rewards, 'h' to show history, or 'q' to quit: ";

/// Parse a 1-based menu entry against `count` options.
///
/// # Errors
///
/// Returns [`FortuneError::InvalidSelection`] for non-numeric or out-of-range input.
pub fn parse_choice(raw: &str, count: usize) -> Result<usize, FortuneError> {
    let trimmed = raw.trim();
    match trimmed.parse::<usize>() {
        Ok(choice) if (1..=count).contains(&choice) => Ok(choice - 1),
        _ => Err(FortuneError::InvalidSelection(format!(
            "'{trimmed}' is not between 1 and {count}"
        ))),
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// List the wish rewards and keep asking until a valid number is entered.
///
/// # Errors
///
/// Fails when the catalog has no wish rewards or input ends before a choice.
pub fn prompt_wish<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    wishes: &[RewardItem],
) -> Result<String> {
    if wishes.is_empty() {
        bail!("the catalog lists no wish rewards to choose from");
    }
    writeln!(out, "Choose your Wish Reward from the following:")?;
    for (idx, wish) in wishes.iter().enumerate() {
        writeln!(out, "{}. {}", idx + 1, wish.key())?;
    }

    loop {
        write!(out, "Enter the number of your choice: ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            bail!("input ended before a wish reward was chosen");
        };
        match parse_choice(&line, wishes.len()) {
            Ok(idx) => return Ok(wishes[idx].name.clone()),
            Err(err) => {
                log::debug!("rejected wish choice: {err}");
                writeln!(out, "{INVALID_CHOICE}")?;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reveal,
    Refresh,
    Collected,
    History,
    Quit,
}

impl Command {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "r" | "reveal" => Some(Self::Reveal),
            "f" | "refresh" => Some(Self::Refresh),
            "c" | "collected" => Some(Self::Collected),
            "h" | "history" => Some(Self::History),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// One entry of the interactive action log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    Revealed {
        slot: usize,
        reward: String,
        cost: u32,
        wish: bool,
    },
    Refreshed {
        cost: u32,
    },
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revealed {
                slot,
                reward,
                cost,
                wish,
            } => {
                write!(f, "revealed slot {} for {cost} tokens: {reward}", slot + 1)?;
                if *wish {
                    f.write_str(" (wish reward!)")?;
                }
                Ok(())
            }
            Self::Refreshed { cost } => write!(f, "refreshed the round for {cost} tokens"),
        }
    }
}

/// A human-driven playthrough.
pub struct InteractiveGame<'a, G> {
    data: &'a CatalogData,
    catalog: &'a RewardCatalog,
    state: EventState,
    rng: G,
    history: Vec<HistoryEntry>,
}

impl<'a, G: Rng> InteractiveGame<'a, G> {
    /// # Errors
    ///
    /// Fails when the opening board cannot be dealt.
    pub fn new(
        data: &'a CatalogData,
        catalog: &'a RewardCatalog,
        tokens: u32,
        mut rng: G,
    ) -> Result<Self> {
        let state = initialize_round(catalog, tokens, &mut rng)?;
        Ok(Self {
            data,
            catalog,
            state,
            rng,
            history: Vec::new(),
        })
    }

    #[must_use]
    pub const fn state(&self) -> &EventState {
        &self.state
    }

    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Apply one command, writing any feedback. Returns `false` on quit.
    ///
    /// Engine errors become messages; they never end the session.
    ///
    /// # Errors
    ///
    /// Fails only when writing to `out` fails.
    pub fn apply<W: Write>(&mut self, command: Command, out: &mut W) -> Result<bool> {
        match command {
            Command::Reveal => {
                if !self.state.can_reveal() {
                    writeln!(out, "Not enough tokens to reveal a reward.")?;
                    return Ok(true);
                }
                match self.state.reveal(&mut self.rng) {
                    Ok(outcome) => {
                        writeln!(out, "Collected reward: {}", outcome.reward.key())?;
                        if outcome.target {
                            writeln!(out, "You found your wish reward! Refreshing is now free.")?;
                        }
                        self.history.push(HistoryEntry::Revealed {
                            slot: outcome.slot,
                            reward: outcome.reward.key().to_string(),
                            cost: outcome.cost,
                            wish: outcome.target,
                        });
                    }
                    Err(FortuneError::RoundExhausted) => {
                        writeln!(out, "Every slot is revealed. Refresh to deal a new round.")?;
                    }
                    Err(err) => writeln!(out, "{err}")?,
                }
            }
            Command::Refresh => {
                if !self.state.can_refresh() {
                    writeln!(out, "Not enough tokens to refresh the round.")?;
                    return Ok(true);
                }
                let cost = self.state.round().refresh_cost();
                let refreshed = self.state.refresh(self.catalog, &mut self.rng).map(|_| ());
                match refreshed {
                    Ok(()) => {
                        writeln!(out, "Dealt a new round.")?;
                        self.history.push(HistoryEntry::Refreshed { cost });
                    }
                    Err(err) => writeln!(out, "{err}")?,
                }
            }
            Command::Collected => write!(out, "{}", collected_table(self.state.collected()))?,
            Command::History => {
                if self.history.is_empty() {
                    writeln!(out, "No actions yet.")?;
                }
                for (idx, entry) in self.history.iter().enumerate() {
                    writeln!(out, "{:>3}. {entry}", idx + 1)?;
                }
            }
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Show the board and process commands until quit or end of input.
    ///
    /// # Errors
    ///
    /// Fails when reading input or writing output fails.
    pub fn run<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<()> {
        loop {
            write!(out, "{}", board_view(self.data, &self.state))?;
            write!(out, "{COMMAND_PROMPT}")?;
            out.flush()?;
            let Some(line) = read_line(input)? else {
                writeln!(out)?;
                return Ok(());
            };
            match Command::parse(&line) {
                Some(command) => {
                    if !self.apply(command, out)? {
                        return Ok(());
                    }
                }
                None => writeln!(out, "Unknown command '{}'.", line.trim())?,
            }
        }
    }
}
