//! Decision strategies for automated playthroughs.
use serde::Serialize;
use std::fmt;

use crate::ledger::ResourceBudget;
use crate::round::RoundState;

/// What a strategy wants the engine to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Reveal,
    Refresh,
    End,
}

impl Action {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Reveal => "reveal",
            Self::Refresh => "refresh",
            Self::End => "end",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pure decision function consulted before every engine command.
///
/// Implementations must not rely on hidden mutable state: the same budget and
/// board always yield the same action.
pub trait Strategy: Send + Sync {
    /// Short stable identifier used to key batch results.
    fn id(&self) -> &str;

    /// Human-readable description.
    fn name(&self) -> &str;

    fn decide(&self, budget: ResourceBudget, round: &RoundState) -> Action;
}

/// Parameterised decision rules behind the built-in strategy table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum DecisionRule {
    /// Keep revealing until the board runs out.
    AlwaysReveal,
    /// Refresh once the target is found and the reveal cost exceeds the threshold.
    RefreshAfterTarget { reveal_cost_above: u32 },
    /// Refresh as soon as the target is found or reveals reach the cost cap.
    RefreshOnTargetOrCost { max_reveal_cost: u32 },
    /// Refresh when reveals cost more than the threshold and no wanted reward is left.
    RefreshWhenMissing {
        reveal_cost_above: u32,
        wanted: Vec<String>,
    },
    /// Reveal while a wanted reward is still face down, otherwise refresh.
    RevealWhileRemaining { wanted: Vec<String> },
    /// Reveal while the reveal cost stays below the cap, otherwise refresh.
    RevealBelowCost { max_reveal_cost: u32 },
}

impl DecisionRule {
    fn preferred(&self, round: &RoundState) -> Action {
        let any_wanted = |wanted: &[String]| wanted.iter().any(|name| round.has_remaining(name));
        match self {
            Self::AlwaysReveal => Action::Reveal,
            Self::RefreshAfterTarget { reveal_cost_above } => {
                if round.target_found() && round.reveal_cost() > *reveal_cost_above {
                    Action::Refresh
                } else {
                    Action::Reveal
                }
            }
            Self::RefreshOnTargetOrCost { max_reveal_cost } => {
                if round.target_found() || round.reveal_cost() >= *max_reveal_cost {
                    Action::Refresh
                } else {
                    Action::Reveal
                }
            }
            Self::RefreshWhenMissing {
                reveal_cost_above,
                wanted,
            } => {
                if round.reveal_cost() > *reveal_cost_above && !any_wanted(wanted) {
                    Action::Refresh
                } else {
                    Action::Reveal
                }
            }
            Self::RevealWhileRemaining { wanted } => {
                if any_wanted(wanted) {
                    Action::Reveal
                } else {
                    Action::Refresh
                }
            }
            Self::RevealBelowCost { max_reveal_cost } => {
                if round.reveal_cost() < *max_reveal_cost {
                    Action::Reveal
                } else {
                    Action::Refresh
                }
            }
        }
    }

    /// Whether an exhausted board should be replaced rather than ending play.
    const fn refreshes_exhausted_board(&self) -> bool {
        !matches!(self, Self::AlwaysReveal)
    }
}

/// A numbered strategy driven by a [`DecisionRule`].
///
/// Every rule is wrapped in the same affordability guard: play ends when
/// neither action can be paid for, and an unaffordable preference ends play
/// instead of being attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleStrategy {
    id: String,
    name: String,
    rule: DecisionRule,
}

impl RuleStrategy {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, rule: DecisionRule) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rule,
        }
    }

    #[must_use]
    pub const fn rule(&self) -> &DecisionRule {
        &self.rule
    }
}

impl Strategy for RuleStrategy {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, budget: ResourceBudget, round: &RoundState) -> Action {
        let can_reveal = budget.can_afford(round.reveal_cost());
        let can_refresh = budget.can_afford(round.refresh_cost());
        if !can_reveal && !can_refresh {
            return Action::End;
        }

        let preferred = if round.is_exhausted() {
            if self.rule.refreshes_exhausted_board() {
                Action::Refresh
            } else {
                Action::End
            }
        } else {
            self.rule.preferred(round)
        };

        match preferred {
            Action::Reveal if can_reveal => Action::Reveal,
            Action::Refresh if can_refresh => Action::Refresh,
            _ => Action::End,
        }
    }
}

/// Strategy backed by a plain decision function.
pub struct FnStrategy<F> {
    id: String,
    name: String,
    decide: F,
}

impl<F> FnStrategy<F>
where
    F: Fn(ResourceBudget, &RoundState) -> Action + Send + Sync,
{
    pub fn new(id: impl Into<String>, name: impl Into<String>, decide: F) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            decide,
        }
    }
}

impl<F> Strategy for FnStrategy<F>
where
    F: Fn(ResourceBudget, &RoundState) -> Action + Send + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, budget: ResourceBudget, round: &RoundState) -> Action {
        (self.decide)(budget, round)
    }
}

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// The numbered strategy table shipped with the simulator.
#[must_use]
pub fn builtin_strategies() -> Vec<RuleStrategy> {
    vec![
        RuleStrategy::new(
            "1",
            "Refresh on finding wish reward when reveal cost > 4",
            DecisionRule::RefreshAfterTarget {
                reveal_cost_above: 4,
            },
        ),
        RuleStrategy::new(
            "2",
            "Refresh when reveal cost > 5 and no Essence Stones remain",
            DecisionRule::RefreshWhenMissing {
                reveal_cost_above: 5,
                wanted: names(&["Essence Stones"]),
            },
        ),
        RuleStrategy::new("3", "Reveal always", DecisionRule::AlwaysReveal),
        RuleStrategy::new(
            "4",
            "Reveal while a Multiplier remains, otherwise refresh",
            DecisionRule::RevealWhileRemaining {
                wanted: names(&["Multiplier"]),
            },
        ),
        RuleStrategy::new(
            "5",
            "Refresh when no wanted items remain",
            DecisionRule::RefreshWhenMissing {
                reveal_cost_above: 0,
                wanted: names(&[
                    "Fire Crystal",
                    "Charm Design",
                    "100 Enhancement XP Component",
                    "Essence Stones",
                ]),
            },
        ),
        RuleStrategy::new(
            "6",
            "Reveal while reveal cost < 10, otherwise refresh",
            DecisionRule::RevealBelowCost {
                max_reveal_cost: 10,
            },
        ),
        RuleStrategy::new(
            "7",
            "Refresh on finding wish reward when reveal cost > 3",
            DecisionRule::RefreshAfterTarget {
                reveal_cost_above: 3,
            },
        ),
        RuleStrategy::new(
            "8",
            "Refresh on finding wish reward or reveal cost >= 6",
            DecisionRule::RefreshOnTargetOrCost { max_reveal_cost: 6 },
        ),
        RuleStrategy::new(
            "9",
            "Refresh on finding wish reward or reveal cost >= 7",
            DecisionRule::RefreshOnTargetOrCost { max_reveal_cost: 7 },
        ),
    ]
}

/// Look up a built-in strategy by its table id.
#[must_use]
pub fn builtin_strategy(id: &str) -> Option<RuleStrategy> {
    builtin_strategies().into_iter().find(|s| s.id() == id.trim())
}
