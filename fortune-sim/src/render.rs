//! ASCII table and board rendering for the terminal.
use fortune_game::constants::PROGRESS_TRACK_LENGTH;
use fortune_game::{CatalogData, CollectedTotals, EventState, RoundState, StrategyAverages};

/// Width of the board view in columns.
pub const TERMINAL_WIDTH: usize = 80;

const HIDDEN_SLOT: &str = "???";

/// Render `rows` under `headers` as a boxed ASCII table with left-aligned cells.
#[must_use]
pub fn generate_table<S: AsRef<str>>(rows: &[Vec<S>], headers: &[&str]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.as_ref().chars().count());
        }
    }

    let rule = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };
    let mut table = rule.clone();
    table.push_str(&format_row(&widths, headers.iter().copied()));
    table.push_str(&rule);
    for row in rows {
        table.push_str(&format_row(&widths, row.iter().map(|cell| cell.as_ref())));
    }
    table.push_str(&rule);
    table
}

fn format_row<'a>(widths: &[usize], cells: impl IntoIterator<Item = &'a str>) -> String {
    let mut cells = cells.into_iter();
    let padded: Vec<String> = widths
        .iter()
        .map(|&width| format!("{:<width$}", cells.next().unwrap_or("")))
        .collect();
    format!("| {} |\n", padded.join(" | "))
}

/// Progress bar such as `=====>_____`, `width` characters wide.
#[must_use]
pub fn progress_bar(progress: u64, total: u64, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let total = total.max(1);
    let width_u64 = u64::try_from(width).unwrap_or(u64::MAX);
    let filled = usize::try_from(width_u64.saturating_mul(progress.min(total)) / total)
        .unwrap_or(width)
        .min(width - 1);
    format!("{}>{}", "=".repeat(filled), "_".repeat(width - filled - 1))
}

fn centered(text: &str, width: usize) -> String {
    format!("{text:^width$}")
}

/// Collected totals as table rows, in catalog key order.
#[must_use]
pub fn collected_table(collected: &CollectedTotals) -> String {
    let rows: Vec<Vec<String>> = collected
        .iter()
        .map(|(key, qty)| vec![key.to_string(), qty.to_string()])
        .collect();
    generate_table(&rows, &["Collected Reward", "Quantity"])
}

fn slot_tables(round: &RoundState) -> (String, String) {
    let possible: Vec<Vec<String>> = round
        .slots()
        .iter()
        .enumerate()
        .map(|(idx, slot)| {
            vec![
                (idx + 1).to_string(),
                slot.name.clone(),
                slot.quantity.to_string(),
            ]
        })
        .collect();
    let revealed: Vec<Vec<String>> = round
        .revealed()
        .iter()
        .enumerate()
        .map(|(idx, slot)| {
            let label = slot
                .as_ref()
                .map_or_else(|| HIDDEN_SLOT.to_string(), |item| item.key().to_string());
            vec![(idx + 1).to_string(), label]
        })
        .collect();
    (
        generate_table(&possible, &["Index", "Possible Reward", "Quantity"]),
        generate_table(&revealed, &["Index", "Revealed Reward"]),
    )
}

/// Full event board: title, progress, milestones, haul, slots, and costs.
#[must_use]
pub fn board_view(data: &CatalogData, state: &EventState) -> String {
    let round = state.round();
    let mut out = String::new();
    for line in [
        "+----------------------+",
        "|   Fortune Hut Event  |",
        "+----------------------+",
    ] {
        out.push_str(&centered(line, TERMINAL_WIDTH));
        out.push('\n');
    }

    let progress = round.progress();
    out.push_str(&format!(
        "Progress: |{}| {progress}\n",
        progress_bar(progress, PROGRESS_TRACK_LENGTH, TERMINAL_WIDTH - 20)
    ));
    if let Some(next) = data.next_milestone(progress) {
        out.push_str(&format!("Next milestone: {} ({})\n", next.milestone, next.rewards));
    }

    let milestones: Vec<Vec<String>> = data
        .progress_rewards
        .iter()
        .map(|m| vec![m.milestone.to_string(), m.rewards.clone()])
        .collect();
    out.push_str(&generate_table(&milestones, &["Milestone", "Rewards"]));
    out.push('\n');
    out.push_str(&collected_table(state.collected()));

    let (possible, revealed) = slot_tables(round);
    out.push('\n');
    out.push_str(&possible);
    out.push('\n');
    out.push_str(&revealed);
    out.push('\n');
    out.push_str(&format!(
        "Tokens: {}  Reveal Cost: {}  Refresh Cost: {}\n",
        state.budget().tokens(),
        round.reveal_cost(),
        round.refresh_cost()
    ));
    out
}

/// Averages for one strategy, highest first, one decimal place.
#[must_use]
pub fn averages_table(averages: &StrategyAverages) -> String {
    let rows: Vec<Vec<String>> = averages
        .averages
        .iter()
        .map(|row| vec![row.reward.to_string(), format!("{:.1}", row.average)])
        .collect();
    generate_table(&rows, &["Collected Reward", "Average Quantity"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use fortune_game::{initialize_round, rng_from_seed};

    #[test]
    fn table_pads_columns_to_widest_cell() {
        let rows = vec![vec!["Wood x1", "3"], vec!["Gems x5", "10"]];
        let table = generate_table(&rows, &["Reward", "Qty"]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "+---------+-----+");
        assert_eq!(lines[1], "| Reward  | Qty |");
        assert_eq!(lines[3], "| Wood x1 | 3   |");
        assert_eq!(lines[4], "| Gems x5 | 10  |");
        assert_eq!(lines.len(), 6);
        assert!(lines.iter().all(|line| line.len() == lines[0].len()));
    }

    #[test]
    fn empty_table_still_has_headers() {
        let rows: Vec<Vec<String>> = Vec::new();
        let table = generate_table(&rows, &["Milestone", "Rewards"]);
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("| Milestone | Rewards |"));
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0, 750, 10), ">_________");
        assert_eq!(progress_bar(375, 750, 10), "=====>____");
        assert_eq!(progress_bar(750, 750, 10), "=========>");
        assert_eq!(progress_bar(5_000, 750, 10).len(), 10);
        assert!(progress_bar(1, 750, 0).is_empty());
    }

    #[test]
    fn board_view_shows_costs_and_hidden_slots() {
        let data = CatalogData::bundled().unwrap();
        let catalog = data.resolve("Pet Food").unwrap();
        let mut rng = rng_from_seed(5);
        let mut state = initialize_round(&catalog, 40, &mut rng).unwrap();
        state.reveal(&mut rng).unwrap();
        let view = board_view(&data, &state);
        assert!(view.contains("Fortune Hut Event"));
        assert!(view.contains("Tokens: 39  Reveal Cost: 2  Refresh Cost"));
        assert_eq!(view.matches(HIDDEN_SLOT).count(), 9);
        assert!(view.contains("Next milestone: 50"));
    }
}
