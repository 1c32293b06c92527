use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

use fortune_game::{BatchReport, FrequencyRow};

use crate::render::{averages_table, generate_table};

pub fn generate_console_report(out: &mut dyn Write, report: &BatchReport) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Simulation Results".bright_cyan().bold())?;
    writeln!(out, "{}", "=====================".cyan())?;
    writeln!(out, "Wish reward: {}", report.target)?;
    writeln!(out, "Tokens per playthrough: {}", report.tokens)?;
    writeln!(out, "Playthroughs per strategy: {}", report.rounds)?;
    writeln!(out, "Seed: {}", report.seed)?;

    for averages in &report.strategies {
        writeln!(out)?;
        writeln!(
            out,
            "{} {}",
            format!("Simulation {}:", averages.id).bold(),
            averages.name
        )?;
        write!(out, "{}", averages_table(averages))?;
        writeln!(
            out,
            "   Avg reveals: {:.1}  Avg refreshes: {:.1}  Avg tokens left: {:.1}",
            averages.mean_reveals, averages.mean_refreshes, averages.mean_tokens_left
        )?;
    }
    Ok(())
}

pub fn generate_json_report<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    let json_output = serde_json::to_string_pretty(value)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, report: &BatchReport) -> Result<()> {
    writeln!(out, "# Fortune Hut Simulation Results\n")?;
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Wish reward**: {}", report.target)?;
    writeln!(out, "- **Tokens**: {}", report.tokens)?;
    writeln!(out, "- **Playthroughs per strategy**: {}", report.rounds)?;
    writeln!(out, "- **Seed**: {}\n", report.seed)?;

    for averages in &report.strategies {
        writeln!(out, "## Simulation {}: {}\n", averages.id, averages.name)?;
        writeln!(
            out,
            "- **Avg reveals**: {:.1}\n- **Avg refreshes**: {:.1}\n- **Avg tokens left**: {:.1}\n",
            averages.mean_reveals, averages.mean_refreshes, averages.mean_tokens_left
        )?;
        writeln!(out, "| Collected Reward | Average Quantity |")?;
        writeln!(out, "|---|---:|")?;
        for row in &averages.averages {
            writeln!(out, "| {} | {:.1} |", row.reward, row.average)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn verify_rows(rows: &[FrequencyRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            vec![
                row.reward.to_string(),
                format!("{:.2}%", row.expected_pct),
                format!("{:.2}%", row.observed_pct),
                format!("{:+.2}%", row.difference),
            ]
        })
        .collect()
}

const VERIFY_HEADERS: [&str; 4] = ["Reward", "Expected", "Observed", "Difference"];

pub fn generate_verify_console_report(
    out: &mut dyn Write,
    pool: &str,
    draws: u64,
    rows: &[FrequencyRow],
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "🎲 Sampler Verification".bright_cyan().bold())?;
    writeln!(out, "{}", "=======================".cyan())?;
    writeln!(out, "Pool: {pool}  Draws: {draws}")?;
    write!(out, "{}", generate_table(&verify_rows(rows), &VERIFY_HEADERS))?;
    Ok(())
}

pub fn generate_verify_markdown_report(
    out: &mut dyn Write,
    pool: &str,
    draws: u64,
    rows: &[FrequencyRow],
) -> Result<()> {
    writeln!(out, "# Sampler Verification\n")?;
    writeln!(out, "- **Pool**: {pool}\n- **Draws**: {draws}\n")?;
    writeln!(out, "| {} |", VERIFY_HEADERS.join(" | "))?;
    writeln!(out, "|---|---:|---:|---:|")?;
    for cells in verify_rows(rows) {
        writeln!(out, "| {} |", cells.join(" | "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fortune_game::{RewardCatalog, RewardItem, RewardKey, builtin_strategy, run_batch};

    fn sample_report() -> BatchReport {
        let catalog = RewardCatalog::from_items(
            vec![RewardItem::new("A", 1, 1.0), RewardItem::new("B", 1, 1.0)],
            "B",
            15,
        )
        .unwrap();
        let strategy = builtin_strategy("3").unwrap();
        run_batch(&catalog, 100, &[&strategy], 10, 1).unwrap()
    }

    fn sample_rows() -> Vec<FrequencyRow> {
        vec![FrequencyRow {
            reward: RewardKey {
                name: "Wood".to_string(),
                quantity: 1,
            },
            expected_pct: 75.0,
            observed_pct: 74.5,
            difference: -0.5,
        }]
    }

    fn render(f: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buf: Vec<u8> = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn console_report_lists_sorted_averages() {
        let report = sample_report();
        let text = render(|out| generate_console_report(out, &report));
        assert!(text.contains("Simulation 3:"));
        assert!(text.contains("| A x1             | 9.0              |"));
        let a = text.find("A x1").unwrap();
        let b = text.find("B x1").unwrap();
        assert!(a < b);
    }

    #[test]
    fn json_report_round_trips_fields() {
        let report = sample_report();
        let text = render(|out| generate_json_report(out, &report));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["target"], "B");
        assert_eq!(value["strategies"][0]["id"], "3");
        assert_eq!(value["strategies"][0]["averages"][0]["average"], 9.0);
    }

    #[test]
    fn markdown_report_has_table_rows() {
        let report = sample_report();
        let text = render(|out| generate_markdown_report(out, &report));
        assert!(text.starts_with("# Fortune Hut Simulation Results"));
        assert!(text.contains("| A x1 | 9.0 |"));
        assert!(text.contains("| B x1 | 1.0 |"));
    }

    #[test]
    fn verify_reports_show_signed_difference() {
        let rows = sample_rows();
        let console = render(|out| generate_verify_console_report(out, "Main", 1000, &rows));
        assert!(console.contains("-0.50%"));
        assert!(console.contains("Draws: 1000"));
        let markdown = render(|out| generate_verify_markdown_report(out, "Main", 1000, &rows));
        assert!(markdown.contains("| Wood x1 | 75.00% | 74.50% | -0.50% |"));
    }
}
