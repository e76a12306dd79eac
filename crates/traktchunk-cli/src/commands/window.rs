use crate::output::{Output, OutputFormat};
use chrono::{DateTime, Utc};
use chunk_config::WindowPolicy;
use chunk_core::{parse_anchor, select_window};
use chunk_core::window::intervals_elapsed;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use serde_json::json;

/// Print the window a list request would select, without touching the network.
pub fn run_window(
    start: &str,
    step: i64,
    chunk: usize,
    total: usize,
    at: Option<&str>,
    policy: WindowPolicy,
    output: &Output,
) -> Result<()> {
    let anchor = parse_anchor(start).map_err(|e| eyre!("{}", e))?;
    let now = match at {
        Some(at) => DateTime::parse_from_rfc3339(at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| eyre!("Invalid --at '{}': {}", at, e))?,
        None => Utc::now(),
    };

    let intervals = intervals_elapsed(anchor, step, now).map_err(|e| eyre!("{}", e))?;
    let window = select_window(policy, anchor, step, chunk, total, now).map_err(|e| eyre!("{}", e))?;

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Window").add_attribute(comfy_table::Attribute::Bold),
                Cell::new(""),
            ]);
            table.add_row(vec![Cell::new("Policy"), Cell::new(format!("{:?}", policy).to_lowercase())]);
            table.add_row(vec![Cell::new("Anchor"), Cell::new(anchor.to_rfc3339())]);
            table.add_row(vec![Cell::new("Evaluated at"), Cell::new(now.to_rfc3339())]);
            table.add_row(vec![Cell::new("Intervals elapsed"), Cell::new(intervals)]);
            table.add_row(vec![Cell::new("Start index"), Cell::new(window.start)]);
            table.add_row(vec![Cell::new("End index (exclusive)"), Cell::new(window.end)]);
            table.add_row(vec![Cell::new("Items returned"), Cell::new(window.len())]);
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);

            if window.is_empty() {
                output.warn(empty_window_note(policy, total));
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "policy": policy,
                "anchor": anchor.to_rfc3339(),
                "at": now.to_rfc3339(),
                "intervals": intervals,
                "start": window.start,
                "end": window.end,
                "count": window.len(),
            }));
        }
    }

    Ok(())
}

/// Why a selected window came out empty.
fn empty_window_note(policy: WindowPolicy, total: usize) -> &'static str {
    if total == 0 {
        return "The list has no items; requests return an empty array.";
    }
    match policy {
        WindowPolicy::Sliding => "The window is past the end of the list; requests return an empty array.",
        WindowPolicy::Cumulative => {
            "The cumulative window stops one item short of both the grown chunk and the list end, \
             so it is empty until it spans more than one item."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_window_note_follows_policy() {
        let anchor = parse_anchor("2024-01-01").unwrap();

        let cumulative = select_window(WindowPolicy::Cumulative, anchor, 7, 1, 10, anchor).unwrap();
        assert!(cumulative.is_empty());
        assert!(empty_window_note(WindowPolicy::Cumulative, 10).starts_with("The cumulative window"));
        assert!(empty_window_note(WindowPolicy::Cumulative, 1).starts_with("The cumulative window"));

        let later = parse_anchor("2024-03-01").unwrap();
        let sliding = select_window(WindowPolicy::Sliding, anchor, 7, 1, 3, later).unwrap();
        assert!(sliding.is_empty());
        assert!(empty_window_note(WindowPolicy::Sliding, 3).contains("past the end"));

        assert!(empty_window_note(WindowPolicy::Sliding, 0).starts_with("The list has no items"));
        assert!(empty_window_note(WindowPolicy::Cumulative, 0).starts_with("The list has no items"));
    }

    #[test]
    fn test_run_window_rejects_bad_input() {
        let output = Output::new(OutputFormat::Json, true);
        assert!(run_window("soon", 7, 10, 35, None, WindowPolicy::Sliding, &output).is_err());
        assert!(run_window("2024-01-01", 0, 10, 35, None, WindowPolicy::Sliding, &output).is_err());
        assert!(run_window("2024-01-01", 7, 10, 35, Some("tomorrow"), WindowPolicy::Sliding, &output).is_err());
        assert!(run_window("2024-01-01", 7, 10, 35, Some("2024-01-08T00:00:00Z"), WindowPolicy::Cumulative, &output).is_ok());
    }
}
