use serde::Serialize;
use tidy_core::OutcomeReport;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    // Calculate column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  "));

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
}

/// First line of a possibly multi-line description.
pub fn headline(description: &str) -> &str {
    description.lines().next().unwrap_or_default()
}

/// Indented text rendering of an outcome tree, one action per line with
/// absorbed failures and failed hooks beneath it.
pub fn render_outcome(report: &OutcomeReport) -> String {
    let mut out = String::new();
    render_into(report, 0, None, &mut out);
    out
}

fn render_into(report: &OutcomeReport, depth: usize, label: Option<&str>, out: &mut String) {
    let pad = "  ".repeat(depth);
    let label = label.map(|l| format!("{l} ")).unwrap_or_default();
    out.push_str(&format!(
        "{pad}{label}[{}] {}\n",
        report.status,
        headline(&report.description)
    ));
    for failure in &report.failures {
        for line in failure.render().lines() {
            out.push_str(&format!("{pad}    ! {line}\n"));
        }
    }
    for hook in &report.pre_run_failures {
        render_into(hook, depth + 1, Some("before"), out);
    }
    for child in &report.nested {
        render_into(child, depth + 1, None, out);
    }
    for hook in &report.post_run_failures {
        render_into(hook, depth + 1, Some("after"), out);
    }
}
