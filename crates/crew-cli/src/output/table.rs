#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

/// Columns kept at full width when the table has to fit the terminal.
const FIXED_COLUMNS: &[&str] = &["id", "key", "status", "priority", "assignee"];

const MIN_WIDTH: usize = 4;
const GAP: &str = "  ";

/// Render an aligned table. When `max_width` is set, free-text columns
/// (title, holder, tags) give up width before the fixed ones do.
#[must_use]
pub fn render_entity_table(
    headers: &[&str],
    rows: &[Vec<String>],
    options: TableOptions,
) -> String {
    let mut widths = natural_widths(headers, rows);
    shrink_to_fit(&mut widths, headers, options.max_width);

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| cell(header, *width, None))
        .collect::<Vec<_>>()
        .join(GAP);
    let divider = "-".repeat(total_width(&widths));

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(header_line.trim_end().to_string());
    lines.push(divider);
    for row in rows {
        let line = headers
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(index, (header, width))| {
                let value = row.get(index).map_or("-", String::as_str);
                let color = if options.color { tint(header, value) } else { None };
                cell(value, *width, color)
            })
            .collect::<Vec<_>>()
            .join(GAP);
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

fn natural_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|value| value.chars().count())
                .fold(header.chars().count(), usize::max)
        })
        .collect()
}

fn total_width(widths: &[usize]) -> usize {
    widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * GAP.len()
}

/// Narrow the widest flexible column one step at a time until the table
/// fits or every flexible column is at its floor.
fn shrink_to_fit(widths: &mut [usize], headers: &[&str], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };
    while total_width(widths) > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|(idx, width)| {
                !FIXED_COLUMNS.contains(&headers[*idx])
                    && **width > headers[*idx].chars().count().max(MIN_WIDTH)
            })
            .max_by_key(|(_, width)| **width)
            .map(|(idx, _)| idx);
        match widest {
            Some(idx) => widths[idx] -= 1,
            None => break,
        }
    }
}

/// `value` cut to `width` chars (ellipsis included), colored, then padded.
fn cell(value: &str, width: usize, color: Option<&str>) -> String {
    let text = if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    };
    let pad = " ".repeat(width.saturating_sub(text.chars().count()));
    match color {
        Some(code) => format!("\u{1b}[{code}m{text}\u{1b}[0m{pad}"),
        None => format!("{text}{pad}"),
    }
}

/// ANSI code for a status or priority cell. Other columns stay plain.
fn tint(header: &str, value: &str) -> Option<&'static str> {
    match (header, value) {
        ("status", "completed") => Some("32"),
        ("status", "in_progress" | "review") => Some("36"),
        ("status", "pending" | "released") => Some("33"),
        ("priority", "urgent") => Some("1;31"),
        ("priority", "high") => Some("31"),
        ("priority", "low") => Some("2"),
        _ => None,
    }
}
