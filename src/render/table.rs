use crate::render::rows::{Row, HEADER};

/// Boxed four-column table:
///
/// ```text
/// +--------+----+-------------+-------+
/// | TYPE   | ID | DESCRIPTION | VALUE |
/// +--------+----+-------------+-------+
/// | MEMORY |    | INFO        | ...   |
/// +--------+----+-------------+-------+
/// ```
pub fn render_table(rows: &[Row]) -> String {
    let mut widths = HEADER.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator = separator_line(&widths);
    let mut lines = Vec::with_capacity(rows.len() + 4);
    lines.push(separator.clone());
    lines.push(table_line(&widths, HEADER));
    lines.push(separator.clone());
    for row in rows {
        lines.push(table_line(&widths, row.cells()));
    }
    lines.push(separator);

    lines.join("\n")
}

fn separator_line(widths: &[usize; 4]) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    format!("+{}+", segments.join("+"))
}

fn table_line(widths: &[usize; 4], cells: [&str; 4]) -> String {
    let padded: Vec<String> = widths
        .iter()
        .zip(cells)
        .map(|(width, cell)| format!(" {:<width$} ", cell, width = *width))
        .collect();
    format!("|{}|", padded.join("|"))
}
