// CSV to markdown table

use crate::types::{AppError, AppResult};

pub fn to_markdown(content: &[u8]) -> AppResult<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| AppError::Conversion(format!("failed to parse CSV: {}", e)))?;
        rows.push(record.iter().map(escape_cell).collect());
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return Ok(String::new());
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (index, row) in rows.iter().enumerate() {
        lines.push(render_row(row, width));
        if index == 0 {
            lines.push(format!("|{}", " --- |".repeat(width)));
        }
    }

    Ok(lines.join("\n"))
}

fn render_row(row: &[String], width: usize) -> String {
    let cells: Vec<&str> = (0..width)
        .map(|i| row.get(i).map(String::as_str).unwrap_or(""))
        .collect();
    format!("| {} |", cells.join(" | "))
}

fn escape_cell(cell: &str) -> String {
    cell.trim().replace('|', "\\|").replace(['\r', '\n'], " ")
}
