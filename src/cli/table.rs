use crate::cli::output::current_preferences;

/// Describes how a column should align its contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

/// Specifies the configuration for a single column in the rendered table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableColumn {
    pub header: String,
    pub max_width: Option<usize>,
    pub alignment: Alignment,
}

impl TableColumn {
    pub fn left(header: &str) -> Self {
        Self {
            header: header.to_string(),
            max_width: None,
            alignment: Alignment::Left,
        }
    }

    pub fn right(header: &str) -> Self {
        Self {
            header: header.to_string(),
            max_width: None,
            alignment: Alignment::Right,
        }
    }

    pub fn max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }
}

/// Represents a table with column metadata and rows of data to render.
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<TableColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Computes the content width of each column from headers, rows, and
    /// column limits.
    pub fn compute_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let mut width = visible_width(&column.header);
                for row in &self.rows {
                    if let Some(cell) = row.get(idx) {
                        width = width.max(visible_width(cell));
                    }
                }
                match column.max_width {
                    Some(max) => width.min(max),
                    None => width,
                }
            })
            .collect()
    }

    pub fn render_row(&self, row: &[String], widths: &[usize]) -> String {
        let cells: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let text = row.get(idx).map(String::as_str).unwrap_or("");
                render_cell(text, widths[idx], column.alignment)
            })
            .collect();
        cells.join("  ").trim_end().to_string()
    }

    pub fn render(&self) -> String {
        let widths = self.compute_widths();
        let header: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();
        let mut lines = vec![self.render_row(&header, &widths), horizontal_rule(&widths)];
        lines.extend(self.rows.iter().map(|row| self.render_row(row, &widths)));
        lines.join("\n")
    }
}

fn visible_width(text: &str) -> usize {
    text.chars().count()
}

fn truncate_text(text: &str, width: usize) -> String {
    if visible_width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut truncated: String = text.chars().take(width - 1).collect();
    truncated.push('…');
    truncated
}

/// Renders a single cell padded to `width` with the given alignment.
pub fn render_cell(text: &str, width: usize, alignment: Alignment) -> String {
    let fitted = truncate_text(text, width);
    let remaining = width.saturating_sub(visible_width(&fitted));
    match alignment {
        Alignment::Left => format!("{}{}", fitted, " ".repeat(remaining)),
        Alignment::Right => format!("{}{}", " ".repeat(remaining), fitted),
    }
}

/// Builds a horizontal rule spanning the table.
pub fn horizontal_rule(widths: &[usize]) -> String {
    if widths.is_empty() {
        return String::new();
    }
    let total: usize = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    let ch = if current_preferences().plain { '-' } else { '─' };
    ch.to_string().repeat(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_columns_align_right() {
        let mut table = Table::new(vec![TableColumn::left("Name"), TableColumn::right("Sales")]);
        table.push_row(vec!["North".into(), "100.00".into()]);
        table.push_row(vec!["S".into(), "5.00".into()]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], format!("Name{}Sales", " ".repeat(4)));
        assert_eq!(lines[2], "North  100.00");
        assert_eq!(lines[3], format!("S{}5.00", " ".repeat(8)));
    }

    #[test]
    fn long_cells_are_truncated() {
        assert_eq!(render_cell("Reservoir", 5, Alignment::Left), "Rese…");
        assert_eq!(render_cell("ab", 4, Alignment::Right), "  ab");
    }
}
