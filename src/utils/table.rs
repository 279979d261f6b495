/// Column alignment within a table cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Monospace text table rendered inside a Discord code block
pub struct Table {
    headers: Vec<String>,
    aligns: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table; every column starts left-aligned
    pub fn new(headers: &[&str]) -> Self {
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            aligns: vec![Align::Left; headers.len()],
            rows: Vec::new(),
        }
    }

    pub fn align(mut self, column: usize, align: Align) -> Self {
        if let Some(slot) = self.aligns.get_mut(column) {
            *slot = align;
        }
        self
    }

    /// Add a row; cells beyond the header count are dropped, missing ones left blank
    pub fn add_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        let mut cells: Vec<String> = row.into_iter().map(Into::into).take(self.headers.len()).collect();
        cells.resize(self.headers.len(), String::new());
        self.rows.push(cells);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    /// Render the table wrapped in a code block
    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut output = String::from("```\n");

        output.push_str(&self.render_row(&self.headers, &widths));
        output.push('\n');

        let separator: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        output.push_str(&separator.join("-+-"));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&self.render_row(row, &widths));
            output.push('\n');
        }

        output.push_str("```");
        output
    }

    fn render_row(&self, row: &[String], widths: &[usize]) -> String {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .zip(&self.aligns)
            .map(|((cell, &width), align)| match align {
                Align::Left => format!("{:<width$}", cell, width = width),
                Align::Right => format!("{:>width$}", cell, width = width),
            })
            .collect();
        cells.join(" | ").trim_end().to_string()
    }
}
