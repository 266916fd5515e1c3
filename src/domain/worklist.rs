/// A single data row read from the source worksheet.
///
/// `row_number` is the 1-based position in the worksheet (the header is row
/// 1, so data rows start at 2), matching what the spreadsheet API expects on
/// write-back. `cells` is padded to the header width at construction time so
/// indexing by mapped column is always in bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklistRow {
    pub row_number: u32,
    pub cells: Vec<String>,
    pub status_column: usize,
}

impl WorklistRow {
    pub fn new(row_number: u32, mut cells: Vec<String>, header_width: usize, status_column: usize) -> Self {
        while cells.len() < header_width {
            cells.push(String::new());
        }
        WorklistRow {
            row_number,
            cells,
            status_column,
        }
    }

    pub fn status_cell(&self) -> &str {
        self.cells
            .get(self.status_column)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// A row is a transfer candidate iff its status cell, trimmed, is empty.
    /// A row shorter than the status column counts as blank there.
    pub fn is_eligible(&self) -> bool {
        self.status_cell().trim().is_empty()
    }
}

/// The Source Reader's product: the header row plus the eligible rows only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worklist {
    pub header: Vec<String>,
    pub rows: Vec<WorklistRow>,
    pub status_column: usize,
}

impl Worklist {
    pub fn empty(status_column: usize) -> Self {
        Worklist {
            header: Vec::new(),
            rows: Vec::new(),
            status_column,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_row_padded_to_header_width() {
        let row = WorklistRow::new(2, cells(&["a", "b"]), 5, 4);
        assert_eq!(row.cells.len(), 5);
        assert_eq!(row.cells[2], "");
    }

    #[test]
    fn test_blank_status_cell_is_eligible() {
        let row = WorklistRow::new(2, cells(&["a", "", ""]), 3, 2);
        assert!(row.is_eligible());
    }

    #[test]
    fn test_whitespace_status_cell_is_eligible() {
        let row = WorklistRow::new(2, cells(&["a", "b", "   "]), 3, 2);
        assert!(row.is_eligible());
    }

    #[test]
    fn test_marked_status_cell_is_not_eligible() {
        let row = WorklistRow::new(2, cells(&["a", "b", "Copied"]), 3, 2);
        assert!(!row.is_eligible());
    }

    #[test]
    fn test_row_shorter_than_status_column_is_eligible() {
        // Shorter than the status column before padding; blank at that position.
        let row = WorklistRow::new(2, cells(&["a"]), 1, 4);
        assert!(row.is_eligible());
    }

    #[test]
    fn test_status_cell_reads_the_configured_column() {
        let row = WorklistRow::new(2, cells(&["x", "done", ""]), 3, 1);
        assert_eq!(row.status_cell(), "done");
    }
}
