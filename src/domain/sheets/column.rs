use std::fmt::Formatter;

/// 1-based spreadsheet column, displayed in letter notation (1 → A, 27 → AA).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Column(u32);

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", number_to_letters(self.0))
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Show both the numeric and letter representation
        write!(f, "Column(u32: {}, letters: {})", self.0, self)
    }
}

impl From<u32> for Column {
    fn from(value: u32) -> Self {
        Column(value)
    }
}

impl From<Column> for u32 {
    fn from(col: Column) -> Self {
        col.0
    }
}

fn number_to_letters(number: u32) -> String {
    if number == 0 {
        panic!("Column number cannot be zero");
    }

    let mut number = number;
    let mut result = String::new();
    while number > 0 {
        let remainder = (number - 1) % 26;
        let letter = (remainder as u8 + b'A') as char;
        result.push(letter);
        number = (number - remainder) / 26;
    }
    result.chars().rev().collect()
}
