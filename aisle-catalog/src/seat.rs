use serde::{Deserialize, Serialize};

/// A single physical seat inside one fare-class partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub seat_id: String,
    pub row: usize,    // 1-based
    pub column: usize, // 1-based
    pub special: String,
    pub occupied: bool,
}

impl Seat {
    pub fn new(row: usize, column: usize, special: impl Into<String>) -> Self {
        Self {
            seat_id: Self::label(row, column),
            row,
            column,
            special: special.into(),
            occupied: false,
        }
    }

    /// Column letter(s) followed by the row number: `A1`, `C12`, `AA3`
    pub fn label(row: usize, column: usize) -> String {
        let mut letters = Vec::new();
        let mut n = column;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(char::from(b'A' + rem as u8));
            n = (n - 1) / 26;
        }
        letters.iter().rev().collect::<String>() + &row.to_string()
    }

    pub fn is_special(&self) -> bool {
        !self.special.is_empty()
    }

    pub fn is_bookable(&self) -> bool {
        !self.occupied && !self.is_special()
    }
}
