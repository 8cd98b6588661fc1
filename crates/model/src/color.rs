use core::fmt::{self, Display};

/// Option colors in display order. The position of a color is the index the host expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Blue,
    Yellow,
    Green,
}

impl Color {
    pub const ALL: [Self; 4] = [Self::Red, Self::Blue, Self::Yellow, Self::Green];

    pub const fn from_index(index: usize) -> Option<Self> {
        Some(match index {
            0 => Self::Red,
            1 => Self::Blue,
            2 => Self::Yellow,
            3 => Self::Green,
            _ => return None,
        })
    }

    /// Parses the first letter of a color name, case-insensitively.
    pub const fn from_letter(letter: char) -> Option<Self> {
        Some(match letter.to_ascii_lowercase() {
            'r' => Self::Red,
            'b' => Self::Blue,
            'y' => Self::Yellow,
            'g' => Self::Green,
            _ => return None,
        })
    }

    pub const fn index(self) -> u8 {
        self as u8
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Red => "RED",
            Self::Blue => "BLUE",
            Self::Yellow => "YELLOW",
            Self::Green => "GREEN",
        })
    }
}
