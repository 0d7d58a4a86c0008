//! In-game calendar: turn counter → (year, month, half-month).
//!
//! Two turns make a month, twelve months make a year. Turn 1 is the first
//! half of month 1 of year 1.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TracksideError};

/// Which half of the month a turn falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Half {
    /// Odd turns.
    Upper,
    /// Even turns.
    Lower,
}

/// An in-game date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameDate {
    /// Year, from 1.
    pub year: u32,
    /// Month, 1-12.
    pub month: u32,
    /// Half of the month.
    pub half: Half,
}

impl fmt::Display for GameDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let half = match self.half {
            Half::Upper => "early",
            Half::Lower => "late",
        };
        write!(f, "Y{} {} M{}", self.year, half, self.month)
    }
}

/// Map a turn to its in-game date.
///
/// # Errors
/// Returns [`TracksideError::InvalidTurn`] for turn 0. Valid game data never
/// produces it, so callers should treat it as a bug.
pub fn turn_to_date(turn: u32) -> Result<GameDate> {
    if turn < 1 {
        return Err(TracksideError::InvalidTurn(turn));
    }
    let month_index = (turn - 1) / 2;
    Ok(GameDate {
        year: month_index / 12 + 1,
        month: month_index % 12 + 1,
        half: if turn % 2 == 1 { Half::Upper } else { Half::Lower },
    })
}

/// Availability era of live items. Eras are cumulative: an item introduced
/// in an earlier era stays available in every later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Era {
    /// The whole first year.
    Year1,
    /// Year 2, months 1-6.
    Year2FirstHalf,
    /// Year 2, months 7-12.
    Year2SecondHalf,
    /// Year 3 and anything after.
    Year3,
}

impl Era {
    /// All eras in chronological order.
    pub const ALL: [Self; 4] = [Self::Year1, Self::Year2FirstHalf, Self::Year2SecondHalf, Self::Year3];

    /// The era a date belongs to.
    #[must_use]
    pub fn of(date: GameDate) -> Self {
        match (date.year, date.month) {
            (0 | 1, _) => Self::Year1,
            (2, 1..=6) => Self::Year2FirstHalf,
            (2, _) => Self::Year2SecondHalf,
            _ => Self::Year3,
        }
    }

    /// This era and every earlier one, oldest first.
    pub fn up_to(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |era| *era <= self)
    }
}
