//! Ordinal demand ratings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Demand levels, lowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Demand {
    CloseToNone,
    VeryLow,
    Low,
    Medium,
    Decent,
    High,
    VeryHigh,
    ExtremelyHigh,
}

impl Demand {
    pub const SCALE: [Demand; 8] = [
        Demand::CloseToNone,
        Demand::VeryLow,
        Demand::Low,
        Demand::Medium,
        Demand::Decent,
        Demand::High,
        Demand::VeryHigh,
        Demand::ExtremelyHigh,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Demand::CloseToNone => "Close to None",
            Demand::VeryLow => "Very Low",
            Demand::Low => "Low",
            Demand::Medium => "Medium",
            Demand::Decent => "Decent",
            Demand::High => "High",
            Demand::VeryHigh => "Very High",
            Demand::ExtremelyHigh => "Extremely High",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::SCALE.get(index).copied()
    }

    /// Case-insensitive; spaces, hyphens and underscores are interchangeable.
    pub fn parse(label: &str) -> Option<Self> {
        let wanted = squash(label);
        if wanted.is_empty() {
            return None;
        }
        Self::SCALE
            .iter()
            .copied()
            .find(|level| squash(level.label()) == wanted)
    }
}

impl fmt::Display for Demand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn squash(label: &str) -> String {
    label
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Position of a label on the scale; `None` for unknown labels.
pub fn index_of(label: Option<&str>) -> Option<usize> {
    label.and_then(Demand::parse).map(|level| level.index())
}

/// `index_of(a) - index_of(b)`, or `None` if either label is unknown.
pub fn delta(a: Option<&str>, b: Option<&str>) -> Option<i32> {
    let a = index_of(a)? as i32;
    let b = index_of(b)? as i32;
    Some(a - b)
}

/// Rounded mean of the recognised labels, used as a group's baseline demand.
pub fn average<'a, I>(labels: I) -> Option<Demand>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let (sum, count) = labels
        .into_iter()
        .filter_map(index_of)
        .fold((0_usize, 0_usize), |(sum, count), index| (sum + index, count + 1));

    if count == 0 {
        return None;
    }
    let mean = sum as f64 / count as f64;
    Demand::from_index(mean.round() as usize)
}
