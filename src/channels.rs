use std::fmt;
use std::str::FromStr;

use crate::error::DatasetError;

// ---------------------------------------------------------------------------
// Lead – one of the twelve standard ECG leads
// ---------------------------------------------------------------------------

/// A standard 12-lead ECG lead, in the column order PTB-XL stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lead {
    I,
    II,
    III,
    Avr,
    Avl,
    Avf,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
}

impl Lead {
    /// All leads in signal-file order.
    pub const ALL: [Lead; 12] = [
        Lead::I,
        Lead::II,
        Lead::III,
        Lead::Avr,
        Lead::Avl,
        Lead::Avf,
        Lead::V1,
        Lead::V2,
        Lead::V3,
        Lead::V4,
        Lead::V5,
        Lead::V6,
    ];

    /// Zero-based column of this lead in a PTB-XL record.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The name used in channel lists (`i`, `avr`, `V1`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Lead::I => "i",
            Lead::II => "ii",
            Lead::III => "iii",
            Lead::Avr => "avr",
            Lead::Avl => "avl",
            Lead::Avf => "avf",
            Lead::V1 => "V1",
            Lead::V2 => "V2",
            Lead::V3 => "V3",
            Lead::V4 => "V4",
            Lead::V5 => "V5",
            Lead::V6 => "V6",
        }
    }
}

impl fmt::Display for Lead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Lead {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Lead::ALL
            .iter()
            .copied()
            .find(|lead| lead.name() == s)
            .ok_or_else(|| DatasetError::UnknownChannel(s.to_string()))
    }
}

/// Resolve a list of lead names into leads, failing on the first unknown name.
pub fn resolve_channels<S: AsRef<str>>(names: &[S]) -> Result<Vec<Lead>, DatasetError> {
    names.iter().map(|n| n.as_ref().parse()).collect()
}
