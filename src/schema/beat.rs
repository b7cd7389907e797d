use serde::{Deserialize, Serialize};

/// The fixed narrative beats every story walks through.
///
/// Beats are always generated in `Beat::ALL` order; none is ever skipped
/// or reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Beat {
    Hook,
    IncitingIncident,
    Debate,
    Midpoint,
    BadTurn,
    Climax,
    Resolution,
}

impl Beat {
    pub const ALL: [Beat; 7] = [
        Self::Hook,
        Self::IncitingIncident,
        Self::Debate,
        Self::Midpoint,
        Self::BadTurn,
        Self::Climax,
        Self::Resolution,
    ];

    /// Display name (e.g., "Inciting Incident").
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hook => "Hook",
            Self::IncitingIncident => "Inciting Incident",
            Self::Debate => "Debate",
            Self::Midpoint => "Midpoint",
            Self::BadTurn => "Bad Turn",
            Self::Climax => "Climax",
            Self::Resolution => "Resolution",
        }
    }

    /// Key of this beat's prompt in the story banks (e.g., "inciting_incident").
    pub fn key(&self) -> &'static str {
        match self {
            Self::Hook => "hook",
            Self::IncitingIncident => "inciting_incident",
            Self::Debate => "debate",
            Self::Midpoint => "midpoint",
            Self::BadTurn => "bad_turn",
            Self::Climax => "climax",
            Self::Resolution => "resolution",
        }
    }

    /// Canonical display names of all beats, in order.
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|beat| beat.name().to_string()).collect()
    }
}
