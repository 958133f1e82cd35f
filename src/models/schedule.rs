use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time-of-day bucket for a time slot.
///
/// Inferred from the clock hour when not given explicitly: slots before
/// noon are morning, everything else afternoon.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shift {
    Morning,
    Afternoon,
}

impl Shift {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "MORNING",
            Self::Afternoon => "AFTERNOON",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "MORNING" => Some(Self::Morning),
            "AFTERNOON" => Some(Self::Afternoon),
            _ => None,
        }
    }

    /// Derive the shift from an `HH:MM` clock time.
    pub fn infer(time: &str) -> Self {
        let hour: u32 = time
            .split(':')
            .next()
            .and_then(|h| h.parse().ok())
            .unwrap_or(0);
        if hour < 12 {
            Self::Morning
        } else {
            Self::Afternoon
        }
    }
}

/// A named time-of-day bucket groups are scheduled into (e.g. `08:00`).
/// Clock times are unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: i64,
    /// Clock time in `HH:MM` format.
    pub time: String,
    pub shift: Shift,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new time slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimeSlotInput {
    pub time: String,
    /// Explicit shift override. Inferred from the hour when omitted.
    pub shift: Option<Shift>,
}

/// Input for updating an existing time slot. All fields are optional for partial updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimeSlotInput {
    pub time: Option<String>,
    pub shift: Option<Shift>,
}
