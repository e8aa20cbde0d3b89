use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PROGRAM_DAYS: usize = 66;
pub const HABIT_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Challenges {
    pub cold_shower: bool,
    pub early_wake: bool,
}

/// One committed day. Fields are only readable once the record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    date: DateTime<Utc>,
    habits: [String; HABIT_COUNT],
    challenges: Challenges,
    journal: String,
}

impl EntryRecord {
    pub fn new(
        date: DateTime<Utc>,
        habits: [String; HABIT_COUNT],
        challenges: Challenges,
        journal: String,
    ) -> Self {
        Self {
            date,
            habits,
            challenges,
            journal,
        }
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn habits(&self) -> &[String; HABIT_COUNT] {
        &self.habits
    }

    pub fn challenges(&self) -> Challenges {
        self.challenges
    }

    pub fn journal(&self) -> &str {
        &self.journal
    }
}

/// The persisted program record (`rise-reset` key).
///
/// `day` is the cursor: 0 while habits are being set up, 1..=66 while days
/// are being logged. `entries` always holds exactly [`PROGRAM_DAYS`] slots and
/// only the slots below the cursor can be filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramState {
    pub(crate) habits: [String; HABIT_COUNT],
    pub(crate) entries: Vec<Option<EntryRecord>>,
    pub(crate) challenges: Challenges,
    pub(crate) day: u8,
}

impl Default for ProgramState {
    fn default() -> Self {
        Self {
            habits: Default::default(),
            entries: vec![None; PROGRAM_DAYS],
            challenges: Challenges::default(),
            day: 0,
        }
    }
}

impl ProgramState {
    pub fn habits(&self) -> &[String; HABIT_COUNT] {
        &self.habits
    }

    pub fn entries(&self) -> &[Option<EntryRecord>] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&EntryRecord> {
        self.entries.get(index).and_then(Option::as_ref)
    }

    pub fn challenges(&self) -> Challenges {
        self.challenges
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn filled_entries(&self) -> usize {
        self.entries.iter().filter(|slot| slot.is_some()).count()
    }
}

/// Raw shape accepted from storage before the invariants are checked.
/// `day` is optional so records written before the cursor was stored still load.
#[derive(Debug, Deserialize)]
pub(crate) struct StoredProgram {
    pub habits: [String; HABIT_COUNT],
    pub entries: Vec<Option<EntryRecord>>,
    pub challenges: Challenges,
    #[serde(default)]
    pub day: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    InProgress,
    Complete,
}

#[derive(Debug, Deserialize)]
pub struct PreferenceRequest {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct PreferencesView {
    pub theme: String,
    pub gradient: String,
    pub gradient_from: String,
    pub gradient_to: String,
}

/// Everything the page needs to render one frame.
#[derive(Debug, Serialize)]
pub struct ProgramView {
    pub program: ProgramState,
    pub day: u8,
    pub days_total: usize,
    pub phase: Phase,
    pub progress: u8,
    pub journal_draft: String,
    pub preferences: PreferencesView,
    pub dark_mode: bool,
}
