//! Day-by-day transitions of a 66-day program.
//!
//! Every transition takes the current [`ProgramState`] by reference and
//! returns a fresh value; nothing here mutates shared state.

use crate::models::{Challenges, EntryRecord, HABIT_COUNT, PROGRAM_DAYS, Phase, ProgramState};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

const LAST_DAY: u8 = PROGRAM_DAYS as u8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgramError {
    #[error("habits can only be edited before the program starts")]
    NotInSetup,
    #[error("the program has already started")]
    AlreadyStarted,
    #[error("the program has not started yet")]
    NotStarted,
    #[error("all 66 days are already logged")]
    ProgramComplete,
    #[error("habit index {0} is out of range (expected 0..3)")]
    HabitIndexOutOfRange(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Challenge {
    ColdShower,
    EarlyWake,
}

/// Input accepted from the page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    SetHabitLabel { index: usize, text: String },
    BeginProgram,
    SetChallengeFlag { challenge: Challenge, value: bool },
    SetJournalDraft { text: String },
    CommitDay {
        #[serde(default)]
        journal: Option<String>,
    },
}

/// Result of applying an [`Action`] to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub program: ProgramState,
    pub journal_draft: String,
    /// False when only the unsaved draft changed.
    pub persist: bool,
}

pub fn phase(state: &ProgramState) -> Phase {
    match state.day {
        0 => Phase::Setup,
        LAST_DAY if state.entries[PROGRAM_DAYS - 1].is_some() => Phase::Complete,
        _ => Phase::InProgress,
    }
}

pub fn progress_percent(day: u8) -> u8 {
    (f64::from(day) / PROGRAM_DAYS as f64 * 100.0).round() as u8
}

pub fn set_habit_label(
    state: &ProgramState,
    index: usize,
    text: impl Into<String>,
) -> Result<ProgramState, ProgramError> {
    if state.day != 0 {
        return Err(ProgramError::NotInSetup);
    }
    if index >= HABIT_COUNT {
        return Err(ProgramError::HabitIndexOutOfRange(index));
    }
    let mut next = state.clone();
    next.habits[index] = text.into();
    Ok(next)
}

pub fn begin_program(state: &ProgramState) -> Result<ProgramState, ProgramError> {
    if state.day != 0 {
        return Err(ProgramError::AlreadyStarted);
    }
    let mut next = state.clone();
    next.day = 1;
    Ok(next)
}

pub fn set_challenge_flag(
    state: &ProgramState,
    challenge: Challenge,
    value: bool,
) -> Result<ProgramState, ProgramError> {
    ensure_in_progress(state)?;
    let mut next = state.clone();
    match challenge {
        Challenge::ColdShower => next.challenges.cold_shower = value,
        Challenge::EarlyWake => next.challenges.early_wake = value,
    }
    Ok(next)
}

/// Records the current day and moves the cursor forward.
///
/// The live challenge flags are copied into the entry and left as they are
/// for the next day. Committing day 66 fills the last slot and keeps the
/// cursor at 66; the program is complete from then on.
pub fn commit_day(
    state: &ProgramState,
    journal: impl Into<String>,
    now: DateTime<Utc>,
) -> Result<ProgramState, ProgramError> {
    ensure_in_progress(state)?;
    let slot = usize::from(state.day) - 1;
    let mut next = state.clone();
    next.entries[slot] = Some(EntryRecord::new(
        now,
        state.habits.clone(),
        state.challenges,
        journal.into(),
    ));
    if state.day < LAST_DAY {
        next.day = state.day + 1;
    }
    Ok(next)
}

pub fn apply(
    state: &ProgramState,
    journal_draft: &str,
    action: Action,
    now: DateTime<Utc>,
) -> Result<Transition, ProgramError> {
    let changed = |program| Transition {
        program,
        journal_draft: journal_draft.to_string(),
        persist: true,
    };

    match action {
        Action::SetHabitLabel { index, text } => set_habit_label(state, index, text).map(changed),
        Action::BeginProgram => begin_program(state).map(changed),
        Action::SetChallengeFlag { challenge, value } => {
            set_challenge_flag(state, challenge, value).map(changed)
        }
        Action::SetJournalDraft { text } => {
            ensure_in_progress(state)?;
            Ok(Transition {
                program: state.clone(),
                journal_draft: text,
                persist: false,
            })
        }
        Action::CommitDay { journal } => {
            let journal = journal.unwrap_or_else(|| journal_draft.to_string());
            Ok(Transition {
                program: commit_day(state, journal, now)?,
                journal_draft: String::new(),
                persist: true,
            })
        }
    }
}

fn ensure_in_progress(state: &ProgramState) -> Result<(), ProgramError> {
    match phase(state) {
        Phase::Setup => Err(ProgramError::NotStarted),
        Phase::Complete => Err(ProgramError::ProgramComplete),
        Phase::InProgress => Ok(()),
    }
}

/// Checks a record read back from storage. `None` means the slots or the
/// cursor contradict each other.
pub(crate) fn validate(
    habits: [String; HABIT_COUNT],
    entries: Vec<Option<EntryRecord>>,
    challenges: Challenges,
    day: Option<u8>,
) -> Option<ProgramState> {
    if entries.len() != PROGRAM_DAYS {
        return None;
    }
    let filled = entries.iter().take_while(|slot| slot.is_some()).count();
    if entries[filled..].iter().any(Option::is_some) {
        return None;
    }

    let derived = if filled == 0 {
        0
    } else {
        (filled + 1).min(PROGRAM_DAYS) as u8
    };
    let day = match day {
        None => derived,
        // Right after `begin_program` nothing is filled yet.
        Some(1) if filled == 0 => 1,
        Some(day) if day == derived => day,
        Some(_) => return None,
    };

    Some(ProgramState {
        habits,
        entries,
        challenges,
        day,
    })
}
