use crate::models::{PROGRAM_DAYS, ProgramState, ProgramView};
use crate::preferences::Preferences;
use crate::program::{Action, ProgramError, apply, phase, progress_percent};
use crate::storage::{LocalStore, load_program, persist_program};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Everything owned by the running session.
#[derive(Debug)]
pub struct Session {
    pub store: LocalStore,
    pub program: ProgramState,
    pub journal_draft: String,
    pub preferences: Preferences,
}

impl Session {
    pub fn new(store: LocalStore) -> Self {
        let program = load_program(&store);
        let preferences = Preferences::load(&store);
        Self {
            store,
            program,
            journal_draft: String::new(),
            preferences,
        }
    }

    /// Applies `action` and saves the result. A failed save is logged and the
    /// session keeps the new state in memory.
    pub async fn dispatch(&mut self, action: Action, now: DateTime<Utc>) -> Result<(), ProgramError> {
        let committing = matches!(action, Action::CommitDay { .. });
        let transition = apply(&self.program, &self.journal_draft, action, now)?;

        self.program = transition.program;
        self.journal_draft = transition.journal_draft;

        if transition.persist {
            if let Err(err) = persist_program(&mut self.store, &self.program).await {
                error!("failed to save program: {err}");
            }
        }
        if committing {
            info!(
                day = self.program.day(),
                filled = self.program.filled_entries(),
                "day committed"
            );
        }
        Ok(())
    }

    pub fn view(&self) -> ProgramView {
        let day = self.program.day();
        ProgramView {
            program: self.program.clone(),
            day,
            days_total: PROGRAM_DAYS,
            phase: phase(&self.program),
            progress: progress_percent(day),
            journal_draft: self.journal_draft.clone(),
            preferences: self.preferences.view(),
            dark_mode: self.preferences.dark_mode(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(store: LocalStore) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new(store))),
        }
    }
}
