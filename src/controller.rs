//! Request lifecycle of the sheet view.
//!
//! The controller owns the busy flag and the current sheet.  Every call to
//! [`SheetController::generate`] is stamped with a request token; a response is
//! only applied while its token is still the newest one issued, so overlapping
//! calls resolve in favour of the last one invoked rather than the last one to
//! arrive.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, error, info};

use crate::client::{FetchError, SheetSource};
use crate::export::{ExportError, SheetExporter};
use crate::layout::{self, SheetLayout};
use crate::model::CharacterSheet;

/// What happened to a single `generate` call.
#[derive(Debug)]
pub enum GenerateOutcome {
    /// The fetched sheet replaced the current one.
    Applied,
    /// The fetch failed; the current sheet was left untouched.
    Failed(FetchError),
    /// A newer request was issued while this one was in flight; its result was dropped.
    Superseded,
}

impl GenerateOutcome {
    /// Returns whether the call ended up replacing the current sheet.
    pub fn is_applied(&self) -> bool {
        matches!(self, GenerateOutcome::Applied)
    }
}

/// Snapshot of what the view displays.
#[derive(Clone, Debug, Default)]
pub struct ViewState {
    pub busy: bool,
    pub sheet: Option<Arc<CharacterSheet>>,
}

#[derive(Debug, Default)]
struct State {
    issued: u64,
    in_flight: Option<u64>,
    sheet: Option<Arc<CharacterSheet>>,
}

/// Owns the busy flag and the current sheet of one view.
pub struct SheetController<S> {
    source: S,
    state: Mutex<State>,
}

impl<S: SheetSource> SheetController<S> {
    /// Creates an idle controller without a sheet.
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(State::default()),
        }
    }

    /// Fetches a new sheet and replaces the current one on success.
    ///
    /// Failures are logged and leave the current sheet as it was.  The busy flag
    /// is raised for the duration of the newest request, and is lowered again if
    /// the returned future is dropped before the request settles.
    pub async fn generate(&self) -> GenerateOutcome {
        let token = self.begin();
        let _pending = PendingRequest {
            state: &self.state,
            token,
        };
        let result = self.source.fetch().await;
        self.settle(token, result)
    }

    /// Returns whether the newest request is still in flight.
    pub fn is_busy(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    /// Returns the current sheet, if any.
    pub fn sheet(&self) -> Option<Arc<CharacterSheet>> {
        self.lock().sheet.clone()
    }

    /// Returns the busy flag and the current sheet as one consistent snapshot.
    pub fn view(&self) -> ViewState {
        let state = self.lock();
        ViewState {
            busy: state.in_flight.is_some(),
            sheet: state.sheet.clone(),
        }
    }

    /// Lays out the current sheet.
    pub fn layout(&self) -> Option<SheetLayout> {
        let sheet = self.sheet();
        layout::render(sheet.as_deref())
    }

    /// Exports the current sheet into `directory`.
    ///
    /// Returns `Ok(None)` without touching the filesystem when no sheet is present.
    pub fn export_to(
        &self,
        exporter: &SheetExporter,
        directory: impl AsRef<Path>,
    ) -> Result<Option<PathBuf>, ExportError> {
        let sheet = self.sheet();
        exporter.export(sheet.as_deref(), directory)
    }

    fn begin(&self) -> u64 {
        let mut state = self.lock();
        state.issued += 1;
        let token = state.issued;
        state.in_flight = Some(token);
        debug!("Sheet request #{token} issued");
        token
    }

    fn settle(&self, token: u64, result: Result<CharacterSheet, FetchError>) -> GenerateOutcome {
        let mut state = self.lock();
        if state.issued != token {
            debug!(
                "Discarding response of sheet request #{token}; request #{} is newer",
                state.issued
            );
            return GenerateOutcome::Superseded;
        }

        state.in_flight = None;
        match result {
            Ok(sheet) => {
                info!("Generated sheet: {} {}", sheet.race(), sheet.class());
                state.sheet = Some(Arc::new(sheet));
                GenerateOutcome::Applied
            }
            Err(err) => {
                error!("Erro ao gerar ficha: {err}");
                GenerateOutcome::Failed(err)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Clears the busy flag of an abandoned request that is still the newest one.
struct PendingRequest<'a> {
    state: &'a Mutex<State>,
    token: u64,
}

impl Drop for PendingRequest<'_> {
    fn drop(&mut self) {
        let mut state = lock_state(self.state);
        if state.in_flight == Some(self.token) {
            debug!("Sheet request #{} abandoned before it settled", self.token);
            state.in_flight = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Unused;

    #[async_trait]
    impl SheetSource for Unused {
        async fn fetch(&self) -> Result<CharacterSheet, FetchError> {
            unreachable!("tests drive begin/settle directly")
        }
    }

    fn sheet(race: &str) -> CharacterSheet {
        CharacterSheet::new(race, "Guerreiro")
    }

    #[test]
    fn idle_before_first_request() {
        let controller = SheetController::new(Unused);
        assert!(!controller.is_busy());
        assert!(controller.sheet().is_none());
        assert!(controller.layout().is_none());
    }

    #[test]
    fn busy_only_while_request_is_in_flight() {
        let controller = SheetController::new(Unused);
        let token = controller.begin();
        assert!(controller.is_busy());
        assert!(controller.settle(token, Ok(sheet("Elfo"))).is_applied());
        assert!(!controller.is_busy());
        assert_eq!(controller.sheet().expect("sheet").race(), "Elfo");
    }

    #[test]
    fn failure_keeps_previous_sheet() {
        let controller = SheetController::new(Unused);
        let first = controller.begin();
        controller.settle(first, Ok(sheet("Anão")));

        let second = controller.begin();
        let outcome = controller.settle(second, Err(FetchError::Parse("eof".to_string())));
        assert!(matches!(outcome, GenerateOutcome::Failed(FetchError::Parse(_))));
        assert!(!controller.is_busy());
        assert_eq!(controller.sheet().expect("sheet").race(), "Anão");
    }

    #[test]
    fn stale_response_arriving_last_is_dropped() {
        let controller = SheetController::new(Unused);
        let older = controller.begin();
        let newer = controller.begin();

        assert!(controller.settle(newer, Ok(sheet("Humano"))).is_applied());
        assert!(matches!(
            controller.settle(older, Ok(sheet("Orc"))),
            GenerateOutcome::Superseded
        ));
        assert_eq!(controller.sheet().expect("sheet").race(), "Humano");
    }

    #[test]
    fn abandoned_request_only_clears_its_own_busy_flag() {
        let controller = SheetController::new(Unused);
        let older = controller.begin();
        drop(PendingRequest {
            state: &controller.state,
            token: older,
        });
        assert!(!controller.is_busy());

        let stale = controller.begin();
        let newest = controller.begin();
        drop(PendingRequest {
            state: &controller.state,
            token: stale,
        });
        assert!(controller.is_busy());
        assert!(controller.settle(newest, Ok(sheet("Gnomo"))).is_applied());
    }

    #[test]
    fn stale_response_does_not_clear_busy() {
        let controller = SheetController::new(Unused);
        let older = controller.begin();
        let newer = controller.begin();

        controller.settle(older, Ok(sheet("Orc")));
        let view = controller.view();
        assert!(view.busy);
        assert!(view.sheet.is_none());

        controller.settle(newer, Err(FetchError::Network("reset".to_string())));
        assert!(!controller.is_busy());
        assert!(controller.sheet().is_none());
    }
}
