//! Validation session manager
//!
//! Holds at most one validation session at a time. Checks run as spawned
//! tasks gated by a semaphore; every task re-checks the session id before
//! applying its result, so replacing or closing a session silently discards
//! late responses.

use std::sync::Arc;

use tokio::sync::{watch, RwLock, Semaphore};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::key_pool::{KeyImportCandidate, KeyImportStatus, KeyImporter};
use crate::domain::validation::{
    parse_key_input, KeyValidationStatus, KeysValidationState, QuotaChecker,
};
use crate::domain::DomainError;

#[derive(Debug)]
struct ActiveSession {
    id: Uuid,
    state: KeysValidationState,
    in_flight: usize,
}

/// Orchestrates one validation session: parse, concurrent checks, retries,
/// and the final import hand-off.
#[derive(Debug)]
pub struct ValidationSessionManager {
    quota: Arc<dyn QuotaChecker>,
    importer: Arc<dyn KeyImporter>,
    semaphore: Arc<Semaphore>,
    session: Arc<RwLock<Option<ActiveSession>>>,
    // Signalled whenever a check settles, an import finishes, or the
    // session goes away.
    progress: Arc<watch::Sender<()>>,
}

impl ValidationSessionManager {
    pub fn new(
        quota: Arc<dyn QuotaChecker>,
        importer: Arc<dyn KeyImporter>,
        concurrency: usize,
    ) -> Self {
        let (progress, _) = watch::channel(());
        Self {
            quota,
            importer,
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            session: Arc::new(RwLock::new(None)),
            progress: Arc::new(progress),
        }
    }

    /// Open a new session from pasted text, replacing any existing one.
    /// Checks for all unique keys start immediately.
    pub async fn start(
        &self,
        group: impl Into<String>,
        text: &str,
    ) -> Result<KeysValidationState, DomainError> {
        let group = group.into();
        let parsed = parse_key_input(text);
        let state = KeysValidationState::from_parsed(group.clone(), parsed);
        let id = Uuid::new_v4();

        let snapshot = {
            let mut guard = self.session.write().await;
            if guard.is_some() {
                info!("replacing open validation session");
            }
            let mut session = ActiveSession {
                id,
                state,
                in_flight: 0,
            };
            let keys = session.state.pending_keys();
            self.issue_checks(&mut session, &keys);
            let snapshot = session.state.clone();
            *guard = Some(session);
            snapshot
        };

        info!(
            group = %group,
            valid_lines = snapshot.valid_lines,
            unique = snapshot.unique_in_input,
            "validation session started"
        );

        Ok(snapshot)
    }

    /// Current session state, if a session is open
    pub async fn snapshot(&self) -> Option<KeysValidationState> {
        let guard = self.session.read().await;
        guard.as_ref().map(|session| session.state.clone())
    }

    /// Discard the session. In-flight responses become no-ops.
    pub async fn close(&self) {
        let mut guard = self.session.write().await;
        if guard.take().is_some() {
            info!("validation session closed");
        }
        drop(guard);
        self.progress.send_replace(());
    }

    /// Re-check a single key. Only rows in a failure status are eligible and
    /// only while the session is not busy; anything else leaves the state
    /// untouched.
    pub async fn retry_one(&self, api_key: &str) -> Result<KeysValidationState, DomainError> {
        let mut guard = self.session.write().await;
        let session = guard
            .as_mut()
            .ok_or_else(|| DomainError::not_found("no open validation session"))?;

        if session.state.row_mut(api_key).is_none() {
            return Err(DomainError::not_found(format!(
                "key '{api_key}' is not part of this session"
            )));
        }

        let eligible = !session.state.is_busy()
            && session
                .state
                .rows
                .iter()
                .any(|row| row.api_key == api_key && row.status.is_failure());
        if eligible {
            self.issue_checks(session, &[api_key.to_owned()]);
        }

        Ok(session.state.clone())
    }

    /// Re-check every key currently in a failure status. No-op while busy or
    /// when nothing failed.
    pub async fn retry_failed(&self) -> Result<KeysValidationState, DomainError> {
        let mut guard = self.session.write().await;
        let session = guard
            .as_mut()
            .ok_or_else(|| DomainError::not_found("no open validation session"))?;

        if !session.state.is_busy() {
            let keys = session.state.failed_keys();
            if !keys.is_empty() {
                info!(count = keys.len(), "retrying failed keys");
                self.issue_checks(session, &keys);
            }
        }

        Ok(session.state.clone())
    }

    /// Import every key that validated successfully. Rows that import cleanly
    /// leave the session; rows whose import failed stay for inspection.
    pub async fn import_valid(&self) -> Result<KeysValidationState, DomainError> {
        let (id, group, candidates) = {
            let mut guard = self.session.write().await;
            let session = guard
                .as_mut()
                .ok_or_else(|| DomainError::not_found("no open validation session"))?;

            if session.state.is_busy() {
                return Err(DomainError::conflict(
                    "session is busy checking or importing",
                ));
            }
            if !session.state.pending_keys().is_empty() {
                return Err(DomainError::conflict("some keys have not been checked yet"));
            }
            let candidates: Vec<KeyImportCandidate> = session
                .state
                .rows
                .iter()
                .filter(|row| row.status.is_success())
                .map(|row| KeyImportCandidate {
                    api_key: row.api_key.clone(),
                    quota_limit: row.quota_limit,
                    quota_remaining: row.quota_remaining,
                })
                .collect();
            if candidates.is_empty() {
                return Err(DomainError::validation("no valid keys to import"));
            }

            session.state.importing = true;
            session.state.import_warning = None;
            session.state.import_error = None;
            (session.id, session.state.group.clone(), candidates)
        };

        // Lock is released while the import call is outstanding.
        let outcome = self.importer.import_batch(&group, &candidates).await;

        let snapshot = {
            let mut guard = self.session.write().await;
            let session = match guard.as_mut() {
                Some(session) if session.id == id => session,
                _ => {
                    return Err(DomainError::not_found(
                        "validation session was closed during import",
                    ))
                }
            };

            session.state.importing = false;
            match outcome {
                Ok(response) => {
                    let succeeded: std::collections::HashSet<&str> = response
                        .results
                        .iter()
                        .filter(|result| result.status != KeyImportStatus::Failed)
                        .map(|result| result.api_key.as_str())
                        .collect();
                    session
                        .state
                        .rows
                        .retain(|row| !succeeded.contains(row.api_key.as_str()));

                    for result in response.failed_results() {
                        if let Some(row) = session.state.row_mut(&result.api_key) {
                            let detail = result
                                .error
                                .clone()
                                .unwrap_or_else(|| "import failed".to_owned());
                            row.apply_failure(KeyValidationStatus::Error, detail);
                        }
                    }

                    let failed = response.summary.failed;
                    if failed > 0 {
                        session.state.import_warning = Some(format!(
                            "{failed} of {} keys failed to import",
                            response.results.len()
                        ));
                    }
                    info!(
                        imported = succeeded.len(),
                        failed, "validation session import finished"
                    );
                    session.state.import_report = Some(response);
                }
                Err(err) => {
                    warn!(error = %err, "validation session import failed");
                    session.state.import_error = Some(err.to_string());
                }
            }
            session.state.clone()
        };
        self.progress.send_replace(());

        Ok(snapshot)
    }

    /// Wait until no check or import is outstanding (or the session is
    /// gone). Woken by the progress channel, so this never polls.
    pub async fn wait_until_idle(&self) {
        let mut progress = self.progress.subscribe();
        loop {
            {
                let guard = self.session.read().await;
                match guard.as_ref() {
                    Some(session) if session.state.is_busy() => {}
                    _ => return,
                }
            }
            if progress.changed().await.is_err() {
                return;
            }
        }
    }

    /// Record attempts and spawn one check task per key. Caller holds the
    /// session lock.
    fn issue_checks(&self, session: &mut ActiveSession, keys: &[String]) {
        for key in keys {
            if let Some(row) = session.state.row_mut(key) {
                row.record_attempt();
            }
            session.in_flight += 1;
            self.spawn_check(session.id, key.clone());
        }
        session.state.checking = session.in_flight > 0;
    }

    fn spawn_check(&self, session_id: Uuid, api_key: String) {
        let quota = Arc::clone(&self.quota);
        let semaphore = Arc::clone(&self.semaphore);
        let session = Arc::clone(&self.session);
        let progress = Arc::clone(&self.progress);

        tokio::spawn(async move {
            // Closed semaphore only happens at shutdown.
            let Ok(_permit) = semaphore.acquire().await else {
                return;
            };
            let result = quota.check_key(&api_key).await;

            let mut guard = session.write().await;
            let Some(active) = guard.as_mut().filter(|active| active.id == session_id) else {
                return;
            };

            if let Some(row) = active.state.row_mut(&api_key) {
                match result {
                    Ok(quota) => row.apply_quota(quota.limit, quota.remaining),
                    Err(failure) => row.apply_failure(failure.row_status(), failure.detail()),
                }
            }

            active.in_flight -= 1;
            active.state.checking = active.in_flight > 0;
            drop(guard);
            progress.send_replace(());
        });
    }
}
