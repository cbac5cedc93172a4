//! Concrete repository adapters: a process-local map and a JSON document file.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;

use super::domain::{ApplicationId, LoanApplication, StoredLoanApplication};
use super::repository::{newest_first, LoanApplicationRepository, RepositoryError};

/// Stamps write metadata onto the storage projection, keeping the first `created_at`.
fn prepare_write(
    application: &LoanApplication,
    existing: Option<&StoredLoanApplication>,
) -> StoredLoanApplication {
    let mut record = application.to_persistence();
    if let Some(existing) = existing {
        record.created_at = existing.created_at;
    }
    record.updated_at = Some(Utc::now());
    record
}

fn rehydrate_all<'a>(
    records: impl Iterator<Item = &'a StoredLoanApplication>,
) -> Vec<LoanApplication> {
    let mut applications: Vec<LoanApplication> = records
        .cloned()
        .map(LoanApplication::reconstruct)
        .collect();
    newest_first(&mut applications);
    applications
}

/// Cheaply cloneable handle to an in-process store. Clones share the same records.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLoanApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, StoredLoanApplication>>>,
}

impl InMemoryLoanApplicationRepository {
    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<ApplicationId, StoredLoanApplication>>, RepositoryError>
    {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl LoanApplicationRepository for InMemoryLoanApplicationRepository {
    fn save(&self, application: &LoanApplication) -> Result<LoanApplication, RepositoryError> {
        let mut guard = self.lock()?;
        let record = prepare_write(application, guard.get(application.id()));
        guard.insert(record.application_id.clone(), record.clone());
        Ok(LoanApplication::reconstruct(record))
    }

    fn find_by_id(&self, id: &ApplicationId) -> Result<Option<LoanApplication>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.get(id).cloned().map(LoanApplication::reconstruct))
    }

    fn find_all(&self) -> Result<Vec<LoanApplication>, RepositoryError> {
        let guard = self.lock()?;
        Ok(rehydrate_all(guard.values()))
    }
}

/// Document store kept as a single JSON array on disk.
///
/// The whole collection is loaded on open and rewritten through a sibling temp file on
/// every save, so a crash mid-write leaves the previous document intact.
#[derive(Debug)]
pub struct JsonFileLoanApplicationRepository {
    path: PathBuf,
    records: Mutex<BTreeMap<ApplicationId, StoredLoanApplication>>,
}

impl JsonFileLoanApplicationRepository {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let records = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                let documents: Vec<StoredLoanApplication> = serde_json::from_str(&raw)?;
                documents
                    .into_iter()
                    .map(|record| (record.application_id.clone(), record))
                    .collect()
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), count = records.len(), "loan application store opened");

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, BTreeMap<ApplicationId, StoredLoanApplication>>, RepositoryError>
    {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }

    fn flush(
        &self,
        records: &BTreeMap<ApplicationId, StoredLoanApplication>,
    ) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let documents: Vec<&StoredLoanApplication> = records.values().collect();
        let payload = serde_json::to_vec_pretty(&documents)?;

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        fs::write(&staging, payload)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

impl LoanApplicationRepository for JsonFileLoanApplicationRepository {
    fn save(&self, application: &LoanApplication) -> Result<LoanApplication, RepositoryError> {
        let mut guard = self.lock()?;
        let record = prepare_write(application, guard.get(application.id()));

        let mut next = guard.clone();
        next.insert(record.application_id.clone(), record.clone());
        self.flush(&next)?;
        *guard = next;

        Ok(LoanApplication::reconstruct(record))
    }

    fn find_by_id(&self, id: &ApplicationId) -> Result<Option<LoanApplication>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.get(id).cloned().map(LoanApplication::reconstruct))
    }

    fn find_all(&self) -> Result<Vec<LoanApplication>, RepositoryError> {
        let guard = self.lock()?;
        Ok(rehydrate_all(guard.values()))
    }
}
