use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use loan_origination::applications::{
    ApplicationId, ApplicationState, InMemoryLoanApplicationRepository,
    JsonFileLoanApplicationRepository, LoanApplication, LoanApplicationRepository,
    RepositoryError,
};
use loan_origination::config::StorageConfig;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Repository picked at startup from `APP_STORAGE`.
pub(crate) enum ConfiguredRepository {
    Memory(InMemoryLoanApplicationRepository),
    JsonFile(JsonFileLoanApplicationRepository),
}

impl ConfiguredRepository {
    pub(crate) fn open(config: &StorageConfig) -> Result<Self, RepositoryError> {
        match config {
            StorageConfig::Memory => Ok(Self::Memory(InMemoryLoanApplicationRepository::default())),
            StorageConfig::JsonFile { path } => {
                JsonFileLoanApplicationRepository::open(path.clone()).map(Self::JsonFile)
            }
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Memory(_) => "memory".to_string(),
            Self::JsonFile(store) => format!("file:{}", store.path().display()),
        }
    }
}

impl LoanApplicationRepository for ConfiguredRepository {
    fn save(&self, application: &LoanApplication) -> Result<LoanApplication, RepositoryError> {
        match self {
            Self::Memory(store) => store.save(application),
            Self::JsonFile(store) => store.save(application),
        }
    }

    fn find_by_id(&self, id: &ApplicationId) -> Result<Option<LoanApplication>, RepositoryError> {
        match self {
            Self::Memory(store) => store.find_by_id(id),
            Self::JsonFile(store) => store.find_by_id(id),
        }
    }

    fn find_all(&self) -> Result<Vec<LoanApplication>, RepositoryError> {
        match self {
            Self::Memory(store) => store.find_all(),
            Self::JsonFile(store) => store.find_all(),
        }
    }

    fn find_by_state(
        &self,
        state: ApplicationState,
    ) -> Result<Vec<LoanApplication>, RepositoryError> {
        match self {
            Self::Memory(store) => store.find_by_state(state),
            Self::JsonFile(store) => store.find_by_state(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_opens_empty() {
        let repository = ConfiguredRepository::open(&StorageConfig::Memory).expect("opens");
        assert_eq!(repository.describe(), "memory");
        assert!(repository.find_all().expect("list").is_empty());
    }

    #[test]
    fn json_storage_reports_its_path() {
        let path = std::env::temp_dir()
            .join(format!("loan-origination-api-{}", std::process::id()))
            .join("missing.json");
        let repository = ConfiguredRepository::open(&StorageConfig::JsonFile { path: path.clone() })
            .expect("missing file opens empty");
        assert_eq!(repository.describe(), format!("file:{}", path.display()));
    }
}
