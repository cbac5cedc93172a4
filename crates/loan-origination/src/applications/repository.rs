use super::domain::{ApplicationId, ApplicationState, LoanApplication};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// `save` is an upsert keyed by application id with last-write-wins semantics. Adapters
/// stamp `updated_at` on every write and hand back the entity as it was stored.
pub trait LoanApplicationRepository: Send + Sync {
    fn save(&self, application: &LoanApplication) -> Result<LoanApplication, RepositoryError>;
    fn find_by_id(&self, id: &ApplicationId) -> Result<Option<LoanApplication>, RepositoryError>;
    /// All applications, newest `created_at` first.
    fn find_all(&self) -> Result<Vec<LoanApplication>, RepositoryError>;

    fn find_by_state(
        &self,
        state: ApplicationState,
    ) -> Result<Vec<LoanApplication>, RepositoryError> {
        Ok(self
            .find_all()?
            .into_iter()
            .filter(|application| application.state() == state)
            .collect())
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("storage io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored document is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub(crate) fn newest_first(applications: &mut [LoanApplication]) {
    applications.sort_by(|left, right| {
        right
            .created_at()
            .cmp(&left.created_at())
            .then_with(|| right.id().cmp(left.id()))
    });
}
