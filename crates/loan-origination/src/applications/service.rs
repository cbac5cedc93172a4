use std::sync::Arc;

use tracing::info;

use super::domain::{
    ApplicationId, ApplicationState, CreditAssessmentResult, InvalidStateTransition,
    LoanApplication, LoanApplicationInput, ValidationError,
};
use super::repository::{LoanApplicationRepository, RepositoryError};

/// Service loading one snapshot per call, applying a domain transition, and persisting it.
pub struct LoanApplicationService<R> {
    repository: Arc<R>,
}

impl<R> Clone for LoanApplicationService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

/// Result of a credit assessment together with the application as stored afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentOutcome {
    pub application: LoanApplication,
    pub result: CreditAssessmentResult,
}

impl<R> LoanApplicationService<R>
where
    R: LoanApplicationRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Validate and store a new draft application.
    pub fn create(
        &self,
        input: LoanApplicationInput,
    ) -> Result<LoanApplication, ApplicationServiceError> {
        let application = LoanApplication::create_new(input)?;
        let stored = self.save(&application)?;
        info!(application_id = %stored.id(), "loan application created");
        Ok(stored)
    }

    /// Every application, newest first, optionally narrowed to one state.
    pub fn list(
        &self,
        state: Option<ApplicationState>,
    ) -> Result<Vec<LoanApplication>, ApplicationServiceError> {
        let result = match state {
            Some(state) => self.repository.find_by_state(state),
            None => self.repository.find_all(),
        };
        result.map_err(|source| ApplicationServiceError::Repository {
            action: "fetch loan applications",
            source,
        })
    }

    pub fn get(&self, id: &ApplicationId) -> Result<LoanApplication, ApplicationServiceError> {
        self.repository
            .find_by_id(id)
            .map_err(|source| ApplicationServiceError::Repository {
                action: "find loan application",
                source,
            })?
            .ok_or_else(|| ApplicationServiceError::NotFound(id.clone()))
    }

    pub fn assess(&self, id: &ApplicationId) -> Result<AssessmentOutcome, ApplicationServiceError> {
        let mut application = self.get(id)?;
        let result = application.perform_credit_assessment()?;
        let application = self.save(&application)?;
        info!(
            application_id = %application.id(),
            passed = result.passed,
            state = %application.state(),
            "credit assessment recorded"
        );
        Ok(AssessmentOutcome {
            application,
            result,
        })
    }

    pub fn approve(&self, id: &ApplicationId) -> Result<LoanApplication, ApplicationServiceError> {
        let mut application = self.get(id)?;
        application.approve()?;
        let application = self.save(&application)?;
        info!(application_id = %application.id(), "loan application approved");
        Ok(application)
    }

    pub fn reject(&self, id: &ApplicationId) -> Result<LoanApplication, ApplicationServiceError> {
        let mut application = self.get(id)?;
        application.reject()?;
        let application = self.save(&application)?;
        info!(application_id = %application.id(), "loan application rejected");
        Ok(application)
    }

    fn save(&self, application: &LoanApplication) -> Result<LoanApplication, ApplicationServiceError> {
        self.repository
            .save(application)
            .map_err(|source| ApplicationServiceError::Repository {
                action: "save loan application",
                source,
            })
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transition(#[from] InvalidStateTransition),
    #[error("Loan application not found")]
    NotFound(ApplicationId),
    #[error("Failed to {action}: {source}")]
    Repository {
        action: &'static str,
        #[source]
        source: RepositoryError,
    },
}
