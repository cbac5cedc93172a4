//! Loan application intake, credit assessment, and approval workflow.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationState, CreditAssessmentResult, CreditAssessmentView,
    InvalidStateTransition,
    LoanApplication, LoanApplicationInput, LoanApplicationView, StoredLoanApplication,
    ValidationError, INCOME_COVERAGE_MULTIPLIER,
};
pub use repository::{LoanApplicationRepository, RepositoryError};
pub use router::{application_router, ApiResponse, AssessmentView};
pub use service::{ApplicationServiceError, AssessmentOutcome, LoanApplicationService};
pub use store::{InMemoryLoanApplicationRepository, JsonFileLoanApplicationRepository};
