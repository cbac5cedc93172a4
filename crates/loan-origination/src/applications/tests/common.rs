use std::sync::Arc;

use axum::response::Response;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::applications::domain::{ApplicationId, LoanApplication, LoanApplicationInput};
use crate::applications::repository::{LoanApplicationRepository, RepositoryError};
use crate::applications::store::InMemoryLoanApplicationRepository;
use crate::applications::LoanApplicationService;

pub(super) fn input(name: &str, income: i64, amount: i64, tenor: i64) -> LoanApplicationInput {
    LoanApplicationInput {
        applicant_name: name.to_string(),
        monthly_income: Decimal::from(income),
        requested_amount: Decimal::from(amount),
        tenor_months: Decimal::from(tenor),
    }
}

/// income 1000 against a 300 installment: covers the 900 requirement.
pub(super) fn passing_input() -> LoanApplicationInput {
    input("Ada Lovelace", 1000, 900, 3)
}

/// income 300 against a 300 installment: short of the 900 requirement.
pub(super) fn failing_input() -> LoanApplicationInput {
    input("Charles Babbage", 300, 900, 3)
}

pub(super) fn draft() -> LoanApplication {
    LoanApplication::create_new(passing_input()).expect("valid input")
}

pub(super) fn build_service() -> (
    LoanApplicationService<InMemoryLoanApplicationRepository>,
    InMemoryLoanApplicationRepository,
) {
    let repository = InMemoryLoanApplicationRepository::default();
    let service = LoanApplicationService::new(Arc::new(repository.clone()));
    (service, repository)
}

pub(super) struct UnavailableRepository;

impl LoanApplicationRepository for UnavailableRepository {
    fn save(&self, _application: &LoanApplication) -> Result<LoanApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_id(&self, _id: &ApplicationId) -> Result<Option<LoanApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_all(&self) -> Result<Vec<LoanApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Repository whose reads abort the calling thread.
pub(super) struct PanickingRepository;

impl LoanApplicationRepository for PanickingRepository {
    fn save(&self, _application: &LoanApplication) -> Result<LoanApplication, RepositoryError> {
        panic!("save aborted")
    }

    fn find_by_id(&self, _id: &ApplicationId) -> Result<Option<LoanApplication>, RepositoryError> {
        panic!("lookup aborted")
    }

    fn find_all(&self) -> Result<Vec<LoanApplication>, RepositoryError> {
        panic!("scan aborted")
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
