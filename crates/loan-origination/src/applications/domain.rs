use std::fmt;
use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Multiple of the monthly installment the applicant's income has to cover.
pub const INCOME_COVERAGE_MULTIPLIER: u32 = 3;

/// Identifier wrapper for loan applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    /// Millisecond timestamp plus a random suffix, e.g. `LOAN-1718000000000-4f1c09ab2`.
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let random = Uuid::new_v4().simple().to_string();
        Self(format!("LOAN-{millis}-{}", &random[..9]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle position of an application.
///
/// `Draft` is initial; `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationState {
    Draft,
    AssessmentPassed,
    Approved,
    Rejected,
}

impl ApplicationState {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationState::Draft => "DRAFT",
            ApplicationState::AssessmentPassed => "ASSESSMENT_PASSED",
            ApplicationState::Approved => "APPROVED",
            ApplicationState::Rejected => "REJECTED",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationState::Approved | ApplicationState::Rejected)
    }
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of the income coverage rule, frozen at the moment it ran.
///
/// Amounts serialize as exact decimal strings; [`CreditAssessmentView`] is the numeric form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditAssessmentResult {
    pub passed: bool,
    pub monthly_installment: Decimal,
    pub required_income: Decimal,
    pub actual_income: Decimal,
    pub assessed_at: DateTime<Utc>,
}

impl CreditAssessmentResult {
    pub fn to_view(&self) -> CreditAssessmentView {
        CreditAssessmentView {
            passed: self.passed,
            monthly_installment: self.monthly_installment,
            required_income: self.required_income,
            actual_income: self.actual_income,
            assessed_at: self.assessed_at,
        }
    }
}

/// Assessment as returned by the API, amounts as JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditAssessmentView {
    pub passed: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_installment: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub required_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub actual_income: Decimal,
    pub assessed_at: DateTime<Utc>,
}

/// Unvalidated creation input as submitted by the application form.
///
/// Amounts accept JSON numbers or numeric strings. Tenor is read as a decimal so that
/// fractional values reach validation instead of being truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoanApplicationInput {
    pub applicant_name: String,
    pub monthly_income: Decimal,
    pub requested_amount: Decimal,
    pub tenor_months: Decimal,
}

/// Storage projection consumed and produced by repository adapters.
///
/// Amounts serialize as decimal strings so documents reload without losing digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLoanApplication {
    pub application_id: ApplicationId,
    pub applicant_name: String,
    pub monthly_income: Decimal,
    pub requested_amount: Decimal,
    pub tenor_months: NonZeroU32,
    pub state: ApplicationState,
    pub credit_assessment_result: Option<CreditAssessmentResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Presentation projection returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplicationView {
    pub id: ApplicationId,
    pub applicant_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub requested_amount: Decimal,
    pub tenor_months: NonZeroU32,
    pub state: ApplicationState,
    pub credit_assessment_result: Option<CreditAssessmentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A loan application and its approval state machine.
///
/// Fields are private: after construction the only mutations are
/// [`perform_credit_assessment`](Self::perform_credit_assessment),
/// [`approve`](Self::approve) and [`reject`](Self::reject).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanApplication {
    id: ApplicationId,
    applicant_name: String,
    monthly_income: Decimal,
    requested_amount: Decimal,
    tenor_months: NonZeroU32,
    state: ApplicationState,
    credit_assessment_result: Option<CreditAssessmentResult>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl LoanApplication {
    /// Validate form input and open a new draft application.
    pub fn create_new(input: LoanApplicationInput) -> Result<Self, ValidationError> {
        let applicant_name = input.applicant_name.trim();
        if applicant_name.is_empty() {
            return Err(ValidationError::MissingApplicantName);
        }
        if input.monthly_income <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveIncome);
        }
        if input.requested_amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }
        if input
            .requested_amount
            .checked_mul(Decimal::from(INCOME_COVERAGE_MULTIPLIER))
            .is_none()
        {
            return Err(ValidationError::AmountOutOfRange);
        }
        let tenor_months = tenor_from_decimal(input.tenor_months)?;

        Ok(Self {
            id: ApplicationId::generate(),
            applicant_name: applicant_name.to_string(),
            monthly_income: input.monthly_income,
            requested_amount: input.requested_amount,
            tenor_months,
            state: ApplicationState::Draft,
            credit_assessment_result: None,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    /// Rehydrate a previously persisted application. The record is trusted as-is.
    pub fn reconstruct(record: StoredLoanApplication) -> Self {
        Self {
            id: record.application_id,
            applicant_name: record.applicant_name,
            monthly_income: record.monthly_income,
            requested_amount: record.requested_amount,
            tenor_months: record.tenor_months,
            state: record.state,
            credit_assessment_result: record.credit_assessment_result,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    pub fn id(&self) -> &ApplicationId {
        &self.id
    }

    pub fn applicant_name(&self) -> &str {
        &self.applicant_name
    }

    pub fn monthly_income(&self) -> Decimal {
        self.monthly_income
    }

    pub fn requested_amount(&self) -> Decimal {
        self.requested_amount
    }

    pub fn tenor_months(&self) -> NonZeroU32 {
        self.tenor_months
    }

    pub fn state(&self) -> ApplicationState {
        self.state
    }

    pub fn credit_assessment_result(&self) -> Option<&CreditAssessmentResult> {
        self.credit_assessment_result.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Requested amount spread evenly over the tenor. Unrounded.
    pub fn monthly_installment(&self) -> Decimal {
        self.requested_amount / Decimal::from(self.tenor_months.get())
    }

    /// Run the income coverage rule once, moving a draft to `AssessmentPassed` or `Rejected`.
    pub fn perform_credit_assessment(
        &mut self,
    ) -> Result<CreditAssessmentResult, InvalidStateTransition> {
        if self.state != ApplicationState::Draft {
            return Err(InvalidStateTransition::AssessmentRequiresDraft {
                current: self.state,
            });
        }

        let monthly_installment = self.monthly_installment();
        // Only reconstructed records can overflow here; intake caps the amount.
        let (required_income, passed) = match monthly_installment
            .checked_mul(Decimal::from(INCOME_COVERAGE_MULTIPLIER))
        {
            Some(required) => (required, self.monthly_income >= required),
            None => (Decimal::MAX, false),
        };

        let result = CreditAssessmentResult {
            passed,
            monthly_installment,
            required_income,
            actual_income: self.monthly_income,
            assessed_at: Utc::now(),
        };

        self.state = if passed {
            ApplicationState::AssessmentPassed
        } else {
            ApplicationState::Rejected
        };
        self.credit_assessment_result = Some(result.clone());

        Ok(result)
    }

    pub fn approve(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != ApplicationState::AssessmentPassed {
            return Err(InvalidStateTransition::ApprovalRequiresPassedAssessment {
                current: self.state,
            });
        }
        self.state = ApplicationState::Approved;
        Ok(())
    }

    /// Manual rejection of an application that passed assessment.
    pub fn reject(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != ApplicationState::AssessmentPassed {
            return Err(InvalidStateTransition::RejectionRequiresPassedAssessment {
                current: self.state,
            });
        }
        self.state = ApplicationState::Rejected;
        Ok(())
    }

    pub fn to_view(&self) -> LoanApplicationView {
        LoanApplicationView {
            id: self.id.clone(),
            applicant_name: self.applicant_name.clone(),
            monthly_income: self.monthly_income,
            requested_amount: self.requested_amount,
            tenor_months: self.tenor_months,
            state: self.state,
            credit_assessment_result: self
                .credit_assessment_result
                .as_ref()
                .map(CreditAssessmentResult::to_view),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn to_persistence(&self) -> StoredLoanApplication {
        StoredLoanApplication {
            application_id: self.id.clone(),
            applicant_name: self.applicant_name.clone(),
            monthly_income: self.monthly_income,
            requested_amount: self.requested_amount,
            tenor_months: self.tenor_months,
            state: self.state,
            credit_assessment_result: self.credit_assessment_result.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn tenor_from_decimal(tenor: Decimal) -> Result<NonZeroU32, ValidationError> {
    if tenor <= Decimal::ZERO || !tenor.fract().is_zero() {
        return Err(ValidationError::InvalidTenor);
    }
    tenor
        .to_u32()
        .and_then(NonZeroU32::new)
        .ok_or(ValidationError::InvalidTenor)
}

/// Malformed creation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Applicant name is required")]
    MissingApplicantName,
    #[error("Monthly income must be greater than zero")]
    NonPositiveIncome,
    #[error("Requested loan amount must be greater than zero")]
    NonPositiveAmount,
    #[error("Requested loan amount is too large")]
    AmountOutOfRange,
    #[error("Tenor must be a positive integer")]
    InvalidTenor,
}

/// A lifecycle method was called from a state it does not accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidStateTransition {
    #[error("Credit assessment can only be performed on draft applications")]
    AssessmentRequiresDraft { current: ApplicationState },
    #[error("Only applications that passed credit assessment can be approved")]
    ApprovalRequiresPassedAssessment { current: ApplicationState },
    #[error("Only applications that passed credit assessment can be manually rejected")]
    RejectionRequiresPassedAssessment { current: ApplicationState },
}

impl InvalidStateTransition {
    pub fn current_state(&self) -> ApplicationState {
        match self {
            InvalidStateTransition::AssessmentRequiresDraft { current }
            | InvalidStateTransition::ApprovalRequiresPassedAssessment { current }
            | InvalidStateTransition::RejectionRequiresPassedAssessment { current } => *current,
        }
    }
}
