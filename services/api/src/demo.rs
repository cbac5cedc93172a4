use clap::Args;
use rust_decimal::Decimal;
use std::sync::Arc;

use loan_origination::applications::{
    ApplicationServiceError, ApplicationState, InMemoryLoanApplicationRepository,
    LoanApplication, LoanApplicationInput, LoanApplicationService,
};
use loan_origination::error::AppError;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Applicant name for the sample application
    #[arg(long, default_value = "Ada Lovelace")]
    pub(crate) name: String,
    /// Declared monthly income
    #[arg(long, default_value = "1000")]
    pub(crate) monthly_income: Decimal,
    /// Requested loan amount
    #[arg(long, default_value = "900")]
    pub(crate) requested_amount: Decimal,
    /// Repayment duration in months
    #[arg(long, default_value = "3")]
    pub(crate) tenor_months: Decimal,
    /// Manually reject instead of approving when the assessment passes
    #[arg(long)]
    pub(crate) reject: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        name,
        monthly_income,
        requested_amount,
        tenor_months,
        reject,
    } = args;

    let repository = Arc::new(InMemoryLoanApplicationRepository::default());
    let service = LoanApplicationService::new(repository);

    println!("Loan origination demo");
    let input = LoanApplicationInput {
        applicant_name: name,
        monthly_income,
        requested_amount,
        tenor_months,
    };
    let application = match service.create(input) {
        Ok(application) => application,
        Err(ApplicationServiceError::Validation(err)) => {
            println!("- Application refused at intake: {}", err);
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    println!(
        "- Created {} for {} -> {}",
        application.id(),
        application.applicant_name(),
        application.state()
    );

    let outcome = service.assess(application.id())?;
    let result = &outcome.result;
    println!(
        "- Credit assessment: installment {} | required income {} | actual income {} -> {}",
        result.monthly_installment.round_dp(2),
        result.required_income.round_dp(2),
        result.actual_income.round_dp(2),
        if result.passed { "passed" } else { "failed" }
    );

    let decided = if outcome.application.state() == ApplicationState::AssessmentPassed {
        let decided = if reject {
            service.reject(application.id())?
        } else {
            service.approve(application.id())?
        };
        println!("- Decision recorded -> {}", decided.state());
        decided
    } else {
        println!("- No decision needed -> {}", outcome.application.state());
        outcome.application
    };

    print_view(&decided);
    Ok(())
}

fn print_view(application: &LoanApplication) {
    match serde_json::to_string_pretty(&application.to_view()) {
        Ok(json) => println!("\nApplication payload:\n{}", json),
        Err(err) => println!("\nApplication payload unavailable: {}", err),
    }
}
