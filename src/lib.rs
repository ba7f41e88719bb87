//! Fixed-rate mortgage amortization: monthly payment, full payment schedule,
//! payoff date, early payoff and extra-payment queries.

pub mod error;
pub mod loan;
pub mod report;

pub use error::{LoanError, Result};
pub use loan::{AmortizationTable, BalancePoint, ExtraPayment, Loan, LoanTerms, PaymentScheduleEntry};
pub use report::{Report, TextReport};
