use crate::error::{LoanError, Result};
use chrono::{Datelike, Months, NaiveDate};
use log::{debug, info, trace, warn};
use std::fmt;

const MAX_TERM_YEARS: u32 = 100;

/// Parameters of a fixed-rate, monthly-pay loan. Validated on construction.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LoanTerms {
    principal: f64,
    annual_rate: f64,
    term_years: u32,
    start_date: NaiveDate,
}

impl LoanTerms {
    pub fn new(
        principal: f64,        // amount borrowed
        annual_rate: f64,      // annual interest rate as a percentage (i.e., 5.875)
        term_years: u32,       // term of loan in years
        start_date: NaiveDate, // loan start; payments fall on the 1st of each month
    ) -> Result<Self> {
        let terms = Self {
            principal,
            annual_rate,
            term_years,
            start_date,
        };
        terms.validate()?;
        Ok(terms)
    }

    /// Builds terms from raw user input, with the start date as `YYYY-MM-DD`.
    pub fn parse(principal: f64, annual_rate: f64, term_years: u32, start_date: &str) -> Result<Self> {
        let start_date = NaiveDate::parse_from_str(start_date.trim(), "%Y-%m-%d").map_err(|e| {
            LoanError::input("start_date", format!("{start_date:?} is not a YYYY-MM-DD date: {e}"))
        })?;
        Self::new(principal, annual_rate, term_years, start_date)
    }

    fn validate(&self) -> Result<()> {
        if !self.principal.is_finite() || self.principal <= 0. {
            return Err(LoanError::input("principal", "must be a positive amount"));
        }
        if !self.annual_rate.is_finite() || self.annual_rate < 0. {
            return Err(LoanError::input("annual_rate", "must be zero or a positive percentage"));
        }
        if self.term_years == 0 || self.term_years > MAX_TERM_YEARS {
            return Err(LoanError::input(
                "term_years",
                format!("must be between 1 and {MAX_TERM_YEARS} years"),
            ));
        }
        Ok(())
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn annual_rate(&self) -> f64 {
        self.annual_rate
    }

    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / 1200.
    }

    pub fn term_months(&self) -> u32 {
        self.term_years * 12
    }

    /// The first of the month on or after the start date.
    pub fn first_pmt_date(&self) -> Result<NaiveDate> {
        if self.start_date.day() == 1 {
            return Ok(self.start_date);
        }
        self.start_date
            .with_day(1)
            .and_then(|d| d.checked_add_months(Months::new(1)))
            .ok_or_else(|| LoanError::input("start_date", "no payment date follows it"))
    }
}

/// One scheduled payment. Amounts are kept at full precision; `Display`
/// rounds them to cents.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PaymentScheduleEntry {
    pub period: u32,
    pub date: NaiveDate,
    pub payment: f64,
    pub interest: f64,
    pub principal_portion: f64,
    pub ending_balance: f64,
}

impl fmt::Display for PaymentScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pmt number {}, date {}, payment ${:.2}, interest paid ${:.2}, principal paid ${:.2}, ending balance ${:.2}",
            self.period,
            self.date,
            round(self.payment, 2),
            round(self.interest, 2),
            round(self.principal_portion, 2),
            round(self.ending_balance, 2)
        )
    }
}

/// A point on the balance / cumulative interest curve.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct BalancePoint {
    pub period: u32,
    pub balance: f64,
    pub cumulative_interest: f64,
}

/// The full payment schedule, ordered by period. Read-only once built.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, PartialEq, Debug)]
pub struct AmortizationTable {
    entries: Vec<PaymentScheduleEntry>,
}

impl AmortizationTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a 1-based period.
    pub fn get(&self, period: u32) -> Option<&PaymentScheduleEntry> {
        (period as usize)
            .checked_sub(1)
            .and_then(|idx| self.entries.get(idx))
    }

    pub fn entries(&self) -> &[PaymentScheduleEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaymentScheduleEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&PaymentScheduleEntry> {
        self.entries.last()
    }

    pub fn total_interest(&self) -> f64 {
        self.entries.iter().map(|e| e.interest).sum()
    }

    pub fn cumulative_interest(&self) -> Vec<f64> {
        self.entries
            .iter()
            .scan(0., |paid, e| {
                *paid += e.interest;
                Some(*paid)
            })
            .collect()
    }

    /// Every `step`-th period, always ending with the final one.
    pub fn sample(&self, step: usize) -> Vec<&PaymentScheduleEntry> {
        let step = step.max(1);
        let mut picked: Vec<&PaymentScheduleEntry> = self.entries.iter().step_by(step).collect();
        if let Some(last) = self.entries.last() {
            if picked.last().map(|e| e.period) != Some(last.period) {
                picked.push(last);
            }
        }
        picked
    }

    pub fn balance_and_interest(&self, step: usize) -> Vec<BalancePoint> {
        let cumulative = self.cumulative_interest();
        self.sample(step)
            .into_iter()
            .map(|e| BalancePoint {
                period: e.period,
                balance: e.ending_balance,
                cumulative_interest: cumulative[e.period as usize - 1],
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a AmortizationTable {
    type Item = &'a PaymentScheduleEntry;
    type IntoIter = std::slice::Iter<'a, PaymentScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Answer to "how much extra per month retires the debt in N years".
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ExtraPayment {
    pub extra_payment: f64,
    pub new_monthly_payment: f64,
}

/// Mortgage calculator. The schedule is computed once in `new` and never
/// changes; every query is a read or an independent recomputation.
#[derive(Clone, PartialEq, Debug)]
pub struct Loan {
    terms: LoanTerms,
    pmt_amount: f64,
    table: AmortizationTable,
}

impl Loan {
    pub fn new(terms: LoanTerms) -> Result<Self> {
        terms.validate()?;
        let monthly_rate = terms.monthly_rate();
        let term_months = terms.term_months();

        let pmt_amount = get_pmt_amount(terms.principal, monthly_rate, term_months as f64);
        let table = AmortizationTable {
            entries: add_scheduled_pmts(
                terms.principal,
                monthly_rate,
                term_months,
                terms.first_pmt_date()?,
                pmt_amount,
            )?,
        };

        // at high enough rate x term the level payment collapses onto the
        // interest and the schedule no longer reaches zero in f64
        let final_balance = table.last().map_or(f64::NAN, |e| e.ending_balance);
        if !pmt_amount.is_finite()
            || pmt_amount <= terms.principal * monthly_rate
            || !final_balance.is_finite()
            || final_balance.abs() > 0.01
        {
            warn!(
                "{}% over {} months does not amortize: payment {}, final balance {}",
                terms.annual_rate, term_months, pmt_amount, final_balance
            );
            return Err(LoanError::input(
                "annual_rate",
                format!(
                    "{}% is too high to amortize over {} years",
                    terms.annual_rate, terms.term_years
                ),
            ));
        }
        info!(
            "loan of {:.2} at {}% over {} months: payment {:.2}",
            terms.principal, terms.annual_rate, term_months, pmt_amount
        );

        Ok(Self {
            terms,
            pmt_amount,
            table,
        })
    }

    pub fn from_input(principal: f64, annual_rate: f64, term_years: u32, start_date: &str) -> Result<Self> {
        Self::new(LoanTerms::parse(principal, annual_rate, term_years, start_date)?)
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn table(&self) -> &AmortizationTable {
        &self.table
    }

    pub fn monthly_payment(&self) -> f64 {
        self.pmt_amount
    }

    pub fn total_payment(&self) -> f64 {
        self.pmt_amount * self.terms.term_months() as f64
    }

    pub fn total_interest(&self) -> f64 {
        self.total_payment() - self.terms.principal
    }

    /// Due date of the final scheduled payment.
    pub fn payoff_date(&self) -> Result<NaiveDate> {
        self.table
            .last()
            .map(|e| e.date)
            .ok_or_else(|| LoanError::InvalidArgument("loan has no scheduled payments".to_string()))
    }

    /// Lump sum that retires the loan right after `period`'s payment: the
    /// remaining balance plus one month of interest on it.
    pub fn early_payoff_amount(&self, period: u32) -> Result<f64> {
        let entry = self.table.get(period).ok_or_else(|| {
            warn!("early payoff requested for period {period}");
            LoanError::InvalidArgument(format!(
                "period must be between 1 and {}, got {period}",
                self.terms.term_months()
            ))
        })?;
        let balance = entry.ending_balance;
        Ok(balance + balance * self.terms.monthly_rate())
    }

    /// Months needed to retire the loan when `extra` is added to every payment.
    pub fn new_term_months_with_extra_payment(&self, extra: f64) -> Result<f64> {
        if !extra.is_finite() {
            return Err(LoanError::InvalidArgument(format!(
                "extra payment must be a finite amount, got {extra}"
            )));
        }
        let months = get_pmt_count(
            self.terms.principal,
            self.terms.monthly_rate(),
            self.pmt_amount + extra,
        )?;
        debug!("extra payment {extra:.2} retires the loan in {months:.4} months");
        Ok(months)
    }

    /// Years needed to retire the loan when `extra` is added to every payment.
    pub fn new_term_with_extra_payment(&self, extra: f64) -> Result<f64> {
        Ok(self.new_term_months_with_extra_payment(extra)? / 12.)
    }

    /// Smallest extra monthly payment that retires the loan within
    /// `target_years`.
    pub fn extra_payment_to_retire_debt(&self, target_years: u32) -> Result<ExtraPayment> {
        if target_years == 0 {
            return Err(LoanError::InvalidArgument(
                "target years must be at least one".to_string(),
            ));
        }
        let target_months = target_years.saturating_mul(12);
        let term_months = self.terms.term_months();
        if target_months >= term_months {
            warn!("target of {target_months} months is not shorter than the {term_months} month term");
            return Err(LoanError::Unreachable(format!(
                "the loan already retires in {} years without extra payments",
                self.terms.term_years
            )));
        }

        let monthly_rate = self.terms.monthly_rate();
        let needed = get_pmt_amount(self.terms.principal, monthly_rate, target_months as f64);
        if needed <= self.terms.principal * monthly_rate {
            return Err(LoanError::Unreachable(format!(
                "no payment retires the loan in {target_years} years"
            )));
        }

        let extra_payment = (needed - self.pmt_amount).max(0.);
        debug!("retiring in {target_months} months needs {needed:.4}, extra {extra_payment:.2}");
        Ok(ExtraPayment {
            extra_payment,
            new_monthly_payment: self.pmt_amount + extra_payment,
        })
    }
}

/// Rounds to `dec` decimal places, never producing negative zero.
pub fn round(amt: f64, dec: u32) -> f64 {
    let factor = 10_f64.powi(dec as i32);
    let rounded = (amt * factor).round() / factor;
    if rounded == 0. {
        0.
    } else {
        rounded
    }
}

/// Level payment that retires `principal` over `pmt_count` periods.
pub fn get_pmt_amount(
    principal: f64,    // loan principal
    monthly_rate: f64, // periodic rate as a decimal (i.e., 0.004896)
    pmt_count: f64,    // number of payments
) -> f64 {
    if monthly_rate == 0. {
        return principal / pmt_count;
    }
    // P*r / (1 - (1+r)^-n), without forming (1+r)^n
    principal * monthly_rate / -(-pmt_count * monthly_rate.ln_1p()).exp_m1()
}

/// Number of periods (fractional) a level payment takes to retire `principal`.
/// Fails when the payment never covers the interest.
pub fn get_pmt_count(
    principal: f64,    // loan principal
    monthly_rate: f64, // periodic rate as a decimal
    pmt_amount: f64,   // level payment per period
) -> Result<f64> {
    let interest = principal * monthly_rate;
    if pmt_amount <= interest || pmt_amount <= 0. {
        return Err(LoanError::InvalidArgument(format!(
            "payment of {pmt_amount:.2} never covers the monthly interest of {interest:.2}"
        )));
    }
    if monthly_rate == 0. {
        return Ok(principal / pmt_amount);
    }
    Ok(-(-interest / pmt_amount).ln_1p() / monthly_rate.ln_1p())
}

fn add_scheduled_pmts(
    principal: f64,
    monthly_rate: f64,
    term_months: u32,
    first_pmt_date: NaiveDate,
    pmt_amount: f64,
) -> Result<Vec<PaymentScheduleEntry>> {
    let mut sched_pmt = Vec::with_capacity(term_months as usize);
    let mut balance = principal;

    for period in 1..=term_months {
        let date = first_pmt_date
            .checked_add_months(Months::new(period - 1))
            .ok_or_else(|| LoanError::input("start_date", "payment dates run past the calendar"))?;
        let interest = balance * monthly_rate;
        let principal_portion = pmt_amount - interest;
        balance -= principal_portion;
        trace!(
            "pmt # {}, date {}, interest {}, principal {}, end bal {}",
            period,
            date,
            interest,
            principal_portion,
            balance
        );

        sched_pmt.push(PaymentScheduleEntry {
            period,
            date,
            payment: pmt_amount,
            interest,
            principal_portion,
            ending_balance: balance,
        });
    }
    Ok(sched_pmt)
}

#[cfg(test)]
mod tests {
    use super::{get_pmt_amount, get_pmt_count, round, Loan, LoanTerms};
    use crate::error::LoanError;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use test_log::test;

    fn loan(principal: f64, rate: f64, years: u32, start: &str) -> Loan {
        Loan::from_input(principal, rate, years, start).unwrap()
    }

    #[test]
    fn test_get_pmt_amount() {
        assert_abs_diff_eq!(get_pmt_amount(360000., 5.875 / 1200., 360.), 2129.54, epsilon = 0.01);
        assert_abs_diff_eq!(get_pmt_amount(250000., 4.5 / 1200., 240.), 1581.62, epsilon = 0.01);
        assert_abs_diff_eq!(get_pmt_amount(200000., 7. / 1200., 180.), 1797.66, epsilon = 0.01);
        assert_eq!(get_pmt_amount(120000., 0., 120.), 1000.);
    }

    #[test]
    fn test_get_pmt_count() {
        let rate = 4.5 / 1200.;
        let pmt = get_pmt_amount(250000., rate, 240.);
        assert_abs_diff_eq!(get_pmt_count(250000., rate, pmt).unwrap(), 240., epsilon = 1e-6);
        assert_eq!(get_pmt_count(120000., 0., 2000.).unwrap(), 60.);

        // payment below the monthly interest never amortizes
        assert!(matches!(
            get_pmt_count(250000., rate, 900.),
            Err(LoanError::InvalidArgument(_))
        ));
        assert!(matches!(
            get_pmt_count(120000., 0., 0.),
            Err(LoanError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_round() {
        assert_eq!(round(2129.5359, 2), 2129.54);
        assert_eq!(round(1797.65654, 4), 1797.6565);
        assert_eq!(round(-0.000001, 2).to_string(), "0");
    }

    #[test]
    fn test_invalid_terms() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        for (principal, rate, years) in [(0., 5., 30), (-1., 5., 30), (f64::NAN, 5., 30), (1000., -0.5, 30), (1000., 5., 0), (1000., 5., 101)] {
            assert!(matches!(
                LoanTerms::new(principal, rate, years, start),
                Err(LoanError::InvalidInput { .. })
            ));
        }
        match Loan::from_input(100000., 5., 30, "03/01/2024") {
            Err(LoanError::InvalidInput { field, .. }) => assert_eq!(field, "start_date"),
            other => panic!("expected invalid start date, got {other:?}"),
        }
    }

    #[test]
    fn test_thirty_year_loan() {
        let loan = loan(360000., 5.875, 30, "2024-01-01");

        assert_abs_diff_eq!(loan.monthly_payment(), 2129.54, epsilon = 0.01);
        assert_abs_diff_eq!(loan.total_payment(), 766632.94, epsilon = 0.01);
        assert_abs_diff_eq!(loan.total_interest(), 406632.94, epsilon = 0.01);
        assert_abs_diff_eq!(
            loan.monthly_payment() * 360. - 360000.,
            loan.total_interest(),
            epsilon = 1e-6
        );
        assert_eq!(loan.table().len(), 360);
    }

    #[test]
    fn test_schedule_amortizes() {
        for (principal, rate, years) in [(360000., 5.875, 30), (250000., 4.5, 20), (15000., 12.9, 5), (80000., 0., 15)] {
            let loan = loan(principal, rate, years, "2024-03-01");
            let table = loan.table();

            assert_abs_diff_eq!(table.last().unwrap().ending_balance, 0., epsilon = 0.01);
            let repaid: f64 = table.iter().map(|e| e.principal_portion).sum();
            assert_abs_diff_eq!(repaid, principal, epsilon = 0.01);
            assert_abs_diff_eq!(table.total_interest(), loan.total_interest(), epsilon = 0.01);
        }
    }

    #[test]
    fn test_schedule_entries() {
        let loan = loan(250000., 4.5, 20, "2024-03-01");
        let table = loan.table();

        let first = table.get(1).unwrap();
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_abs_diff_eq!(first.interest, 937.5, epsilon = 1e-9);
        assert_abs_diff_eq!(first.principal_portion, 644.12, epsilon = 0.01);
        assert_eq!(
            first.to_string(),
            "pmt number 1, date 2024-03-01, payment $1581.62, interest paid $937.50, principal paid $644.12, ending balance $249355.88"
        );

        // each period's interest accrues on the previous ending balance
        for pair in table.entries().windows(2) {
            assert_eq!(pair[1].period, pair[0].period + 1);
            assert_abs_diff_eq!(pair[1].interest, pair[0].ending_balance * 4.5 / 1200., epsilon = 1e-9);
        }

        assert!(table.get(0).is_none());
        assert!(table.get(241).is_none());
        assert_eq!(table.get(240).unwrap().to_string().split(", ").last(), Some("ending balance $0.00"));
    }

    #[test]
    fn test_payoff_date() {
        let loan1 = loan(250000., 4.5, 20, "2024-03-01");
        assert_eq!(loan1.payoff_date().unwrap(), NaiveDate::from_ymd_opt(2044, 2, 1).unwrap());

        // mid-month start: payments begin on the 1st of the next month
        let loan2 = loan(10000., 6., 1, "2024-12-15");
        assert_eq!(loan2.table().get(1).unwrap().date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(loan2.payoff_date().unwrap(), NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    }

    #[test]
    fn test_early_payoff_amount() {
        let loan = loan(360000., 5.875, 30, "2024-01-01");
        assert_abs_diff_eq!(loan.early_payoff_amount(12).unwrap(), 357215.36, epsilon = 0.01);
        assert_abs_diff_eq!(loan.early_payoff_amount(360).unwrap(), 0., epsilon = 0.01);

        for period in [0, 361] {
            assert!(matches!(
                loan.early_payoff_amount(period),
                Err(LoanError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_new_term_with_extra_payment() {
        let loan = loan(360000., 5.875, 30, "2024-01-01");

        assert_abs_diff_eq!(loan.new_term_with_extra_payment(0.).unwrap(), 30., epsilon = 1e-6);
        assert_abs_diff_eq!(loan.new_term_months_with_extra_payment(500.).unwrap(), 227.17, epsilon = 0.01);
        assert_abs_diff_eq!(loan.new_term_with_extra_payment(500.).unwrap(), 18.93, epsilon = 0.01);

        let mut previous = f64::INFINITY;
        for extra in (0..=40).map(|i| i as f64 * 250.) {
            let term = loan.new_term_with_extra_payment(extra).unwrap();
            assert!(term <= previous, "term rose to {term} at extra {extra}");
            previous = term;
        }

        // a payment cut below the monthly interest never retires the loan
        assert!(matches!(
            loan.new_term_with_extra_payment(-1000.),
            Err(LoanError::InvalidArgument(_))
        ));
        assert!(matches!(
            loan.new_term_with_extra_payment(f64::NAN),
            Err(LoanError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_extra_payment_to_retire_debt() {
        let loan = loan(250000., 4.5, 20, "2024-03-01");

        let extra = loan.extra_payment_to_retire_debt(15).unwrap();
        assert_abs_diff_eq!(extra.extra_payment, 330.86, epsilon = 0.01);
        assert_abs_diff_eq!(extra.new_monthly_payment, 1912.48, epsilon = 0.01);
        assert_abs_diff_eq!(
            extra.new_monthly_payment,
            loan.monthly_payment() + extra.extra_payment,
            epsilon = 1e-9
        );

        for years in 1..20 {
            let extra = loan.extra_payment_to_retire_debt(years).unwrap();
            let months = loan.new_term_months_with_extra_payment(extra.extra_payment).unwrap();
            let target = (years * 12) as f64;
            assert!(months <= target + 1e-6, "{months} months for a {years} year target");
            assert!(months > target - 1.);
        }

        assert!(matches!(loan.extra_payment_to_retire_debt(20), Err(LoanError::Unreachable(_))));
        assert!(matches!(loan.extra_payment_to_retire_debt(25), Err(LoanError::Unreachable(_))));
        assert!(matches!(
            loan.extra_payment_to_retire_debt(0),
            Err(LoanError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_extra_payment_on_tiny_loan() {
        // a cent is a large share of this payment, so the answer must not be
        // rounded to whole cents
        let loan = loan(0.5, 5., 30, "2024-01-01");

        for years in [1, 5, 29] {
            let extra = loan.extra_payment_to_retire_debt(years).unwrap();
            assert!(extra.extra_payment > 0.);
            let months = loan.new_term_months_with_extra_payment(extra.extra_payment).unwrap();
            let target = (years * 12) as f64;
            assert_abs_diff_eq!(months, target, epsilon = 1e-6);
            assert!(months > target - 1.);
        }
    }

    #[test]
    fn test_high_rate_terms() {
        // payment collapses onto the monthly interest
        for (rate, years) in [(10000., 100), (1000., 30), (60., 100)] {
            match Loan::from_input(100000., rate, years, "2024-01-01") {
                Err(LoanError::InvalidInput { field, .. }) => assert_eq!(field, "annual_rate"),
                other => panic!("expected {rate}% over {years} years to be rejected, got {other:?}"),
            }
        }

        let steep = loan(100000., 25., 30, "2024-01-01");
        assert!(steep.monthly_payment() > 100000. * 25. / 1200.);
        assert_abs_diff_eq!(steep.table().last().unwrap().ending_balance, 0., epsilon = 0.01);

        // every accepted loan at the edges of validation amortizes
        for rate in [15., 25., 40., 60., 100., 1000., 10000.] {
            for years in [1, 30, 50, 100] {
                match Loan::from_input(100000., rate, years, "2024-01-01") {
                    Ok(loan) => {
                        let last = loan.table().last().unwrap();
                        assert!(loan.monthly_payment().is_finite());
                        assert_abs_diff_eq!(last.ending_balance, 0., epsilon = 0.01);
                        let payoff = loan.early_payoff_amount(last.period).unwrap();
                        assert!(payoff.abs() <= 0.01 * (1. + rate / 1200.));
                    }
                    Err(LoanError::InvalidInput { field, .. }) => assert_eq!(field, "annual_rate"),
                    Err(e) => panic!("unexpected error for {rate}% over {years} years: {e}"),
                }
            }
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_output_types_serialize() {
        fn is_serde<T: serde::Serialize + for<'de> serde::Deserialize<'de>>() {}
        is_serde::<super::PaymentScheduleEntry>();
        is_serde::<super::AmortizationTable>();
        is_serde::<super::BalancePoint>();
        is_serde::<LoanTerms>();
    }

    #[test]
    fn test_zero_rate_loan() {
        let loan = loan(120000., 0., 10, "2024-01-01");

        assert_eq!(loan.monthly_payment(), 1000.);
        assert_eq!(loan.total_interest(), 0.);
        assert_eq!(loan.table().get(60).unwrap().ending_balance, 60000.);
        assert_eq!(loan.early_payoff_amount(60).unwrap(), 60000.);
        assert_eq!(loan.new_term_with_extra_payment(1000.).unwrap(), 5.);

        let extra = loan.extra_payment_to_retire_debt(5).unwrap();
        assert_eq!(extra.extra_payment, 1000.);
        assert_eq!(extra.new_monthly_payment, 2000.);
    }

    #[test]
    fn test_balance_and_interest() {
        let loan = loan(250000., 4.5, 20, "2024-03-01");
        let table = loan.table();

        let cumulative = table.cumulative_interest();
        assert_eq!(cumulative.len(), 240);
        assert_abs_diff_eq!(cumulative[0], 937.5, epsilon = 1e-9);
        assert_abs_diff_eq!(cumulative[239], table.total_interest(), epsilon = 1e-6);

        let points = table.balance_and_interest(6);
        assert_eq!(points.len(), 41);
        assert_eq!(points[0].period, 1);
        assert_eq!(points[1].period, 7);
        assert_eq!(points.last().unwrap().period, 240);
        assert!(points.windows(2).all(|p| p[1].balance < p[0].balance));
        assert!(points.windows(2).all(|p| p[1].cumulative_interest > p[0].cumulative_interest));

        assert_eq!(table.sample(0).len(), 240);
    }
}
