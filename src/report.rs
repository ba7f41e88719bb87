//! Presentation of a loan: summary, schedule and the balance / interest
//! series. Rendering is kept out of the engine behind the `Report` trait.

use crate::loan::{round, AmortizationTable, Loan};
use std::io::{self, Write};

pub trait Report {
    fn summary(&mut self, loan: &Loan) -> io::Result<()>;
    fn amortization(&mut self, table: &AmortizationTable) -> io::Result<()>;
    /// Remaining balance against interest paid so far, every `step` periods.
    fn balance_and_interest(&mut self, table: &AmortizationTable, step: usize) -> io::Result<()>;
}

/// Plain-text report written to any `Write`.
pub struct TextReport<W: Write> {
    out: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Report for TextReport<W> {
    fn summary(&mut self, loan: &Loan) -> io::Result<()> {
        let terms = loan.terms();
        writeln!(self.out, "Loan Amount: {}", money(terms.principal()))?;
        writeln!(self.out, "Annual Interest Rate: {:.2}%", terms.annual_rate())?;
        writeln!(self.out, "Loan Term: {} months", terms.term_months())?;
        writeln!(self.out, "Monthly Payment: {}", money(loan.monthly_payment()))?;
        writeln!(self.out, "Total Payment: {}", money(loan.total_payment()))?;
        writeln!(self.out, "Total Interest: {}", money(loan.total_interest()))?;
        if let Some(last) = loan.table().last() {
            writeln!(self.out, "Payoff Date: {}", last.date)?;
        }
        writeln!(self.out)?;
        self.amortization(loan.table())
    }

    fn amortization(&mut self, table: &AmortizationTable) -> io::Result<()> {
        writeln!(
            self.out,
            "{:>6} {:>10} {:>14} {:>14} {:>14} {:>16}",
            "Period", "Date", "Payment", "Interest", "Principal", "Balance"
        )?;
        writeln!(self.out, "{}", "-".repeat(79))?;
        for e in table {
            writeln!(
                self.out,
                "{:>6} {:>10} {:>14} {:>14} {:>14} {:>16}",
                e.period,
                e.date.format("%Y-%m-%d"),
                money(e.payment),
                money(e.interest),
                money(e.principal_portion),
                money(e.ending_balance)
            )?;
        }
        Ok(())
    }

    fn balance_and_interest(&mut self, table: &AmortizationTable, step: usize) -> io::Result<()> {
        writeln!(
            self.out,
            "{:>6} {:>18} {:>20}",
            "Period", "Remaining Balance", "Cumulative Interest"
        )?;
        writeln!(self.out, "{}", "-".repeat(46))?;
        for p in table.balance_and_interest(step) {
            writeln!(
                self.out,
                "{:>6} {:>18} {:>20}",
                p.period,
                money(p.balance),
                money(p.cumulative_interest)
            )?;
        }
        Ok(())
    }
}

/// Renders a report into a `String`, mostly for callers without a writer.
pub fn render<F>(f: F) -> io::Result<String>
where
    F: FnOnce(&mut TextReport<Vec<u8>>) -> io::Result<()>,
{
    let mut report = TextReport::new(Vec::new());
    f(&mut report)?;
    Ok(String::from_utf8_lossy(&report.into_inner()).into_owned())
}

/// `$1,234.56` style currency, rounded to cents.
pub fn money(amount: f64) -> String {
    let cents = round(amount, 2);
    let sign = if cents < 0. { "-" } else { "" };
    let text = format!("{:.2}", cents.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{frac}")
}
