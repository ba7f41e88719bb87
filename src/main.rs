use clap::{Parser, Subcommand, ValueEnum};
use log::debug;
use mortgage::report::money;
use mortgage::{Loan, LoanError, Report, TextReport};
use simple_logger::SimpleLogger;
use std::io::{self, Write};
use std::process;

/// Fixed-rate mortgage calculator
#[derive(Parser)]
#[command(name = "mortgage", version, about)]
struct Cli {
    /// Loan amount
    #[arg(long)]
    principal: f64,

    /// Annual interest rate in percent (i.e., 5.875)
    #[arg(long)]
    rate: f64,

    /// Loan term in years
    #[arg(long)]
    years: u32,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    start: String,

    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Monthly payment
    Payment,
    /// Sum of all scheduled payments
    TotalPayment,
    /// Interest paid over the life of the loan
    TotalInterest,
    /// Date of the final payment
    PayoffDate,
    /// Full amortization schedule
    Schedule,
    /// Loan summary followed by the schedule
    Summary,
    /// Amount needed to pay the loan off after a given payment
    EarlyPayoff {
        #[arg(long)]
        period: u32,
    },
    /// Term of the loan when paying extra every month
    NewTerm {
        #[arg(long, allow_negative_numbers = true)]
        extra: f64,
    },
    /// Extra monthly payment needed to be debt free within a number of years
    ExtraPayment {
        #[arg(long)]
        target_years: u32,
    },
    /// Remaining balance and cumulative interest
    BalanceInterest {
        /// Show every Nth period
        #[arg(long, default_value_t = 6)]
        step: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Loan(#[from] LoanError),
    #[error("could not write output: {0}")]
    Io(#[from] io::Error),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = SimpleLogger::new().with_level(cli.log_level.into()).init() {
        eprintln!("logger unavailable: {e}");
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let loan = Loan::from_input(cli.principal, cli.rate, cli.years, &cli.start)?;
    debug!("running {:?}", loan.terms());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Payment => writeln!(out, "Monthly payment: {}", money(loan.monthly_payment()))?,
        Command::TotalPayment => writeln!(out, "Total payment: {}", money(loan.total_payment()))?,
        Command::TotalInterest => writeln!(out, "Total interest: {}", money(loan.total_interest()))?,
        Command::PayoffDate => writeln!(out, "Payoff date: {}", loan.payoff_date()?.format("%Y-%m-%d"))?,
        Command::Schedule => TextReport::new(out).amortization(loan.table())?,
        Command::Summary => TextReport::new(out).summary(&loan)?,
        Command::EarlyPayoff { period } => writeln!(
            out,
            "Early payoff amount at month {period}: {}",
            money(loan.early_payoff_amount(period)?)
        )?,
        Command::NewTerm { extra } => writeln!(
            out,
            "New term with extra payment: {:.2} years",
            loan.new_term_with_extra_payment(extra)?
        )?,
        Command::ExtraPayment { target_years } => {
            let solved = loan.extra_payment_to_retire_debt(target_years)?;
            writeln!(
                out,
                "Extra monthly payment to retire debt in {target_years} years: {}",
                money(solved.extra_payment)
            )?;
            writeln!(out, "New monthly payment: {}", money(solved.new_monthly_payment))?;
        }
        Command::BalanceInterest { step } => {
            TextReport::new(out).balance_and_interest(loan.table(), step)?
        }
    }
    Ok(())
}

// verifies that the calculator can be shared across threads
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<Loan>();
    is_normal::<mortgage::AmortizationTable>();
    is_normal::<mortgage::LoanTerms>();
}

#[test]
fn cli_parses_menu_options() {
    use clap::CommandFactory;
    Cli::command().debug_assert();

    let cli = Cli::try_parse_from([
        "mortgage", "--principal", "250000", "--rate", "4.5", "--years", "20", "--start", "2024-03-01",
        "extra-payment", "--target-years", "15",
    ])
    .unwrap();
    assert!(matches!(cli.command, Command::ExtraPayment { target_years: 15 }));
}
