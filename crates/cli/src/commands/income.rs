use chrono::{DateTime, FixedOffset, Local, TimeZone};
use serde::Serialize;

use crate::commands::{load_config, runtime, CommandResult};
use partsdesk_core::analytics::{sales_since, IncomeReport, Period, PeriodSelector};
use partsdesk_core::config::LoadOptions;
use partsdesk_core::domain::sale::Sale;
use partsdesk_core::errors::ApplicationError;
use partsdesk_db::{open_store, SaleRepository};

#[derive(Debug, Serialize)]
struct IncomeOutput {
    #[serde(flatten)]
    report: IncomeReport,
    /// The period's sales, newest first.
    transactions: Vec<Sale>,
}

pub fn run(options: &LoadOptions, period: Period, now: Option<&str>) -> CommandResult {
    let config = match load_config("income", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let pinned = match reference_instant(now) {
        Ok(pinned) => pinned,
        Err(message) => return CommandResult::failure("income", "bad_request", message, 5),
    };

    let runtime = match runtime("income") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let store = open_store(&config)?;
        let sales = store.list_sales().await?;
        let output = match pinned {
            Some(reference) => income_output(period, &sales, &reference),
            None => income_output(period, &sales, &Local::now()),
        };
        Ok::<IncomeOutput, ApplicationError>(output)
    });

    match result {
        Ok(output) => CommandResult::success_with_data(
            "income",
            format!(
                "{}: {} across {} transactions",
                period.label(),
                output.report.total_income,
                output.report.transaction_count
            ),
            &output,
        ),
        Err(error) => CommandResult::from_application_error("income", error),
    }
}

/// Buckets follow `reference`'s zone, so a local reference keeps DST rules.
fn income_output<Tz: TimeZone>(
    period: Period,
    sales: &[Sale],
    reference: &DateTime<Tz>,
) -> IncomeOutput {
    let report = PeriodSelector::new(period).refresh(sales, reference);
    let transactions = sales_since(sales, report.start_date).into_iter().cloned().collect();
    IncomeOutput { report, transactions }
}

/// `--now` pins the reference instant (and its offset) for reproducible
/// reports. `None` means the machine's local clock.
fn reference_instant(now: Option<&str>) -> Result<Option<DateTime<FixedOffset>>, String> {
    now.map(|raw| {
        DateTime::parse_from_rfc3339(raw.trim())
            .map_err(|error| format!("invalid --now `{raw}` (expected RFC 3339): {error}"))
    })
    .transpose()
}
