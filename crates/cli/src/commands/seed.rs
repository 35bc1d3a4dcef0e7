use chrono::Utc;

use crate::commands::{load_config, runtime, CommandResult};
use partsdesk_core::config::LoadOptions;
use partsdesk_core::errors::ApplicationError;
use partsdesk_db::fixtures::{sample_products, sample_sales};
use partsdesk_db::{JsonFileStore, SeedOutcome};

/// Writes the demo catalog and sales into the local data directory. Each
/// collection is only written when it is currently empty.
pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config("seed", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let store = JsonFileStore::new(config.store.data_dir.clone());
    let result = runtime.block_on(async {
        let outcome = store.seed_if_empty(sample_products(), sample_sales(Utc::now())).await?;
        Ok::<SeedOutcome, ApplicationError>(outcome)
    });

    match result {
        Ok(outcome) => CommandResult::success_with_data("seed", seed_message(&outcome), &outcome),
        Err(error) => CommandResult::from_application_error("seed", error),
    }
}

fn seed_message(outcome: &SeedOutcome) -> String {
    if outcome.is_noop() {
        return "store already populated; nothing seeded".to_string();
    }
    format!(
        "seeded {} products and {} sales",
        outcome.products_written, outcome.sales_written
    )
}

#[cfg(test)]
mod tests {
    use partsdesk_db::SeedOutcome;

    use super::seed_message;

    #[test]
    fn message_reports_what_was_written() {
        let outcome = SeedOutcome { products_written: 10, sales_written: 0 };
        assert_eq!(seed_message(&outcome), "seeded 10 products and 0 sales");
    }

    #[test]
    fn populated_store_reports_noop() {
        let outcome = SeedOutcome { products_written: 0, sales_written: 0 };
        assert_eq!(seed_message(&outcome), "store already populated; nothing seeded");
    }
}
