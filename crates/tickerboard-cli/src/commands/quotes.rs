use tickerboard_core::{DashboardController, LoadStatus, SortKey, FETCH_ERROR_NOTICE};

use crate::cli::QuotesArgs;
use crate::error::CliError;

use super::{CommandOutput, CommandResult};

pub async fn run(
    args: &QuotesArgs,
    controller: &DashboardController,
) -> Result<CommandResult, CliError> {
    controller.set_filter(args.filter.as_str());
    apply_sort(controller, args.sort, args.desc);

    controller.refresh().await;
    let view = controller.render();

    let failure =
        (view.status == LoadStatus::Failed).then(|| String::from(FETCH_ERROR_NOTICE));
    Ok(CommandResult::ok(CommandOutput::Dashboard(view)).with_failure(failure))
}

/// Reach `(key, direction)` through column clicks, starting from the
/// default symbol-ascending order.
fn apply_sort(controller: &DashboardController, key: SortKey, descending: bool) {
    if key != SortKey::default() {
        controller.toggle_sort(key);
    }
    if descending {
        controller.toggle_sort(key);
    }
}
