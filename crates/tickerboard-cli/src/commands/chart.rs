use tickerboard_core::{ChartStatus, DashboardController, Symbol};

use crate::cli::ChartArgs;
use crate::error::CliError;

use super::{CommandOutput, CommandResult};

pub async fn run(
    args: &ChartArgs,
    controller: &DashboardController,
) -> Result<CommandResult, CliError> {
    let reloaded = match &args.symbol {
        Some(raw) => controller.select_symbol(&Symbol::parse(raw)?).await?,
        None => false,
    };
    if !reloaded {
        controller.load_chart().await;
    }

    let chart = controller.render().chart;
    let failure = (chart.status == ChartStatus::Failed)
        .then(|| chart.error.clone())
        .flatten();
    Ok(CommandResult::ok(CommandOutput::Chart(chart)).with_failure(failure))
}
