use tickerboard_core::{ChartPanel, DashboardView, QuoteRecord, SortDirection, TablePanel};

use crate::cli::OutputFormat;
use crate::commands::{CommandOutput, SourceStatus};
use crate::error::CliError;

pub fn render(output: &CommandOutput, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(output)?
            } else {
                serde_json::to_string(output)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => match output {
            CommandOutput::Dashboard(view) => render_dashboard(view),
            CommandOutput::Chart(chart) => render_chart(chart),
            CommandOutput::Sources(sources) => render_sources(sources),
        },
    }

    Ok(())
}

fn render_dashboard(view: &DashboardView) {
    if let Some(notice) = view.error {
        println!("! {notice}");
    }

    match &view.table {
        TablePanel::Loading { placeholder_rows } => {
            print_header();
            for _ in 0..*placeholder_rows {
                println!(
                    "{:<8}  {:<26}  {:>10}  {:>9}  {:>8}  {:>12}",
                    "…", "…", "…", "…", "…", "…"
                );
            }
        }
        TablePanel::Ready {
            rows,
            summary,
            no_matches,
        } => {
            print_header();
            for row in rows {
                println!("{}", format_row(row));
            }
            if *no_matches {
                println!("no symbols match '{}'", view.view_state.filter_term);
            }

            println!();
            println!("market cap  : {}", summary.market_cap_label());
            println!("gainers     : {}", summary.gainer_count);
            println!("losers      : {}", summary.loser_count);
            if let Some(top) = &summary.top_gainer {
                println!("top gainer  : {} {:+.2}%", top.symbol, top.change_percent);
            }
            if let Some(top) = &summary.top_loser {
                println!("top loser   : {} {:+.2}%", top.symbol, top.change_percent);
            }
        }
    }

    println!(
        "sort        : {} {}",
        view.view_state.sort.key,
        match view.view_state.sort.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    );
    if let Some(fetched_at) = view.fetched_at {
        println!("fetched_at  : {fetched_at}");
    }
    if !view.dropped.is_empty() {
        println!(
            "unavailable : {}",
            view.dropped
                .iter()
                .map(|symbol| symbol.as_str())
                .collect::<Vec<_>>()
                .join(",")
        );
    }
}

fn print_header() {
    println!(
        "{:<8}  {:<26}  {:>10}  {:>9}  {:>8}  {:>12}",
        "SYMBOL", "NAME", "PRICE", "CHANGE", "CHANGE%", "VOLUME"
    );
}

fn format_row(record: &QuoteRecord) -> String {
    format!(
        "{:<8}  {:<26}  {:>10.2}  {:>+9.2}  {:>+7.2}%  {:>12}",
        record.symbol.as_str(),
        truncate(&record.name, 26),
        record.price,
        record.change,
        record.change_percent,
        record.volume
    )
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_owned();
    }
    let mut truncated = value.chars().take(width - 1).collect::<String>();
    truncated.push('…');
    truncated
}

fn render_chart(chart: &ChartPanel) {
    println!("chart       : {}", chart.symbol);
    if let Some(error) = &chart.error {
        println!("! {error}");
        return;
    }
    if chart.points.is_empty() {
        println!("no data");
        return;
    }

    for point in &chart.points {
        println!("{:<20}  {:>10.2}", point.label, point.price);
    }
}

fn render_sources(sources: &[SourceStatus]) {
    println!("{:<14}  {:<6}  {:<4}  CAPABILITIES", "SOURCE", "ACTIVE", "KEY");
    for source in sources {
        println!(
            "{:<14}  {:<6}  {:<4}  {}",
            source.id.as_str(),
            if source.active { "yes" } else { "no" },
            if source.key_configured { "set" } else { "-" },
            source.capabilities.join(",")
        );
    }
}
