use std::sync::Arc;

use serde::Serialize;

use tickerboard_core::{DashboardConfig, NoopHttpClient, ProviderId};

use super::{CommandOutput, CommandResult};

#[derive(Debug, Serialize)]
pub struct SourceStatus {
    pub id: ProviderId,
    pub active: bool,
    pub key_configured: bool,
    pub capabilities: Vec<&'static str>,
}

pub fn run(config: &DashboardConfig) -> CommandResult {
    let sources = ProviderId::ALL
        .into_iter()
        .map(|id| {
            let probe = DashboardConfig {
                provider: id,
                ..config.clone()
            };
            let key = match id {
                ProviderId::Finnhub => &config.finnhub_api_key,
                ProviderId::Alphavantage => &config.alphavantage_api_key,
            };

            SourceStatus {
                id,
                active: id == config.provider,
                key_configured: !key.is_empty(),
                capabilities: probe
                    .data_source(Arc::new(NoopHttpClient))
                    .capabilities()
                    .supported_endpoints(),
            }
        })
        .collect();

    CommandResult::ok(CommandOutput::Sources(sources))
}
