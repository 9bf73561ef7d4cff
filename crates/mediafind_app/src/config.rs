use std::path::PathBuf;
use std::time::Duration;

use client_logging::LogDestination;
use log::LevelFilter;
use mediafind_core::CoreSettings;
use mediafind_engine::TransportSettings;

use crate::cli::{CliArgs, LogTarget};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClientConfig {
    pub transport: TransportSettings,
    pub core: CoreSettings,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

impl ClientConfig {
    pub fn from_args(args: &CliArgs) -> Self {
        let transport = TransportSettings {
            base_url: args.api_base.clone(),
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            ..TransportSettings::default()
        };
        let core = CoreSettings {
            poll_interval: Duration::from_millis(args.poll_interval_ms),
            top_k: args.top_k,
        };
        let log_destination = match args.log {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        };
        let log_level = match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        };

        Self {
            transport,
            core,
            log_destination,
            log_file: args
                .log_file
                .clone()
                .unwrap_or_else(client_logging::default_log_file),
            log_level,
        }
    }
}
