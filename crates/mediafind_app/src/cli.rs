use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use mediafind_core::DEFAULT_TOP_K;
use mediafind_engine::DEFAULT_API_BASE;

/// Command-line arguments accepted by the `mediafind` binary.
#[derive(Parser, Debug)]
#[command(
    name = "mediafind",
    version,
    about = "Submit media for processing, track jobs, and search the results"
)]
pub(crate) struct CliArgs {
    /// Base URL of the processing backend.
    #[arg(long, value_name = "URL", env = "MEDIAFIND_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    /// Log file used by `--log file` and `--log both`.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Milliseconds between job status polls.
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub poll_interval_ms: u64,

    /// Seconds before a single request is abandoned.
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Number of hits requested per search.
    #[arg(long, global = true, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    /// Upload a file and follow its job until it finishes.
    Submit {
        #[arg(value_enum)]
        kind: KindArg,
        file: PathBuf,
    },
    /// Follow an existing job until it finishes.
    Watch { job_id: String },
    /// Free-text search across videos and transcriptions.
    Search {
        #[arg(default_value = "")]
        query: String,
    },
    /// Find items similar to an existing video or transcription.
    Similar {
        #[arg(value_enum)]
        media_type: MediaTypeArg,
        id: i64,
    },
    /// List the known videos and transcriptions.
    Catalog,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KindArg {
    Video,
    Audio,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MediaTypeArg {
    Video,
    Transcription,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogTarget {
    Terminal,
    File,
    Both,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_submit_with_defaults() {
        let args = CliArgs::try_parse_from(["mediafind", "submit", "audio", "speech.wav"]).unwrap();
        assert_eq!(
            args.command,
            Command::Submit {
                kind: KindArg::Audio,
                file: PathBuf::from("speech.wav"),
            }
        );
        assert_eq!(args.poll_interval_ms, 1000);
        assert_eq!(args.top_k, DEFAULT_TOP_K);
        assert_eq!(args.log, LogTarget::Terminal);
    }

    #[test]
    fn top_k_is_accepted_after_subcommand() {
        let args =
            CliArgs::try_parse_from(["mediafind", "similar", "transcription", "10", "--top-k", "3"])
                .unwrap();
        assert_eq!(args.top_k, 3);
        assert_eq!(
            args.command,
            Command::Similar {
                media_type: MediaTypeArg::Transcription,
                id: 10,
            }
        );
    }

    #[test]
    fn search_query_may_be_empty() {
        let args = CliArgs::try_parse_from(["mediafind", "search"]).unwrap();
        assert_eq!(
            args.command,
            Command::Search {
                query: String::new()
            }
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(CliArgs::try_parse_from(["mediafind", "submit", "image", "x.png"]).is_err());
    }
}
