use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use client_logging::{client_debug, client_info};
use mediafind_core::{update, AppState, JobId, MediaKind, MediaType, Msg};

use crate::cli::{Command, KindArg, MediaTypeArg};
use crate::config::ClientConfig;
use crate::effects::EffectRunner;
use crate::render;

/// How long the loop blocks waiting for the engine before re-checking.
const IDLE_WAIT: Duration = Duration::from_millis(100);

/// What a command waits for before it stops the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Goal {
    JobSettled,
    SearchAnswered,
    CatalogSettled,
}

impl Goal {
    fn reached(self, state: &AppState) -> bool {
        match self {
            Goal::JobSettled => {
                !state.upload().in_flight() && !state.tracker().phase().is_active()
            }
            Goal::SearchAnswered => {
                state.search().active_query().is_some() && !state.search().in_flight()
            }
            Goal::CatalogSettled => state.search().catalog_settled(),
        }
    }
}

pub(crate) fn run(command: Command, config: &ClientConfig) -> anyhow::Result<ExitCode> {
    client_info!("using backend {}", config.transport.base_url);
    let runner = EffectRunner::new(config.transport.clone())?;
    let state = AppState::with_settings(config.core);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let succeeded = run_with(&runner, state, command, &mut out)?;
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Returns whether the command finished without an error.
fn run_with(
    runner: &EffectRunner,
    state: AppState,
    command: Command,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    let (goal, initial) = plan(command);
    let mut session = Session::new(runner, state);
    for msg in initial {
        session.dispatch(msg, out)?;
    }
    while !goal.reached(&session.state) {
        if let Some(msg) = runner.next_msg(IDLE_WAIT)? {
            session.dispatch(msg, out)?;
        }
    }

    let view = session.state.view();
    let failed = match goal {
        Goal::JobSettled => {
            if let Some(error) = &view.upload.error {
                writeln!(out, "upload failed: {error}")?;
                true
            } else {
                writeln!(out, "{}", render::job_outcome(&view.job))?;
                view.job.error.is_some()
            }
        }
        Goal::SearchAnswered => {
            write!(out, "{}", render::search_results(&view.search))?;
            view.search.error.is_some()
        }
        Goal::CatalogSettled => {
            write!(out, "{}", render::catalog(&view.search.catalog))?;
            false
        }
    };
    out.flush()?;

    Ok(!failed)
}

fn plan(command: Command) -> (Goal, Vec<Msg>) {
    match command {
        Command::Submit { kind, file } => {
            let kind = match kind {
                KindArg::Video => MediaKind::Video,
                KindArg::Audio => MediaKind::Audio,
            };
            (
                Goal::JobSettled,
                vec![Msg::UploadRequested { kind, path: file }],
            )
        }
        Command::Watch { job_id } => (
            Goal::JobSettled,
            vec![Msg::JobBound(Some(JobId::new(job_id)))],
        ),
        Command::Search { query } => (
            Goal::SearchAnswered,
            vec![Msg::QueryChanged(query), Msg::TextSearchSubmitted],
        ),
        Command::Similar { media_type, id } => {
            let media_type = match media_type {
                MediaTypeArg::Video => MediaType::Video,
                MediaTypeArg::Transcription => MediaType::Transcription,
            };
            (
                Goal::SearchAnswered,
                vec![Msg::Initialize, Msg::ReferenceSelected { media_type, id }],
            )
        }
        Command::Catalog => (Goal::CatalogSettled, vec![Msg::Initialize]),
    }
}

/// Single-threaded message loop state: applies messages, runs effects, and
/// prints job progress when it changes.
struct Session<'a> {
    runner: &'a EffectRunner,
    state: AppState,
    announced_job: Option<JobId>,
    last_job_line: Option<String>,
}

impl<'a> Session<'a> {
    fn new(runner: &'a EffectRunner, state: AppState) -> Self {
        Self {
            runner,
            state,
            announced_job: None,
            last_job_line: None,
        }
    }

    fn dispatch(&mut self, msg: Msg, out: &mut impl Write) -> io::Result<()> {
        client_debug!("msg {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);

        if was_dirty {
            self.render_progress(out)?;
        }
        Ok(())
    }

    fn render_progress(&mut self, out: &mut impl Write) -> io::Result<()> {
        let view = self.state.view();
        if view.upload.last_job_id != self.announced_job {
            if let Some(job_id) = &view.upload.last_job_id {
                writeln!(out, "submitted as {job_id}")?;
            }
            self.announced_job = view.upload.last_job_id;
        }
        let line = render::job_line(&view.job);
        if line.is_some() && line != self.last_job_line {
            if let Some(line) = &line {
                writeln!(out, "{line}")?;
            }
            self.last_job_line = line;
        }
        Ok(())
    }
}
