use std::fmt::Write;

use mediafind_core::{JobObservation, ReferenceCatalog, SearchView, TrackerPhase};

/// One-line summary of the current job snapshot, if there is one.
pub(crate) fn job_line(observation: &JobObservation) -> Option<String> {
    let job = observation.job.as_ref()?;
    let mut line = format!("{}: {}", job.id, job.status.as_str());
    if let Some(progress) = job.progress {
        let _ = write!(line, " {progress}%");
    }
    if let (Some(attempt), Some(max)) = (job.attempt, job.max_attempts) {
        let _ = write!(line, " attempt {attempt}/{max}");
    }
    if let Some(message) = job.message.as_deref().filter(|m| !m.is_empty()) {
        let _ = write!(line, " - {message}");
    }
    Some(line)
}

/// Final report once tracking stopped.
pub(crate) fn job_outcome(observation: &JobObservation) -> String {
    if let Some(error) = &observation.error {
        return format!("error: {error}");
    }
    match (&observation.result, observation.phase) {
        (Some(result), _) => serde_json::to_string_pretty(result.payload())
            .unwrap_or_else(|_| result.payload().to_string()),
        (None, TrackerPhase::Cancelled) => "cancelled".to_string(),
        (None, _) => "no result".to_string(),
    }
}

pub(crate) fn search_results(view: &SearchView) -> String {
    let mut out = String::new();
    if let Some(error) = &view.error {
        let _ = writeln!(out, "error: {error}");
    }
    if view.results.is_empty() {
        let _ = writeln!(out, "no results");
        return out;
    }
    for (rank, hit) in view.results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. [{}] #{} {} ({:.3})",
            rank + 1,
            hit.media_type.as_str(),
            hit.id,
            hit.filename,
            hit.score
        );
        if let Some(text) = hit.text.as_deref().or(hit.summary.as_deref()) {
            let _ = writeln!(out, "    {text}");
        }
    }
    out
}

pub(crate) fn catalog(catalog: &ReferenceCatalog) -> String {
    let mut out = String::new();
    for (title, entries) in [
        ("videos", &catalog.videos),
        ("transcriptions", &catalog.transcriptions),
    ] {
        let _ = writeln!(out, "{title} ({}):", entries.len());
        for entry in entries {
            let _ = writeln!(out, "  #{} {}", entry.id, entry.filename);
        }
    }
    out
}
