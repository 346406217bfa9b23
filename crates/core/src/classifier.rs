//! Output line classification.
//!
//! The provisioner has no structured progress protocol, so progress is
//! recovered from its human-readable output:
//! - a catalog pattern appearing in a line enters that step,
//! - a `TASK [...]` banner announces a task,
//! - `fatal` / `failed` anywhere in a line is reported as a warning.
//!
//! This is a heuristic over free text. If the provisioner changes its output
//! format, classification degrades silently instead of failing.

use ck_protocol::run_models::StepDefinition;

/// Banner prefix the provisioner prints before each task.
const TASK_PREFIX: &str = "TASK [";

/// Lowercase substrings that flag a per-task failure.
const FAILURE_MARKERS: [&str; 2] = ["fatal", "failed"];

/// Decision for one output line.
///
/// The three aspects are independent: a single line may change the step,
/// announce a task and carry a failure marker at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification<'a> {
    /// Id of the first catalog entry whose pattern occurs in the line.
    pub step: Option<&'a str>,

    /// The matched step differs from the step that was open.
    pub step_changed: bool,

    /// Task name from a `TASK [...]` banner.
    pub task: Option<&'a str>,

    /// The line carries a failure marker.
    pub warning: bool,
}

impl Classification<'_> {
    /// Whether the line produces any event.
    pub fn is_noteworthy(&self) -> bool {
        self.step_changed || self.task.is_some() || self.warning
    }
}

/// Classify one output line against a step catalog.
///
/// # Arguments
///
/// * `line` - Raw output line, without its newline
/// * `catalog` - Steps in catalog order; the first matching entry wins
/// * `current_step` - Id of the step currently open, if any
pub fn classify<'a>(
    line: &'a str,
    catalog: &'a [StepDefinition],
    current_step: Option<&str>,
) -> Classification<'a> {
    let step = catalog
        .iter()
        .find(|def| !def.match_pattern.is_empty() && line.contains(def.match_pattern.as_str()))
        .map(|def| def.id.as_str());

    let step_changed = match step {
        Some(id) => current_step != Some(id),
        None => false,
    };

    Classification {
        step,
        step_changed,
        task: task_name(line),
        warning: has_failure_marker(line),
    }
}

/// Extract the task name from a `TASK [name] ****` banner.
pub fn task_name(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(TASK_PREFIX)?;
    let name = rest
        .trim_end_matches(|c: char| c == '*' || c.is_whitespace())
        .trim_end_matches(']')
        .trim();

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Case-insensitive check for a failure marker anywhere in the line.
pub fn has_failure_marker(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    FAILURE_MARKERS.iter().any(|marker| lower.contains(marker))
}
