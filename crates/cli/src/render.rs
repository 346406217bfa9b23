//! Terminal rendering of run events.

use ck_protocol::events::Event;
use ck_protocol::run_models::StepDefinition;
use colored::Colorize;
use std::collections::HashMap;

/// Turns events into printable lines, resolving step ids to labels.
#[derive(Debug, Default)]
pub struct Renderer {
    labels: HashMap<String, String>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text to print for `event`.
    pub fn line(&mut self, event: &Event) -> String {
        match event {
            Event::Steps { steps } => {
                self.remember(steps);
                let plan: Vec<String> = steps
                    .iter()
                    .enumerate()
                    .map(|(i, step)| format!("  {}. {}", i + 1, step.label))
                    .collect();
                format!("{}\n{}", "Plan".bold(), plan.join("\n"))
            }
            Event::StepStart { step } => format!("{} {}", "▶".cyan(), self.label(step).bold()),
            Event::StepDone { step } => format!("{} {}", "✔".green(), self.label(step)),
            Event::StepFailed { step } => format!("{} {}", "✘".red(), self.label(step).red()),
            Event::Task { name, .. } => format!("    {}", name.dimmed()),
            Event::TaskWarning { line, .. } => format!("    {} {}", "!".yellow(), line.yellow()),
            Event::Finished { aborted: true, .. } => "Run aborted".yellow().bold().to_string(),
            Event::Finished { success: true, .. } => "Run succeeded".green().bold().to_string(),
            Event::Finished { .. } => "Run failed".red().bold().to_string(),
            Event::Error { message } => format!("{} {}", "Error:".red().bold(), message),
        }
    }

    fn remember(&mut self, steps: &[StepDefinition]) {
        self.labels = steps
            .iter()
            .map(|step| (step.id.clone(), step.label.clone()))
            .collect();
    }

    fn label<'a>(&'a self, step: &'a str) -> &'a str {
        self.labels.get(step).map_or(step, String::as_str)
    }
}
