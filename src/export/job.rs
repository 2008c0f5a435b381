//! Export job state published to observers.

use super::options::ExportFormat;
use std::fmt;

/// Receives each stage as an adapter enters it.
pub type Progress<'a> = dyn Fn(Stage) + Send + Sync + 'a;

/// Pipeline stage of a running export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Preparing,
    LoadingAssets,
    Styling,
    Rendering,
    Packaging,
    Saving,
    Done,
}

impl Stage {
    /// Progress percentage reached when the stage starts.
    pub fn percent(self) -> u8 {
        match self {
            Stage::Preparing => 5,
            Stage::LoadingAssets => 20,
            Stage::Styling => 40,
            Stage::Rendering => 60,
            Stage::Packaging => 80,
            Stage::Saving => 90,
            Stage::Done => 100,
        }
    }

    /// Label shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Preparing => "Preparing export",
            Stage::LoadingAssets => "Loading images",
            Stage::Styling => "Applying export styles",
            Stage::Rendering => "Rendering",
            Stage::Packaging => "Packaging",
            Stage::Saving => "Saving file",
            Stage::Done => "Done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle of an export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Observable state of the current (or last) export.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportJob {
    /// Increments with every started export
    pub generation: u64,
    pub state: JobState,
    pub format: Option<ExportFormat>,
    pub stage: Option<Stage>,
    /// Percentage, never decreasing while running
    pub progress: u8,
    /// Result message, held for a fixed duration after completion
    pub message: Option<String>,
}

impl ExportJob {
    /// A fresh running job.
    pub fn start(generation: u64, format: ExportFormat) -> Self {
        Self {
            generation,
            state: JobState::Running,
            format: Some(format),
            stage: Some(Stage::Preparing),
            progress: Stage::Preparing.percent(),
            message: None,
        }
    }

    /// Whether an export is in flight.
    pub fn is_running(&self) -> bool {
        self.state == JobState::Running
    }

    /// Move to `stage`. Earlier stages are ignored.
    pub fn advance(&mut self, stage: Stage) {
        if !self.is_running() {
            return;
        }
        if self.stage.map(|s| stage > s).unwrap_or(true) {
            self.stage = Some(stage);
            self.progress = self.progress.max(stage.percent());
        }
    }

    /// Record the outcome.
    pub fn finish(&mut self, success: bool, message: impl Into<String>) {
        self.state = if success {
            JobState::Succeeded
        } else {
            JobState::Failed
        };
        if success {
            self.stage = Some(Stage::Done);
            self.progress = Stage::Done.percent();
        }
        self.message = Some(message.into());
    }

    /// Drop the result message, returning to idle.
    pub fn clear(&mut self) {
        self.state = JobState::Idle;
        self.stage = None;
        self.progress = 0;
        self.message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_never_decreases() {
        let mut job = ExportJob::start(1, ExportFormat::PdfA4);
        job.advance(Stage::Rendering);
        job.advance(Stage::LoadingAssets);
        assert_eq!(job.stage, Some(Stage::Rendering));
        assert_eq!(job.progress, 60);
    }

    #[test]
    fn test_finish_and_clear() {
        let mut job = ExportJob::start(2, ExportFormat::Png);
        job.advance(Stage::Styling);
        job.finish(false, "Failed to generate PDF. Please try again.");
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.progress, 40);
        job.advance(Stage::Packaging);
        assert_eq!(job.progress, 40);

        job.clear();
        assert_eq!(job.state, JobState::Idle);
        assert_eq!(job.message, None);
        assert_eq!(job.generation, 2);
    }
}
