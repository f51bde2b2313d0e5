//! Stage transitions and warnings reported while a pipeline runs.

use std::fmt;

/// States of one pipeline invocation. No state is entered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Received,
    Probing,
    OrientationResolved,
    Transcoding,
    ThumbnailPhase,
    Succeeded,
    Failed,
}

impl PipelineStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Received => "received",
            Self::Probing => "probing",
            Self::OrientationResolved => "orientation_resolved",
            Self::Transcoding => "transcoding",
            Self::ThumbnailPhase => "thumbnail",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Something a caller may want to observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// The invocation entered a new stage.
    Stage(PipelineStage),
    /// A non-fatal problem (the thumbnail could not be produced).
    Warning(String),
}

/// Sender for reporting pipeline events from within an invocation.
///
/// Wraps a callback; events are delivered synchronously on the invoking
/// task.
pub struct EventSender {
    callback: Box<dyn Fn(&PipelineEvent) + Send + Sync>,
}

impl EventSender {
    /// Create a new sender from the given callback.
    pub fn new(callback: impl Fn(&PipelineEvent) + Send + Sync + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Create a no-op sender that discards all events.
    pub fn noop() -> Self {
        Self {
            callback: Box::new(|_| {}),
        }
    }

    pub fn send(&self, event: PipelineEvent) {
        (self.callback)(&event);
    }

    pub fn stage(&self, stage: PipelineStage) {
        self.send(PipelineEvent::Stage(stage));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.send(PipelineEvent::Warning(message.into()));
    }
}

impl Default for EventSender {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for EventSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSender").finish_non_exhaustive()
    }
}
