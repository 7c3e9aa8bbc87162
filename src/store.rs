use crate::model::AnalysisResult;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Store handle shared between the uploader and whoever renders it.
pub type SharedStore = Arc<Mutex<AnalysisStore>>;

/// Client-held analysis state. `result` and `error` never coexist.
#[derive(Debug, Default, Clone)]
pub struct AnalysisStore {
    is_analyzing: bool,
    result: Option<AnalysisResult>,
    error: Option<String>,
}

/// What a renderer should show, in display precedence.
#[derive(Debug, PartialEq)]
pub enum AnalysisPhase<'a> {
    Idle,
    Analyzing,
    Failed(&'a str),
    Ready(&'a AnalysisResult),
}

impl AnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn set_analyzing(&mut self, analyzing: bool) {
        self.is_analyzing = analyzing;
    }

    pub fn set_result(&mut self, result: AnalysisResult) {
        self.result = Some(result);
        self.error = None;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.result = None;
    }

    /// Empties both the error and the result slot.
    pub fn clear_error(&mut self) {
        self.error = None;
        self.result = None;
    }

    pub fn reset(&mut self) {
        self.is_analyzing = false;
        self.result = None;
        self.error = None;
    }

    pub fn is_analyzing(&self) -> bool {
        self.is_analyzing
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> AnalysisPhase<'_> {
        if self.is_analyzing {
            AnalysisPhase::Analyzing
        } else if let Some(err) = self.error.as_deref() {
            AnalysisPhase::Failed(err)
        } else if let Some(result) = self.result.as_ref() {
            AnalysisPhase::Ready(result)
        } else {
            AnalysisPhase::Idle
        }
    }
}
