pub mod terminal;

use crate::engine::IndicatorFrame;
use crate::model::AnalysisRequest;
use crate::signal::SignalSummary;

/// Sink for a finished analysis: the price/indicator table and the
/// ordered signal lines. Owns all display formatting; the frame carries
/// raw values.
pub trait Renderer {
    fn render(&self, request: &AnalysisRequest, frame: &IndicatorFrame, summary: &SignalSummary);
}
