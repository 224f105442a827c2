//! Session span over both streams.

use contracts::{MotionSeries, Sample, SessionSpan};

/// Earliest and latest timestamp across both streams.
///
/// `(None, None)` when the series holds no samples. Does not rely on
/// either stream being sorted.
pub fn session_span(series: &MotionSeries) -> SessionSpan {
    span_of(series.accelerometer.iter().chain(series.gyroscope.iter()))
}

pub(crate) fn span_of<'a>(samples: impl Iterator<Item = &'a Sample>) -> SessionSpan {
    samples.fold(SessionSpan::default(), |span, sample| {
        let t = sample.timestamp;
        SessionSpan {
            start: Some(span.start.map_or(t, |s| s.min(t))),
            end: Some(span.end.map_or(t, |e| e.max(t))),
        }
    })
}
