//! Dispatcher 指标记录
//!
//! 通过 `metrics` facade 记录；未安装 recorder 时为空操作。

use contracts::Timestamp;
use metrics::{counter, gauge, histogram};

/// 记录一轮调度
///
/// # Example
///
/// ```ignore
/// let outcome = round::run_round(subjects)?;
/// observability::record_round(outcome.events, outcome.is_idle(), outcome.eof);
/// ```
pub fn record_round(events: usize, idle: bool, eof: bool) {
    counter!("lockstep_rounds_total").increment(1);
    histogram!("lockstep_events_per_round").record(events as f64);

    if idle {
        counter!("lockstep_idle_rounds_total").increment(1);
    }
    if eof {
        counter!("lockstep_eof_total").increment(1);
    }
}

/// 记录当前轮的时间戳 (Unix 秒)
pub fn record_round_timestamp(ts: Timestamp) {
    gauge!("lockstep_current_timestamp_seconds").set(ts.timestamp_millis() as f64 / 1000.0);
}

/// 记录单个 subject 的事件分发
pub fn record_event_dispatched(subject_id: &str, realtime: bool) {
    let kind = if realtime { "realtime" } else { "historical" };
    counter!(
        "lockstep_events_dispatched_total",
        "subject" => subject_id.to_string(),
        "kind" => kind
    )
    .increment(1);
}

/// 记录 realtime 生产线程产出的事件
pub fn record_event_produced(subject_id: &str) {
    counter!(
        "lockstep_events_produced_total",
        "subject" => subject_id.to_string()
    )
    .increment(1);
}

/// 记录生命周期切换
pub fn record_lifecycle(phase: &'static str) {
    counter!("lockstep_lifecycle_transitions_total", "phase" => phase).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_noop() {
        record_round(3, false, false);
        record_round(0, true, false);
        record_event_dispatched("bars", false);
        record_event_produced("ticker");
        record_lifecycle("running");
    }
}
