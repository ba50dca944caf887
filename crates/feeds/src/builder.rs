//! Scenario → subjects

use std::sync::Arc;
use std::time::Duration;

use contracts::{EventCallback, Scenario, SubjectConfig, SubjectKind, SubjectRef};
use tracing::debug;

use crate::error::{FeedError, Result};
use crate::historical::HistoricalFeed;
use crate::realtime::{RealtimeConfig, RealtimeFeed};

/// Build one subject from its configuration, optionally attaching a listener.
pub fn build_subject(config: &SubjectConfig, listener: Option<EventCallback>) -> Result<SubjectRef> {
    let subject: SubjectRef = match config.kind {
        SubjectKind::Historical => {
            let feed = HistoricalFeed::new(config.id.clone(), config.events.iter().cloned())
                .with_priority(config.dispatch_priority());
            if let Some(listener) = listener {
                feed.listen(listener);
            }
            Arc::new(feed)
        }
        SubjectKind::Realtime => {
            let feed = RealtimeFeed::new(config.id.clone(), realtime_config(config)?)
                .with_priority(config.dispatch_priority());
            if let Some(listener) = listener {
                feed.listen(listener);
            }
            Arc::new(feed)
        }
    };

    debug!(
        subject = %config.id,
        kind = ?config.kind,
        priority = %config.dispatch_priority(),
        "subject built"
    );
    Ok(subject)
}

/// Build every subject of a scenario in declaration order.
pub fn build_subjects(scenario: &Scenario, listener: Option<EventCallback>) -> Result<Vec<SubjectRef>> {
    scenario
        .subjects
        .iter()
        .map(|config| build_subject(config, listener.clone()))
        .collect()
}

fn realtime_config(config: &SubjectConfig) -> Result<RealtimeConfig> {
    let invalid = |message: &str| FeedError::InvalidConfig {
        feed_id: config.id.to_string(),
        message: message.to_string(),
    };

    let interval_ms = config
        .interval_ms
        .ok_or_else(|| invalid("interval_ms is required for realtime subjects"))?;
    if config.channel_capacity == 0 {
        return Err(invalid("channel_capacity must be greater than 0"));
    }

    let defaults = RealtimeConfig::default();
    Ok(RealtimeConfig {
        interval: Duration::from_millis(interval_ms),
        count: config.count,
        channel_capacity: config.channel_capacity,
        payload: config.payload.clone(),
        poll_timeout: config
            .poll_timeout_ms
            .map_or(defaults.poll_timeout, Duration::from_millis),
    })
}
