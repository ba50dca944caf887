//! 场景校验模块
//!
//! 校验规则：
//! - subject id 非空且唯一
//! - historical: 至少一个事件，不得设置 interval_ms / poll_timeout_ms
//! - realtime: interval_ms 必填，channel_capacity > 0，不得携带 events
//! - max_rounds > 0

use std::collections::HashSet;

use contracts::{ContractError, Scenario, SubjectConfig, SubjectKind};

/// 校验 Scenario
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(scenario: &Scenario) -> Result<(), ContractError> {
    validate_dispatcher(scenario)?;
    validate_subject_ids(scenario)?;
    for (idx, subject) in scenario.subjects.iter().enumerate() {
        match subject.kind {
            SubjectKind::Historical => validate_historical(idx, subject)?,
            SubjectKind::Realtime => validate_realtime(idx, subject)?,
        }
    }
    Ok(())
}

fn validate_dispatcher(scenario: &Scenario) -> Result<(), ContractError> {
    if scenario.dispatcher.max_rounds == Some(0) {
        return Err(ContractError::config_validation(
            "dispatcher.max_rounds",
            "max_rounds must be > 0",
        ));
    }
    Ok(())
}

/// 校验 subject id 非空与唯一性
fn validate_subject_ids(scenario: &Scenario) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, subject) in scenario.subjects.iter().enumerate() {
        if subject.id.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("subjects[{idx}].id"),
                "subject id cannot be empty",
            ));
        }
        if !seen.insert(subject.id.as_str()) {
            return Err(ContractError::config_validation(
                format!("subjects[id={}]", subject.id),
                "duplicate subject id",
            ));
        }
    }
    Ok(())
}

fn validate_historical(idx: usize, subject: &SubjectConfig) -> Result<(), ContractError> {
    if subject.events.is_empty() {
        return Err(ContractError::config_validation(
            format!("subjects[{idx}].events"),
            format!("historical subject '{}' has no events", subject.id),
        ));
    }
    if subject.interval_ms.is_some() {
        return Err(ContractError::config_validation(
            format!("subjects[{idx}].interval_ms"),
            "interval_ms only applies to realtime subjects",
        ));
    }
    if subject.poll_timeout_ms.is_some() {
        return Err(ContractError::config_validation(
            format!("subjects[{idx}].poll_timeout_ms"),
            "poll_timeout_ms only applies to realtime subjects",
        ));
    }
    Ok(())
}

fn validate_realtime(idx: usize, subject: &SubjectConfig) -> Result<(), ContractError> {
    if subject.interval_ms.is_none() {
        return Err(ContractError::config_validation(
            format!("subjects[{idx}].interval_ms"),
            format!("realtime subject '{}' requires interval_ms", subject.id),
        ));
    }
    if subject.channel_capacity == 0 {
        return Err(ContractError::config_validation(
            format!("subjects[{idx}].channel_capacity"),
            "channel_capacity must be > 0",
        ));
    }
    if !subject.events.is_empty() {
        return Err(ContractError::config_validation(
            format!("subjects[{idx}].events"),
            "events only apply to historical subjects",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_toml;

    fn scenario(content: &str) -> Scenario {
        parse_toml(content).unwrap()
    }

    fn field_of(err: ContractError) -> String {
        match err {
            ContractError::ConfigValidation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    const VALID: &str = r#"
[dispatcher]
max_rounds = 100

[[subjects]]
id = "bars"
kind = "historical"
[[subjects.events]]
at = "2024-01-02T09:30:00Z"

[[subjects]]
id = "ticker"
kind = "realtime"
interval_ms = 0
count = 2
"#;

    #[test]
    fn valid_scenario_passes() {
        assert!(validate(&scenario(VALID)).is_ok());
    }

    #[test]
    fn duplicate_id_rejected() {
        let s = scenario(
            r#"
[[subjects]]
id = "a"
kind = "realtime"
interval_ms = 1

[[subjects]]
id = "a"
kind = "realtime"
interval_ms = 1
"#,
        );
        let err = validate(&s).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn empty_id_rejected() {
        let s = scenario(
            r#"
[[subjects]]
id = " "
kind = "realtime"
interval_ms = 1
"#,
        );
        assert_eq!(field_of(validate(&s).unwrap_err()), "subjects[0].id");
    }

    #[test]
    fn historical_without_events_rejected() {
        let s = scenario(
            r#"
[[subjects]]
id = "bars"
kind = "historical"
"#,
        );
        assert_eq!(field_of(validate(&s).unwrap_err()), "subjects[0].events");
    }

    #[test]
    fn historical_poll_timeout_rejected() {
        let s = scenario(
            r#"
[[subjects]]
id = "bars"
kind = "historical"
poll_timeout_ms = 10
[[subjects.events]]
at = "2024-01-02T09:30:00Z"
"#,
        );
        assert_eq!(
            field_of(validate(&s).unwrap_err()),
            "subjects[0].poll_timeout_ms"
        );
    }

    #[test]
    fn realtime_requires_interval() {
        let s = scenario(
            r#"
[[subjects]]
id = "ticker"
kind = "realtime"
"#,
        );
        assert_eq!(field_of(validate(&s).unwrap_err()), "subjects[0].interval_ms");
    }

    #[test]
    fn realtime_zero_capacity_rejected() {
        let s = scenario(
            r#"
[[subjects]]
id = "ticker"
kind = "realtime"
interval_ms = 1
channel_capacity = 0
"#,
        );
        assert_eq!(
            field_of(validate(&s).unwrap_err()),
            "subjects[0].channel_capacity"
        );
    }

    #[test]
    fn zero_max_rounds_rejected() {
        let mut s = scenario(VALID);
        s.dispatcher.max_rounds = Some(0);
        assert_eq!(field_of(validate(&s).unwrap_err()), "dispatcher.max_rounds");
    }

    #[test]
    fn empty_scenario_is_valid() {
        let s = scenario("subjects = []");
        assert!(validate(&s).is_ok());
    }
}
