//! 配置校验模块
//!
//! 校验规则：
//! - queue_capacity > 0
//! - worker_name 非空
//! - sink 名称非空且唯一
//! - file sink 必须提供 path
//! - network sink 必须提供可解析的 addr

use std::collections::HashSet;
use std::net::SocketAddr;

use contracts::{ContractError, LoggerBlueprint, SinkConfig, SinkType};

/// 校验 LoggerBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &LoggerBlueprint) -> Result<(), ContractError> {
    validate_dispatcher(blueprint)?;
    validate_sink_names(blueprint)?;
    validate_sink_params(blueprint)?;
    Ok(())
}

/// 校验分发器设置
fn validate_dispatcher(blueprint: &LoggerBlueprint) -> Result<(), ContractError> {
    let settings = &blueprint.dispatcher;

    if settings.queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "dispatcher.queue_capacity",
            "queue_capacity must be > 0",
        ));
    }

    if settings.worker_name.trim().is_empty() {
        return Err(ContractError::config_validation(
            "dispatcher.worker_name",
            "worker_name cannot be empty",
        ));
    }

    Ok(())
}

/// 校验 sink 名称唯一性
fn validate_sink_names(blueprint: &LoggerBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

/// 校验 sink 类型特定参数
fn validate_sink_params(blueprint: &LoggerBlueprint) -> Result<(), ContractError> {
    for sink in &blueprint.sinks {
        match sink.sink_type {
            SinkType::Log => {}
            SinkType::File => require_param(sink, "path").map(|_| ())?,
            SinkType::Network => {
                let addr = require_param(sink, "addr")?;
                addr.parse::<SocketAddr>().map_err(|e| {
                    ContractError::config_validation(
                        format!("sinks[{}].params.addr", sink.name),
                        format!("invalid address '{}': {}", addr, e),
                    )
                })?;
            }
        }
    }
    Ok(())
}

fn require_param<'a>(sink: &'a SinkConfig, key: &str) -> Result<&'a str, ContractError> {
    sink.params
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ContractError::config_validation(
                format!("sinks[{}].params.{}", sink.name, key),
                format!("missing '{}' parameter", key),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ConfigVersion, DispatcherSettings, FormatterSettings};
    use std::collections::HashMap;

    fn minimal_blueprint() -> LoggerBlueprint {
        LoggerBlueprint {
            version: ConfigVersion::V1,
            dispatcher: DispatcherSettings::default(),
            formatter: FormatterSettings::default(),
            sinks: vec![SinkConfig {
                name: "console".into(),
                sink_type: SinkType::Log,
                params: HashMap::new(),
            }],
        }
    }

    #[test]
    fn test_valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_zero_capacity() {
        let mut bp = minimal_blueprint();
        bp.dispatcher.queue_capacity = 0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("queue_capacity must be > 0"), "got: {err}");
    }

    #[test]
    fn test_empty_worker_name() {
        let mut bp = minimal_blueprint();
        bp.dispatcher.worker_name = "  ".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("worker_name"), "got: {err}");
    }

    #[test]
    fn test_duplicate_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks.push(bp.sinks[0].clone());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duplicate sink name"), "got: {err}");
    }

    #[test]
    fn test_empty_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].name = String::new();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_file_sink_requires_path() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].sink_type = SinkType::File;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("missing 'path'"), "got: {err}");
    }

    #[test]
    fn test_network_sink_bad_addr() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].sink_type = SinkType::Network;
        bp.sinks[0]
            .params
            .insert("addr".into(), "not-an-address".into());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("invalid address"), "got: {err}");
    }
}
