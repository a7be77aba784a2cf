//! LoggerBlueprint - Config Loader 输出
//!
//! 描述完整的异步日志配置：分发队列、格式化器、输出路由。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的日志配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 分发器设置
    #[serde(default)]
    pub dispatcher: DispatcherSettings,

    /// 格式化器设置
    #[serde(default)]
    pub formatter: FormatterSettings,

    /// 输出路由配置（按注册顺序调用）
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// 分发器设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherSettings {
    /// 队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 关闭等待上限（毫秒），None 表示无限等待
    #[serde(default)]
    pub shutdown_timeout_ms: Option<u64>,

    /// 后台线程名称
    #[serde(default = "default_worker_name")]
    pub worker_name: String,
}

impl DispatcherSettings {
    /// 关闭等待上限
    pub fn shutdown_timeout(&self) -> Option<Duration> {
        self.shutdown_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            shutdown_timeout_ms: None,
            worker_name: default_worker_name(),
        }
    }
}

fn default_queue_capacity() -> usize {
    8192
}

fn default_worker_name() -> String {
    "async-log-worker".to_string()
}

/// 格式化器设置
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FormatterSettings {
    /// 格式化器类型
    #[serde(default)]
    pub kind: FormatterKind,
}

/// 格式化器类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatterKind {
    /// 单行文本
    #[default]
    Plain,
    /// 每行一个 JSON 对象
    Json,
}

/// Sink 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink 名称
    pub name: String,

    /// Sink 类型
    pub sink_type: SinkType,

    /// 类型特定参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// 通过 tracing 输出
    Log,
    /// 文件输出
    File,
    /// 网络输出 (UDP)
    Network,
}

impl Default for LoggerBlueprint {
    fn default() -> Self {
        Self {
            version: ConfigVersion::V1,
            dispatcher: DispatcherSettings::default(),
            formatter: FormatterSettings::default(),
            sinks: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let bp: LoggerBlueprint = toml::from_str("").unwrap();
        assert_eq!(bp.dispatcher.queue_capacity, 8192);
        assert_eq!(bp.dispatcher.worker_name, "async-log-worker");
        assert_eq!(bp.formatter.kind, FormatterKind::Plain);
        assert!(bp.dispatcher.shutdown_timeout().is_none());
        assert!(bp.sinks.is_empty());
    }

    #[test]
    fn test_sink_type_snake_case() {
        let json = r#"{ "name": "net", "sink_type": "network", "params": { "addr": "127.0.0.1:9000" } }"#;
        let sink: SinkConfig = serde_json::from_str(json).unwrap();
        assert_eq!(sink.sink_type, SinkType::Network);
        assert_eq!(sink.params["addr"], "127.0.0.1:9000");
    }

    #[test]
    fn test_shutdown_timeout_conversion() {
        let settings = DispatcherSettings {
            shutdown_timeout_ms: Some(250),
            ..Default::default()
        };
        assert_eq!(settings.shutdown_timeout(), Some(Duration::from_millis(250)));
    }
}
