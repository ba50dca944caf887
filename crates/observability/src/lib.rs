//! # Observability
//!
//! 可观测性模块：Tracing + Prometheus 指标。
//!
//! ## 功能
//!
//! - Tracing 初始化 (JSON/Pretty/Compact 格式)
//! - Prometheus 指标导出
//! - 调度轮次、事件分发、生命周期指标
//!
//! ## 使用示例
//!
//! ```ignore
//! // 初始化
//! observability::init()?;
//!
//! // Dispatcher 每轮结束后记录
//! observability::record_round(outcome.events, outcome.is_idle(), outcome.eof);
//! ```

pub mod metrics;

use std::str::FromStr;

use anyhow::{bail, Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Re-exports
pub use crate::metrics::{
    record_event_dispatched, record_event_produced, record_lifecycle, record_round,
    record_round_timestamp,
};

/// 初始化可观测性（Tracing + Prometheus）
///
/// - Tracing: JSON 格式，支持 RUST_LOG 环境变量
/// - Prometheus: 默认关闭
pub fn init() -> Result<()> {
    init_with_config(ObservabilityConfig::default())
}

/// 可观测性配置
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// 日志格式
    pub log_format: LogFormat,
    /// Prometheus 端口 (None = 禁用)
    pub metrics_port: Option<u16>,
    /// 默认日志级别 (RUST_LOG 未设置时使用)
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            metrics_port: None,
            default_log_level: "info".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// 从环境变量读取
    ///
    /// - `LOCKSTEP_LOG_FORMAT`: json | pretty | compact
    /// - `LOCKSTEP_METRICS_PORT`: Prometheus 端口
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(format) = std::env::var("LOCKSTEP_LOG_FORMAT") {
            config.log_format = format.parse()?;
        }
        if let Ok(port) = std::env::var("LOCKSTEP_METRICS_PORT") {
            let port = port
                .parse::<u16>()
                .with_context(|| format!("Invalid LOCKSTEP_METRICS_PORT: {port}"))?;
            config.metrics_port = Some(port);
        }

        Ok(config)
    }

    pub fn with_log_format(mut self, log_format: LogFormat) -> Self {
        self.log_format = log_format;
        self
    }

    pub fn with_metrics_port(mut self, port: Option<u16>) -> Self {
        self.metrics_port = port;
        self
    }

    pub fn with_default_log_level(mut self, level: impl Into<String>) -> Self {
        self.default_log_level = level.into();
        self
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON 结构化日志
    #[default]
    Json,
    /// 人类可读格式
    Pretty,
    /// 紧凑单行格式
    Compact,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => bail!("Unknown log format: {other} (expected json, pretty or compact)"),
        }
    }
}

/// 使用自定义配置初始化
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    // 1. Tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_log_level));

    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    // 2. Prometheus (optional)
    if let Some(port) = config.metrics_port {
        install_prometheus(port)?;
    }

    tracing::info!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );

    Ok(())
}

/// 仅初始化 Prometheus 指标（不初始化 Tracing）
///
/// 用于 Tracing 已由其他模块初始化的场景。
pub fn init_metrics_only(port: u16) -> Result<()> {
    install_prometheus(port)
}

fn install_prometheus(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}
