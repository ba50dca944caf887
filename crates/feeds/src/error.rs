//! Feed 错误类型

use contracts::ContractError;
use thiserror::Error;

/// Feed 错误
#[derive(Debug, Error)]
pub enum FeedError {
    /// 在 start 之前被访问
    #[error("feed {feed_id} has not been started")]
    NotStarted {
        /// Feed ID
        feed_id: String,
    },

    /// 重复启动
    #[error("feed {feed_id} is already started")]
    AlreadyStarted {
        /// Feed ID
        feed_id: String,
    },

    /// 生产线程创建失败
    #[error("failed to spawn producer thread for feed {feed_id}")]
    ThreadSpawn {
        /// Feed ID
        feed_id: String,
        #[source]
        source: std::io::Error,
    },

    /// 生产线程 panic
    #[error("producer thread of feed {feed_id} panicked")]
    ProducerPanicked {
        /// Feed ID
        feed_id: String,
    },

    /// 配置不合法
    #[error("invalid configuration for feed {feed_id}: {message}")]
    InvalidConfig {
        /// Feed ID
        feed_id: String,
        /// 错误消息
        message: String,
    },
}

impl FeedError {
    pub fn feed_id(&self) -> &str {
        match self {
            Self::NotStarted { feed_id }
            | Self::AlreadyStarted { feed_id }
            | Self::ThreadSpawn { feed_id, .. }
            | Self::ProducerPanicked { feed_id }
            | Self::InvalidConfig { feed_id, .. } => feed_id,
        }
    }
}

impl From<FeedError> for ContractError {
    fn from(err: FeedError) -> Self {
        let message = err.to_string();
        match err {
            FeedError::NotStarted { feed_id } => ContractError::subject_dispatch(feed_id, message),
            FeedError::AlreadyStarted { feed_id } | FeedError::ThreadSpawn { feed_id, .. } => {
                ContractError::subject_lifecycle(feed_id, message)
            }
            FeedError::ProducerPanicked { feed_id } => ContractError::subject_join(feed_id, message),
            FeedError::InvalidConfig { feed_id, .. } => {
                ContractError::config_validation(format!("subjects.{feed_id}"), message)
            }
        }
    }
}

/// Feed Result 类型别名
pub type Result<T> = std::result::Result<T, FeedError>;
