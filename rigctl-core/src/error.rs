//! 错误类型定义

use thiserror::Error;

/// 核心错误类型
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("持久化错误: {message}")]
    Persist { message: String },

    #[error("配置错误: {message}")]
    Config { message: String },

    #[error("协作者错误: {collaborator}: {message}")]
    Collaborator { collaborator: String, message: String },

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML序列化错误: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    #[error("TOML解析错误: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// 创建持久化错误
    pub fn persist<S: Into<String>>(message: S) -> Self {
        Self::Persist { message: message.into() }
    }

    /// 创建配置错误
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    /// 创建协作者错误
    pub fn collaborator<C: Into<String>, S: Into<String>>(collaborator: C, message: S) -> Self {
        Self::Collaborator {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }
}
