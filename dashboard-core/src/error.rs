use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashError>;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("配置错误: {0}")]
    Config(#[from] toml::de::Error),

    #[error("配置文件未找到")]
    ConfigNotFound,

    #[error("配置无效: {0}")]
    InvalidConfig(String),

    #[error("URL 解析错误: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP 请求错误: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("视图文件写入失败 {path}: {source}")]
    Output {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("序列化错误: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("API请求失败: {0}")]
    Api(String),

    #[error("记录格式无效: {0}")]
    InvalidRecord(String),

    #[error("自定义错误: {0}")]
    Custom(String),
}

impl DashError {
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
