//! 应用层错误类型
//!
//! 汇总数据层、网络、归档与查询错误；数据层错误通过 `From` 自动转换。

use crate::data::DataError;
use crate::models::player::InvalidKeyType;
use thiserror::Error;

/// 库对外的统一错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 数据层错误（文件、编解码、缓存）
    #[error(transparent)]
    Data(#[from] DataError),

    /// 网络请求失败（连接、超时、读取响应体）
    #[error("请求失败: {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 服务端返回非成功状态码
    #[error("请求 {url} 返回状态码 {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// ZIP 归档读取失败
    #[error("归档读取失败: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// 反向查询的键类型无效
    #[error(transparent)]
    InvalidKeyType(#[from] InvalidKeyType),

    /// 配置错误
    #[error("配置错误: {reason}")]
    Config { reason: String },

    /// 其他错误
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// 应用层结果类型
pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    /// 构造网络请求错误
    pub fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.into(),
            source,
        }
    }

    /// 构造配置错误
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_is_transparent() {
        let err: AppError = DataError::NotFound("core/Parks.csv".to_string()).into();
        assert_eq!(err.to_string(), "未找到资源: core/Parks.csv");
    }

    #[test]
    fn test_invalid_key_type_conversion() {
        let err: AppError = "bogus".parse::<crate::models::KeyType>().unwrap_err().into();
        assert!(matches!(err, AppError::InvalidKeyType(_)));
        assert!(err.to_string().contains("bogus"));
    }
}
