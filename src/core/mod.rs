// 核心基础设施：错误类型、HTTP 客户端、日志
pub mod error;
pub mod http;
pub mod logger;

pub use error::{AppError, AppResult};
pub use http::{build_http_client, fetch_bytes, validate_url};
pub use logger::{init_logger, update_log_level};
