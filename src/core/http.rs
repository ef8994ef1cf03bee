use crate::core::error::{AppError, AppResult};
use crate::models::HttpSettings;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("baseball-data/", env!("CARGO_PKG_VERSION"));

/// 构建 HTTP 客户端
///
/// # 参数
/// - `settings`: HTTP 配置（超时、User-Agent）
///
/// # 返回
/// - 配置好的 reqwest::Client（有上限超时、有限重定向、不重试）
pub fn build_http_client(settings: &HttpSettings) -> AppResult<Client> {
    if settings.timeout_secs == 0 {
        return Err(AppError::config("HTTP 超时必须大于 0 秒"));
    }

    let user_agent = settings.user_agent.as_deref().unwrap_or(USER_AGENT);

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(settings.timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(10)) // GitHub 归档会重定向到 codeload
        .build()
        .map_err(|e| AppError::Other(e.into()))
}

/// GET 请求并返回完整响应体
///
/// 非 2xx 状态码返回 `HttpStatus`，网络失败返回 `Http`，均不重试。
pub async fn fetch_bytes(client: &Client, url: &str) -> AppResult<Bytes> {
    tracing::debug!(url = %url, "发起 GET 请求");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::http(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::HttpStatus {
            url: url.to_string(),
            status,
        });
    }

    let body = response.bytes().await.map_err(|e| AppError::http(url, e))?;
    tracing::debug!(url = %url, bytes = body.len(), "响应接收完成");
    Ok(body)
}

/// 校验 URL 是否为 http(s) 地址
pub fn validate_url(raw: &str) -> AppResult<url::Url> {
    let parsed =
        url::Url::parse(raw).map_err(|e| AppError::config(format!("URL 无效 '{raw}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(AppError::config(format!(
            "不支持的 URL 协议 '{other}': {raw}"
        ))),
    }
}
