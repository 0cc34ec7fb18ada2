//! 全局错误类型定义

use thiserror::Error;
use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum CriticalCssError {
    // 网络相关错误
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Stylesheet fetch failed: {0}")]
    FetchError(String),

    // 缓存相关错误
    #[error("Cache operation failed: {0}")]
    CacheError(String),
    #[error("MessagePack encode/decode failed: {0}")]
    MsgPackError(String),

    // 处理相关错误
    #[error("Regex compilation failed: {0}")]
    RegexCompileError(#[from] RegexError),
    #[error("HTML rewrite failed: {0}")]
    RewriteError(String),

    // 基础错误
    #[error("JSON parse failed: {0}")]
    JsonError(#[from] SerdeJsonError),
    #[error("IO operation failed: {0}")]
    IoError(#[from] IoError),
    #[error("URL parse failed: {0}")]
    UrlError(#[from] UrlParseError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// 全局Result类型
pub type CssResult<T> = Result<T, CriticalCssError>;
