// src/error.rs — 核心库错误类型

use thiserror::Error;

/// 核心组件返回的错误
#[derive(Error, Debug)]
pub enum Error {
    #[error("口令长度 {0} 超出范围 [1, 55]")]
    InvalidLength(usize),

    /// 操作系统熵源失败，不重试也不降级
    #[error("安全随机源不可用: {0}")]
    EntropyUnavailable(#[source] rand::Error),

    /// 上游 QR 构建器返回了退化矩阵
    #[error("QR 模块数无效: {0}")]
    InvalidModuleCount(u32),

    #[error("图像数据损坏: {0}")]
    CorruptImageData(String),

    #[error("不支持的图像扩展名: {0}")]
    UnsupportedImageExtension(String),

    #[error("QR 编码失败: {0}")]
    QrBuild(#[from] qrcode::types::QrError),

    #[error("图像编码失败: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn corrupt<T: Into<String>>(msg: T) -> Self {
        Self::CorruptImageData(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
