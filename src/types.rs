// src/types.rs — 所有核心数据类型

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 口令字符集策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PasswordPolicy {
    /// 大小写字母 + 数字 + 特殊符号
    #[default]
    StandardMixed,
    AlphaNumeric,
    Numeric,
    Base64,
    /// 大写十六进制
    Hex,
}

/// 加密类型（二维码 T: 字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SecurityType {
    #[default]
    Wpa,
    Wep,
}

impl fmt::Display for SecurityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityType::Wpa => write!(f, "WPA"),
            SecurityType::Wep => write!(f, "WEP"),
        }
    }
}

/// QR 纠错等级：L≈7% M≈15% Q≈25% H≈30%
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum EccLevel {
    L,
    #[default]
    M,
    Q,
    H,
}

impl From<EccLevel> for qrcode::EcLevel {
    fn from(level: EccLevel) -> Self {
        match level {
            EccLevel::L => qrcode::EcLevel::L,
            EccLevel::M => qrcode::EcLevel::M,
            EccLevel::Q => qrcode::EcLevel::Q,
            EccLevel::H => qrcode::EcLevel::H,
        }
    }
}

/// 单个 Wi-Fi 凭据，只用于拼装二维码载荷
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredential {
    pub ssid: String,
    pub security: SecurityType,
    pub password: String,
    pub hidden: bool,
}

/// 像素尺寸，命令行写作 `WxH`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    /// 宽高均不小于 `other`
    pub fn covers(&self, other: &Size) -> bool {
        self.width >= other.width && self.height >= other.height
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (w, h) = match s.split_once(['x', 'X']) {
            Some((w, h)) => (w, h),
            // 只给一个数时视为正方形
            None => (s, s),
        };
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("无效宽度 '{w}': {e}"))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("无效高度 '{h}': {e}"))?;
        Ok(Size::new(width, height))
    }
}

/// 渲染计划：模块数 → 每模块像素数 → 最终边长
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QrRenderPlan {
    pub module_count: u32,
    /// 实际采用的目标边长（不足最小值时已替换为最小值）
    pub target_pixel_size: u32,
    pub pixels_per_module: u32,
    pub final_pixel_size: u32,
}

/// 已编码的图像字节（PNG / JPEG）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob(Vec<u8>);

impl ImageBlob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
