// src/lib.rs — 随机 Wi-Fi 口令与二维码生成核心

pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod password;
pub mod payload;
pub mod qr;
pub mod sizer;
pub mod types;

pub use error::{Error, Result};
pub use types::{EccLevel, ImageBlob, PasswordPolicy, QrRenderPlan, SecurityType, Size, WifiCredential};
