// src/config.rs — 配置加载，支持文件覆盖

use crate::password::{MAX_LENGTH, MIN_LENGTH};
use crate::types::{EccLevel, PasswordPolicy, SecurityType, Size};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// SSID 最大长度（字符）
pub const MAX_SSID_LEN: usize = 64;
/// 自定义输出尺寸每边的允许范围
pub const OUTPUT_SIDE_RANGE: std::ops::RangeInclusive<u32> = 400..=9000;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub password_policy: PasswordPolicy,
    /// 1–55
    pub password_length: usize,
    pub ecc_level: EccLevel,
    /// 默认输出边长
    pub image_width: u32,
    /// 自定义输出尺寸，每边 400–9000；未设置时用 image_width
    pub output_size: Option<Size>,
    /// 请求尺寸低于此值时改用此值
    pub min_size: u32,
    pub ssid: String,
    pub security: SecurityType,
    pub hidden: bool,
    /// 导出 PNG 时写入的分辨率
    pub dpi: u32,
    /// 同时转义密码中的保留字符
    pub escape_password: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            password_policy: PasswordPolicy::StandardMixed,
            password_length: 50,
            ecc_level: EccLevel::M,
            image_width: 525,
            output_size: None,
            min_size: 150,
            ssid: String::new(),
            security: SecurityType::Wpa,
            hidden: false,
            dpi: 1000,
            escape_password: false,
        }
    }
}

impl Config {
    /// 按优先级查找并加载配置文件；显式指定的路径必须存在
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let candidates = config_candidates();
        for path in &candidates {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        Ok(Config::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件 {}", path.display()))?;
        let cfg: Config = toml::from_str(&text)
            .with_context(|| format!("配置文件格式错误 {}", path.display()))?;
        log::debug!("已加载配置 {}", path.display());
        Ok(cfg)
    }

    /// 渲染请求尺寸
    pub fn requested_size(&self) -> Size {
        self.output_size
            .unwrap_or_else(|| Size::square(self.image_width))
    }

    pub fn minimum_size(&self) -> Size {
        Size::square(self.min_size)
    }

    /// 校验所有字段；SSID 字符集只给警告，见 [`ssid_is_conventional`]
    pub fn validate(&self) -> Result<()> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&self.password_length) {
            bail!(
                "口令长度必须在 {MIN_LENGTH}–{MAX_LENGTH} 之间，当前为 {}",
                self.password_length
            );
        }
        if let Some(size) = self.output_size {
            if !OUTPUT_SIDE_RANGE.contains(&size.width) || !OUTPUT_SIDE_RANGE.contains(&size.height) {
                bail!("自定义尺寸 {size} 超出范围，每边须在 400–9000 之间");
            }
        }
        if self.image_width == 0 {
            bail!("image_width 不能为 0");
        }
        if self.dpi == 0 {
            bail!("dpi 不能为 0");
        }
        let ssid_len = self.ssid.chars().count();
        if ssid_len > MAX_SSID_LEN {
            bail!("SSID 过长（{ssid_len} 字符，最多 {MAX_SSID_LEN}）");
        }
        Ok(())
    }
}

/// SSID 是否只含字母、数字、`_` `-` `.` 且至少 4 个字符
pub fn ssid_is_conventional(ssid: &str) -> bool {
    ssid.chars().count() >= 4
        && ssid
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn config_candidates() -> Vec<PathBuf> {
    let mut v = vec![];
    // 同目录下的 config.toml
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            v.push(dir.join("config.toml"));
        }
    }
    // ~/.config/wifi-qrgen/config.toml
    if let Some(dir) = dirs::config_dir() {
        v.push(dir.join("wifi-qrgen").join("config.toml"));
    }
    v
}
