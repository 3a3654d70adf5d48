// src/password.rs — 基于操作系统熵源的随机口令生成

use crate::error::{Error, Result};
use crate::types::PasswordPolicy;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

pub const MIN_LENGTH: usize = 1;
pub const MAX_LENGTH: usize = 55;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const HEX_DIGITS: &[u8] = b"0123456789ABCDEF";
const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// 特殊符号集，不含 `;` `,` `"` `\` `:`，避免破坏 WIFI: 载荷的字段分隔
pub const SPECIAL_CHARS: &[u8] = b"!+-@#?$%&*=_.";

impl PasswordPolicy {
    /// 该策略下输出可能出现的全部字符
    pub fn alphabet(&self) -> Vec<u8> {
        match self {
            PasswordPolicy::StandardMixed => [UPPERCASE, LOWERCASE, DIGITS, SPECIAL_CHARS].concat(),
            PasswordPolicy::AlphaNumeric => [UPPERCASE, LOWERCASE, DIGITS].concat(),
            PasswordPolicy::Numeric => DIGITS.to_vec(),
            PasswordPolicy::Hex => HEX_DIGITS.to_vec(),
            PasswordPolicy::Base64 => BASE64_CHARS.to_vec(),
        }
    }
}

/// 用 OsRng 生成口令
pub fn generate(policy: PasswordPolicy, length: usize) -> Result<String> {
    generate_with(&mut OsRng, policy, length)
}

/// 用指定的密码学随机源生成口令，长度须在 [1, 55]
pub fn generate_with<R>(rng: &mut R, policy: PasswordPolicy, length: usize) -> Result<String>
where
    R: RngCore + CryptoRng,
{
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(Error::InvalidLength(length));
    }

    let password = match policy {
        PasswordPolicy::Base64 => base64_chars(rng, length)?,
        _ => draw_uniform(rng, &policy.alphabet(), length)?,
    };

    log::debug!("已生成 {policy:?} 口令，长度 {length}");
    Ok(password)
}

/// 逐字符等概率抽取
///
/// 拒绝采样：落在 `256 - 256 % n` 及以上的字节直接丢弃，消除取模偏差。
fn draw_uniform<R>(rng: &mut R, alphabet: &[u8], length: usize) -> Result<String>
where
    R: RngCore + CryptoRng,
{
    let n = alphabet.len();
    let limit = 256 - (256 % n);
    let mut out = String::with_capacity(length);
    let mut buf = [0u8; 64];

    while out.len() < length {
        rng.try_fill_bytes(&mut buf)
            .map_err(Error::EntropyUnavailable)?;
        for &b in buf.iter().filter(|&&b| (b as usize) < limit) {
            out.push(alphabet[b as usize % n] as char);
            if out.len() == length {
                break;
            }
        }
    }

    Ok(out)
}

/// 取 ceil(length * 3 / 4) 个随机字节做 base64，再截断到 length
///
/// 截断后的前缀总落在有效字符区内，不会带出 `=`。
fn base64_chars<R>(rng: &mut R, length: usize) -> Result<String>
where
    R: RngCore + CryptoRng,
{
    let mut bytes = vec![0u8; (length * 3).div_ceil(4)];
    rng.try_fill_bytes(&mut bytes)
        .map_err(Error::EntropyUnavailable)?;

    let mut encoded = STANDARD.encode(&bytes);
    encoded.truncate(length);
    Ok(encoded)
}
