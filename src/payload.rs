// src/payload.rs — Wi-Fi 二维码载荷字符串（WIFI: URI 约定）

use crate::types::{SecurityType, WifiCredential};

/// 生成 `WIFI:S:<ssid>;T:<WPA|WEP>;P:<password>;H:<True|False>;`
///
/// 只转义 SSID 中的 `;`，密码原样写入（沿用既有行为；需要严格转义时用
/// [`encode_strict`]）。调用方负责事先校验 SSID 与密码。
pub fn encode(ssid: &str, security: SecurityType, password: &str, hidden: bool) -> String {
    let ssid_esc = ssid.replace(';', "\\;");
    format_payload(&ssid_esc, security, password, hidden)
}

/// 与 [`encode`] 相同，但 SSID 和密码都转义全部保留字符
pub fn encode_strict(ssid: &str, security: SecurityType, password: &str, hidden: bool) -> String {
    let ssid_esc = escape_wifi_field(ssid);
    let pass_esc = escape_wifi_field(password);
    format_payload(&ssid_esc, security, &pass_esc, hidden)
}

impl WifiCredential {
    /// 按转义模式拼装载荷
    pub fn payload(&self, strict: bool) -> String {
        if strict {
            encode_strict(&self.ssid, self.security, &self.password, self.hidden)
        } else {
            encode(&self.ssid, self.security, &self.password, self.hidden)
        }
    }
}

fn format_payload(ssid: &str, security: SecurityType, password: &str, hidden: bool) -> String {
    let hidden = if hidden { "True" } else { "False" };
    format!("WIFI:S:{ssid};T:{security};P:{password};H:{hidden};")
}

/// 转义 Wi-Fi QR 格式中的保留字符
fn escape_wifi_field(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        match c {
            '\\' | ';' | ',' | '"' | ':' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
