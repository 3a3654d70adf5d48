// src/main.rs — 主入口 & 命令行编排

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use wifi_qrgen::config::{self, Config};
use wifi_qrgen::{codec, export, password, qr, sizer};
use wifi_qrgen::{EccLevel, ImageBlob, PasswordPolicy, QrRenderPlan, SecurityType, Size, WifiCredential};

// ════════════════════════════════════════════════════════════════
// CLI 参数
// ════════════════════════════════════════════════════════════════

#[derive(Parser)]
#[command(name = "wifi-qrgen", about = "随机 Wi-Fi 口令与二维码生成器", version)]
struct Cli {
    /// 配置文件路径（省略时按优先级查找）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// 生成口令和 Wi-Fi 二维码（默认）
    Generate(GenerateArgs),
    /// 只生成随机口令
    Password {
        #[arg(short, long, value_enum)]
        policy: Option<PasswordPolicy>,
        #[arg(short, long)]
        length: Option<usize>,
    },
    /// 计算给定模块数的渲染缩放
    Plan {
        /// QR 模块边数（含静区）
        modules: u32,
        /// 目标尺寸 WxH
        #[arg(short, long)]
        size: Option<Size>,
        /// 最小尺寸 WxH
        #[arg(long)]
        min: Option<Size>,
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },
    /// 把图像文件转成 base64 PNG 文本
    ExportText {
        input: PathBuf,
        #[arg(long)]
        dpi: Option<u32>,
    },
    /// 从 base64 PNG 文本还原图像文件（.png / .jpg / .jpeg）
    ImportText {
        /// 文本文件，省略时读 stdin
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Args, Default)]
struct GenerateArgs {
    #[arg(long)]
    ssid: Option<String>,
    #[arg(long, value_enum)]
    security: Option<SecurityType>,
    /// 隐藏网络（不广播 SSID）
    #[arg(long)]
    hidden: bool,
    /// 广播网络，覆盖配置文件里的 hidden = true
    #[arg(long, conflicts_with = "hidden")]
    visible: bool,
    #[arg(short, long, value_enum)]
    policy: Option<PasswordPolicy>,
    #[arg(short, long)]
    length: Option<usize>,
    /// 使用指定口令而不是随机生成
    #[arg(long, conflicts_with_all = ["policy", "length"])]
    password: Option<String>,
    #[arg(long, value_enum)]
    ecc: Option<EccLevel>,
    /// 输出尺寸 WxH，每边 400–9000
    #[arg(short, long)]
    size: Option<Size>,
    /// 保存二维码图像（.png / .jpg / .jpeg）
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// 额外输出 base64 PNG 文本
    #[arg(long)]
    text: bool,
    /// 不在终端显示二维码
    #[arg(long)]
    no_preview: bool,
    /// 同时转义密码中的保留字符
    #[arg(long)]
    escape_password: bool,
    /// 只转义 SSID，覆盖配置文件里的 escape_password = true
    #[arg(long, conflicts_with = "escape_password")]
    no_escape_password: bool,
}

impl GenerateArgs {
    /// 命令行参数覆盖配置文件
    fn apply(&self, cfg: &mut Config) {
        if let Some(ssid) = &self.ssid {
            cfg.ssid = ssid.clone();
        }
        if let Some(security) = self.security {
            cfg.security = security;
        }
        if let Some(policy) = self.policy {
            cfg.password_policy = policy;
        }
        if let Some(length) = self.length {
            cfg.password_length = length;
        }
        if let Some(ecc) = self.ecc {
            cfg.ecc_level = ecc;
        }
        if let Some(size) = self.size {
            cfg.output_size = Some(size);
        }
        if self.hidden {
            cfg.hidden = true;
        } else if self.visible {
            cfg.hidden = false;
        }
        if self.escape_password {
            cfg.escape_password = true;
        } else if self.no_escape_password {
            cfg.escape_password = false;
        }
    }
}

// ════════════════════════════════════════════════════════════════
// 入口
// ════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let cli = Cli::parse();
    let mut cfg = Config::load(cli.config.as_deref())?;

    match cli.cmd.unwrap_or_else(|| Cmd::Generate(GenerateArgs::default())) {
        Cmd::Generate(args) => {
            args.apply(&mut cfg);
            cfg.validate()?;
            run_generate(cfg, &args).await?;
        }
        Cmd::Password { policy, length } => {
            if let Some(policy) = policy {
                cfg.password_policy = policy;
            }
            if let Some(length) = length {
                cfg.password_length = length;
            }
            cfg.validate()?;
            println!("{}", password::generate(cfg.password_policy, cfg.password_length)?);
        }
        Cmd::Plan {
            modules,
            size,
            min,
            json,
        } => {
            let requested = size.unwrap_or_else(|| cfg.requested_size());
            let minimum = min.unwrap_or_else(|| cfg.minimum_size());
            let plan = sizer::plan(modules, requested, minimum)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_plan(&plan);
            }
        }
        Cmd::ExportText { input, dpi } => {
            let bytes = std::fs::read(&input)
                .with_context(|| format!("无法读取图像 {}", input.display()))?;
            let text = codec::encode_to_text(&ImageBlob::new(bytes), dpi.unwrap_or(cfg.dpi))?;
            println!("{text}");
        }
        Cmd::ImportText { input, output } => {
            let text = match &input {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("无法读取文本 {}", path.display()))?,
                None => {
                    let mut s = String::new();
                    std::io::stdin().read_to_string(&mut s)?;
                    s
                }
            };
            let blob = codec::decode_from_text(&text)?;
            let format = export::export(&output, &blob, cfg.dpi)?;
            log::info!("💾 已导入 {} 字节图像，保存为 {format:?}", blob.len());
            println!("已写入 {}", output.display());
        }
    }

    Ok(())
}

fn init_logger() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&log_level))
        .format_timestamp_secs()
        .init();
}

// ════════════════════════════════════════════════════════════════
// 生成流程
// ════════════════════════════════════════════════════════════════

async fn run_generate(cfg: Config, args: &GenerateArgs) -> Result<()> {
    check_ssid(&cfg.ssid);

    let password = match &args.password {
        Some(p) => {
            let n = p.chars().count();
            if !(password::MIN_LENGTH..=password::MAX_LENGTH).contains(&n) {
                bail!(
                    "口令须为 {}–{} 个字符，当前为 {n}",
                    password::MIN_LENGTH,
                    password::MAX_LENGTH
                );
            }
            p.clone()
        }
        None => password::generate(cfg.password_policy, cfg.password_length)?,
    };

    let cred = WifiCredential {
        ssid: cfg.ssid.clone(),
        security: cfg.security,
        password,
        hidden: cfg.hidden,
    };
    let payload = cred.payload(cfg.escape_password);

    // 矩阵构建和栅格化放到阻塞线程池，渲染结果整体移交回来
    let (ecc, requested, minimum, dpi) = (
        cfg.ecc_level,
        cfg.requested_size(),
        cfg.minimum_size(),
        cfg.dpi,
    );
    log::info!("🔳 生成二维码（纠错 {ecc:?}，目标 {requested}）…");
    let rendered =
        tokio::task::spawn_blocking(move || qr::render(&payload, ecc, requested, minimum, dpi))
            .await
            .context("渲染任务异常退出")??;

    println!("口令: {}", cred.password);
    print_plan(&rendered.plan);

    if !args.no_preview {
        println!("\n{}\n", qr::terminal(&rendered.code));
    }

    if let Some(path) = &args.output {
        let format = export::export(path, &rendered.png, dpi)?;
        log::info!("💾 已保存 {format:?} 到 {}", path.display());
    }

    if args.text {
        println!("{}", codec::encode_to_text(&rendered.png, dpi)?);
    }

    Ok(())
}

/// SSID 非常规时只警告，仍然生成
fn check_ssid(ssid: &str) {
    if ssid.is_empty() {
        log::info!("未指定 SSID，只生成口令和对应二维码");
    } else if !config::ssid_is_conventional(ssid) {
        log::warn!("SSID「{ssid}」含非常规字符或少于 4 个字符，部分设备可能无法识别");
    }
}

fn print_plan(plan: &QrRenderPlan) {
    println!(
        "模块数 {}，每模块 {} 像素，输出 {}x{}（目标 {}）",
        plan.module_count,
        plan.pixels_per_module,
        plan.final_pixel_size,
        plan.final_pixel_size,
        plan.target_pixel_size
    );
}
