// src/qr.rs — 用 qrcode crate 构建矩阵、按渲染计划栅格化，并生成终端预览

use crate::codec;
use crate::error::Result;
use crate::sizer;
use crate::types::{EccLevel, ImageBlob, QrRenderPlan, Size};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::render::unicode;
use qrcode::QrCode;
use std::fmt;
use std::io::Cursor;

/// 普通 QR 码四周的静区宽度（模块）
pub const QUIET_ZONE: u32 = 4;

/// 渲染结果：矩阵 + 计划 + 带 dpi 的 PNG
#[derive(Clone)]
pub struct RenderedQr {
    pub code: QrCode,
    pub plan: QrRenderPlan,
    pub png: ImageBlob,
}

// QrCode 没有实现 Debug，只输出边长
impl fmt::Debug for RenderedQr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedQr")
            .field("code_width", &self.code.width())
            .field("plan", &self.plan)
            .field("png_len", &self.png.len())
            .finish()
    }
}

/// 由载荷构建 QR 矩阵
pub fn build(payload: &str, ecc: EccLevel) -> Result<QrCode> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), ecc.into())?;
    log::debug!("QR 版本 {:?}，边长 {} 模块", code.version(), code.width());
    Ok(code)
}

/// 含静区在内的模块边数，即输出图像的网格边长
pub fn module_count(code: &QrCode) -> u32 {
    code.width() as u32 + 2 * QUIET_ZONE
}

/// 按计划栅格化，输出边长等于 `plan.final_pixel_size`
pub fn rasterize(code: &QrCode, plan: &QrRenderPlan) -> GrayImage {
    code.render::<Luma<u8>>()
        .quiet_zone(true)
        .module_dimensions(plan.pixels_per_module, plan.pixels_per_module)
        .build()
}

/// 完整流水线：构建矩阵 → 计算缩放 → 栅格化 → PNG（写入 dpi）
pub fn render(
    payload: &str,
    ecc: EccLevel,
    requested: Size,
    minimum: Size,
    dpi: u32,
) -> Result<RenderedQr> {
    let code = build(payload, ecc)?;
    let plan = sizer::plan(module_count(&code), requested, minimum)?;
    let image = rasterize(&code, &plan);

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(image).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    let png = codec::set_png_dpi(&png, dpi)?;

    Ok(RenderedQr {
        code,
        plan,
        png: ImageBlob::new(png),
    })
}

/// 生成终端预览字符串（UTF-8 块字符）
pub fn terminal(code: &QrCode) -> String {
    let image = code
        .render::<unicode::Dense1x2>()
        .quiet_zone(true)
        .build();

    // 每行加两个前导空格，终端显示时稍微居中
    image
        .lines()
        .map(|l| format!("  {l}"))
        .collect::<Vec<_>>()
        .join("\n")
}
