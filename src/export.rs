// src/export.rs — 按扩展名选择编码器导出图像文件

use crate::codec;
use crate::error::{Error, Result};
use crate::types::ImageBlob;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::DynamicImage;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// JPEG 固定质量（中档压缩）
pub const JPEG_QUALITY: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// 无损，最高压缩等级
    Png,
    /// 质量 [`JPEG_QUALITY`]
    Jpeg,
}

impl ExportFormat {
    /// 由文件扩展名决定编码器（不区分大小写），其它扩展名一律拒绝
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            _ => Err(Error::UnsupportedImageExtension(path.display().to_string())),
        }
    }
}

/// 按格式编码，PNG 额外写入 dpi
pub fn encode(image: &DynamicImage, format: ExportFormat, dpi: u32) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        ExportFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
            image.write_with_encoder(encoder)?;
            buf = codec::set_png_dpi(&buf, dpi)?;
        }
        ExportFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
            // JPEG 不支持透明通道
            DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
        }
    }
    Ok(buf)
}

/// 解码图像并写入 `path`
///
/// 先写同目录下的随机名临时文件再 persist，读者不会看到写一半的文件，
/// 失败时临时文件随 drop 删除。
pub fn export(path: &Path, blob: &ImageBlob, dpi: u32) -> Result<ExportFormat> {
    let format = ExportFormat::from_path(path)?;
    let image = image::load_from_memory(blob.as_bytes())
        .map_err(|e| Error::corrupt(format!("图像解码失败: {e}")))?;
    let bytes = encode(&image, format, dpi)?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    log::debug!("已导出 {:?} {} 字节到 {}", format, bytes.len(), path.display());
    Ok(format)
}
