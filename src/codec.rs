// src/codec.rs — 图像 ↔ base64 PNG 文本，用于剪贴板与文本导入导出

use crate::error::{Error, Result};
use crate::types::ImageBlob;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use std::io::Cursor;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// 每行字符数（MIME 风格，行间用 CRLF）
pub const LINE_WIDTH: usize = 76;

/// 图像 → 带换行的 base64 PNG 文本
///
/// 非 PNG 输入先转成 PNG；PNG 输入只重写 pHYs 块，其余字节保持不变。
///
/// 只有输入 PNG 已经带有同一 `dpi` 的 pHYs 块时（[`crate::qr::render`] 的输出
/// 都满足），`decode_from_text(encode_to_text(b, dpi)) == b` 才逐字节成立；
/// 否则结果只在 pHYs 块上不同，再编码一次即稳定。
pub fn encode_to_text(image: &ImageBlob, dpi: u32) -> Result<String> {
    let png = normalize_png(image.as_bytes(), dpi)?;
    log::debug!("编码 {} 字节 PNG（{dpi} dpi）为文本", png.len());
    Ok(wrap_base64(&png))
}

/// base64 文本 → PNG 字节，要么完整成功要么报 CorruptImageData
pub fn decode_from_text(text: &str) -> Result<ImageBlob> {
    let bytes = unwrap_base64(text)?;
    image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .map_err(|e| Error::corrupt(format!("不是有效的 PNG: {e}")))?;
    Ok(ImageBlob::new(bytes))
}

/// 标准字母表 base64，每 76 字符插入 CRLF
pub fn wrap_base64(bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / LINE_WIDTH * 2);
    for (i, c) in encoded.chars().enumerate() {
        if i > 0 && i % LINE_WIDTH == 0 {
            out.push_str("\r\n");
        }
        out.push(c);
    }
    out
}

/// 忽略所有 ASCII 空白后解码
pub fn unwrap_base64(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::corrupt(format!("base64 解码失败: {e}")))
}

/// 校验图像并输出带指定 dpi 的 PNG
pub fn normalize_png(bytes: &[u8], dpi: u32) -> Result<Vec<u8>> {
    let format = image::guess_format(bytes)
        .map_err(|e| Error::corrupt(format!("无法识别图像格式: {e}")))?;
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| Error::corrupt(format!("图像解码失败: {e}")))?;

    let png = if format == ImageFormat::Png {
        bytes.to_vec()
    } else {
        let mut buf = Vec::new();
        decoded.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        buf
    };

    set_png_dpi(&png, dpi)
}

/// 替换（或在 IHDR 之后插入）pHYs 块；IEND 之后的字节原样保留
pub fn set_png_dpi(png: &[u8], dpi: u32) -> Result<Vec<u8>> {
    let mut rest = png
        .strip_prefix(PNG_SIGNATURE.as_slice())
        .ok_or_else(|| Error::corrupt("缺少 PNG 签名"))?;

    let mut out = Vec::with_capacity(png.len() + 21);
    out.extend_from_slice(&PNG_SIGNATURE);

    let mut stamped = false;
    while !rest.is_empty() {
        let (kind, chunk, tail) = split_chunk(rest)?;
        rest = tail;
        if &kind == b"pHYs" {
            continue;
        }
        out.extend_from_slice(chunk);
        if &kind == b"IHDR" && !stamped {
            write_chunk(&mut out, b"pHYs", &phys_data(dpi));
            stamped = true;
        }
        if &kind == b"IEND" {
            out.extend_from_slice(rest);
            break;
        }
    }

    if !stamped {
        return Err(Error::corrupt("缺少 IHDR 块"));
    }
    Ok(out)
}

/// 读取 pHYs 中的分辨率（按米为单位换算回 dpi）
pub fn png_dpi(png: &[u8]) -> Option<u32> {
    let mut rest = png.strip_prefix(PNG_SIGNATURE.as_slice())?;
    while !rest.is_empty() {
        let (kind, chunk, tail) = split_chunk(rest).ok()?;
        if &kind == b"pHYs" && chunk.len() == 21 && chunk[16] == 1 {
            let ppm = u32::from_be_bytes([chunk[8], chunk[9], chunk[10], chunk[11]]);
            return Some(((u64::from(ppm) * 254 + 5_000) / 10_000) as u32);
        }
        if &kind == b"IEND" {
            return None;
        }
        rest = tail;
    }
    None
}

/// dpi → 每米像素数（四舍五入）
pub fn dots_per_meter(dpi: u32) -> u32 {
    let ppm = (u64::from(dpi) * 10_000 + 127) / 254;
    u32::try_from(ppm).unwrap_or(u32::MAX)
}

/// 拆出一个完整块：(类型, 整块字节, 剩余)
fn split_chunk(data: &[u8]) -> Result<([u8; 4], &[u8], &[u8])> {
    if data.len() < 12 {
        return Err(Error::corrupt("PNG 块被截断"));
    }
    let len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let total = len
        .checked_add(12)
        .filter(|&t| t <= data.len())
        .ok_or_else(|| Error::corrupt("PNG 块长度越界"))?;
    let kind = [data[4], data[5], data[6], data[7]];
    Ok((kind, &data[..total], &data[total..]))
}

fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
}

fn phys_data(dpi: u32) -> [u8; 9] {
    let ppm = dots_per_meter(dpi).to_be_bytes();
    let mut data = [0u8; 9];
    data[..4].copy_from_slice(&ppm);
    data[4..8].copy_from_slice(&ppm);
    data[8] = 1; // 单位：米
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma};

    fn sample(format: ImageFormat) -> Vec<u8> {
        let img = GrayImage::from_fn(8, 8, |x, y| Luma([if (x + y) % 2 == 0 { 0 } else { 255 }]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), format)
            .unwrap();
        buf
    }

    #[test]
    fn stamped_png_round_trips_exactly() {
        let blob = ImageBlob::new(normalize_png(&sample(ImageFormat::Png), 1000).unwrap());
        let text = encode_to_text(&blob, 1000).unwrap();
        let back = decode_from_text(&text).unwrap();
        assert_eq!(back, blob);
    }

    #[test]
    fn stamping_is_idempotent_and_readable() {
        let once = set_png_dpi(&sample(ImageFormat::Png), 300).unwrap();
        let twice = set_png_dpi(&once, 300).unwrap();
        assert_eq!(once, twice);
        assert_eq!(png_dpi(&once), Some(300));

        let restamped = set_png_dpi(&once, 1000).unwrap();
        assert_eq!(restamped.len(), once.len());
        assert_eq!(png_dpi(&restamped), Some(1000));
        assert!(image::load_from_memory(&restamped).is_ok());
    }

    #[test]
    fn dots_per_meter_matches_png_convention() {
        assert_eq!(dots_per_meter(72), 2835);
        assert_eq!(dots_per_meter(1000), 39370);
        assert_eq!(dots_per_meter(u32::MAX), u32::MAX);
    }

    #[test]
    fn jpeg_input_becomes_png() {
        let jpeg = ImageBlob::new(sample(ImageFormat::Jpeg));
        let text = encode_to_text(&jpeg, 96).unwrap();
        let png = decode_from_text(&text).unwrap();
        assert!(png.as_bytes().starts_with(&PNG_SIGNATURE));
        assert_eq!(png_dpi(png.as_bytes()), Some(96));
    }

    #[test]
    fn text_is_wrapped_at_76_columns() {
        let blob = ImageBlob::new(sample(ImageFormat::Png));
        let text = encode_to_text(&blob, 1000).unwrap();
        let lines: Vec<&str> = text.split("\r\n").collect();
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= LINE_WIDTH));
        assert!(lines[..lines.len() - 1].iter().all(|l| l.len() == LINE_WIDTH));
    }

    #[test]
    fn base64_layer_is_lossless_for_any_bytes() {
        for bytes in [vec![], vec![0u8], (0..=255u8).collect::<Vec<_>>(), vec![0xFF; 500]] {
            assert_eq!(unwrap_base64(&wrap_base64(&bytes)).unwrap(), bytes);
        }
    }

    #[test]
    fn decode_tolerates_foreign_line_breaks() {
        let blob = ImageBlob::new(normalize_png(&sample(ImageFormat::Png), 1000).unwrap());
        let text = STANDARD.encode(blob.as_bytes());
        let reflowed: String = text
            .chars()
            .enumerate()
            .flat_map(|(i, c)| if i % 60 == 59 { vec![c, '\n'] } else { vec![c] })
            .collect();
        assert_eq!(decode_from_text(&reflowed).unwrap(), blob);
    }

    #[test]
    fn invalid_base64_is_corrupt() {
        assert!(matches!(
            decode_from_text("not-base64!!"),
            Err(Error::CorruptImageData(_))
        ));
    }

    #[test]
    fn non_png_payload_is_corrupt() {
        let text = wrap_base64(b"definitely not an image");
        assert!(matches!(decode_from_text(&text), Err(Error::CorruptImageData(_))));
        assert!(matches!(decode_from_text(""), Err(Error::CorruptImageData(_))));

        let jpeg_text = wrap_base64(&sample(ImageFormat::Jpeg));
        assert!(matches!(decode_from_text(&jpeg_text), Err(Error::CorruptImageData(_))));
    }

    #[test]
    fn foreign_png_differs_only_in_phys() {
        let plain = sample(ImageFormat::Png);
        assert_eq!(png_dpi(&plain), None);

        let blob = ImageBlob::new(plain.clone());
        let first = decode_from_text(&encode_to_text(&blob, 1000).unwrap()).unwrap();
        assert_eq!(first.len(), plain.len() + 21);
        assert_eq!(png_dpi(first.as_bytes()), Some(1000));

        let second = decode_from_text(&encode_to_text(&first, 1000).unwrap()).unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn bytes_after_iend_are_kept() {
        let mut png = sample(ImageFormat::Png);
        let trailer = b"\x00trailing junk";
        png.extend_from_slice(trailer);
        assert!(image::load_from_memory(&png).is_ok());

        let stamped = set_png_dpi(&png, 1000).unwrap();
        assert!(stamped.ends_with(trailer));
        assert_eq!(png_dpi(&stamped), Some(1000));
        assert_eq!(set_png_dpi(&stamped, 1000).unwrap(), stamped);

        let text = encode_to_text(&ImageBlob::new(png), 1000).unwrap();
        assert!(decode_from_text(&text).unwrap().as_bytes().ends_with(trailer));
    }

    #[test]
    fn truncated_png_is_corrupt() {
        let png = sample(ImageFormat::Png);
        let cut = &png[..png.len() / 2];
        assert!(matches!(set_png_dpi(cut, 1000), Err(Error::CorruptImageData(_))));
        let blob = ImageBlob::new(cut.to_vec());
        assert!(matches!(encode_to_text(&blob, 1000), Err(Error::CorruptImageData(_))));
    }
}
