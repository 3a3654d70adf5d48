// tests/pipeline.rs — 口令 → 载荷 → 渲染 → 文本/文件 全流程

use image::GenericImageView;
use wifi_qrgen::export::{self, ExportFormat};
use wifi_qrgen::{codec, password, qr};
use wifi_qrgen::{EccLevel, Error, ImageBlob, PasswordPolicy, SecurityType, Size, WifiCredential};

fn render_sample(dpi: u32) -> qr::RenderedQr {
    let cred = WifiCredential {
        ssid: "Cafe;Guest".into(),
        security: SecurityType::Wpa,
        password: password::generate(PasswordPolicy::AlphaNumeric, 24).unwrap(),
        hidden: false,
    };
    let payload = cred.payload(false);
    assert!(payload.starts_with(r"WIFI:S:Cafe\;Guest;T:WPA;P:"));
    qr::render(&payload, EccLevel::M, Size::square(525), Size::square(150), dpi).unwrap()
}

#[test]
fn rendered_png_round_trips_through_text() {
    let rendered = render_sample(1000);
    let text = codec::encode_to_text(&rendered.png, 1000).unwrap();
    let back = codec::decode_from_text(&text).unwrap();
    assert_eq!(back.as_bytes(), rendered.png.as_bytes());
}

#[test]
fn rendered_size_follows_plan() {
    let rendered = render_sample(1000);
    let plan = rendered.plan;
    assert_eq!(plan.module_count, qr::module_count(&rendered.code));
    assert_eq!(plan.final_pixel_size, plan.pixels_per_module * plan.module_count);
    assert!(plan.final_pixel_size >= 525);
    assert!(plan.final_pixel_size < 525 + plan.module_count);
}

#[test]
fn export_dispatches_on_extension() {
    let rendered = render_sample(1000);
    let dir = tempfile::tempdir().unwrap();

    let png_path = dir.path().join("foo.png");
    assert_eq!(
        export::export(&png_path, &rendered.png, 1000).unwrap(),
        ExportFormat::Png
    );
    let png = std::fs::read(&png_path).unwrap();
    assert_eq!(codec::png_dpi(&png), Some(1000));
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!(img.dimensions().0, rendered.plan.final_pixel_size);

    let jpg_path = dir.path().join("foo.jpg");
    assert_eq!(
        export::export(&jpg_path, &rendered.png, 1000).unwrap(),
        ExportFormat::Jpeg
    );
    let jpg = std::fs::read(&jpg_path).unwrap();
    assert_eq!(image::guess_format(&jpg).unwrap(), image::ImageFormat::Jpeg);

    let bmp_path = dir.path().join("foo.bmp");
    let err = export::export(&bmp_path, &rendered.png, 1000).unwrap_err();
    assert!(matches!(err, Error::UnsupportedImageExtension(_)));
    assert!(!bmp_path.exists());
}

#[test]
fn imported_text_can_be_exported() {
    let rendered = render_sample(300);
    let text = codec::encode_to_text(&rendered.png, 300).unwrap();
    let blob = codec::decode_from_text(&text).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("imported.PNG");
    export::export(&path, &blob, 300).unwrap();
    assert!(image::load_from_memory(&std::fs::read(&path).unwrap()).is_ok());
}

#[test]
fn corrupt_blob_is_not_exported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    let err = export::export(&path, &ImageBlob::new(b"garbage".to_vec()), 1000).unwrap_err();
    assert!(matches!(err, Error::CorruptImageData(_)));
    assert!(!path.exists());
}
