use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{CanvasError, Result};

/// File name offered when the design is downloaded.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "phone-case-design.png";

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Encode an RGBA buffer as PNG. The same pixels always produce the same
/// bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(image.as_raw().len() / 4);
    PngEncoder::new(&mut buf)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ColorType::Rgba8,
        )
        .map_err(CanvasError::Encode)?;
    Ok(buf)
}

/// `data:image/png;base64,...` for the given PNG bytes.
pub fn png_data_url(png: &[u8]) -> String {
    let mut url = String::with_capacity(PNG_DATA_URL_PREFIX.len() + png.len() * 4 / 3 + 4);
    url.push_str(PNG_DATA_URL_PREFIX);
    STANDARD.encode_string(png, &mut url);
    url
}

/// Extract the payload of a base64 `data:` URL. Only base64 URLs carrying an
/// `image/*` media type are accepted.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let invalid = |reason: &str| CanvasError::InvalidDataUrl(reason.to_string());

    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| invalid("missing 'data:' scheme"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid("missing ',' separator"))?;
    let mut parts = header.split(';');
    let media_type = parts.next().unwrap_or_default();
    if !media_type.starts_with("image/") {
        return Err(invalid("media type is not an image"));
    }
    if !parts.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(invalid("payload is not base64"));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| CanvasError::InvalidDataUrl(e.to_string()))
}

/// Decode any raster format the `image` crate was built with.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(CanvasError::Decode)
}

/// Write encoded bytes to `path`, creating or truncating it.
pub fn write_file(bytes: &[u8], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}
