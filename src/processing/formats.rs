//! Image format detection and codec I/O

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageFormat, ImageResult};

use crate::error::{Result, ResizeError};

/// Open and decode an image, returning it with the format it was stored in.
///
/// The format is sniffed from the file header first and from the extension
/// second, so mislabelled files still round-trip in their real format.
pub fn open_image(path: &Path) -> Result<(DynamicImage, ImageFormat)> {
    let mut reader = image::io::Reader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| ResizeError::decode(path, e.into()))?;

    let format = match reader.format() {
        Some(format) => format,
        None => {
            let format = ImageFormat::from_path(path).map_err(|e| ResizeError::decode(path, e))?;
            reader.set_format(format);
            format
        }
    };

    let image = reader.decode().map_err(|e| ResizeError::decode(path, e))?;
    Ok((image, format))
}

/// Encode `image` as `format` and write it to `path`.
///
/// JPEG output honours `quality` (1-100); other formats use the codec
/// defaults.
pub fn save_image(image: &DynamicImage, path: &Path, format: ImageFormat, quality: u8) -> ImageResult<()> {
    match format {
        ImageFormat::Jpeg => {
            let mut writer = BufWriter::new(File::create(path)?);
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));

            // The JPEG encoder takes 8-bit gray or RGB only
            match image.color() {
                ColorType::L8 | ColorType::Rgb8 => image.write_with_encoder(encoder)?,
                _ => DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?,
            }
            writer.flush()?;
            Ok(())
        }
        _ => image.save_with_format(path, format),
    }
}

/// Short lowercase name of a format for log lines
pub fn format_name(format: ImageFormat) -> String {
    format!("{:?}", format).to_lowercase()
}
