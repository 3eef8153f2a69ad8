//! Resize policy: the three user-visible resize strategies

use image::{imageops, DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ResizeMode, ResizeSpec};
use crate::error::{Result, ResizeError};

/// Applies a [`ResizeMode`] to decoded images
#[derive(Debug, Clone)]
pub struct ImageResizer {
    filter: FilterType,
    fill_color: [u8; 3],
}

/// Available resize filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    /// Nearest neighbor (fastest, lowest quality)
    Nearest,
    /// Triangle (linear interpolation)
    Triangle,
    /// Catmull-Rom cubic spline
    CatmullRom,
    /// Gaussian blur
    Gaussian,
    /// Lanczos with radius 3 (high quality, recommended)
    #[default]
    Lanczos3,
}

impl From<FilterType> for imageops::FilterType {
    fn from(filter: FilterType) -> Self {
        match filter {
            FilterType::Nearest => imageops::FilterType::Nearest,
            FilterType::Triangle => imageops::FilterType::Triangle,
            FilterType::CatmullRom => imageops::FilterType::CatmullRom,
            FilterType::Gaussian => imageops::FilterType::Gaussian,
            FilterType::Lanczos3 => imageops::FilterType::Lanczos3,
        }
    }
}

impl ImageResizer {
    /// Create a new resizer with default settings
    pub fn new() -> Self {
        Self::with_filter(FilterType::default())
    }

    /// Create a resizer with custom filter
    pub fn with_filter(filter: FilterType) -> Self {
        Self {
            filter,
            fill_color: [255, 255, 255],
        }
    }

    /// Set the canvas colour used to pad contain-mode output
    pub fn fill_color(mut self, fill_color: [u8; 3]) -> Self {
        self.fill_color = fill_color;
        self
    }

    /// Resize according to a raw width/height request
    pub fn resize_to_spec(&self, image: &DynamicImage, spec: &ResizeSpec) -> Result<DynamicImage> {
        let mode = spec.mode()?;
        self.resize(image, mode)
    }

    /// Resize an image according to the specified mode
    pub fn resize(&self, image: &DynamicImage, mode: ResizeMode) -> Result<DynamicImage> {
        let (target_width, target_height) =
            calculate_dimensions(image.width(), image.height(), mode)?;

        debug!(
            "Resizing {}x{} -> {}x{} ({}) using {:?}",
            image.width(),
            image.height(),
            target_width,
            target_height,
            mode,
            self.filter
        );

        let scaled = if target_width == image.width() && target_height == image.height() {
            image.clone()
        } else {
            image.resize_exact(target_width, target_height, self.filter.into())
        };

        match mode {
            ResizeMode::Contain { width, height } => Ok(self.pad(&scaled, width, height)),
            ResizeMode::ScaleByWidth { .. } | ResizeMode::ScaleByHeight { .. } => Ok(scaled),
        }
    }

    /// Centre `content` on a `width x height` canvas of the fill colour
    fn pad(&self, content: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        if content.width() == width && content.height() == height {
            return content.clone();
        }

        // Odd gaps put the extra pixel before the content
        let x = i64::from(width.saturating_sub(content.width()).div_ceil(2));
        let y = i64::from(height.saturating_sub(content.height()).div_ceil(2));
        let [r, g, b] = self.fill_color;

        if content.color().has_alpha() {
            let mut canvas = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 0]));
            imageops::overlay(&mut canvas, &content.to_rgba8(), x, y);
            DynamicImage::ImageRgba8(canvas)
        } else {
            let mut canvas = RgbImage::from_pixel(width, height, Rgb([r, g, b]));
            imageops::overlay(&mut canvas, &content.to_rgb8(), x, y);
            DynamicImage::ImageRgb8(canvas)
        }
    }
}

impl Default for ImageResizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Calculate the dimensions the source content is scaled to.
///
/// For [`ResizeMode::Contain`] this is the size of the content inside the
/// padded canvas, never larger than the source.
pub fn calculate_dimensions(
    original_width: u32,
    original_height: u32,
    mode: ResizeMode,
) -> Result<(u32, u32)> {
    let original_width = original_width.max(1);
    let original_height = original_height.max(1);

    match mode {
        ResizeMode::ScaleByWidth { width } => {
            if width == 0 {
                return Err(ResizeError::InvalidSpec);
            }
            let aspect_ratio = f64::from(original_height) / f64::from(original_width);
            let height = (f64::from(width) * aspect_ratio).round() as u32;
            Ok((width, height.max(1)))
        }

        ResizeMode::ScaleByHeight { height } => {
            if height == 0 {
                return Err(ResizeError::InvalidSpec);
            }
            let aspect_ratio = f64::from(original_width) / f64::from(original_height);
            let width = (f64::from(height) * aspect_ratio).round() as u32;
            Ok((width.max(1), height))
        }

        ResizeMode::Contain { width, height } => {
            if width == 0 || height == 0 {
                return Err(ResizeError::InvalidSpec);
            }
            if original_width <= width && original_height <= height {
                return Ok((original_width, original_height));
            }

            let scale = (f64::from(width) / f64::from(original_width))
                .min(f64::from(height) / f64::from(original_height));
            let new_width = (f64::from(original_width) * scale).round() as u32;
            let new_height = (f64::from(original_height) * scale).round() as u32;
            Ok((new_width.clamp(1, width), new_height.clamp(1, height)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageBuffer, LumaA};

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let intensity = ((x + y) % 255) as u8;
            Rgb([intensity, intensity, intensity])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_dimension_calculation() {
        let by_width = calculate_dimensions(1000, 800, ResizeMode::ScaleByWidth { width: 500 });
        assert_eq!(by_width.unwrap(), (500, 400));

        let by_height = calculate_dimensions(1000, 800, ResizeMode::ScaleByHeight { height: 400 });
        assert_eq!(by_height.unwrap(), (500, 400));

        // Landscape and portrait content inside a square box
        let contain = ResizeMode::Contain { width: 600, height: 600 };
        assert_eq!(calculate_dimensions(1000, 800, contain).unwrap(), (600, 480));
        assert_eq!(calculate_dimensions(800, 1000, contain).unwrap(), (480, 600));
    }

    #[test]
    fn test_derived_side_is_rounded() {
        // 333 * 100 / 1000 = 33.3
        let (w, h) = calculate_dimensions(1000, 333, ResizeMode::ScaleByWidth { width: 100 }).unwrap();
        assert_eq!((w, h), (100, 33));

        // Very wide images never collapse to zero height
        let (_, h) = calculate_dimensions(10_000, 1, ResizeMode::ScaleByWidth { width: 10 }).unwrap();
        assert_eq!(h, 1);
    }

    #[test]
    fn test_contain_never_enlarges_content() {
        let dims = calculate_dimensions(50, 40, ResizeMode::Contain { width: 200, height: 200 });
        assert_eq!(dims.unwrap(), (50, 40));
    }

    #[test]
    fn test_width_only_allows_upscaling() {
        let resizer = ImageResizer::new();
        let resized = resizer
            .resize(&create_test_image(50, 20), ResizeMode::ScaleByWidth { width: 100 })
            .unwrap();
        assert_eq!(resized.dimensions(), (100, 40));
    }

    #[test]
    fn test_height_only_scales_without_cropping() {
        let resizer = ImageResizer::new();
        let resized = resizer
            .resize(&create_test_image(1000, 800), ResizeMode::ScaleByHeight { height: 200 })
            .unwrap();
        assert_eq!(resized.dimensions(), (250, 200));
    }

    #[test]
    fn test_contain_output_matches_box_exactly() {
        let resizer = ImageResizer::new();
        for (w, h) in [(1000, 800), (800, 1000), (30, 30), (640, 480)] {
            let resized = resizer
                .resize(&create_test_image(w, h), ResizeMode::Contain { width: 120, height: 90 })
                .unwrap();
            assert_eq!(resized.dimensions(), (120, 90), "source {}x{}", w, h);
        }
    }

    #[test]
    fn test_contain_pads_with_fill_color() {
        let resizer = ImageResizer::with_filter(FilterType::Nearest).fill_color([255, 0, 0]);
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 50, Rgb([0, 0, 255])));

        let resized = resizer
            .resize(&image, ResizeMode::Contain { width: 100, height: 100 })
            .unwrap()
            .to_rgb8();

        // Content is centred vertically: rows 25..75
        assert_eq!(resized.get_pixel(50, 5), &Rgb([255, 0, 0]));
        assert_eq!(resized.get_pixel(50, 50), &Rgb([0, 0, 255]));
        assert_eq!(resized.get_pixel(50, 95), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_contain_odd_gap_rounds_offset_up() {
        let resizer = ImageResizer::with_filter(FilterType::Nearest).fill_color([255, 255, 255]);
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 4, Rgb([0, 0, 0])));

        // 10x4 content on a 10x7 canvas leaves a 3 row gap: 2 above, 1 below
        let resized = resizer
            .resize(&image, ResizeMode::Contain { width: 10, height: 7 })
            .unwrap()
            .to_rgb8();

        assert_eq!(resized.get_pixel(5, 1), &Rgb([255, 255, 255]));
        assert_eq!(resized.get_pixel(5, 2), &Rgb([0, 0, 0]));
        assert_eq!(resized.get_pixel(5, 5), &Rgb([0, 0, 0]));
        assert_eq!(resized.get_pixel(5, 6), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_contain_keeps_alpha_transparent() {
        let resizer = ImageResizer::new();
        let image = DynamicImage::ImageLumaA8(ImageBuffer::from_pixel(40, 20, LumaA([10, 255])));

        let resized = resizer
            .resize(&image, ResizeMode::Contain { width: 40, height: 40 })
            .unwrap();
        assert!(resized.color().has_alpha());
        assert_eq!(resized.to_rgba8().get_pixel(0, 0)[3], 0);
        assert_eq!(resized.to_rgba8().get_pixel(20, 20)[3], 255);
    }

    #[test]
    fn test_resize_to_spec() {
        let resizer = ImageResizer::new();
        let image = create_test_image(400, 200);

        let resized = resizer.resize_to_spec(&image, &ResizeSpec::new(Some(100), None)).unwrap();
        assert_eq!(resized.dimensions(), (100, 50));

        let resized = resizer.resize_to_spec(&image, &ResizeSpec::new(Some(64), Some(64))).unwrap();
        assert_eq!(resized.dimensions(), (64, 64));

        assert!(matches!(
            resizer.resize_to_spec(&image, &ResizeSpec::default()),
            Err(ResizeError::InvalidSpec)
        ));
    }

    #[test]
    fn test_invalid_parameters() {
        let resizer = ImageResizer::new();
        let image = create_test_image(100, 100);

        assert!(resizer.resize(&image, ResizeMode::ScaleByWidth { width: 0 }).is_err());
        assert!(resizer.resize(&image, ResizeMode::ScaleByHeight { height: 0 }).is_err());
        assert!(resizer.resize(&image, ResizeMode::Contain { width: 0, height: 100 }).is_err());
    }

    #[test]
    fn test_filter_serde_names() {
        let filter: FilterType = serde_json::from_str("\"catmull-rom\"").unwrap();
        assert_eq!(filter, FilterType::CatmullRom);
        assert_eq!(serde_json::to_string(&FilterType::Lanczos3).unwrap(), "\"lanczos3\"");
    }
}
