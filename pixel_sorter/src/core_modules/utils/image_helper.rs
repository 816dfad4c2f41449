// Decoding into and encoding out of a `PixelGrid`. Any input the `image` crate
// recognises by content (PNG, JPEG, GIF, ...) is widened to RGBA16; output is
// always an 8-bit RGBA PNG.

pub mod image_helper {
    use crate::core_modules::grid::PixelGrid;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::error::SortError;
    use image::{DynamicImage, ImageBuffer, ImageEncoder, ImageFormat, ImageReader, Rgba};
    use std::fs::File;
    use std::io::BufWriter;
    use std::path::Path;

    /// Reads and decodes `path`. Also returns the detected format, when known.
    pub fn load(path: &Path) -> Result<(PixelGrid, Option<ImageFormat>), SortError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader.format();
        let image = reader.decode().map_err(SortError::Decode)?;
        Ok((from_dynamic(image)?, format))
    }

    pub fn from_dynamic(image: DynamicImage) -> Result<PixelGrid, SortError> {
        let rgba = image.into_rgba16();
        let (width, height) = (rgba.width() as usize, rgba.height() as usize);
        if width == 0 || height == 0 {
            return Err(SortError::EmptyImage { width, height });
        }
        let pixels = rgba.pixels().map(|p| Pixel::from(*p)).collect();
        PixelGrid::new(width, height, pixels)
    }

    pub fn to_dynamic(grid: &PixelGrid) -> Result<DynamicImage, SortError> {
        let (width, height) = (grid.width(), grid.height());
        let mismatch = || SortError::DimensionMismatch {
            len: grid.pixels().len(),
            width,
            height,
        };
        let (w, h) = (
            u32::try_from(width).map_err(|_| mismatch())?,
            u32::try_from(height).map_err(|_| mismatch())?,
        );

        let raw: Vec<u16> = grid.pixels().iter().flat_map(Pixel::channels).collect();
        let buffer = ImageBuffer::<Rgba<u16>, Vec<u16>>::from_raw(w, h, raw).ok_or_else(mismatch)?;
        Ok(DynamicImage::ImageRgba16(buffer))
    }

    /// Writes `grid` to `path` as an 8-bit RGBA PNG.
    pub fn save(path: &Path, grid: &PixelGrid) -> Result<(), SortError> {
        let rgba8 = to_dynamic(grid)?.into_rgba8();
        let output = BufWriter::new(File::create(path)?);
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder
            .write_image(
                rgba8.as_raw(),
                rgba8.width(),
                rgba8.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(SortError::Encode)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::image_helper::*;
    use crate::core_modules::grid::PixelGrid;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::error::SortError;
    use image::ImageFormat;
    use std::path::PathBuf;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pixel_sorter_{}_{name}", std::process::id()))
    }

    #[test]
    fn save_and_reload_gradient_file() {
        let width = 16;
        let height = 9;
        let pixels = (0..width * height)
            .map(|i| Pixel::from_rgb8((i % 256) as u8, (i * 3 % 256) as u8, 40))
            .collect();
        let grid = PixelGrid::new(width, height, pixels).unwrap();
        let path = scratch_path("gradient.png");

        save(&path, &grid).expect("Error Saving File.");
        let (reloaded, format) = load(&path).expect("Error Loading File.");
        std::fs::remove_file(&path).ok();

        assert_eq!(format, Some(ImageFormat::Png));
        assert_eq!(reloaded, grid);
    }

    #[test]
    fn format_is_detected_from_content() {
        let grid = PixelGrid::filled(3, 2, Pixel::from_rgb8(200, 10, 10));
        // Wrong extension on purpose.
        let path = scratch_path("really_a_png.jpg");

        save(&path, &grid).unwrap();
        let (_, format) = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(format, Some(ImageFormat::Png));
    }

    #[test]
    fn to_dynamic_keeps_grid_dimensions() {
        let grid = PixelGrid::filled(5, 2, Pixel::new(1, 2, 3, 4));
        let image = to_dynamic(&grid).unwrap();
        assert_eq!((image.width(), image.height()), (5, 2));
        assert_eq!(image.to_rgba16().get_pixel(4, 1).0, [1, 2, 3, 4]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load(&scratch_path("does_not_exist.png")).unwrap_err();
        assert!(matches!(err, SortError::Io(_)));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let path = scratch_path("garbage.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        let err = load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, SortError::Decode(_)));
    }

    #[test]
    fn unwritable_destination_is_an_io_error() {
        let grid = PixelGrid::filled(1, 1, Pixel::default());
        let path = scratch_path("missing_dir").join("out.png");
        assert!(matches!(save(&path, &grid), Err(SortError::Io(_))));
    }
}
