//! Texture loading and data structures.
//! Decodes PNG/JPEG into RGBA8 ready for GPU upload.

use std::path::Path;

use anyhow::{Context, ensure};

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

/// Supported texture formats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureFormat {
    Rgba8,
}

/// Byte length of an RGBA8 image, `None` if it does not fit in memory.
fn rgba8_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(4)
}

impl TextureData {
    /// Create a new texture with given dimensions and RGBA8 format.
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> anyhow::Result<Self> {
        let expected = rgba8_len(width, height)
            .with_context(|| format!("Texture size {width}x{height} overflows"))?;
        ensure!(
            data.len() == expected,
            "Data size {} doesn't match RGBA8 {width}x{height} ({expected} bytes)",
            data.len()
        );
        Ok(Self {
            data,
            width,
            height,
            format: TextureFormat::Rgba8,
        })
    }

    /// Load a texture from an image file (format guessed from content).
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::debug!("Decoding texture {:?}", path);

        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to open image {:?}", path))?;
        let texture = Self::from_bytes(&bytes)
            .with_context(|| format!("Failed to decode image {:?}", path))?;

        log::debug!(
            "Decoded texture {}x{} with {} bytes",
            texture.width,
            texture.height,
            texture.data.len()
        );
        Ok(texture)
    }

    /// Decode an in-memory image.
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let img = image::load_from_memory(bytes).context("Failed to decode image bytes")?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::new_rgba8(width, height, rgba.into_raw())
    }

    /// 1x1 texture of a single color. White is the default material image.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            data: rgba.to_vec(),
            width: 1,
            height: 1,
            format: TextureFormat::Rgba8,
        }
    }

    /// Get the number of bytes per pixel for the format.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self.format {
            TextureFormat::Rgba8 => 4,
        }
    }

    /// Row pitch in bytes.
    pub fn bytes_per_row(&self) -> u32 {
        self.width.saturating_mul(self.bytes_per_pixel())
    }

    /// Check if the texture data is valid.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && rgba8_len(self.width, self.height) == Some(self.data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .expect("encode png");
        out.into_inner()
    }

    #[test]
    fn solid_is_one_valid_pixel() {
        let t = TextureData::solid([255, 255, 255, 255]);
        assert!(t.is_valid());
        assert_eq!((t.width, t.height), (1, 1));
        assert_eq!(t.bytes_per_row(), 4);
    }

    #[test]
    fn decodes_png_bytes() {
        let t = TextureData::from_bytes(&png_bytes(3, 2)).expect("decode");
        assert_eq!((t.width, t.height), (3, 2));
        assert!(t.is_valid());
        assert_eq!(&t.data[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn garbage_bytes_fail() {
        assert!(TextureData::from_bytes(b"definitely not an image").is_err());
    }

    #[test]
    fn mismatched_pixel_buffer_is_an_error() {
        assert!(TextureData::new_rgba8(2, 2, vec![0; 15]).is_err());
        assert!(TextureData::new_rgba8(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn huge_dimensions_do_not_overflow() {
        // 65536 * 65536 * 4 wraps to 0 in u32 arithmetic.
        assert!(TextureData::new_rgba8(65536, 65536, Vec::new()).is_err());
        let bogus = TextureData {
            data: Vec::new(),
            width: 65536,
            height: 65536,
            format: TextureFormat::Rgba8,
        };
        assert!(!bogus.is_valid());
    }

    #[test]
    fn loads_png_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("canvas.png");
        std::fs::write(&file, png_bytes(5, 3)).expect("write png");
        let t = TextureData::load(&file).expect("load");
        assert_eq!((t.width, t.height), (5, 3));
        assert!(t.is_valid());
    }

    #[test]
    fn missing_file_fails() {
        assert!(TextureData::load("/nonexistent/dir/leather.jpg").is_err());
    }
}
