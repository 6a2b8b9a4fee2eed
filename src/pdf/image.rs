use super::refs::{ObjectReferences, RefType};
use crate::error::RenderError;
use image::DynamicImage;
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::{Filter, Finish, Pdf};
use std::path::Path;

/// How the pixel data is carried in the PDF. JPEG files that are already
/// 8-bit RGB are embedded as-is with a DCT filter; everything else is
/// decoded and re-compressed with zlib.
enum Encoding {
    Jpeg(Vec<u8>),
    Flate { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

/// A raster image (background photograph or locator code) ready for
/// embedding as an image XObject
pub struct Image {
    width: u32,
    height: u32,
    encoding: Encoding,
}

impl Image {
    /// Load an image from disk. PNG and JPEG are supported, which covers the
    /// background assets and anything the locator generator produces.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Image, RenderError> {
        let data = std::fs::read(path.as_ref())?;
        let format = image::guess_format(&data)?;
        let decoded = image::load_from_memory_with_format(&data, format)?;

        if format == image::ImageFormat::Jpeg && decoded.color() == image::ColorType::Rgb8 {
            return Ok(Image {
                width: decoded.width(),
                height: decoded.height(),
                encoding: Encoding::Jpeg(data),
            });
        }

        Ok(Self::from_dynamic(&decoded))
    }

    /// Encode an already-decoded image
    pub fn from_dynamic(image: &DynamicImage) -> Image {
        use image::GenericImageView;
        let level = CompressionLevel::DefaultLevel as u8;

        let alpha = image.color().has_alpha().then(|| {
            let alphas: Vec<u8> = image.pixels().map(|p| (p.2).0[3]).collect();
            compress_to_vec_zlib(&alphas, level)
        });
        let rgb = compress_to_vec_zlib(image.to_rgb8().as_raw(), level);

        Image {
            width: image.width(),
            height: image.height(),
            encoding: Encoding::Flate { rgb, alpha },
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, index: usize, writer: &mut Pdf) {
        let id = refs.gen(RefType::Image(index));

        let (filter, bytes, alpha) = match &self.encoding {
            Encoding::Jpeg(bytes) => (Filter::DctDecode, bytes, None),
            Encoding::Flate { rgb, alpha } => (Filter::FlateDecode, rgb, alpha.as_ref()),
        };

        let mut xobject = writer.image_xobject(id, bytes.as_slice());
        xobject.filter(filter);
        xobject.width(self.width as i32);
        xobject.height(self.height as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);

        let mask_id = alpha.map(|_| refs.gen(RefType::ImageMask(index)));
        if let Some(mask_id) = mask_id {
            xobject.s_mask(mask_id);
        }
        xobject.finish();

        if let (Some(mask_id), Some(alpha)) = (mask_id, alpha) {
            let mut mask = writer.image_xobject(mask_id, alpha.as_slice());
            mask.filter(Filter::FlateDecode);
            mask.width(self.width as i32);
            mask.height(self.height as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_grayscale_as_flate_rgb() {
        let gray = image::GrayImage::from_pixel(4, 4, image::Luma([128u8]));
        let img = Image::from_dynamic(&DynamicImage::ImageLuma8(gray));
        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 4);
        assert!(matches!(
            img.encoding,
            Encoding::Flate { alpha: None, .. }
        ));
    }
}
