//! The locator code: a QR image encoding the URL where the generated
//! contract will be hosted. Generation failure is fatal, consistent with
//! the no-partial-output policy.

use crate::baseurl::BaseUrl;
use crate::error::RenderError;
use image::{GrayImage, Luma};
use qrcode::{Color, EcLevel, QrCode};

/// Pixels per QR module in the rasterised image
const MODULE_SCALE: u32 = 4;
/// Quiet-zone border around the code, in modules
const QUIET_ZONE: u32 = 4;

/// A scannable locator embedded into the contract. The URL is byte-stable
/// for identical input and environment; the image exists only inside the
/// output document.
pub struct LocatorCode {
    pub url: String,
    pub image: GrayImage,
}

/// The URL a contract will be reachable under once the caller stores it in
/// its uploads directory
pub fn locator_url(base: &BaseUrl, filename: &str) -> String {
    format!("{}/uploads/{}", base.origin(), filename)
}

impl LocatorCode {
    /// Encode `url` at error-correction level H, the level small embedded
    /// prints need to stay scannable
    pub fn generate(url: String) -> Result<LocatorCode, RenderError> {
        let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::H)?;
        let modules = code.width() as u32;
        let colors = code.to_colors();

        let side = (modules + 2 * QUIET_ZONE) * MODULE_SCALE;
        let mut image = GrayImage::from_pixel(side, side, Luma([255u8]));
        for (i, color) in colors.iter().enumerate() {
            if *color == Color::Dark {
                let mx = (i as u32 % modules + QUIET_ZONE) * MODULE_SCALE;
                let my = (i as u32 / modules + QUIET_ZONE) * MODULE_SCALE;
                for dy in 0..MODULE_SCALE {
                    for dx in 0..MODULE_SCALE {
                        image.put_pixel(mx + dx, my + dy, Luma([0u8]));
                    }
                }
            }
        }

        Ok(LocatorCode { url, image })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_origin_uploads_and_filename() {
        assert_eq!(
            locator_url(&BaseUrl::Local, "order_17.pdf"),
            "http://localhost:5000/uploads/order_17.pdf"
        );
        assert_eq!(
            locator_url(&BaseUrl::PlatformDomain("app.dev".into()), "c.pdf"),
            "https://app.dev/uploads/c.pdf"
        );
    }

    #[test]
    fn url_is_stable_across_runs() {
        let a = locator_url(&BaseUrl::Local, "order_17.pdf");
        let b = locator_url(&BaseUrl::Local, "order_17.pdf");
        assert_eq!(a, b);
    }

    #[test]
    fn generates_a_square_image_with_quiet_zone() {
        let code = LocatorCode::generate("http://localhost:5000/uploads/x.pdf".into())
            .expect("QR generation succeeds");
        let side = code.image.width();
        assert_eq!(side, code.image.height());
        // a version-1 code is 21 modules; ours carries a URL so it can only
        // be larger
        assert!(side >= (21 + 2 * QUIET_ZONE) * MODULE_SCALE);
        // corners are inside the quiet zone, so they must be white
        assert_eq!(code.image.get_pixel(0, 0).0[0], 255);
    }
}
