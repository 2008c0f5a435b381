//! Single-page PDF packaging of a captured bitmap.

use super::options::PageSize;
use crate::error::Result;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbaImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Write;

/// Placement of an image on a page, in points from the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Largest uniform scale that fits `image` inside `page`, centered.
pub fn fit_to_page(image: (u32, u32), page: (f32, f32)) -> Placement {
    let (iw, ih) = (image.0.max(1) as f32, image.1.max(1) as f32);
    let (pw, ph) = page;
    let scale = (pw / iw).min(ph / ih);
    let (width, height) = (iw * scale, ih * scale);
    Placement {
        x: (pw - width) / 2.0,
        y: (ph - height) / 2.0,
        width,
        height,
    }
}

/// Flatten RGBA onto white and return packed RGB bytes.
fn flatten_rgb(image: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::with_capacity((image.width() * image.height() * 3) as usize);
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u16;
        let over = |c: u8| ((c as u16 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        out.extend_from_slice(&[over(r), over(g), over(b)]);
    }
    out
}

/// Build a one-page PDF of `page` size with `image` centered on it.
pub fn image_to_pdf(image: &RgbaImage, page: PageSize, title: &str) -> Result<Vec<u8>> {
    let (page_width, page_height) = page.points();
    let placement = fit_to_page(image.dimensions(), (page_width, page_height));

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&flatten_rgb(image))?;
    let pixels = encoder.finish()?;
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width() as i64,
            "Height" => image.height() as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        pixels,
    ));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    placement.width.into(),
                    0.into(),
                    0.into(),
                    placement.height.into(),
                    placement.x.into(),
                    placement.y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&content.encode()?)?;
    let content_id = doc.add_object(Stream::new(
        dictionary! { "Filter" => "FlateDecode" },
        encoder.finish()?,
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), page_width.into(), page_height.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im1" => image_id },
        },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Producer" => Object::string_literal(concat!("cvbuilder ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    log::debug!(
        "Packed {}x{} bitmap into {} page ({} bytes)",
        image.width(),
        image.height(),
        page.suffix(),
        bytes.len()
    );
    Ok(bytes)
}
