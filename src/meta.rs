//! Camera metadata normalization: upright the image from its orientation
//! tag and pull GPS coordinates out of the metadata block when present.
//!
//! Missing or unreadable metadata is never an error here; orientation
//! defaults to "already upright" and GPS extraction simply yields nothing.

use exif::{In, Tag, Value};
use image::DynamicImage;
use tracing::debug;

/// Read the EXIF orientation tag (1-8) from raw image bytes.
///
/// Falls back to 1 (no transform) when the container has no EXIF segment,
/// the tag is absent, or the value is out of range.
pub fn orientation(data: &[u8]) -> u16 {
    let Some(exif) = read_exif(data) else {
        return 1;
    };
    let value = exif
        .get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(1);
    if (1..=8).contains(&value) {
        value as u16
    } else {
        1
    }
}

/// Rotate/flip `image` upright according to the orientation tag embedded in
/// `data` (the raw bytes the image was decoded from).
pub fn normalize_orientation(data: &[u8], image: DynamicImage) -> DynamicImage {
    let tag = orientation(data);
    if tag > 1 {
        debug!(tag, "restoring camera orientation");
    }
    apply_orientation(image, tag)
}

/// Apply the flip/rotation sequence documented for an orientation value.
///
/// Values 5-8 describe the camera held sideways; note that `rotate90` in
/// the image crate is clockwise where the original tables speak in
/// counter-clockwise terms.
pub(crate) fn apply_orientation(image: DynamicImage, tag: u16) -> DynamicImage {
    match tag {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.fliph().rotate270(),
        6 => image.rotate90(),
        7 => image.fliph().rotate90(),
        8 => image.rotate270(),
        _ => image,
    }
}

/// Convert a degrees/minutes/seconds triple to signed decimal degrees.
///
/// `negative` flags the southern/western hemisphere.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64, negative: bool) -> f64 {
    let decimal = degrees + minutes / 60.0 + seconds / 3600.0;
    if negative {
        -decimal
    } else {
        decimal
    }
}

/// Extract (latitude, longitude) from the GPS metadata block, if any.
pub fn extract_gps(data: &[u8]) -> Option<(f64, f64)> {
    let exif = read_exif(data)?;

    let lat = rational_triple(&exif, Tag::GPSLatitude)?;
    let lon = rational_triple(&exif, Tag::GPSLongitude)?;
    let south = hemisphere(&exif, Tag::GPSLatitudeRef) == Some('S');
    let west = hemisphere(&exif, Tag::GPSLongitudeRef) == Some('W');

    Some((
        dms_to_decimal(lat[0], lat[1], lat[2], south),
        dms_to_decimal(lon[0], lon[1], lon[2], west),
    ))
}

fn read_exif(data: &[u8]) -> Option<exif::Exif> {
    exif::Reader::new()
        .read_from_container(&mut std::io::Cursor::new(data))
        .ok()
}

fn rational_triple(exif: &exif::Exif, tag: Tag) -> Option<[f64; 3]> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match field.value {
        Value::Rational(ref parts) if parts.len() >= 3 => Some([
            parts[0].to_f64(),
            parts[1].to_f64(),
            parts[2].to_f64(),
        ]),
        _ => None,
    }
}

fn hemisphere(exif: &exif::Exif, tag: Tag) -> Option<char> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match field.value {
        Value::Ascii(ref lines) => lines
            .first()
            .and_then(|line| line.first())
            .map(|byte| *byte as char),
        _ => None,
    }
}
