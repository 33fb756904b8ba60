//! Page rectification: find the document's quadrilateral outline in a
//! photograph and perspective-correct it to a flat rectangle.
//!
//! Absence of a usable outline is not an error; callers fall back to the
//! unmodified image. The warp's trustworthiness is reported through a
//! paper-likeness score (see [`crate::geometry::likeness`]) rather than a
//! fixed geometric threshold.

use image::{imageops, GrayImage, Luma, Rgb, RgbImage};
use imageproc::{
    contours::find_contours,
    drawing::draw_polygon_mut,
    edges::canny,
    filter::gaussian_blur_f32,
    geometric_transformations::{warp_into, Interpolation, Projection},
    geometry::{approximate_polygon_dp, arc_length},
    point::Point,
};
use tracing::debug;

use crate::geometry::{self, Corners};

const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 190.0;

/// Polygon approximation tolerance, as a fraction of contour perimeter.
const APPROX_TOLERANCE: f64 = 0.01;

/// Sigma of the smoothing blur applied before edge detection.
const PREPARE_SIGMA: f32 = 1.0;

/// A perspective-corrected page and the confidence in that correction.
#[derive(Debug, Clone)]
pub struct Rectified {
    /// Paper-likeness of the warped rectangle, 100 at an exact ISO-216
    /// aspect ratio.
    pub likeness: f32,
    pub image: RgbImage,
}

/// Blur lightly and reduce to a single intensity channel.
fn prepare(image: &RgbImage) -> GrayImage {
    let blurred = gaussian_blur_f32(image, PREPARE_SIGMA);
    imageops::grayscale(&blurred)
}

/// Find the largest 4-vertex contour in the image, if any.
pub fn locate_page(image: &RgbImage) -> Option<[Point<i32>; 4]> {
    let edges = canny(&prepare(image), CANNY_LOW, CANNY_HIGH);

    let mut best: Option<([Point<i32>; 4], f64)> = None;
    for contour in find_contours::<i32>(&edges) {
        let epsilon = APPROX_TOLERANCE * arc_length(&contour.points, true);
        let approx = approximate_polygon_dp(&contour.points, epsilon, true);
        if approx.len() != 4 {
            continue;
        }
        let area = geometry::contour_area(&approx);
        let larger = best.map_or(true, |(_, best_area)| area > best_area);
        if larger {
            best = Some(([approx[0], approx[1], approx[2], approx[3]], area));
        }
    }

    best.map(|(quad, area)| {
        debug!(area, "located page outline");
        quad
    })
}

/// Perspective-warp the page found in `image` to a flat rectangle.
///
/// Returns `None` when no 4-vertex outline exists or the corner geometry is
/// degenerate; the caller should then use the original image as-is.
pub fn rectify(image: &RgbImage) -> Option<Rectified> {
    let corners = Corners::order(locate_page(image)?);
    let (width, height) = corners.target_size();
    let (out_w, out_h) = (width.round() as u32, height.round() as u32);

    let source = [
        corners.top_left,
        corners.top_right,
        corners.bottom_right,
        corners.bottom_left,
    ];
    let target = [
        (0.0, 0.0),
        (width - 1.0, 0.0),
        (width - 1.0, height - 1.0),
        (0.0, height - 1.0),
    ];
    let projection = Projection::from_control_points(source, target)?;

    let mut warped = RgbImage::new(out_w.max(1), out_h.max(1));
    warp_into(
        image,
        &projection,
        Interpolation::Bilinear,
        Rgb([255, 255, 255]),
        &mut warped,
    );

    let likeness = geometry::likeness(width, height);
    debug!(likeness, out_w, out_h, "rectified page");
    Some(Rectified {
        likeness,
        image: warped,
    })
}

/// Crop to the bounding rectangle of the located page, blanking out
/// everything outside its outline.
///
/// A visual-cleanup alternative to [`rectify`]: no perspective correction
/// and no likeness scoring, just masking for presentation.
pub fn crop_to_bounds(image: &RgbImage) -> Option<RgbImage> {
    let quad = locate_page(image)?;
    let corners = Corners::order(quad);

    // Fill the page polygon into a mask; vertices in role order so the
    // polygon cannot self-intersect.
    let polygon = [
        point_i32(corners.top_left),
        point_i32(corners.top_right),
        point_i32(corners.bottom_right),
        point_i32(corners.bottom_left),
    ];
    let mut mask = GrayImage::new(image.width(), image.height());
    draw_polygon_mut(&mut mask, &polygon, Luma([255u8]));

    let mut masked = image.clone();
    for (x, y, pixel) in masked.enumerate_pixels_mut() {
        if mask.get_pixel(x, y)[0] == 0 {
            *pixel = Rgb([255, 255, 255]);
        }
    }

    let min_x = polygon.iter().map(|p| p.x).min()?.clamp(0, image.width() as i32 - 1) as u32;
    let min_y = polygon.iter().map(|p| p.y).min()?.clamp(0, image.height() as i32 - 1) as u32;
    let max_x = polygon.iter().map(|p| p.x).max()?.clamp(0, image.width() as i32 - 1) as u32;
    let max_y = polygon.iter().map(|p| p.y).max()?.clamp(0, image.height() as i32 - 1) as u32;

    let cropped = imageops::crop_imm(
        &masked,
        min_x,
        min_y,
        max_x - min_x + 1,
        max_y - min_y + 1,
    );
    Some(cropped.to_image())
}

fn point_i32(p: (f32, f32)) -> Point<i32> {
    Point::new(p.0.round() as i32, p.1.round() as i32)
}
