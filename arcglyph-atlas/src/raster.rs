//! Distance-field generation with `fdsm`.
//!
//! RGB holds the multi-channel distance of an edge-colored shape, alpha the
//! true signed distance. Both use the glyph transform's full distance range,
//! so 0.5 is the outline, above is inside.

use crate::error::RasterError;
use crate::source::{DistanceBitmap, GlyphTransform};
use fdsm::bezier::scanline::FillRule;
use fdsm::generate::{generate_msdf, generate_sdf};
use fdsm::render::{correct_sign_msdf, correct_sign_sdf};
use fdsm::shape::Shape;
use fdsm::transform::Transform;
use fdsm_ttf_parser::load_shape_from_face;
use image::{GrayImage, RgbImage};
use nalgebra::{Affine2, Matrix3};
use tracing::trace;
use ttf_parser::{Face, GlyphId};

/// Largest cell the rasterizer accepts.
const MAX_CELL: u32 = 1024;

/// Corner angle threshold for edge coloring, as a sine.
const CORNER_SIN_ALPHA: f64 = 0.03;

const COLORING_SEED: u64 = 0;

/// Median and true distance may straddle 0.5 by this much near the outline
/// without counting as a clash.
const CLASH_TOLERANCE: f32 = 1.5 / 255.0;

/// An empty square bitmap, or an allocation error for unusable sizes.
pub(crate) fn allocate(cell_size: u32) -> Result<DistanceBitmap, RasterError> {
    if cell_size == 0 || cell_size > MAX_CELL {
        return Err(RasterError::Allocation {
            width: cell_size,
            height: cell_size,
        });
    }
    Ok(DistanceBitmap::new(cell_size, cell_size))
}

/// The glyph transform as an affine map from font units to bitmap pixels.
pub fn glyph_affine(transform: &GlyphTransform) -> Affine2<f64> {
    let s = transform.scale;
    let t = transform.translate;
    Affine2::from_matrix_unchecked(Matrix3::new(
        s,
        0.0,
        s * t.x,
        0.0,
        s,
        s * t.y,
        0.0,
        0.0,
        1.0,
    ))
}

/// Rasterize glyph `glyph` of `face` into a four channel distance field.
///
/// Bitmap rows follow font y, so row 0 is the bottom of the cell.
pub fn rasterize_mtsdf(
    face: &Face<'_>,
    glyph: GlyphId,
    transform: &GlyphTransform,
    cell_size: u32,
) -> Result<DistanceBitmap, RasterError> {
    let mut bitmap = allocate(cell_size)?;
    let affine = glyph_affine(transform);
    let range = transform.px_range();

    let mut shape = load_shape_from_face(face, glyph);
    shape.transform(&affine);
    let colored = Shape::edge_coloring_simple(shape, CORNER_SIN_ALPHA, COLORING_SEED);
    let prepared = colored.prepare();
    let mut msdf = RgbImage::new(cell_size, cell_size);
    generate_msdf(&prepared, range, &mut msdf);
    correct_sign_msdf(&mut msdf, &prepared, FillRule::Nonzero);

    let mut shape = load_shape_from_face(face, glyph);
    shape.transform(&affine);
    let prepared = shape.prepare();
    let mut sdf = GrayImage::new(cell_size, cell_size);
    generate_sdf(&prepared, range, &mut sdf);
    correct_sign_sdf(&mut sdf, &prepared, FillRule::Nonzero);

    for (x, y, rgb) in msdf.enumerate_pixels() {
        let [r, g, b] = rgb.0;
        let a = sdf.get_pixel(x, y).0[0];
        bitmap.set_texel(x, y, [r, g, b, a].map(|v| f32::from(v) / 255.0));
    }
    trace!("Rasterized glyph {} into {}px cell", glyph.0, cell_size);
    Ok(bitmap)
}

/// Replace the color channels of texels whose median disagrees with the true
/// distance about which side of the outline they are on. Returns the number
/// of texels changed.
pub fn correct_channel_clashes(bitmap: &mut DistanceBitmap) -> usize {
    let mut corrected = 0;
    for y in 0..bitmap.height() {
        for x in 0..bitmap.width() {
            let [r, g, b, a] = bitmap.texel(x, y);
            let median = r.max(g).min(r.min(g).max(b));
            if (median > 0.5) != (a > 0.5) && (median - a).abs() > CLASH_TOLERANCE {
                bitmap.set_texel(x, y, [a; 4]);
                corrected += 1;
            }
        }
    }
    corrected
}
