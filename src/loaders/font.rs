//! typeface.js fonts
//!
//! A typeface file is JSON holding one outline per glyph as a string of
//! drawing commands in font units:
//!
//! ```text
//! m x y          move to
//! l x y          line to
//! q x y cx cy    quadratic curve to (x, y), control point first after the end
//! b x y c1x c1y c2x c2y   cubic curve to (x, y)
//! ```

use std::{collections::HashMap, path::Path, str::SplitWhitespace};

use cgmath::Vector2;
use serde::Deserialize;

use crate::error::AssetError;

use super::triangulate::{point_in_polygon, signed_area};

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    #[serde(default)]
    pub x_min: f32,
    #[serde(default)]
    pub y_min: f32,
    #[serde(default)]
    pub x_max: f32,
    #[serde(default)]
    pub y_max: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Glyph {
    /// Horizontal advance in font units
    #[serde(default)]
    pub ha: f32,
    /// Outline commands; absent for blank glyphs such as space
    #[serde(default)]
    pub o: Option<String>,
}

/// Parsed typeface font
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    #[serde(default)]
    pub family_name: String,
    pub glyphs: HashMap<String, Glyph>,
    pub resolution: f32,
    #[serde(default)]
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub underline_thickness: f32,
}

/// A filled outline with the holes cut out of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    pub outer: Vec<Vector2<f32>>,
    pub holes: Vec<Vec<Vector2<f32>>>,
}

impl Font {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let text = std::fs::read_to_string(path).map_err(|e| AssetError::from_io(path, e))?;
        let font = Self::from_json(&text).map_err(|source| AssetError::Font {
            path: path.to_path_buf(),
            source,
        })?;

        if font.resolution <= 0.0 {
            return Err(AssetError::Malformed {
                path: path.to_path_buf(),
                reason: format!("resolution must be positive, got {}", font.resolution),
            });
        }

        log::debug!(
            "Parsed font '{}' with {} glyphs",
            font.family_name,
            font.glyphs.len()
        );
        Ok(font)
    }

    /// Lays out `text` and returns its filled shapes, scaled so that one em
    /// is `size` units tall.
    ///
    /// Curves are flattened into `curve_segments` straight pieces.
    pub fn generate_shapes(&self, text: &str, size: f32, curve_segments: u32) -> Vec<Shape> {
        let scale = size / self.resolution;
        let line_height = (self.bounding_box.y_max - self.bounding_box.y_min
            + self.underline_thickness)
            * scale;

        let mut shapes = Vec::new();
        let mut offset = Vector2::new(0.0f32, 0.0f32);

        for ch in text.chars() {
            if ch == '\n' {
                offset.x = 0.0;
                offset.y -= line_height;
                continue;
            }

            let mut buf = [0u8; 4];
            let key: &str = ch.encode_utf8(&mut buf);
            let Some(glyph) = self.glyphs.get(key) else {
                log::warn!(
                    "Character '{}' does not exist in font family {}",
                    ch,
                    self.family_name
                );
                continue;
            };

            if let Some(outline) = &glyph.o {
                let contours = trace_outline(outline, scale, offset, curve_segments.max(1));
                shapes.extend(contours_to_shapes(contours));
            }
            offset.x += glyph.ha * scale;
        }

        shapes
    }
}

fn trace_outline(
    outline: &str,
    scale: f32,
    offset: Vector2<f32>,
    segments: u32,
) -> Vec<Vec<Vector2<f32>>> {
    let mut tokens = outline.split_whitespace();
    let mut contours: Vec<Vec<Vector2<f32>>> = Vec::new();
    let mut current: Vec<Vector2<f32>> = Vec::new();

    let point = |tokens: &mut SplitWhitespace<'_>| read_point(tokens, scale, offset);

    while let Some(command) = tokens.next() {
        match command {
            "m" => {
                let Some(p) = point(&mut tokens) else { break };
                if current.len() > 2 {
                    contours.push(std::mem::take(&mut current));
                }
                current.clear();
                current.push(p);
            }
            "l" => {
                let Some(p) = point(&mut tokens) else { break };
                current.push(p);
            }
            "q" => {
                let (Some(end), Some(control)) = (point(&mut tokens), point(&mut tokens)) else {
                    break;
                };
                let Some(&start) = current.last() else { continue };
                for i in 1..=segments {
                    let t = i as f32 / segments as f32;
                    let s = 1.0 - t;
                    current.push(start * (s * s) + control * (2.0 * s * t) + end * (t * t));
                }
            }
            "b" => {
                let (Some(end), Some(c1), Some(c2)) =
                    (point(&mut tokens), point(&mut tokens), point(&mut tokens))
                else {
                    break;
                };
                let Some(&start) = current.last() else { continue };
                for i in 1..=segments {
                    let t = i as f32 / segments as f32;
                    let s = 1.0 - t;
                    current.push(
                        start * (s * s * s)
                            + c1 * (3.0 * s * s * t)
                            + c2 * (3.0 * s * t * t)
                            + end * (t * t * t),
                    );
                }
            }
            other => log::trace!("Ignoring outline command '{}'", other),
        }
    }
    if current.len() > 2 {
        contours.push(current);
    }

    contours.into_iter().map(clean_contour).filter(|c| c.len() > 2).collect()
}

fn read_point(
    tokens: &mut SplitWhitespace<'_>,
    scale: f32,
    offset: Vector2<f32>,
) -> Option<Vector2<f32>> {
    let x: f32 = tokens.next()?.parse().ok()?;
    let y: f32 = tokens.next()?.parse().ok()?;
    Some(Vector2::new(x * scale + offset.x, y * scale + offset.y))
}

/// Drops repeated points and the closing copy of the first point.
fn clean_contour(mut contour: Vec<Vector2<f32>>) -> Vec<Vector2<f32>> {
    const EPSILON: f32 = 1e-7;
    contour.dedup_by(|b, a| (*a - *b).x.abs() < EPSILON && (*a - *b).y.abs() < EPSILON);
    if contour.len() > 1 {
        let (first, last) = (contour[0], contour[contour.len() - 1]);
        if (first - last).x.abs() < EPSILON && (first - last).y.abs() < EPSILON {
            contour.pop();
        }
    }
    contour
}

/// Clockwise contours are solids, counter-clockwise ones are holes in the
/// solid that contains them. A lone contour is solid whatever its winding.
fn contours_to_shapes(contours: Vec<Vec<Vector2<f32>>>) -> Vec<Shape> {
    if contours.len() == 1 {
        return contours
            .into_iter()
            .map(|outer| Shape {
                outer,
                holes: Vec::new(),
            })
            .collect();
    }

    let (solids, holes): (Vec<_>, Vec<_>) =
        contours.into_iter().partition(|c| signed_area(c) < 0.0);

    let mut shapes: Vec<Shape> = solids
        .into_iter()
        .map(|outer| Shape {
            outer,
            holes: Vec::new(),
        })
        .collect();

    for hole in holes {
        let owner = shapes
            .iter()
            .position(|shape| point_in_polygon(hole[0], &shape.outer))
            .or_else(|| shapes.len().checked_sub(1));
        match owner {
            Some(index) => shapes[index].holes.push(hole),
            None => log::warn!("Dropping hole contour with no enclosing outline"),
        }
    }

    shapes
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Glyph "o": a clockwise square with a counter-clockwise square hole,
    /// plus a triangular "v" and a blank space.
    const FONT_JSON: &str = r#"{
        "familyName": "Test Sans",
        "resolution": 1000,
        "underlineThickness": 50,
        "boundingBox": { "xMin": 0, "yMin": -200, "xMax": 1000, "yMax": 800 },
        "glyphs": {
            "o": { "ha": 1000, "o": "m 0 0 l 0 1000 l 1000 1000 l 1000 0 l 0 0 m 250 250 l 750 250 l 750 750 l 250 750 l 250 250" },
            "v": { "ha": 600, "o": "m 0 1000 q 300 0 300 500 l 600 1000" },
            " ": { "ha": 300 }
        }
    }"#;

    fn font() -> Font {
        Font::from_json(FONT_JSON).unwrap()
    }

    #[test]
    fn test_parses_camel_case_fields() {
        let font = font();
        assert_eq!(font.family_name, "Test Sans");
        assert_eq!(font.bounding_box.y_max, 800.0);
        assert!(font.glyphs[" "].o.is_none());
    }

    #[test]
    fn test_hole_is_attached_to_its_outline() {
        let shapes = font().generate_shapes("o", 1.0, 12);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].outer.len(), 4);
        assert_eq!(shapes[0].holes.len(), 1);
        assert!((signed_area(&shapes[0].outer) + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_advance_and_unknown_characters() {
        let shapes = font().generate_shapes("o o#o", 0.5, 12);
        // '#' is skipped, the space only advances
        assert_eq!(shapes.len(), 3);
        let min_x = |s: &Shape| s.outer.iter().map(|p| p.x).fold(f32::MAX, f32::min);
        assert!((min_x(&shapes[1]) - 0.65).abs() < 1e-5);
        assert!((min_x(&shapes[2]) - 1.15).abs() < 1e-5);
    }

    #[test]
    fn test_newline_moves_down_one_line() {
        let shapes = font().generate_shapes("o\no", 1.0, 12);
        let min_y = |s: &Shape| s.outer.iter().map(|p| p.y).fold(f32::MAX, f32::min);
        assert!((min_y(&shapes[0]) - min_y(&shapes[1]) - 1.05).abs() < 1e-5);
    }

    #[test]
    fn test_quadratic_curve_is_flattened() {
        let shapes = font().generate_shapes("v", 1.0, 12);
        assert_eq!(shapes.len(), 1);
        // start, twelve curve points, final line point
        assert_eq!(shapes[0].outer.len(), 14);
        // control point comes second: (300, 500) pulls the midpoint up
        let mid = shapes[0].outer[6];
        assert!((mid.x - 0.225).abs() < 1e-5);
        assert!((mid.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = Font::load(Path::new("/no/such/font.typeface.json")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));
    }
}
