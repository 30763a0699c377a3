// ABOUTME: Picture placement for the image-deck application
// ABOUTME: Fits an image into the slide content area without distorting it

use thiserror::Error;

pub const EMU_PER_INCH: i64 = 914400;

/// An axis-aligned box on a slide, in EMU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Rect {
    pub fn right(&self) -> i64 {
        self.x + self.cx
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.cy
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Shrink by `margin` on every side
    pub fn inset(&self, margin: i64) -> Rect {
        Rect {
            x: self.x + margin,
            y: self.y + margin,
            cx: self.cx - 2 * margin,
            cy: self.cy - 2 * margin,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    #[error("image has zero width or height ({0}x{1})")]
    ZeroDimension(u32, u32),

    #[error("content area is empty")]
    EmptyContentArea,
}

/// Largest centered rectangle with the image's aspect ratio inside the content area.
///
/// `image` is the source size in pixels, `slide` the slide size in EMU and `margin`
/// the blank border kept on each side.
pub fn layout(image: (u32, u32), slide: (i64, i64), margin: i64) -> Result<Rect, LayoutError> {
    let (img_w, img_h) = image;
    if img_w == 0 || img_h == 0 {
        return Err(LayoutError::ZeroDimension(img_w, img_h));
    }

    let area = Rect {
        x: 0,
        y: 0,
        cx: slide.0,
        cy: slide.1,
    }
    .inset(margin);
    if area.cx <= 0 || area.cy <= 0 {
        return Err(LayoutError::EmptyContentArea);
    }

    let image_ratio = img_w as f64 / img_h as f64;
    let area_ratio = area.cx as f64 / area.cy as f64;

    // Clamped so rounding can never push the box past the area or below one EMU
    let (cx, cy) = if area_ratio > image_ratio {
        let cx = (area.cy as f64 * image_ratio).round() as i64;
        (cx.clamp(1, area.cx), area.cy)
    } else {
        let cy = (area.cx as f64 / image_ratio).round() as i64;
        (area.cx, cy.clamp(1, area.cy))
    };

    Ok(Rect {
        x: area.x + (area.cx - cx) / 2,
        y: area.y + (area.cy - cy) / 2,
        cx,
        cy,
    })
}
