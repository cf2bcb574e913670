use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world pixels. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Strict overlap test: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Integer pixel origin used for mask alignment.
    pub fn pixel_origin(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }
}

/// Which edge of a partially revealed mask stays fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Bottom,
}

/// Pixel count of a `width`×`height` mask.
fn area(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Per-pixel collision mask, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    pub fn filled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; area(width, height)],
        }
    }

    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; area(width, height)],
        }
    }

    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity(area(width, height));
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[y as usize * self.width as usize + x as usize]
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|&b| b)
    }

    pub fn flipped_vertical(&self) -> Self {
        Self::from_fn(self.width, self.height, |x, y| {
            self.get(x, self.height - 1 - y)
        })
    }

    /// Nearest-neighbour resample to a new size.
    pub fn scaled(&self, width: u32, height: u32) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }
        if self.width == 0 || self.height == 0 {
            return Self::empty(width, height);
        }
        Self::from_fn(width, height, |x, y| {
            let sx = (x as u64 * self.width as u64 / width as u64) as u32;
            let sy = (y as u64 * self.height as u64 / height as u64) as u32;
            self.get(sx, sy)
        })
    }

    /// Keep only `visible_rows` rows adjacent to `anchor`; everything else is cleared.
    pub fn revealed(&self, visible_rows: u32, anchor: Anchor) -> Self {
        let visible_rows = visible_rows.min(self.height);
        let first_visible = match anchor {
            Anchor::Top => 0,
            Anchor::Bottom => self.height - visible_rows,
        };
        let last_visible = first_visible + visible_rows;
        Self::from_fn(self.width, self.height, |x, y| {
            y >= first_visible && y < last_visible && self.get(x, y)
        })
    }

    /// Whether any set pixel of `other`, placed at `offset` relative to this
    /// mask's origin, coincides with a set pixel of this mask.
    pub fn overlaps(&self, other: &Mask, offset: (i32, i32)) -> bool {
        let (ox, oy) = offset;
        let x_start = ox.max(0);
        let y_start = oy.max(0);
        let x_end = (ox + other.width as i32).min(self.width as i32);
        let y_end = (oy + other.height as i32).min(self.height as i32);
        if x_start >= x_end || y_start >= y_end {
            return false;
        }
        for y in y_start..y_end {
            for x in x_start..x_end {
                if self.get(x as u32, y as u32) && other.get((x - ox) as u32, (y - oy) as u32) {
                    return true;
                }
            }
        }
        false
    }
}

/// Per-pixel test between two positioned masks.
pub fn masks_collide(a_rect: &Rect, a_mask: &Mask, b_rect: &Rect, b_mask: &Mask) -> bool {
    let (ax, ay) = a_rect.pixel_origin();
    let (bx, by) = b_rect.pixel_origin();
    a_mask.overlaps(b_mask, (bx - ax, by - ay))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&b.translated(0.0, -1.0)));
    }

    #[test]
    fn masks_overlap_only_on_set_pixels() {
        let left_half = Mask::from_fn(10, 10, |x, _| x < 5);
        let full = Mask::filled(10, 10);
        assert!(left_half.overlaps(&full, (4, 0)));
        assert!(!left_half.overlaps(&full, (5, 0)));
        assert!(!left_half.overlaps(&full, (0, 10)));
    }

    #[test]
    fn positioned_masks_use_floored_origins() {
        let mask = Mask::filled(4, 4);
        let a = Rect::new(0.0, 0.0, 4.0, 4.0);
        // 3.9 floors to 3, so the last column still overlaps.
        assert!(masks_collide(&a, &mask, &Rect::new(3.9, 0.0, 4.0, 4.0), &mask));
        assert!(!masks_collide(&a, &mask, &Rect::new(4.0, 0.0, 4.0, 4.0), &mask));
    }

    #[test]
    fn empty_mask_never_collides() {
        let empty = Mask::empty(8, 8);
        let full = Mask::filled(8, 8);
        assert!(empty.is_empty());
        assert!(!empty.overlaps(&full, (0, 0)));
    }

    #[test]
    fn reveal_keeps_rows_next_to_anchor() {
        let full = Mask::filled(4, 10);
        let bottom = full.revealed(3, Anchor::Bottom);
        assert_eq!(bottom.count(), 12);
        assert!(bottom.get(0, 9) && bottom.get(0, 7));
        assert!(!bottom.get(0, 6));

        let top = full.revealed(3, Anchor::Top);
        assert!(top.get(0, 0) && top.get(0, 2));
        assert!(!top.get(0, 3));
    }

    #[test]
    fn scaling_preserves_shape() {
        let lower_half = Mask::from_fn(16, 16, |_, y| y >= 8);
        let big = lower_half.scaled(32, 32);
        assert_eq!(big.width(), 32);
        assert!(!big.get(0, 15));
        assert!(big.get(0, 16));
    }

    #[test]
    fn vertical_flip_mirrors_rows() {
        let top_row = Mask::from_fn(3, 3, |_, y| y == 0);
        let flipped = top_row.flipped_vertical();
        assert!(flipped.get(1, 2));
        assert!(!flipped.get(1, 0));
    }

    #[test]
    fn large_masks_size_without_overflow() {
        // 70_000² overflows u32, so the area must be computed wider.
        assert_eq!(area(70_000, 70_000), 4_900_000_000);
        let tall = Mask::empty(1, 70_000);
        assert!(!tall.get(0, 69_999));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn mask_strategy() -> impl Strategy<Value = Mask> {
            (1u32..12, 1u32..12, any::<u64>()).prop_map(|(w, h, seed)| {
                Mask::from_fn(w, h, |x, y| (seed >> ((x * 7 + y * 3) % 64)) & 1 == 1)
            })
        }

        proptest! {
            #[test]
            fn collision_is_symmetric(
                a in mask_strategy(),
                b in mask_strategy(),
                ax in -20.0f32..20.0,
                ay in -20.0f32..20.0,
                bx in -20.0f32..20.0,
                by in -20.0f32..20.0,
            ) {
                let ra = Rect::new(ax, ay, a.width() as f32, a.height() as f32);
                let rb = Rect::new(bx, by, b.width() as f32, b.height() as f32);
                prop_assert_eq!(masks_collide(&ra, &a, &rb, &b), masks_collide(&rb, &b, &ra, &a));
            }

            #[test]
            fn reveal_stays_next_to_anchor(
                mask in mask_strategy(),
                rows in 0u32..16,
                bottom in any::<bool>(),
            ) {
                let anchor = if bottom { Anchor::Bottom } else { Anchor::Top };
                let shown = mask.revealed(rows, anchor);
                let visible = rows.min(mask.height());
                prop_assert!(shown.count() <= (visible * mask.width()) as usize);
                for y in 0..mask.height() {
                    let near_anchor = match anchor {
                        Anchor::Top => y < visible,
                        Anchor::Bottom => y >= mask.height() - visible,
                    };
                    for x in 0..mask.width() {
                        let expected = near_anchor && mask.get(x, y);
                        prop_assert_eq!(shown.get(x, y), expected);
                    }
                }
            }
        }
    }
}
