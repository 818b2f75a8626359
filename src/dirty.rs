//! Dirty rectangle tracking.

use crate::raster::Raster;

/// A rectangle in raster coordinates.  The right and bottom edges are
/// exclusive.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub struct Rect {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

/// Rectangles touched by the decoders, in the order they were touched.
///
/// The list is not deduplicated; overlapping rectangles are expected.
/// The decoders only ever append to it, except for a full frame
/// recompute which replaces the whole list with a single rectangle.
/// Callers should drain the list after each decode.
#[derive(Clone,Debug,Default)]
pub struct DirtyRects {
    rects: Vec<Rect>,
}

impl Rect {
    pub fn new(left: usize, top: usize, right: usize, bottom: usize) -> Self {
        Rect {
            left: left,
            top: top,
            right: right,
            bottom: bottom,
        }
    }

    pub fn width(&self) -> usize {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

impl DirtyRects {
    pub fn new() -> Self {
        DirtyRects {
            rects: Vec::new(),
        }
    }

    /// Record a touched rectangle.  Empty rectangles are dropped.
    pub fn push(&mut self, rect: Rect) {
        if !rect.is_empty() {
            self.rects.push(rect);
        }
    }

    /// Replace the list with a single rectangle covering a w x h raster.
    pub fn mark_all(&mut self, w: usize, h: usize) {
        self.rects.clear();
        self.push(Rect::new(0, 0, w, h));
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    pub fn as_slice(&self) -> &[Rect] {
        &self.rects[..]
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Remove and return all rectangles.
    pub fn take(&mut self) -> Vec<Rect> {
        ::std::mem::replace(&mut self.rects, Vec::new())
    }

    /// Copy the dirty regions of the raster into a caller surface with
    /// the given pitch, then clear the list.
    ///
    /// Rectangles are clipped to the raster, and rows that do not fit
    /// in the destination are skipped.
    pub fn copy_to_buffer(&mut self, src: &Raster, dst: &mut [u8], pitch: usize) {
        for rect in self.rects.drain(..) {
            let right = rect.right.min(src.width()).min(pitch);
            let bottom = rect.bottom.min(src.height());
            if rect.left >= right {
                continue;
            }

            for y in rect.top..bottom {
                let start = pitch * y + rect.left;
                let end = pitch * y + right;
                if end > dst.len() {
                    break;
                }

                dst[start..end].copy_from_slice(&src.row(y)[rect.left..right]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::raster::Raster;
    use super::*;

    #[test]
    fn test_mark_all_replaces_list() {
        let mut dirty = DirtyRects::new();
        dirty.push(Rect::new(0, 3, 2, 4));
        dirty.push(Rect::new(0, 3, 2, 4));
        assert_eq!(dirty.len(), 2);

        dirty.mark_all(320, 200);
        assert_eq!(dirty.as_slice(), &[Rect::new(0, 0, 320, 200)]);
    }

    #[test]
    fn test_empty_rect_dropped() {
        let mut dirty = DirtyRects::new();
        dirty.push(Rect::new(5, 1, 5, 2));
        assert!(dirty.is_empty());
    }

    #[test]
    fn test_copy_to_buffer() {
        const SCREEN_W: usize = 4;
        const SCREEN_H: usize = 2;
        const PITCH: usize = 6;

        let mut raster = Raster::new(SCREEN_W, SCREEN_H);
        raster.pixels_mut().copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

        let mut dirty = DirtyRects::new();
        dirty.push(Rect::new(1, 0, 3, 1));
        dirty.push(Rect::new(3, 1, 4, 2));

        let mut dst = [0xFF; PITCH * SCREEN_H];
        dirty.copy_to_buffer(&raster, &mut dst, PITCH);

        let expected = [
            0xFF, 2, 3, 0xFF, 0xFF, 0xFF,
            0xFF, 0xFF, 0xFF, 8, 0xFF, 0xFF ];

        assert_eq!(&dst[..], &expected[..]);
        assert!(dirty.is_empty());
    }
}
