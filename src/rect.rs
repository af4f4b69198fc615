use serde::{Deserialize, Serialize};

/// A room rectangle in grid coordinates. `x1,y1` is the top-left corner and
/// `x2,y2` the bottom-right; the one-cell edge ring is the room's wall, so
/// only the interior gets carved.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Rect {
        assert!(w > 0 && h > 0, "degenerate room {}x{}", w, h);
        Rect {
            x1: x,
            y1: y,
            x2: x + w,
            y2: y + h,
        }
    }

    /// Inclusive-bounds overlap test; rooms that merely touch count as
    /// intersecting so accepted rooms always keep a wall between them.
    pub fn intersect(&self, other: &Rect) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }

    pub fn center(&self) -> (i32, i32) {
        ((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_is_integer_midpoint() {
        let room = Rect::new(10, 10, 6, 4);
        assert_eq!(room.center(), (13, 12));
    }

    #[test]
    fn overlapping_rooms_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert!(a.intersect(&b));
        assert!(b.intersect(&a));
    }

    #[test]
    fn touching_rooms_intersect() {
        let a = Rect::new(0, 0, 5, 5);
        let b = Rect::new(5, 0, 5, 5);
        assert!(a.intersect(&b));
    }

    #[test]
    fn distant_rooms_do_not_intersect() {
        let a = Rect::new(0, 0, 5, 5);
        let b = Rect::new(20, 20, 5, 5);
        assert!(!a.intersect(&b));
    }
}
