use super::units::Pt;

/// A rectangle specified by two opposite corners, with `(x1, y1)` the
/// lower-left corner and `(x2, y2)` the upper-right corner (PDF coordinates
/// put the origin at the bottom left of the page).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rect {
    pub x1: Pt,
    pub y1: Pt,
    pub x2: Pt,
    pub y2: Pt,
}

impl Rect {
    pub fn new(x1: Pt, y1: Pt, x2: Pt, y2: Pt) -> Rect {
        Rect { x1, y1, x2, y2 }
    }

    /// Build a rectangle from its lower-left corner and a width/height pair
    pub fn from_origin_size(x: Pt, y: Pt, width: Pt, height: Pt) -> Rect {
        Rect {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    pub fn width(&self) -> Pt {
        self.x2 - self.x1
    }

    pub fn height(&self) -> Pt {
        self.y2 - self.y1
    }
}

impl From<Rect> for pdf_writer::Rect {
    fn from(r: Rect) -> Self {
        pdf_writer::Rect {
            x1: r.x1.into(),
            y1: r.y1.into(),
            x2: r.x2.into(),
            y2: r.y2.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_size_round_trips() {
        let r = Rect::from_origin_size(Pt(10.0), Pt(20.0), Pt(100.0), Pt(50.0));
        assert_eq!(r.width(), Pt(100.0));
        assert_eq!(r.height(), Pt(50.0));
        assert_eq!(r.x2, Pt(110.0));
        assert_eq!(r.y2, Pt(70.0));
    }
}
