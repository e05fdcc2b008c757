use kurbo::{Point, Rect, Size};

/// Compass direction for the callout arrow: which side of the anchor the
/// expanded panel sits on (the arrow points back toward the anchor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CardinalDir {
    North,
    East,
    South,
    West,
}

/// Padding/placement helpers over [`kurbo::Rect`] that the layout code leans
/// on. kurbo already provides `union`, `contains` and `center`.
pub trait RectExt: Sized {
    /// Grow (or shrink, for negative `d`) on all four sides.
    fn padded(&self, d: f64) -> Self;

    /// Grow on the left and right sides only.
    fn h_padded(&self, d: f64) -> Self;

    /// A `size`-sized rect sharing this rect's center.
    fn centred_inside(&self, size: Size) -> Self;

    /// Translate so that the rect's origin lands at `origin`.
    fn at_origin(&self, origin: Point) -> Self;
}

impl RectExt for Rect {
    fn padded(&self, d: f64) -> Self {
        Rect::new(self.x0 - d, self.y0 - d, self.x1 + d, self.y1 + d)
    }

    fn h_padded(&self, d: f64) -> Self {
        Rect::new(self.x0 - d, self.y0, self.x1 + d, self.y1)
    }

    fn centred_inside(&self, size: Size) -> Self {
        let c = self.center();
        Rect::new(
            c.x - size.width / 2.0,
            c.y - size.height / 2.0,
            c.x + size.width / 2.0,
            c.y + size.height / 2.0,
        )
    }

    fn at_origin(&self, origin: Point) -> Self {
        Rect::new(
            origin.x,
            origin.y,
            origin.x + self.width(),
            origin.y + self.height(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_expands_all_sides() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0).padded(5.0);
        assert_eq!(r, Rect::new(5.0, 5.0, 25.0, 25.0));
    }

    #[test]
    fn h_padded_leaves_vertical_alone() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0).h_padded(2.0);
        assert_eq!(r, Rect::new(8.0, 10.0, 22.0, 20.0));
    }

    #[test]
    fn centred_inside_shares_center() {
        let outer = Rect::new(0.0, 0.0, 100.0, 50.0);
        let inner = outer.centred_inside(Size::new(10.0, 10.0));
        assert_eq!(inner.center(), outer.center());
        assert_eq!(inner.width(), 10.0);
        assert_eq!(inner.height(), 10.0);
    }

    #[test]
    fn negative_padding_shrinks() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).padded(-2.0);
        assert_eq!(r, Rect::new(2.0, 2.0, 8.0, 8.0));
    }
}
