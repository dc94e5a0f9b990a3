#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }
}

/// Axis-aligned bounding box in canvas pixels. `x`/`y` is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }

    pub fn at(position: Vector2D, width: f64, height: f64) -> Self {
        Rect::new(position.x, position.y, width, height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Vector2D {
        Vector2D::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict overlap on all four half-planes: rectangles that only share an edge do not touch.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Overlap test where both far edges are pulled in by `margin`.
    ///
    /// This is the forgiving ship hitbox: the margin is subtracted from the
    /// right/bottom extent of each rectangle before the strict test.
    pub fn overlaps_with_margin(&self, other: &Rect, margin: f64) -> bool {
        self.x < other.right() - margin
            && self.right() - margin > other.x
            && self.y < other.bottom() - margin
            && self.bottom() - margin > other.y
    }

    /// Largest rectangle with the given aspect ratio that fits in `fraction` of
    /// `bounds`, centred inside it.
    pub fn fit_centered(aspect: f64, bounds: Rect, fraction: f64) -> Rect {
        let max_width = bounds.width * fraction;
        let max_height = bounds.height * fraction;
        let (width, height) = if max_width / max_height > aspect {
            (max_height * aspect, max_height)
        } else {
            (max_width, max_width / aspect)
        };
        let center = bounds.center();
        Rect::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }
}

/// Colours the game paints with. Kept independent of the terminal backend so the
/// core never touches crossterm types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    White,
    Grey,
    Cyan,
    Brown,
    Yellow,
}
