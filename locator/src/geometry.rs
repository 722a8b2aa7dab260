/// A 2D pixel position in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box of a matched region, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The nine named anchor points of this box.
    pub fn anchors(&self) -> AnchorSet {
        AnchorSet::of(self)
    }
}

/// One of the nine named reference points on a matched box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    TopCenter,
    BottomCenter,
    LeftCenter,
    RightCenter,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::Center,
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomLeft,
        Anchor::BottomRight,
        Anchor::TopCenter,
        Anchor::BottomCenter,
        Anchor::LeftCenter,
        Anchor::RightCenter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Anchor::Center => "center",
            Anchor::TopLeft => "top_left",
            Anchor::TopRight => "top_right",
            Anchor::BottomLeft => "bottom_left",
            Anchor::BottomRight => "bottom_right",
            Anchor::TopCenter => "top_center",
            Anchor::BottomCenter => "bottom_center",
            Anchor::LeftCenter => "left_center",
            Anchor::RightCenter => "right_center",
        }
    }

    /// Parse one of the nine anchor names (`center`, `top_left`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }
}

/// All nine anchor points computed from one box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorSet {
    pub center: Point,
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
    pub top_center: Point,
    pub bottom_center: Point,
    pub left_center: Point,
    pub right_center: Point,
}

impl AnchorSet {
    /// Compute the anchor points of `b`. Center coordinates use truncating
    /// integer division, so odd-sized boxes round toward the top-left.
    pub fn of(b: &BoundingBox) -> Self {
        let right = b.x + b.width as i32;
        let bottom = b.y + b.height as i32;
        let cx = b.x + (b.width / 2) as i32;
        let cy = b.y + (b.height / 2) as i32;
        Self {
            center: Point::new(cx, cy),
            top_left: Point::new(b.x, b.y),
            top_right: Point::new(right, b.y),
            bottom_left: Point::new(b.x, bottom),
            bottom_right: Point::new(right, bottom),
            top_center: Point::new(cx, b.y),
            bottom_center: Point::new(cx, bottom),
            left_center: Point::new(b.x, cy),
            right_center: Point::new(right, cy),
        }
    }

    /// Look up one anchor point by name.
    pub fn point(&self, anchor: Anchor) -> Point {
        match anchor {
            Anchor::Center => self.center,
            Anchor::TopLeft => self.top_left,
            Anchor::TopRight => self.top_right,
            Anchor::BottomLeft => self.bottom_left,
            Anchor::BottomRight => self.bottom_right,
            Anchor::TopCenter => self.top_center,
            Anchor::BottomCenter => self.bottom_center,
            Anchor::LeftCenter => self.left_center,
            Anchor::RightCenter => self.right_center,
        }
    }
}
