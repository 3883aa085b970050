use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Point {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Point {
    pub(crate) const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub(crate) fn dist(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub(crate) fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned furniture footprint, `x1 < x2`, `y1 < y2`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Rect {
    pub(crate) x1: f32,
    pub(crate) y1: f32,
    pub(crate) x2: f32,
    pub(crate) y2: f32,
}

impl Rect {
    pub(crate) const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub(crate) fn expand(self, by: f32) -> Rect {
        Rect::new(self.x1 - by, self.y1 - by, self.x2 + by, self.y2 + by)
    }

    /// Strict interior test; points on the edge are outside.
    pub(crate) fn contains(self, p: Point) -> bool {
        p.x > self.x1 && p.x < self.x2 && p.y > self.y1 && p.y < self.y2
    }
}

/// Named spots in the room. Routine steps and task categories refer to these,
/// never to raw coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) enum Location {
    Laptop,
    Cart,
    Calendar,
    Shelf,
    Plant,
    Bed,
    BedSleep,
    Cushion,
    Desk,
    Center,
}

impl Location {
    pub(crate) fn point(self) -> Point {
        match self {
            Location::Laptop => Point::new(190.0, 344.0),
            Location::Cart => Point::new(368.0, 420.0),
            Location::Calendar => Point::new(412.0, 268.0),
            Location::Shelf => Point::new(400.0, 142.0),
            Location::Plant => Point::new(440.0, 404.0),
            Location::Bed => Point::new(214.0, 214.0),
            Location::BedSleep => Point::new(124.0, 96.0),
            Location::Cushion => Point::new(190.0, 344.0),
            Location::Desk => Point::new(162.0, 342.0),
            Location::Center => Point::new(260.0, 300.0),
        }
    }

    /// Spots inside furniture that the pet walks into instead of stopping
    /// at the nearest free point.
    pub(crate) fn enter_directly(self) -> bool {
        matches!(self, Location::Shelf | Location::BedSleep)
    }

    /// Furniture associated with a task category.
    pub(crate) fn for_category(category: &str) -> Location {
        match category {
            "coding" => Location::Laptop,
            "shopping" => Location::Cart,
            "calendar" => Location::Calendar,
            "writing" => Location::Shelf,
            "research" => Location::Desk,
            _ => Location::Center,
        }
    }
}

const RING_RADII: [f32; 7] = [10.0, 20.0, 30.0, 40.0, 55.0, 70.0, 90.0];
const RING_STEP_DEG: usize = 20;
const SEGMENT_SAMPLE: f32 = 2.0;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Room {
    /// Walkable area for the pet's center; already shrunk by the radius.
    pub(crate) bounds: Rect,
    pub(crate) pet_radius: f32,
    pub(crate) obstacles: Vec<Rect>,
    pub(crate) fallback: Point,
}

impl Default for Room {
    fn default() -> Self {
        Self {
            bounds: Rect::new(52.0, 82.0, 462.0, 474.0),
            pet_radius: 16.0,
            obstacles: vec![
                Rect::new(52.0, 52.0, 260.0, 196.0),
                Rect::new(300.0, 52.0, 456.0, 194.0),
                Rect::new(28.0, 250.0, 138.0, 500.0),
                Rect::new(306.0, 430.0, 486.0, 504.0),
            ],
            fallback: Location::Center.point(),
        }
    }
}

impl Room {
    pub(crate) fn out_of_bounds(&self, p: Point) -> bool {
        p.x < self.bounds.x1 || p.x > self.bounds.x2 || p.y < self.bounds.y1 || p.y > self.bounds.y2
    }

    /// Index of the first obstacle whose radius-expanded footprint holds `p`.
    pub(crate) fn obstacle_at(&self, p: Point) -> Option<usize> {
        self.obstacles
            .iter()
            .position(|r| r.expand(self.pet_radius).contains(p))
    }

    pub(crate) fn inside_obstacle(&self, p: Point) -> bool {
        self.obstacle_at(p).is_some()
    }

    pub(crate) fn is_blocked(&self, p: Point) -> bool {
        !p.is_finite() || self.out_of_bounds(p) || self.inside_obstacle(p)
    }

    pub(crate) fn nearest_walkable(&self, p: Point) -> Point {
        if !self.is_blocked(p) {
            return p;
        }
        if p.is_finite() {
            for r in RING_RADII {
                for deg in (0..360).step_by(RING_STEP_DEG) {
                    let rad = (deg as f32).to_radians();
                    let cand = Point::new(
                        (p.x + rad.cos() * r).round(),
                        (p.y + rad.sin() * r).round(),
                    );
                    if !self.is_blocked(cand) {
                        return cand;
                    }
                }
            }
        }
        self.fallback
    }

    pub(crate) fn segment_clear(&self, a: Point, b: Point) -> bool {
        let len = a.dist(b);
        let steps = (len / SEGMENT_SAMPLE).ceil().max(1.0) as usize;
        (0..=steps).all(|i| {
            let t = i as f32 / steps as f32;
            let p = Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
            !self.is_blocked(p)
        })
    }

    /// Corner of the first clear one-bend axis path from `a` to `b`:
    /// horizontal-then-vertical, then vertical-then-horizontal.
    pub(crate) fn l_path_corner(&self, a: Point, b: Point) -> Option<Point> {
        [Point::new(b.x, a.y), Point::new(a.x, b.y)]
            .into_iter()
            .find(|&corner| self.segment_clear(a, corner) && self.segment_clear(corner, b))
    }
}
