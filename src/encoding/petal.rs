use eframe::egui::{Vec2, vec2};

type Point = [f32; 2];
/// Control point, control point, end point.
type Cubic = [Point; 3];

const ROUND: &[Cubic] = &[
    [[50.0, 50.0], [50.0, 100.0], [0.0, 100.0]],
    [[-50.0, 100.0], [-50.0, 50.0], [0.0, 0.0]],
];
const TULIP: &[Cubic] = &[
    [[-25.0, 25.0], [25.0, 25.0], [35.0, 0.0]],
    [[50.0, 25.0], [25.0, 75.0], [0.0, 100.0]],
    [[-25.0, 75.0], [-50.0, 25.0], [-35.0, 0.0]],
];
const HEART: &[Cubic] = &[
    [[-50.0, 20.0], [-25.0, 40.0], [-10.0, 40.0]],
    [[-5.0, 35.0], [5.0, 35.0], [10.0, 40.0]],
    [[25.0, 40.0], [50.0, 20.0], [0.0, 0.0]],
];
const ALMOND: &[Cubic] = &[
    [[50.0, 25.0], [50.0, 75.0], [0.0, 100.0]],
    [[-50.0, 75.0], [-50.0, 25.0], [0.0, 0.0]],
];

/// The petal outlines a flower can be drawn with. Each one is a closed path
/// of cubic Bézier segments in a 100-unit tall box with the stem at the origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PetalShape {
    /// `M0 0 C50 50 50 100 0 100 C-50 100 -50 50 0 0`
    Round,
    /// `M-35 0 C-25 25 25 25 35 0 C50 25 25 75 0 100 C-25 75 -50 25 -35 0`
    Tulip,
    /// `M0,0 C-50,20,-25,40,-10,40 C-5,35,5,35,10,40 C25,40,50,20,0,0`
    Heart,
    /// `M0 0 C50 25 50 75 0 100 C-50 75 -50 25 0 0`
    Almond,
}

impl PetalShape {
    pub const ALL: [Self; 4] = [Self::Round, Self::Tulip, Self::Heart, Self::Almond];

    fn segments(self) -> (Point, &'static [Cubic]) {
        match self {
            Self::Round => ([0.0, 0.0], ROUND),
            Self::Tulip => ([-35.0, 0.0], TULIP),
            Self::Heart => ([0.0, 0.0], HEART),
            Self::Almond => ([0.0, 0.0], ALMOND),
        }
    }

    /// Flattens the outline into a closed polyline, `samples` points per
    /// segment. The starting point is not repeated at the end.
    pub fn outline(self, samples: usize) -> Vec<Vec2> {
        let samples = samples.max(1);
        let (start, segments) = self.segments();
        let mut points = Vec::with_capacity(segments.len() * samples);
        let mut from = vec2(start[0], start[1]);

        for [c1, c2, to] in segments {
            let c1 = vec2(c1[0], c1[1]);
            let c2 = vec2(c2[0], c2[1]);
            let to = vec2(to[0], to[1]);
            for step in 0..samples {
                let t = step as f32 / samples as f32;
                points.push(cubic_point(from, c1, c2, to, t));
            }
            from = to;
        }

        points
    }
}

fn cubic_point(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}
