// graticule.rs - 经纬网生成（经线 / 纬线，单位：度）

use glam::DVec2;

const EPSILON: f64 = 1e-6;

/// Meridians and parallels over a lon/lat extent.
///
/// Major lines (default every 90° of longitude, 360° of latitude, which leaves
/// only the equator) and minor lines (default every 10°) have separate steps and
/// extents; a minor line that coincides with a major one is emitted once.
/// Points are `(lon, lat)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Graticule {
    extent_major: [[f64; 2]; 2],
    extent_minor: [[f64; 2]; 2],
    step_major: [f64; 2],
    step_minor: [f64; 2],
    precision: f64,
}

impl Default for Graticule {
    fn default() -> Self {
        Self {
            extent_major: [[-180.0, -90.0 + EPSILON], [180.0, 90.0 - EPSILON]],
            extent_minor: [[-180.0, -80.0 - EPSILON], [180.0, 80.0 + EPSILON]],
            step_major: [90.0, 360.0],
            step_minor: [10.0, 10.0],
            precision: 2.5,
        }
    }
}

impl Graticule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets both major and minor extents.
    pub fn extent(mut self, extent: [[f64; 2]; 2]) -> Self {
        self.extent_major = extent;
        self.extent_minor = extent;
        self
    }

    pub fn extent_major(mut self, extent: [[f64; 2]; 2]) -> Self {
        self.extent_major = extent;
        self
    }

    pub fn extent_minor(mut self, extent: [[f64; 2]; 2]) -> Self {
        self.extent_minor = extent;
        self
    }

    /// Minor step `[dx, dy]`.
    pub fn step(mut self, step: [f64; 2]) -> Self {
        self.step_minor = step;
        self
    }

    pub fn step_major(mut self, step: [f64; 2]) -> Self {
        self.step_major = step;
        self
    }

    /// Sampling interval along each line, in degrees.
    pub fn precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    /// All graticule lines: major meridians, major parallels, then the minor ones.
    pub fn lines(&self) -> Vec<Vec<DVec2>> {
        let [[big_x0, big_y0], [big_x1, big_y1]] = self.extent_major;
        let [[x0, y0], [x1, y1]] = self.extent_minor;
        let [big_dx, big_dy] = self.step_major;
        let [dx, dy] = self.step_minor;

        let mut lines = Vec::new();
        for x in aligned_range(big_x0, big_x1, big_dx) {
            lines.push(self.meridian(x, big_y0, big_y1));
        }
        for y in aligned_range(big_y0, big_y1, big_dy) {
            lines.push(self.parallel(y, big_x0, big_x1));
        }
        for x in aligned_range(x0, x1, dx).filter(|x| (x % big_dx).abs() > EPSILON) {
            lines.push(self.meridian(x, y0, y1));
        }
        for y in aligned_range(y0, y1, dy).filter(|y| (y % big_dy).abs() > EPSILON) {
            lines.push(self.parallel(y, x0, x1));
        }
        lines
    }

    /// Closed boundary of the major extent.
    pub fn outline(&self) -> Vec<DVec2> {
        let [[x0, y0], [x1, y1]] = self.extent_major;
        let mut ring = self.meridian(x0, y0, y1);
        ring.extend(self.parallel(y1, x0, x1).into_iter().skip(1));
        ring.extend(self.meridian(x1, y0, y1).into_iter().rev().skip(1));
        ring.extend(self.parallel(y0, x0, x1).into_iter().rev().skip(1));
        ring
    }

    fn meridian(&self, x: f64, y0: f64, y1: f64) -> Vec<DVec2> {
        samples(y0, y1, self.precision).map(|y| DVec2::new(x, y)).collect()
    }

    fn parallel(&self, y: f64, x0: f64, x1: f64) -> Vec<DVec2> {
        samples(x0, x1, self.precision).map(|x| DVec2::new(x, y)).collect()
    }
}

/// `ceil(start / step) * step, ...` up to but excluding `stop`.
fn aligned_range(start: f64, stop: f64, step: f64) -> impl Iterator<Item = f64> {
    let first = (start / step).ceil() * step;
    let n = ((stop - first) / step).ceil().max(0.0) as usize;
    (0..n).map(move |i| first + i as f64 * step)
}

/// `start, start + step, ...` strictly below `stop - EPSILON`, then `stop` itself.
fn samples(start: f64, stop: f64, step: f64) -> impl Iterator<Item = f64> {
    let n = ((stop - EPSILON - start) / step).ceil().max(0.0) as usize;
    (0..n).map(move |i| start + i as f64 * step).chain(std::iter::once(stop))
}
