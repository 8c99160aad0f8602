// scene.rs - 当前旋转下的屏幕空间几何：外圆 + 裁剪后的经纬网

use crate::graticule::Graticule;
use crate::projection::ProjectionState;
use glam::{DVec2, DVec3};
use std::f64::consts::TAU;

/// Screen-space polylines for one frame. Rebuilt after every rotation change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub outline: Vec<DVec2>,
    pub graticule: Vec<Vec<DVec2>>,
}

impl Scene {
    pub fn build(projection: &ProjectionState, graticule: &Graticule, outline_segments: usize) -> Self {
        let outline = circle(projection.translate(), projection.scale(), outline_segments);
        let graticule = graticule
            .lines()
            .iter()
            .flat_map(|line| clip_line(projection, line))
            .collect();
        Self { outline, graticule }
    }

    pub fn segment_count(&self) -> usize {
        let count = |l: &Vec<DVec2>| l.len().saturating_sub(1);
        count(&self.outline) + self.graticule.iter().map(count).sum::<usize>()
    }
}

/// Closed polyline of `segments` chords around `center`.
fn circle(center: DVec2, radius: f64, segments: usize) -> Vec<DVec2> {
    let segments = segments.max(3);
    (0..=segments)
        .map(|i| {
            let a = TAU * (i % segments) as f64 / segments as f64;
            center + radius * DVec2::new(a.cos(), a.sin())
        })
        .collect()
}

/// Rotates a lon/lat polyline into view space and splits it at the horizon.
///
/// Each crossing is interpolated on the chord between the two samples and
/// pushed back onto the sphere, so visible runs end exactly on the limb.
fn clip_line(projection: &ProjectionState, line: &[DVec2]) -> Vec<Vec<DVec2>> {
    let mut runs = Vec::new();
    let mut current: Vec<DVec2> = Vec::new();
    let mut prev: Option<DVec3> = None;

    for p in line {
        let v = projection.rotate_point(p.x, p.y);
        let visible = v.x >= 0.0;

        if let Some(u) = prev {
            let was_visible = u.x >= 0.0;
            if visible != was_visible {
                let edge = horizon_crossing(u, v);
                current.push(projection.project_view(edge));
                if was_visible {
                    flush(&mut runs, &mut current);
                }
            }
        }
        if visible {
            current.push(projection.project_view(v));
        }
        prev = Some(v);
    }
    flush(&mut runs, &mut current);
    runs
}

fn horizon_crossing(u: DVec3, v: DVec3) -> DVec3 {
    let t = u.x / (u.x - v.x);
    let mut p = u.lerp(v, t);
    p.x = 0.0;
    p.normalize_or_zero()
}

fn flush(runs: &mut Vec<Vec<DVec2>>, current: &mut Vec<DVec2>) {
    if current.len() >= 2 {
        runs.push(std::mem::take(current));
    } else {
        current.clear();
    }
}
