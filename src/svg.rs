// svg.rs - 将当前场景导出为 SVG 文档

use crate::config::Style;
use crate::error::GlobeError;
use crate::scene::Scene;
use glam::DVec2;
use std::fmt::Write as _;
use std::path::Path;

/// `[min_x, min_y, width, height]`, in the same space as the scene.
pub type ViewBox = [f64; 4];

/// View box framing the disk `(center, radius)` with `padding` on each side.
pub fn view_box(center: DVec2, radius: f64, padding: f64) -> ViewBox {
    let half = radius + padding;
    [center.x - half, center.y - half, 2.0 * half, 2.0 * half]
}

pub fn render_document(scene: &Scene, style: &Style, center: DVec2, radius: f64, view_box: ViewBox) -> String {
    let [x, y, w, h] = view_box;
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="100%" height="100%">"#,
        num(x),
        num(y),
        num(w),
        num(h)
    );
    let _ = writeln!(
        out,
        r#"  <circle cx="{}" cy="{}" r="{}" stroke="{}" style="opacity: {}; fill: transparent"/>"#,
        num(center.x),
        num(center.y),
        num(radius),
        rgb(style.outline),
        style.opacity
    );
    let _ = writeln!(out, r#"  <g class="graticule">"#);
    let _ = writeln!(
        out,
        r#"    <path fill="transparent" style="opacity: {}" stroke="{}" d="{}"/>"#,
        style.opacity,
        rgb(style.graticule),
        path_data(&scene.graticule)
    );
    let _ = writeln!(out, "  </g>");
    out.push_str("</svg>\n");
    out
}

pub fn export(path: &Path, scene: &Scene, style: &Style, center: DVec2, radius: f64, view_box: ViewBox) -> Result<(), GlobeError> {
    let doc = render_document(scene, style, center, radius, view_box);
    std::fs::write(path, doc)?;
    log::info!("exported {} polylines to {}", scene.graticule.len(), path.display());
    Ok(())
}

/// `M x,y L x,y ...` per polyline.
fn path_data(lines: &[Vec<DVec2>]) -> String {
    let mut d = String::new();
    for line in lines {
        for (i, p) in line.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{cmd}{},{}", num(p.x), num(p.y));
        }
    }
    d
}

fn rgb([r, g, b]: [u8; 3]) -> String {
    format!("rgb({r},{g},{b})")
}

/// 最多 3 位小数，去掉多余的 0
fn num(v: f64) -> String {
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graticule::Graticule;
    use crate::projection::ProjectionState;

    fn reference_scene() -> (Scene, ProjectionState) {
        let projection = ProjectionState::new(250.0, DVec2::new(250.0, 250.0));
        let graticule = Graticule::new().step([30.0, 20.0]).extent([[-180.0, -80.0001], [180.0, 80.0001]]);
        (Scene::build(&projection, &graticule, 64), projection)
    }

    #[test]
    fn view_box_matches_reference() {
        assert_eq!(view_box(DVec2::new(250.0, 250.0), 250.0, 25.0), [-25.0, -25.0, 550.0, 550.0]);
    }

    #[test]
    fn numbers_are_trimmed() {
        assert_eq!(num(250.0), "250");
        assert_eq!(num(-25.5), "-25.5");
        assert_eq!(num(1.23456), "1.235");
        assert_eq!(num(-0.0001), "0");
    }

    #[test]
    fn path_data_starts_each_line_with_move() {
        let lines = vec![
            vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 2.0)],
            vec![DVec2::new(3.0, 4.0), DVec2::new(5.0, 6.0), DVec2::new(7.0, 8.0)],
        ];
        assert_eq!(path_data(&lines), "M0,0L1,2M3,4L5,6L7,8");
    }

    #[test]
    fn document_has_circle_and_graticule() {
        let (scene, projection) = reference_scene();
        let doc = render_document(
            &scene,
            &Style::default(),
            projection.translate(),
            projection.scale(),
            view_box(projection.translate(), projection.scale(), 25.0),
        );
        assert!(doc.starts_with("<svg"));
        assert!(doc.contains(r#"viewBox="-25 -25 550 550""#));
        assert!(doc.contains(r#"<circle cx="250" cy="250" r="250" stroke="rgb(255,255,255)""#));
        assert!(doc.contains(r#"<g class="graticule">"#));
        assert_eq!(doc.matches('M').count(), scene.graticule.len());
        assert!(doc.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn export_writes_file() {
        let (scene, projection) = reference_scene();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("globe.svg");
        export(&path, &scene, &Style::default(), projection.translate(), projection.scale(), [-25.0, -25.0, 550.0, 550.0]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("graticule"));
    }

    #[test]
    fn export_to_missing_dir_fails() {
        let (scene, projection) = reference_scene();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("globe.svg");
        let err = export(&path, &scene, &Style::default(), projection.translate(), projection.scale(), [0.0, 0.0, 1.0, 1.0]);
        assert!(matches!(err, Err(GlobeError::Io(_))));
    }
}
