use kurbo::{BezPath, Rect, Shape};
use std::path::Path;

/// Every subpath in an SVG document, together with the stroke width it is
/// drawn with.
///
/// Groups are walked recursively and transforms are applied, so the paths are
/// in document coordinates. Stroke widths are scaled along with the path;
/// unstroked paths get width zero. The two vectors have the same length.
pub fn collect_paths_and_widths(tree: &usvg::Tree) -> (Vec<BezPath>, Vec<f64>) {
    let mut paths = Vec::new();
    let mut widths = Vec::new();

    fn pt(p: usvg::tiny_skia_path::Point) -> kurbo::Point {
        kurbo::Point::new(p.x as f64, p.y as f64)
    }

    fn add_group(group: &usvg::Group, paths: &mut Vec<BezPath>, widths: &mut Vec<f64>) {
        for child in group.children() {
            match child {
                usvg::Node::Group(group) => add_group(group, paths, widths),
                usvg::Node::Path(path) => {
                    let ts = path.abs_transform();
                    let Some(data) = path.data().clone().transform(ts) else {
                        continue;
                    };
                    let scale = ((ts.sx * ts.sy - ts.kx * ts.ky).abs() as f64).sqrt();
                    let width = path
                        .stroke()
                        .map_or(0.0, |s| s.width().get() as f64 * scale);

                    let mut current = BezPath::new();
                    for seg in data.segments() {
                        match seg {
                            usvg::tiny_skia_path::PathSegment::MoveTo(p) => {
                                if !current.is_empty() {
                                    paths.push(std::mem::take(&mut current));
                                    widths.push(width);
                                }
                                current.move_to(pt(p));
                            }
                            usvg::tiny_skia_path::PathSegment::LineTo(p) => current.line_to(pt(p)),
                            usvg::tiny_skia_path::PathSegment::QuadTo(p0, p1) => {
                                current.quad_to(pt(p0), pt(p1))
                            }
                            usvg::tiny_skia_path::PathSegment::CubicTo(p0, p1, p2) => {
                                current.curve_to(pt(p0), pt(p1), pt(p2))
                            }
                            usvg::tiny_skia_path::PathSegment::Close => {
                                current.close_path();
                                paths.push(std::mem::take(&mut current));
                                widths.push(width);
                            }
                        }
                    }

                    if !current.is_empty() {
                        paths.push(current);
                        widths.push(width);
                    }
                }
                _ => {}
            }
        }
    }

    add_group(tree.root(), &mut paths, &mut widths);
    (paths, widths)
}

/// Parses an SVG document from a string.
pub fn parse_svg(text: &str) -> Result<usvg::Tree, usvg::Error> {
    usvg::Tree::from_str(text, &usvg::Options::default())
}

/// Reads and parses an SVG file.
pub fn load_svg(path: &Path) -> Result<usvg::Tree, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_svg(&text)?)
}

pub fn bezier_bounding_box<'a>(paths: impl Iterator<Item = &'a BezPath>) -> Rect {
    let mut rect = Rect::new(
        f64::INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::NEG_INFINITY,
    );

    for p in paths {
        rect = rect.union(p.bounding_box());
    }
    rect
}
