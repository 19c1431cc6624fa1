use kurbo::BezPath;
use knotwork::{Curve, KnotConfig, KnotEffect, Sign};
use knotwork_util::{bezier_bounding_box, collect_paths_and_widths, load_svg};
use libtest_mimic::{Arguments, Failed, Trial};
use std::path::{Path, PathBuf};

fn main() {
    let args = Arguments::from_args();
    let tests = knot_tests();

    libtest_mimic::run(&args, tests).exit();
}

fn knot_tests() -> Vec<Trial> {
    let ws = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let file_paths = glob::glob(&format!("{ws}/tests/knots/**/*.svg")).unwrap();

    file_paths
        .into_iter()
        .map(|p| {
            let p = p.unwrap();
            let name = input_path_base(&p).display().to_string();
            Trial::test(name, || knot_test(p))
        })
        .collect()
}

fn input_path_base(input_path: &Path) -> &Path {
    let ws = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let base = format!("{ws}/tests/knots");
    input_path.strip_prefix(base).unwrap()
}

fn expected_crossings(name: &str) -> Option<usize> {
    match name {
        "apart" => Some(0),
        "hopf_link" => Some(2),
        "loops" => Some(2),
        "pentagram" => Some(5),
        "woven" => Some(9),
        _ => None,
    }
}

fn to_bez(curves: &[Curve]) -> BezPath {
    let mut ret = BezPath::new();
    for c in curves {
        c.append_to(&mut ret);
    }
    ret
}

fn knot_test(path: PathBuf) -> Result<(), Failed> {
    let tree = load_svg(&path).map_err(|e| e.to_string())?;
    let (bez_paths, widths) = collect_paths_and_widths(&tree);
    assert_eq!(bez_paths.len(), widths.len());

    let mut curves = Vec::new();
    let mut curve_widths = Vec::new();
    for (p, w) in bez_paths.iter().zip(&widths) {
        for c in Curve::from_bez_path(p) {
            curves.push(c);
            curve_widths.push(*w);
        }
    }

    let mut effect = KnotEffect::default();
    let persisted = effect.before_effect(curves.clone(), curve_widths.clone(), &[])?;
    let crossings = effect.crossings().clone();
    crossings.check_invariants();

    let name = path.file_stem().unwrap().to_str().unwrap();
    if let Some(expected) = expected_crossings(name) {
        if crossings.len() != expected {
            return Err(format!("expected {expected} crossings, found {}", crossings.len()).into());
        }
    }

    // Running again on the same geometry changes nothing.
    let again = effect.before_effect(curves.clone(), curve_widths.clone(), &persisted)?;
    if again != persisted {
        return Err("crossing data changed on an identical rebuild".into());
    }

    // Carving only ever removes ink.
    let out = effect.do_effect(&curves)?;
    let input = to_bez(&curves);
    let in_box = bezier_bounding_box(std::iter::once(&input)).inflate(1e-6, 1e-6);
    let out_box = bezier_bounding_box(std::iter::once(&out));
    if crossings.is_empty() {
        if out != input {
            return Err("carving changed a drawing without crossings".into());
        }
    } else if in_box.union(out_box) != in_box {
        return Err(format!("output {out_box:?} escapes input {in_box:?}").into());
    }

    // With every crossing flat, nothing gets carved.
    let mut flat = KnotEffect::new(KnotConfig {
        default_sign: Sign::Flat,
        ..KnotConfig::default()
    });
    flat.before_effect(curves.clone(), curve_widths, &[])?;
    if flat.do_effect(&curves)? != input {
        return Err("flat crossings carved something".into());
    }

    Ok(())
}
