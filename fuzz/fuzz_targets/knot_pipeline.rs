#![no_main]

use arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;

use knotwork::{ClickModifier, KnotEffect};

fn run(u: &mut Unstructured<'_>) -> arbitrary::Result<()> {
    let paths = knotwork::arbitrary::curves(u)?;
    let widths = paths
        .iter()
        .map(|_| knotwork::arbitrary::width(u))
        .collect::<arbitrary::Result<Vec<_>>>()?;

    let mut effect = KnotEffect::default();
    let persisted = effect
        .before_effect(paths.clone(), widths.clone(), &[])
        .unwrap();
    effect.crossings().check_invariants();

    if let Some(p) = effect.crossings().iter().next().map(|(_, cp)| cp.pt) {
        effect.select_nearest(p);
        effect.click(ClickModifier::None);
    }
    effect.do_effect(&paths).unwrap();

    let again = effect.before_effect(paths, widths, &persisted).unwrap();
    assert_eq!(again.len(), persisted.len());
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let _ = run(&mut Unstructured::new(data));
});
