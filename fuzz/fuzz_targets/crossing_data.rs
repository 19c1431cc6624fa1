#![no_main]

use libfuzzer_sys::fuzz_target;

use knotwork::{CrossingPoints, Sign};

// Whatever the host hands back as stored crossing data, reading it and
// inheriting from it must not panic.
fuzz_target!(|data: Vec<f64>| {
    let old = CrossingPoints::from_flat(&data);
    if !old.is_empty() {
        assert_eq!(old.to_flat().len(), data.len());
    }
    let mut new = CrossingPoints::from_flat(&old.to_flat());
    new.inherit_signs(&old, Sign::Positive);
});
