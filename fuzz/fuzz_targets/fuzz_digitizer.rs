#![no_main]

use libfuzzer_sys::fuzz_target;
use stand_thinning_planner::io::read_digitizer_from_bytes;

fuzz_target!(|data: &[u8]| {
    if let Ok(series) = read_digitizer_from_bytes(data) {
        for s in &series {
            assert_eq!(s.x.len(), s.y.len());
            assert!(s.category.is_loadable());
        }
    }
});
