#![no_main]

use libfuzzer_sys::fuzz_target;
use stand_thinning_planner::io::read_series_csv_from_bytes;

fuzz_target!(|data: &[u8]| {
    let _ = read_series_csv_from_bytes(data);
});
