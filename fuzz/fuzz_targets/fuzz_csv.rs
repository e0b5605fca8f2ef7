#![no_main]

use libfuzzer_sys::fuzz_target;
use species_tracker::io::read_csv_from_bytes;
use species_tracker::models::PANAMA_PROVINCES;

fuzz_target!(|data: &[u8]| {
    let provinces: Vec<String> = PANAMA_PROVINCES.iter().map(|p| p.to_string()).collect();
    // Loading is lenient: arbitrary bytes may fail to parse but must not panic
    let _ = read_csv_from_bytes(data, None);
    let _ = read_csv_from_bytes(data, Some(&provinces));
});
