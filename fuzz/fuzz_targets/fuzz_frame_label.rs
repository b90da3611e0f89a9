#![no_main]

use libfuzzer_sys::fuzz_target;
use spriteport_spec::frame::split_frame_label;

fuzz_target!(|label: &str| {
    if let Some((stem, index)) = split_frame_label(label) {
        assert!(label.starts_with(stem));
        assert!(label.contains(&index.to_string()));
    }
});
