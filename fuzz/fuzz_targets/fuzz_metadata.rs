#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(sheet) = spriteport_backend_aseprite::parse_metadata(json) {
        // Sequence indices are the document positions.
        for (i, frame) in sheet.frames.iter().enumerate() {
            assert_eq!(frame.sequence_index, i);
        }
    }
});
