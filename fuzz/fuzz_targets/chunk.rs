#![no_main]

use libfuzzer_sys::fuzz_target;
use tdbscope::{
    tdb::{raw::RawChunk, MemorySource},
    target::{render_header, Program},
    ImportConfig, Importer,
};

fuzz_target!(|data: &[u8]| {
    let Ok(chunk) = serde_json::from_slice::<RawChunk>(data) else {
        return;
    };

    let mut source: MemorySource = [chunk].into_iter().collect();
    let mut program = Program::new();
    let importer = Importer::new(ImportConfig::default().with_progress_interval(0));
    if importer.run(&mut source, &mut program).is_ok() {
        let _ = render_header(&program);
    }
});
