#![no_main]

use agij_validation::ModuleSnapshot;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding arbitrary bytes must fail cleanly, never panic.
    if let Ok(snapshot) = ModuleSnapshot::from_bytes(data) {
        // Anything that decodes must re-encode to a decodable snapshot.
        let bytes = snapshot.to_bytes().expect("decoded snapshot re-encodes");
        let again = ModuleSnapshot::from_bytes(&bytes).expect("re-encoded snapshot decodes");
        assert_eq!(again, snapshot);
    }

    let _ = bincode::deserialize::<agij_validation::JobRound>(data);
    let _ = bincode::deserialize::<agij_types::ValidationParams>(data);
});
