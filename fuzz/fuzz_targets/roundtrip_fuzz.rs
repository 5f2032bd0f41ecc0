#![no_main]
use bindelta::hash::config::{self, DeltaConfig};
use bindelta::{MatchBackend, apply_delta, calculate_delta_with_options};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte selects the profile, second the split point.
    let flags = data[0];
    let payload = &data[2..];
    let split = if payload.is_empty() {
        0
    } else {
        data[1] as usize % (payload.len() + 1)
    };
    let (base, target) = payload.split_at(split);

    let config = DeltaConfig {
        block_size: Some(1 + (flags as usize >> 3)),
        backend: if flags & 1 != 0 {
            MatchBackend::SuffixAutomaton
        } else {
            MatchBackend::SuffixArray
        },
        parallel_index: flags & 2 != 0,
        ..config::config_for_level(u32::from(flags & 4 != 0))
    };

    let delta = calculate_delta_with_options(base, target, &config);
    assert!(delta.is_canonical());
    let decoded = apply_delta(base, &delta).unwrap();
    assert_eq!(decoded, target);
});
