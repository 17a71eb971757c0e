use hashdec_mph::{MphBuilder, MphConfig, PerfectHashSpec};
use rand::{rngs::StdRng, seq::index::sample, SeedableRng};

/// Distinct keys shaped like R-type encodings: random upper bits over a fixed opcode
fn opcode_keys(n: usize, seed: u64) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    sample(&mut rng, 1 << 20, n).into_iter().map(|upper| ((upper as u32) << 12) | 0x33).collect()
}

fn assert_bijection(spec: &PerfectHashSpec, keys: &[u32]) {
    assert_eq!(spec.n, keys.len());
    let mut slots: Vec<usize> = keys.iter().map(|&key| spec.index(key)).collect();
    slots.sort_unstable();
    assert_eq!(slots, (0..keys.len()).collect::<Vec<_>>());
}

#[test]
fn test_bijection_across_sizes() {
    let builder = MphBuilder::default();
    for (seed, n) in [1usize, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144, 233].into_iter().enumerate() {
        let keys = opcode_keys(n, seed as u64);
        let mut rng = StdRng::seed_from_u64(0x5EED + seed as u64);
        let spec = builder.build(&keys, &mut rng).unwrap();
        assert_bijection(&spec, &keys);
    }
}

#[test]
fn test_bijection_for_funct_field_keys() {
    // Keys that only differ in funct3/funct7, like the OP major opcode of RV64IM
    let keys: Vec<u32> = [0x00u32, 0x01, 0x20]
        .iter()
        .flat_map(|&funct7| (0..8u32).map(move |funct3| (funct7 << 25) | (funct3 << 12) | 0x33))
        .collect();
    let mut rng = StdRng::seed_from_u64(42);
    let spec = MphBuilder::default().build(&keys, &mut rng).unwrap();
    assert_bijection(&spec, &keys);
}

#[test]
fn test_bijection_with_zero_key() {
    let keys = [0, 1, 0x100, 0x1_0000, 0x100_0000];
    let mut rng = StdRng::seed_from_u64(9);
    let spec = MphBuilder::default().build(&keys, &mut rng).unwrap();
    assert_bijection(&spec, &keys);
}

#[test]
fn test_same_seed_same_table() {
    let keys = opcode_keys(64, 1);
    let builder = MphBuilder::new(MphConfig::new().with_max_attempts(500));
    let first = builder.build(&keys, &mut StdRng::seed_from_u64(77)).unwrap();
    let second = builder.build(&keys, &mut StdRng::seed_from_u64(77)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_spec_survives_serialization() {
    let keys = opcode_keys(16, 2);
    let spec = MphBuilder::default().build(&keys, &mut StdRng::seed_from_u64(4)).unwrap();
    let json = serde_json::to_string(&spec).unwrap();
    let restored: PerfectHashSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, spec);
    assert_bijection(&restored, &keys);
}
