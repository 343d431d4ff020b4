//! CPU mirrors of the shader logic, run against reference implementations.
//!
//! The bitonic network, atlas decode and CSR rebuild are re-implemented
//! here exactly as the WGSL executes them (same loop structure, same index
//! math) so the schedules can be checked without a GPU.

use layout3d::SORT_SPAN;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SPAN: usize = SORT_SPAN as usize;

/// The span_sort.wgsl network, step for step: every "thread" t runs the
/// same compare-exchange schedule over shared (key, index) arrays.
fn bitonic_network(keys: &mut [f32; SPAN], idx: &mut [u32; SPAN]) {
    let mut k = 2usize;
    while k <= SPAN {
        let mut j = k >> 1;
        while j > 0 {
            for t in 0..SPAN {
                let partner = t ^ j;
                if partner > t {
                    let ascending = (t & k) == 0;
                    let (key_a, idx_a) = (keys[t], idx[t]);
                    let (key_b, idx_b) = (keys[partner], idx[partner]);
                    let a_after_b = key_a > key_b || (key_a == key_b && idx_a > idx_b);
                    if a_after_b == ascending {
                        keys[t] = key_b;
                        idx[t] = idx_b;
                        keys[partner] = key_a;
                        idx[partner] = idx_a;
                    }
                }
            }
            j >>= 1;
        }
        k <<= 1;
    }
}

#[test]
fn test_bitonic_network_matches_stable_sort() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    for _ in 0..20 {
        let source: Vec<f32> = (0..SPAN)
            .map(|_| (rng.gen_range(0..32) as f32) / 32.0)
            .collect();

        let mut keys: [f32; SPAN] = source.clone().try_into().unwrap();
        let mut idx: [u32; SPAN] = std::array::from_fn(|i| i as u32);
        bitonic_network(&mut keys, &mut idx);

        let mut expected: Vec<(f32, u32)> =
            source.iter().enumerate().map(|(i, &k)| (k, i as u32)).collect();
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap());

        for t in 0..SPAN {
            assert_eq!((keys[t], idx[t]), expected[t], "mismatch at position {}", t);
        }
    }
}

#[test]
fn test_bitonic_network_sentinels_sink() {
    // Out-of-range slots enter with a sentinel key and must end up at the
    // high end, in original order.
    let live = 37usize;
    let mut keys: [f32; SPAN] = std::array::from_fn(|i| {
        if i < live {
            (live - i) as f32
        } else {
            1e30
        }
    });
    let mut idx: [u32; SPAN] = std::array::from_fn(|i| i as u32);
    bitonic_network(&mut keys, &mut idx);

    for t in 0..live {
        assert!(keys[t] < 1e30, "live key expected at {}", t);
        assert_eq!(idx[t] as usize, live - 1 - t);
    }
    for t in live..SPAN {
        assert_eq!(keys[t], 1e30);
        assert_eq!(idx[t] as usize, t, "sentinels must keep their order");
    }
}

/// The shared atlas decode of reshuffle/csr_scan/edge_relocate.
fn source_slot(i: usize, sort_offset: usize, span_count: usize, atlas: &[u32]) -> usize {
    if i < sort_offset {
        return i;
    }
    let rel = i - sort_offset;
    let span = rel / SPAN;
    if span >= span_count {
        return i;
    }
    span * SPAN + sort_offset + atlas[rel] as usize
}

/// Build an atlas over the given keys exactly as one tick would.
fn encode_atlas(keys: &[f32], sort_offset: usize) -> (Vec<u32>, usize) {
    let n = keys.len();
    let span_count = if n > sort_offset {
        (n - sort_offset).div_ceil(SPAN)
    } else {
        0
    };
    let mut atlas = vec![0u32; span_count * SPAN];
    for span in 0..span_count {
        let base = span * SPAN + sort_offset;
        let mut span_keys: [f32; SPAN] =
            std::array::from_fn(|t| if base + t < n { keys[base + t] } else { 1e30 });
        let mut idx: [u32; SPAN] = std::array::from_fn(|t| t as u32);
        bitonic_network(&mut span_keys, &mut idx);
        atlas[span * SPAN..(span + 1) * SPAN].copy_from_slice(&idx);
    }
    (atlas, span_count)
}

#[test]
fn test_atlas_decode_is_a_permutation() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    for &(n, sort_offset) in &[(300usize, 0usize), (300, 64), (128, 64), (60, 64), (1, 0)] {
        let keys: Vec<f32> = (0..n).map(|_| rng.gen_range(0.0..1.0)).collect();
        let (atlas, span_count) = encode_atlas(&keys, sort_offset);

        let mut seen = vec![false; n];
        for i in 0..n {
            let src = source_slot(i, sort_offset, span_count, &atlas);
            assert!(src < n, "n={} offset={}: slot {} decodes out of range", n, sort_offset, i);
            assert!(!seen[src], "n={} offset={}: source {} gathered twice", n, sort_offset, src);
            seen[src] = true;
        }
        assert!(seen.into_iter().all(|s| s), "every source must be gathered once");
    }
}

#[test]
fn test_atlas_orders_keys_within_spans() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let n = 500usize;
    let keys: Vec<f32> = (0..n).map(|_| rng.gen_range(0.0..1.0)).collect();
    let sort_offset = 64usize;
    let (atlas, span_count) = encode_atlas(&keys, sort_offset);

    let gathered: Vec<f32> = (0..n)
        .map(|i| keys[source_slot(i, sort_offset, span_count, &atlas)])
        .collect();
    for span in 0..span_count {
        let begin = span * SPAN + sort_offset;
        let end = (begin + SPAN).min(n);
        for i in begin + 1..end {
            assert!(
                gathered[i - 1] <= gathered[i],
                "span {} not ascending at slot {}",
                span,
                i
            );
        }
    }
}

/// CPU rebuild of the CSR offsets: seed counts through the atlas, inclusive
/// Hillis-Steele scan, exclusive finalize. Mirrors csr_scan.wgsl.
fn rebuild_offsets(
    offsets_old: &[u32],
    atlas: &[u32],
    sort_offset: usize,
    span_count: usize,
) -> Vec<u32> {
    let n = offsets_old.len() - 1;
    let mut counts = vec![0u32; n];
    for (i, count) in counts.iter_mut().enumerate() {
        let src = source_slot(i, sort_offset, span_count, atlas);
        *count = offsets_old[src + 1] - offsets_old[src];
    }

    let mut inclusive = counts.clone();
    let mut step = 1usize;
    while step < n {
        let prev = inclusive.clone();
        for i in 0..n {
            inclusive[i] = prev[i] + if i >= step { prev[i - step] } else { 0 };
        }
        step <<= 1;
    }

    let mut offsets_new = vec![0u32; n + 1];
    for i in 0..n {
        offsets_new[i] = inclusive[i] - counts[i];
    }
    offsets_new[n] = if n == 0 { 0 } else { inclusive[n - 1] };
    offsets_new
}

#[test]
fn test_csr_rebuild_follows_the_permutation() {
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let n = 300usize;

    let counts: Vec<u32> = (0..n).map(|_| rng.gen_range(0..5)).collect();
    let mut offsets_old = vec![0u32; n + 1];
    for i in 0..n {
        offsets_old[i + 1] = offsets_old[i] + counts[i];
    }
    let total = offsets_old[n];

    let keys: Vec<f32> = (0..n).map(|_| rng.gen_range(0.0..1.0)).collect();
    let sort_offset = 64usize;
    let (atlas, span_count) = encode_atlas(&keys, sort_offset);
    let offsets_new = rebuild_offsets(&offsets_old, &atlas, sort_offset, span_count);

    assert_eq!(offsets_new[0], 0);
    assert_eq!(offsets_new[n], total);
    for i in 0..n {
        assert!(offsets_new[i] <= offsets_new[i + 1], "offsets decrease at {}", i);
        let src = source_slot(i, sort_offset, span_count, &atlas);
        assert_eq!(
            offsets_new[i + 1] - offsets_new[i],
            counts[src],
            "slot {} lost its edge count",
            i
        );
    }
}

#[test]
fn test_csr_rebuild_all_empty() {
    let n = 130usize;
    let offsets_old = vec![0u32; n + 1];
    let keys = vec![0.5f32; n];
    let (atlas, span_count) = encode_atlas(&keys, 0);
    let offsets_new = rebuild_offsets(&offsets_old, &atlas, 0, span_count);
    assert!(offsets_new.iter().all(|&o| o == 0));
}
