//! Tests for the Sdr value type and the EncoderOutput contract.
//!
//! Tests cover:
//! - Normalization of unsorted / duplicated input
//! - Rejection of out-of-range and empty input
//! - Overlap and similarity against a dense reference
//! - Property-based invariants

use proptest::prelude::*;
use sparsepool::{BitField, EncoderOutput, PoolerError, Sdr};

#[test]
fn test_sdr_normalizes() {
    let sdr = Sdr::new(64, vec![9, 3, 3, 40, 0, 9]).unwrap();
    assert_eq!(sdr.active_bits(), &[0, 3, 9, 40]);
    assert_eq!(sdr.len(), 4);
    assert_eq!(sdr.width(), 64);
    assert_eq!(sdr.sparsity(), 4.0 / 64.0);
}

#[test]
fn test_sdr_out_of_range() {
    let err = Sdr::new(10, vec![1, 10]).unwrap_err();
    assert_eq!(err, PoolerError::BitOutOfRange { index: 10, width: 10 });
}

#[test]
fn test_empty_sdr() {
    let sdr = Sdr::empty(128);
    assert!(sdr.is_empty());
    assert_eq!(sdr.sparsity(), 0.0);
    assert_eq!(sdr.similarity(&Sdr::new(128, vec![1]).unwrap()), 0.0);
}

#[test]
fn test_is_active() {
    let sdr = Sdr::new(1024, (0..=200).step_by(10).collect()).unwrap();
    assert!(sdr.is_active(0));
    assert!(sdr.is_active(200));
    assert!(!sdr.is_active(5));
    assert!(!sdr.is_active(210));
}

#[test]
fn test_encoder_output_to_sdr() {
    let input = EncoderOutput::new(1024, (0..=200).step_by(10).collect());
    assert_eq!(input.active_bits.len(), 21);
    assert!((input.sparsity - 21.0 / 1024.0).abs() < 1e-12);

    let sdr = input.to_sdr().unwrap();
    assert_eq!(sdr.len(), 21);

    let back = EncoderOutput::from(&sdr);
    assert_eq!(back, input);
}

#[test]
fn test_encoder_output_empty() {
    let input = EncoderOutput::new(1024, vec![]);
    assert_eq!(input.to_sdr().unwrap_err(), PoolerError::EmptyInput);
}

#[test]
fn test_encoder_output_ignores_reported_sparsity() {
    let input = EncoderOutput {
        width: 100,
        active_bits: vec![1, 2, 3],
        sparsity: 0.9,
    };
    assert!((input.to_sdr().unwrap().sparsity() - 0.03).abs() < 1e-12);
}

#[test]
fn test_encoder_output_json_without_sparsity() {
    let input: EncoderOutput = serde_json::from_str(r#"{"width": 32, "active_bits": [4, 2]}"#).unwrap();
    assert_eq!(input.sparsity, 0.0);
    assert_eq!(input.to_sdr().unwrap().active_bits(), &[2, 4]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_sdr_is_sorted_unique(bits in proptest::collection::vec(0u32..500, 0..100)) {
        let sdr = Sdr::new(500, bits.clone()).unwrap();
        prop_assert!(sdr.active_bits().windows(2).all(|w| w[0] < w[1]));
        for b in &bits {
            prop_assert!(sdr.is_active(*b));
        }
    }

    #[test]
    fn prop_overlap_matches_dense(
        a in proptest::collection::vec(0u32..1000, 0..100),
        b in proptest::collection::vec(0u32..1000, 0..100),
    ) {
        let sa = Sdr::new(1000, a).unwrap();
        let sb = Sdr::new(1000, b).unwrap();

        let dense = sa.to_bitfield().num_similar(&sb.to_bitfield());
        prop_assert_eq!(sa.overlap(&sb), dense);
        prop_assert_eq!(sa.overlap(&sb), sb.overlap(&sa));
    }

    #[test]
    fn prop_similarity_in_unit_range(
        a in proptest::collection::vec(0u32..200, 1..50),
        b in proptest::collection::vec(0u32..200, 1..50),
    ) {
        let sa = Sdr::new(200, a).unwrap();
        let sb = Sdr::new(200, b).unwrap();
        let s = sa.similarity(&sb);
        prop_assert!((0.0..=1.0).contains(&s));
        prop_assert_eq!(sa.similarity(&sa), 1.0);
    }

    #[test]
    fn prop_bitfield_round_trip(bits in proptest::collection::vec(0u32..300, 0..60)) {
        let sdr = Sdr::new(300, bits).unwrap();
        let field: BitField = sdr.to_bitfield();
        prop_assert_eq!(field.num_bits(), 300);
        prop_assert_eq!(field.get_acts(), sdr.active_bits().to_vec());
    }
}
