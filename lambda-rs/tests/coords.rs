use lambda_rs::coords::{blast_positions, untranslate_position};
use lambda_rs::{Clips, MatchError, untranslated_clip_positions};

#[test]
fn untranslated_clips() {
    let clips = untranslated_clip_positions(2, 8, 0, 10, false).unwrap();
    assert_eq!(clips, Clips { left: 2, right: 2 });
}

#[test]
fn untranslate_position_uses_frame_magnitude() {
    assert_eq!(untranslate_position(0, 1), Ok(0));
    assert_eq!(untranslate_position(4, 2), Ok(13));
    assert_eq!(untranslate_position(4, -3), Ok(14));
}

#[test]
fn huge_translated_coordinates_are_rejected() {
    let half = u64::MAX / 2;
    let err = untranslated_clip_positions(half, half, 1, 30, true).unwrap_err();
    assert_eq!(
        err,
        MatchError::CoordinateOverflow {
            pos: half,
            frame_shift: 1
        }
    );

    let err = blast_positions(0, u64::MAX / 3 + 1, -2, 30, true).unwrap_err();
    assert!(matches!(err, MatchError::CoordinateOverflow { .. }), "{err}");

    // 3 * (MAX / 3 - 1) + 3 - 1 still fits
    assert_eq!(untranslate_position(u64::MAX / 3 - 1, 3), Ok(u64::MAX - 1));
}

#[test]
fn translated_forward_clips() {
    // residues 2..5 in frame 1 of a 30 nt query: nucleotides 6..15
    let clips = untranslated_clip_positions(2, 5, 1, 30, true).unwrap();
    assert_eq!(clips, Clips { left: 6, right: 15 });
    // aligned span plus both clips adds back up to the real length
    assert_eq!(clips.left + 3 * (5 - 2) + clips.right, 30);
}

#[test]
fn reverse_frame_swaps_clips() {
    let forward = untranslated_clip_positions(2, 5, 2, 31, true).unwrap();
    let reverse = untranslated_clip_positions(2, 5, -2, 31, true).unwrap();
    assert_eq!(reverse.left, forward.right);
    assert_eq!(reverse.right, forward.left);
}

#[test]
fn strand_symmetry_for_every_frame() {
    for frame in 1..=3i8 {
        for (start, end) in [(0u64, 1u64), (1, 4), (3, 9)] {
            let len = 40;
            let plus = untranslated_clip_positions(start, end, frame, len, true).unwrap();
            let minus = untranslated_clip_positions(start, end, -frame, len, true).unwrap();
            assert_eq!((plus.left, plus.right), (minus.right, minus.left));
        }
    }
}

#[test]
fn end_past_sequence_is_an_error() {
    let err = untranslated_clip_positions(0, 11, 0, 10, false).unwrap_err();
    assert_eq!(err, MatchError::ClipUnderflow { end: 11, length: 10 });

    // 3 * 4 + 1 - 1 = 12 > 11
    let err = untranslated_clip_positions(0, 4, 1, 11, true).unwrap_err();
    assert_eq!(err, MatchError::ClipUnderflow { end: 12, length: 11 });
}

#[test]
fn inverted_range_is_an_error() {
    let err = untranslated_clip_positions(5, 3, 0, 10, false).unwrap_err();
    assert_eq!(err, MatchError::InvertedRange { start: 5, end: 3 });
}

#[test]
fn translated_match_needs_a_frame() {
    let err = untranslated_clip_positions(0, 2, 0, 10, true).unwrap_err();
    assert_eq!(err, MatchError::InvalidFrame(0));
    let err = untranslated_clip_positions(0, 2, 4, 10, true).unwrap_err();
    assert_eq!(err, MatchError::InvalidFrame(4));
}

#[test]
fn blast_positions_forward_and_reverse() {
    assert_eq!(blast_positions(2, 8, 0, 10, false).unwrap(), (3, 8));
    assert_eq!(blast_positions(2, 8, -1, 10, false).unwrap(), (8, 3));
    // frame 1, residues 0..3 of a 12 nt query
    assert_eq!(blast_positions(0, 3, 1, 12, true).unwrap(), (1, 9));
    assert_eq!(blast_positions(0, 3, -1, 12, true).unwrap(), (12, 4));
}
