//! Conversions from match-local coordinates to untranslated output coordinates.
use crate::error::MatchError;

/// Hard-clip lengths on either side of an alignment, in output coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Clips {
    pub left: u64,
    pub right: u64,
}

/// Map a position in codon space back to the nucleotide strand it was translated from.
///
/// `frame_shift` must be nonzero.
pub fn untranslate_position(pos: u64, frame_shift: i8) -> Result<u64, MatchError> {
    pos.checked_mul(3)
        .and_then(|p| p.checked_add(frame_shift.unsigned_abs() as u64))
        .and_then(|p| p.checked_sub(1))
        .ok_or(MatchError::CoordinateOverflow { pos, frame_shift })
}

fn check_range(start: u64, end: u64) -> Result<(), MatchError> {
    if end < start {
        return Err(MatchError::InvertedRange { start, end });
    }
    Ok(())
}

fn check_frame(frame_shift: i8, translated: bool) -> Result<(), MatchError> {
    if translated && !(1..=3).contains(&frame_shift.unsigned_abs()) {
        return Err(MatchError::InvalidFrame(frame_shift));
    }
    Ok(())
}

/// Left/right hard clips for a match spanning `[start, end)` of a sequence whose untranslated
/// length is `real_length`.
///
/// On the reverse strand the two clips trade places, since match coordinates are mirrored
/// relative to the forward untranslated sequence.
pub fn untranslated_clip_positions(
    start: u64,
    end: u64,
    frame_shift: i8,
    real_length: u64,
    translated: bool,
) -> Result<Clips, MatchError> {
    check_range(start, end)?;
    check_frame(frame_shift, translated)?;

    let (start, end) = if translated {
        (
            untranslate_position(start, frame_shift)?,
            untranslate_position(end, frame_shift)?,
        )
    } else {
        (start, end)
    };

    let right = real_length
        .checked_sub(end)
        .ok_or(MatchError::ClipUnderflow {
            end,
            length: real_length,
        })?;

    let mut clips = Clips { left: start, right };
    if frame_shift < 0 {
        std::mem::swap(&mut clips.left, &mut clips.right);
    }
    Ok(clips)
}

/// 1-based inclusive start/end as BLAST tabular output reports them.
///
/// Reverse-strand matches report `start > end`.
pub fn blast_positions(
    start: u64,
    end: u64,
    frame_shift: i8,
    length: u64,
    translated: bool,
) -> Result<(u64, u64), MatchError> {
    check_range(start, end)?;
    check_frame(frame_shift, translated)?;

    let (start, end) = if translated {
        (
            untranslate_position(start, frame_shift)?,
            untranslate_position(end, frame_shift)?,
        )
    } else {
        (start, end)
    };
    if end > length {
        return Err(MatchError::ClipUnderflow { end, length });
    }

    if frame_shift < 0 {
        Ok((length - start, length - end + 1))
    } else {
        Ok((start + 1, end))
    }
}
