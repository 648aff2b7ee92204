use crate::coords::untranslate_position;
use crate::error::MatchError;

pub fn complement(base: u8) -> u8 {
    match base {
        b'A' | b'a' => b'T',
        b'T' | b't' => b'A',
        b'C' | b'c' => b'G',
        b'G' | b'g' => b'C',
        _ => b'N',
    }
}

pub fn reverse_complement(seq: &mut [u8]) {
    seq.reverse();
    for base in seq.iter_mut() {
        *base = complement(*base);
    }
}

/// Recover the nucleotides a translated match was computed from.
///
/// `source` is the full forward-strand untranslated sequence; `start`/`end` are the match
/// bounds in codon space. On a negative frame the range is taken from the reverse complement
/// of `source`, built in a buffer owned by this call.
pub fn untranslate_sequence(
    source: &[u8],
    start: u64,
    end: u64,
    frame_shift: i8,
) -> Result<Vec<u8>, MatchError> {
    if end < start {
        return Err(MatchError::InvertedRange { start, end });
    }
    if !(1..=3).contains(&frame_shift.unsigned_abs()) {
        return Err(MatchError::InvalidFrame(frame_shift));
    }

    let from = untranslate_position(start, frame_shift)?;
    let to = untranslate_position(end, frame_shift)?;
    let length = source.len() as u64;
    if to > length {
        return Err(MatchError::SequenceRange {
            start: from,
            end: to,
            length,
        });
    }
    let range = from as usize..to as usize;

    if frame_shift >= 0 {
        Ok(source[range].to_vec())
    } else {
        let mut buf = source.to_vec();
        reverse_complement(&mut buf);
        Ok(buf[range].to_vec())
    }
}
