use crate::constants::EC256_COMPONENT_SIZE;

pub mod crypto;
pub mod hash;

/// Removes `std::mem::size_of<T>()` bytes from the front of `bytes` and returns it as a `T`.
///
/// Returns `None` and leaves `bytes` unchanged if it isn't long enough.
pub fn read_from_bytes<T: zerocopy::FromBytes>(bytes: &mut &[u8]) -> Option<T> {
    let front = T::read_from_prefix(bytes)?;
    *bytes = &bytes[std::mem::size_of::<T>()..];
    Some(front)
}

/// Removes a slice of `N` from the front of `bytes` and copies
/// it into an owned `[u8; N]`
///
/// Returns `None` and leaves `bytes` unchanged if it isn't long enough.
pub fn read_array<const N: usize>(bytes: &mut &[u8]) -> Option<[u8; N]> {
    if bytes.len() < N {
        return None;
    }
    let mut res = [0u8; N];
    let (front, rest) = bytes.split_at(N);
    res.copy_from_slice(front);
    *bytes = rest;
    Some(res)
}

/// Byte-swaps a single 32-bit word.
#[inline]
fn swap_endian_dw(word: [u8; 4]) -> [u8; 4] {
    u32::from_le_bytes(word).swap_bytes().to_le_bytes()
}

/// Converts a 256-bit signature component between the little-endian limb order
/// of the ecc context and the big-endian order of the report.
///
/// The component is handled as eight 4-byte words: word `i` trades places with
/// word `7 - i` and every word is byte-swapped on the way. Applying it twice
/// yields the original bytes.
pub fn swap_endian_32b(component: &mut [u8; EC256_COMPONENT_SIZE]) {
    const WORDS: usize = EC256_COMPONENT_SIZE / 4;

    let mut words = [[0u8; 4]; WORDS];
    for (word, chunk) in words.iter_mut().zip(component.chunks_exact(4)) {
        word.copy_from_slice(chunk);
    }

    for i in 0..WORDS / 2 {
        let low = swap_endian_dw(words[i]);
        words[i] = swap_endian_dw(words[WORDS - 1 - i]);
        words[WORDS - 1 - i] = low;
    }

    for (chunk, word) in component.chunks_exact_mut(4).zip(words.iter()) {
        chunk.copy_from_slice(word);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting() -> [u8; 32] {
        let mut buf = [0u8; 32];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = i as u8;
        }
        buf
    }

    #[test]
    fn swap_moves_outer_words_inward() {
        let mut buf = counting();
        swap_endian_32b(&mut buf);

        // word 7 (28..32) lands in word 0, byte-swapped
        assert_eq!(&buf[0..4], &[31, 30, 29, 28]);
        // word 0 lands in word 7, byte-swapped
        assert_eq!(&buf[28..32], &[3, 2, 1, 0]);
        // middle pair
        assert_eq!(&buf[12..16], &[19, 18, 17, 16]);
        assert_eq!(&buf[16..20], &[15, 14, 13, 12]);
    }

    #[test]
    fn swap_is_a_full_reversal() {
        let mut buf = counting();
        swap_endian_32b(&mut buf);

        let mut reversed = counting();
        reversed.reverse();
        assert_eq!(buf, reversed);
    }

    #[test]
    fn swap_twice_is_identity() {
        let mut buf = counting();
        swap_endian_32b(&mut buf);
        swap_endian_32b(&mut buf);
        assert_eq!(buf, counting());
    }

    #[test]
    fn read_array_leaves_short_input_untouched() {
        let data = [1u8, 2, 3];
        let mut bytes = &data[..];
        assert_eq!(read_array::<4>(&mut bytes), None);
        assert_eq!(bytes.len(), 3);

        assert_eq!(read_array::<2>(&mut bytes), Some([1, 2]));
        assert_eq!(bytes, &[3]);
    }
}
