//! Packed locale codes and the locale rules used while picking a configuration
//!
//! Language and region live in two bytes each. Two-letter codes are stored as
//! ASCII, three-letter codes are packed into 15 bits with the high bit set.

pub(crate) const ENGLISH: [u8; 2] = *b"en";
pub(crate) const UNITED_STATES: [u8; 2] = *b"US";
pub(crate) const TAGALOG: [u8; 2] = *b"tl";

/// "fil" packed with base 'a'
pub(crate) const FILIPINO: [u8; 2] = [0xad, 0x05];

/// Regions whose English inherits from US English rather than from International English (en-001)
static US_ENGLISH_LIKE_REGIONS: phf::Set<&'static str> = phf::phf_set! {
    "AS", "GU", "MH", "MP", "PR", "UM", "US", "VI",
};

const LANGUAGE_BASE: u8 = b'a';
const REGION_BASE: u8 = b'0';

fn pack(code: &[u8], base: u8) -> [u8; 2] {
    match code {
        [first, second] => [*first, *second],
        [first, second, third] => {
            let first = first.wrapping_sub(base) & 0x7f;
            let second = second.wrapping_sub(base) & 0x7f;
            let third = third.wrapping_sub(base) & 0x7f;

            [0x80 | (third << 2) | (second >> 3), (second << 5) | first]
        }
        _ => [0, 0],
    }
}

fn unpack(packed: [u8; 2], base: u8) -> String {
    if packed[0] & 0x80 != 0 {
        let first = packed[1] & 0x1f;
        let second = ((packed[1] & 0xe0) >> 5) + ((packed[0] & 0x03) << 3);
        let third = (packed[0] & 0x7c) >> 2;

        return [first + base, second + base, third + base]
            .iter()
            .map(|&c| c as char)
            .collect();
    }

    packed
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as char)
        .collect()
}

/// Pack a lowercase ISO-639 language code, two or three letters
#[inline]
pub fn pack_language(code: &str) -> [u8; 2] {
    pack(code.as_bytes(), LANGUAGE_BASE)
}

/// Pack an uppercase ISO-3166 region or a three-digit UN M.49 code
#[inline]
pub fn pack_region(code: &str) -> [u8; 2] {
    pack(code.as_bytes(), REGION_BASE)
}

#[inline]
pub fn unpack_language(packed: [u8; 2]) -> String {
    unpack(packed, LANGUAGE_BASE)
}

#[inline]
pub fn unpack_region(packed: [u8; 2]) -> String {
    unpack(packed, REGION_BASE)
}

/// Tagalog and Filipino are treated as the same language
pub(crate) fn langs_are_equivalent(left: [u8; 2], right: [u8; 2]) -> bool {
    left == right
        || (left == TAGALOG && right == FILIPINO)
        || (left == FILIPINO && right == TAGALOG)
}

/// Empty region, US and the regions inheriting US English conventions
pub(crate) fn is_close_to_us_english(region: [u8; 2]) -> bool {
    if region[0] == 0 {
        return true;
    }

    US_ENGLISH_LIKE_REGIONS.contains(unpack_region(region).as_str())
}

/// Positive if `left` is the closer region for the request, negative for `right`
///
/// Only exact matches and the region-less parent are ranked, any two other
/// regions are considered equally distant.
pub(crate) fn compare_regions(left: [u8; 2], right: [u8; 2], requested: [u8; 2]) -> i32 {
    if left == right {
        return 0;
    }

    if requested[0] != 0 {
        if left == requested {
            return 1;
        }
        if right == requested {
            return -1;
        }
    }

    match (left[0] == 0, right[0] == 0) {
        (true, false) => 1,
        (false, true) => -1,
        _ => 0,
    }
}

/// Fixed-width, NUL-padded ASCII field to string
pub(crate) fn ascii_field(raw: &[u8]) -> String {
    raw.iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as char)
        .collect()
}

/// Copy `value` into a NUL-padded fixed-width field
pub(crate) fn fill_field<const N: usize>(value: &str) -> [u8; N] {
    let mut out = [0u8; N];
    for (dst, src) in out.iter_mut().zip(value.bytes()) {
        *dst = src;
    }
    out
}
