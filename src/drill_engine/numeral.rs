//! Numbers → speakable segments.
//!
//! Kanji numerals are read with a short pause after each big-unit marker
//! (万, 億, 兆), so `234000` is spoken as `二十三万` ‹pause› `四千`.

use serde::Serialize;

pub const ZERO: &str = "零";

const DIGIT_GLYPHS: [&str; 10] = ["零", "一", "二", "三", "四", "五", "六", "七", "八", "九"];

/// Unit glyphs for the thousands, hundreds, tens and ones positions of a group.
const POSITION_UNITS: [&str; 4] = ["千", "百", "十", ""];

/// Group suffixes from the lowest group upward: 1, 10^4, 10^8, 10^12, 10^16.
const BIG_UNITS: [&str; 5] = ["", "万", "億", "兆", "京"];

/// Markers after which a spoken pause is inserted.
const PAUSE_MARKERS: [char; 3] = ['万', '億', '兆'];

/// One utterance of a rendered number, followed by a pause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    /// Pause after this segment; always 0 for the last one.
    pub pause_after_ms: u64,
}

/// Convert `n` to a kanji numeral.
///
/// A 一 is dropped before 千, 百 and 十, and before the big unit of a
/// leading group that is exactly 1, so `1000` is `千` and `10000` is `万`.
/// Anywhere else a ones-position 1 is spoken: `11` is `十一`, `10001` is
/// `万一`.
pub fn to_kanji(n: u64) -> String {
    if n == 0 {
        return ZERO.to_string();
    }

    let digits: Vec<u8> = n.to_string().bytes().map(|b| b - b'0').collect();
    let group_count = digits.len().div_ceil(4);
    let lead = group_count * 4 - digits.len();

    let mut out = String::new();
    for g in 0..group_count {
        let group: [u8; 4] = std::array::from_fn(|pos| {
            (g * 4 + pos).checked_sub(lead).map(|i| digits[i]).unwrap_or(0)
        });
        let suffix = BIG_UNITS[group_count - g - 1];

        if g == 0 && !suffix.is_empty() && group == [0, 0, 0, 1] {
            out.push_str(suffix);
            continue;
        }

        let mut part = String::new();
        for (pos, &d) in group.iter().enumerate() {
            match (pos, d) {
                (_, 0) => {}
                (0..=2, 1) => part.push_str(POSITION_UNITS[pos]),
                _ => {
                    part.push_str(DIGIT_GLYPHS[d as usize]);
                    part.push_str(POSITION_UNITS[pos]);
                }
            }
        }
        if !part.is_empty() {
            part.push_str(suffix);
            out.push_str(&part);
        }
    }

    if out.is_empty() { ZERO.to_string() } else { out }
}

/// Split a kanji numeral immediately after each big-unit marker.
pub fn split_by_big_units(kanji: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut buf = String::new();
    for c in kanji.chars() {
        buf.push(c);
        if PAUSE_MARKERS.contains(&c) {
            parts.push(std::mem::take(&mut buf));
        }
    }
    if !buf.is_empty() {
        parts.push(buf);
    }
    parts
}

/// Render `n` as ordered segments.
///
/// `tail` is appended to the final segment only; `pause_ms` separates
/// consecutive segments. Decimal rendering is always a single segment.
pub fn render(n: u64, use_kanji: bool, tail: &str, pause_ms: u64) -> Vec<Segment> {
    if !use_kanji {
        return vec![Segment { text: format!("{n}{tail}"), pause_after_ms: 0 }];
    }

    let parts = split_by_big_units(&to_kanji(n));
    let last = parts.len().saturating_sub(1);
    parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| {
            if i == last {
                Segment { text: part + tail, pause_after_ms: 0 }
            } else {
                Segment { text: part, pause_after_ms: pause_ms }
            }
        })
        .collect()
}
