//! # Numeral conversion
//!
//! Season and part markers in catalog titles are written with Chinese
//! numerals ("第二十三季"), Arabic digits ("第 2 季") or Roman numerals
//! ("Rocky II", "进击的巨人Ⅲ"). Both converters return `0` for input they
//! cannot interpret; `0` is the "unknown" value throughout the season
//! heuristics, never an error.

const CHINESE_DIGITS: &str = "一二三四五六七八九";

/// Converts a Chinese numeral (or a plain ASCII integer) to a number.
///
/// Evaluation runs right to left with a running unit: `十`/`百`/`千`/`万`
/// set the unit, every other character adds `unit * digit`. A leading unit
/// character stands for one of itself, so `十二` is 12. Characters outside
/// `一..九` count as zero, which means `零` is simply skipped and
/// `一百零五` evaluates to 105.
///
/// ```
/// use douban_meta_core::numeral::chinese_numeral_to_int;
///
/// assert_eq!(chinese_numeral_to_int("二十三"), 23);
/// assert_eq!(chinese_numeral_to_int("12"), 12);
/// assert_eq!(chinese_numeral_to_int(""), 0);
/// ```
pub fn chinese_numeral_to_int(text: &str) -> u32 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }
    if let Ok(value) = text.parse::<u32>() {
        return value;
    }

    let chars: Vec<char> = text.chars().collect();
    let mut result: u32 = 0;
    let mut unit: u32 = 1;
    for (i, c) in chars.iter().enumerate().rev() {
        let next_unit = match c {
            '十' => 10,
            '百' => 100,
            '千' => 1000,
            '万' => 10000,
            _ => {
                let digit = CHINESE_DIGITS
                    .chars()
                    .position(|d| d == *c)
                    .map_or(0, |p| p as u32 + 1);
                result = result.saturating_add(unit.saturating_mul(digit));
                continue;
            }
        };
        unit = next_unit;
        if i == 0 {
            result = result.saturating_add(unit);
        }
    }
    result
}

/// Converts a Roman numeral to a number.
///
/// ASCII numerals (case-insensitive) use standard subtractive-pair
/// evaluation. A single Unicode Roman numeral character in the `Ⅰ..Ⅻ` or
/// `ⅰ..ⅻ` blocks is mapped by code-point offset. Anything else yields 0.
pub fn roman_numeral_to_int(text: &str) -> u32 {
    let text = text.trim();
    let mut chars = text.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(value) = unicode_roman_value(c) {
            return value;
        }
    }

    let mut values = Vec::with_capacity(text.len());
    for c in text.chars() {
        let value = match c.to_ascii_uppercase() {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            'L' => 50,
            'C' => 100,
            'D' => 500,
            'M' => 1000,
            _ => return 0,
        };
        values.push(value);
    }

    let mut total: u32 = 0;
    for (i, value) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(next) if next > value => total = total.saturating_sub(*value),
            _ => total = total.saturating_add(*value),
        }
    }
    total
}

fn unicode_roman_value(c: char) -> Option<u32> {
    let code = c as u32;
    match code {
        0x2160..=0x216B => Some(code - 0x2160 + 1),
        0x2170..=0x217B => Some(code - 0x2170 + 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chinese_reference_table() {
        for (input, expected) in [
            ("一", 1),
            ("九", 9),
            ("十", 10),
            ("十二", 12),
            ("二十", 20),
            ("二十三", 23),
            ("九十九", 99),
            ("一百", 100),
            ("三百二十一", 321),
            ("一千", 1000),
            ("一万二千", 12000),
        ] {
            assert_eq!(chinese_numeral_to_int(input), expected, "input: {input}");
        }
    }

    #[test]
    fn medial_zero_is_skipped() {
        assert_eq!(chinese_numeral_to_int("一百零五"), 105);
    }

    #[test]
    fn ascii_digits_parse_directly() {
        assert_eq!(chinese_numeral_to_int("3"), 3);
        assert_eq!(chinese_numeral_to_int(" 42 "), 42);
    }

    #[test]
    fn unparseable_is_zero() {
        assert_eq!(chinese_numeral_to_int(""), 0);
        assert_eq!(chinese_numeral_to_int("   "), 0);
        assert_eq!(chinese_numeral_to_int("季"), 0);
        assert_eq!(chinese_numeral_to_int("abc"), 0);
    }

    #[test]
    fn roman_subtractive_pairs() {
        for (input, expected) in [
            ("I", 1),
            ("II", 2),
            ("IV", 4),
            ("IX", 9),
            ("XII", 12),
            ("XIV", 14),
            ("xl", 40),
            ("MCMXCIV", 1994),
        ] {
            assert_eq!(roman_numeral_to_int(input), expected, "input: {input}");
        }
    }

    #[test]
    fn roman_unicode_code_points() {
        assert_eq!(roman_numeral_to_int("Ⅰ"), 1);
        assert_eq!(roman_numeral_to_int("Ⅲ"), 3);
        assert_eq!(roman_numeral_to_int("Ⅻ"), 12);
        assert_eq!(roman_numeral_to_int("ⅱ"), 2);
    }

    #[test]
    fn roman_rejects_other_text() {
        assert_eq!(roman_numeral_to_int(""), 0);
        assert_eq!(roman_numeral_to_int("IIa"), 0);
        assert_eq!(roman_numeral_to_int("二"), 0);
    }
}
