/// Coarse character-overlap ratio between two lower-cased tokens.
///
/// Counts how many characters of the shorter input occur anywhere in the
/// longer one and divides by the longer length. On equal length the first
/// argument is treated as the longer one, so `similarity(a, b)` and
/// `similarity(b, a)` can differ.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let (longer, longer_len, shorter) = if a_len >= b_len { (a, a_len, b) } else { (b, b_len, a) };

    if longer_len == 0 {
        return 1.0;
    }

    let matches = shorter.chars().filter(|ch| longer.contains(*ch)).count();
    matches as f64 / longer_len as f64
}

#[cfg(test)]
mod tests {
    use super::similarity;

    #[test]
    fn identical_tokens_are_fully_similar() {
        assert_eq!(similarity("lamp", "lamp"), 1.0);
        assert_eq!(similarity("x", "x"), 1.0);
    }

    #[test]
    fn empty_inputs_short_circuit() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("lamp", ""), 0.0);
    }

    #[test]
    fn ratio_is_relative_to_longer_token() {
        // "blue" against "deluxe": b misses, l/u/e hit, over six characters
        assert_eq!(similarity("deluxe", "blue"), 0.5);
        assert_eq!(similarity("blue", "deluxe"), 0.5);
    }

    #[test]
    fn misspelling_stays_above_fuzzy_threshold() {
        assert!(similarity("lamp", "lmap") > 0.7);
        assert!(similarity("chair", "chiar") > 0.7);
    }

    #[test]
    fn equal_length_inputs_are_not_symmetric() {
        // longer = "aab": both 'a' and 'c' are checked against it
        assert!((similarity("aab", "acc") - 1.0 / 3.0).abs() < f64::EPSILON);
        // longer = "acc": 'a','a' hit, 'b' misses
        assert!((similarity("acc", "aab") - 2.0 / 3.0).abs() < f64::EPSILON);
    }
}
