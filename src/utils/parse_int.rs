/// Parse a strictly positive integer from user input; blanks and junk yield `None`.
pub fn parse_positive_int(value: &str) -> Option<usize> {
    let t = value.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<usize>().ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_and_junk() {
        assert_eq!(parse_positive_int(" 25 "), Some(25));
        assert_eq!(parse_positive_int("0"), None);
        assert_eq!(parse_positive_int("-3"), None);
        assert_eq!(parse_positive_int("abc"), None);
    }
}
