//! Repeated string fields (emails, phones, faxes)
//!
//! While editing, every list keeps exactly one blank slot at the end so the
//! user always has an empty input to type a new entry into. Blank entries are
//! never sent to the server.

/// The three repeated fields of a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Emails,
    Phones,
    Faxes,
}

impl ListKind {
    pub const ALL: [ListKind; 3] = [ListKind::Emails, ListKind::Phones, ListKind::Faxes];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Emails => "emails",
            ListKind::Phones => "phones",
            ListKind::Faxes => "faxes",
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Drop blank entries, then append a single blank slot.
pub fn with_trailing_blank(values: &[String]) -> Vec<String> {
    let mut normalized = compact(values);
    normalized.push(String::new());
    normalized
}

/// Position entry `index` ends up at after [`with_trailing_blank`].
/// A blank entry is dropped, so it maps to the new trailing slot.
pub fn index_after_blur(values: &[String], index: usize) -> usize {
    let kept_before = values.iter().take(index).filter(|v| !is_blank(v)).count();
    match values.get(index) {
        Some(value) if !is_blank(value) => kept_before,
        _ => values.iter().filter(|v| !is_blank(v)).count(),
    }
}

/// Drop blank entries and trim surrounding whitespace.
pub fn compact(values: &[String]) -> Vec<String> {
    values
        .iter()
        .filter(|v| !is_blank(v))
        .map(|v| v.trim().to_string())
        .collect()
}

/// Convert phone entries to the server's integer form.
///
/// Every non-digit character is stripped; entries left without digits, or too
/// long for an `i64`, are dropped.
pub fn phone_numbers(values: &[String]) -> Vec<i64> {
    values
        .iter()
        .filter_map(|v| {
            let digits: String = v.chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                None
            } else {
                digits.parse().ok()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn blank_runs_ok(values: &[String]) -> bool {
        let trailing_blanks = values.iter().rev().take_while(|v| is_blank(v)).count();
        let consecutive = values.windows(2).any(|w| is_blank(&w[0]) && is_blank(&w[1]));
        trailing_blanks <= 1 && !consecutive
    }

    #[test]
    fn test_trailing_blank_is_appended() {
        let values = with_trailing_blank(&strings(&["a@b.co"]));
        assert_eq!(values, strings(&["a@b.co", ""]));
    }

    #[test]
    fn test_trailing_blank_on_empty_list() {
        assert_eq!(with_trailing_blank(&[]), strings(&[""]));
    }

    #[test]
    fn test_blank_runs_collapse() {
        let inputs = [
            strings(&["", "", ""]),
            strings(&["x", "", "", "y", "", ""]),
            strings(&["  ", "x", "\t"]),
            strings(&["x", "y"]),
        ];
        for input in inputs {
            let normalized = with_trailing_blank(&input);
            assert!(blank_runs_ok(&normalized), "{:?} -> {:?}", input, normalized);
            assert_eq!(normalized.last().map(String::as_str), Some(""));
        }
    }

    #[test]
    fn test_compact_drops_embedded_blanks() {
        let values = strings(&["", " x ", "", "y", ""]);
        assert_eq!(compact(&values), strings(&["x", "y"]));
    }

    #[test]
    fn test_index_after_blur_follows_entry() {
        let values = strings(&["", "x", "", "y", ""]);
        assert_eq!(index_after_blur(&values, 1), 0);
        assert_eq!(index_after_blur(&values, 3), 1);
        // blank entries land on the trailing slot
        assert_eq!(index_after_blur(&values, 2), 2);
        assert_eq!(index_after_blur(&values, 4), 2);
        assert_eq!(with_trailing_blank(&values)[2], "");
    }

    #[test]
    fn test_phone_numbers_strip_formatting() {
        let values = strings(&["+7 (495) 123-45-67", "", "доб.", "12"]);
        assert_eq!(phone_numbers(&values), vec![74951234567, 12]);
    }

    #[test]
    fn test_phone_numbers_drop_overflow() {
        let values = strings(&["99999999999999999999999"]);
        assert!(phone_numbers(&values).is_empty());
    }
}
