//! Alphanumeric-chunked "natural" string comparison.
//!
//! Names are compared chunk by chunk: maximal digit runs numerically,
//! text runs character by character. "Vendor2" sorts before
//! "Vendor10", and a strict prefix sorts before its extension.

use std::cmp::Ordering;

pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (mut i, mut j) = (0usize, 0usize);

    while i < a.len() && j < b.len() {
        let a_digit = a[i].is_ascii_digit();
        let b_digit = b[j].is_ascii_digit();

        if a_digit && b_digit {
            let a_run = digit_run(&a, i);
            let b_run = digit_run(&b, j);
            match cmp_digit_runs(&a[i..a_run], &b[j..b_run]) {
                Ordering::Equal => {
                    i = a_run;
                    j = b_run;
                }
                other => return other,
            }
        } else if a_digit != b_digit {
            return a[i].cmp(&b[j]);
        } else {
            match a[i].cmp(&b[j]) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                other => return other,
            }
        }
    }

    // Strict prefix sorts first.
    (a.len() - i).cmp(&(b.len() - j))
}

fn digit_run(chars: &[char], start: usize) -> usize {
    let mut end = start;
    while end < chars.len() && chars[end].is_ascii_digit() {
        end += 1;
    }
    end
}

/// Compares two digit runs as integers without parsing: strip leading
/// zeros, longer run wins, equal lengths compare lexicographically.
fn cmp_digit_runs(a: &[char], b: &[char]) -> Ordering {
    let a = trim_leading_zeros(a);
    let b = trim_leading_zeros(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn trim_leading_zeros(digits: &[char]) -> &[char] {
    let first = digits.iter().position(|c| *c != '0').unwrap_or(digits.len());
    &digits[first..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_chunks_compare_by_value() {
        let mut names = vec!["Vendor2", "Vendor10", "Vendor1"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["Vendor1", "Vendor2", "Vendor10"]);
    }

    #[test]
    fn prefix_sorts_before_extension() {
        assert_eq!(natural_cmp("Vendor", "Vendor1"), Ordering::Less);
        assert_eq!(natural_cmp("Vendor1", "Vendor"), Ordering::Greater);
        assert_eq!(natural_cmp("Vendor1", "Vendor1"), Ordering::Equal);
    }

    #[test]
    fn leading_zeros_do_not_change_numeric_value() {
        assert_eq!(natural_cmp("Hub007", "Hub7"), Ordering::Equal);
        assert_eq!(natural_cmp("Hub007", "Hub10"), Ordering::Less);
    }

    #[test]
    fn mixed_chunks_fall_back_to_character_order() {
        assert_eq!(natural_cmp("Depot9East", "Depot10East"), Ordering::Less);
        assert_eq!(natural_cmp("A1", "AB"), Ordering::Less);
    }
}
