/// Normalizes a department name before it is written.
///
/// Surrounding whitespace is trimmed. "IT" and "HR" keep their acronym
/// casing whatever the input casing; every other value is title-cased, a
/// letter becoming upper case when it follows a non-letter and lower case
/// otherwise ("research & development" -> "Research & Development").
pub fn normalize_department(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("it") {
        return "IT".to_string();
    }
    if trimmed.eq_ignore_ascii_case("hr") {
        return "HR".to_string();
    }
    title_case(trimmed)
}

fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_letter = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(ch);
            previous_is_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acronyms_are_special_cased() {
        for raw in ["it", "IT", " It ", "iT"] {
            assert_eq!(normalize_department(raw), "IT");
        }
        for raw in ["hr", "HR", "\thR\n"] {
            assert_eq!(normalize_department(raw), "HR");
        }
    }

    #[test]
    fn other_names_are_title_cased() {
        assert_eq!(normalize_department("  sales "), "Sales");
        assert_eq!(normalize_department("HUMAN RESOURCES"), "Human Resources");
        assert_eq!(normalize_department("research & development"), "Research & Development");
        assert_eq!(normalize_department("r&d"), "R&D");
        assert_eq!(normalize_department("it support"), "It Support");
    }

    #[test]
    fn digits_reset_word_boundaries() {
        assert_eq!(normalize_department("team 2b"), "Team 2B");
    }

    #[test]
    fn blank_input_stays_blank() {
        assert_eq!(normalize_department("   "), "");
    }
}
