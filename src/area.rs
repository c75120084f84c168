//! Area-name derivation from placename-order file names.
//!
//! Placename orders are published with file names such as
//! `an-tordu-logainmneacha-contae-an-longfoirt-2014-dreacht.pdf`: the tokens
//! between the `logainmneacha` marker and the four-digit year name the county
//! or Gaeltacht region the order covers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Token that precedes the area words in every placename-order file name.
pub const DEFAULT_MARKER: &str = "logainmneacha";

/// Area returned when the marker or the year cannot be found.
pub const AREA_ERR: &str = "err";

static RE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").unwrap());

/// Derive the area label using the default marker token.
pub fn area_from_file_name(file_name: &str) -> String {
    area_from_file_name_with_marker(file_name, DEFAULT_MARKER)
}

/// Derive the area label: the `-`-separated tokens strictly between `marker`
/// and the first following 4-digit token, joined with spaces.
///
/// Every `.pdf` occurrence is removed before tokenising. Returns
/// [`AREA_ERR`] when either token is missing; a year directly after the
/// marker yields an empty area.
pub fn area_from_file_name_with_marker(file_name: &str, marker: &str) -> String {
    let stem = file_name.replace(".pdf", "");
    let tokens: Vec<&str> = stem.split('-').collect();

    let Some(marker_idx) = tokens.iter().position(|t| *t == marker) else {
        return AREA_ERR.to_string();
    };
    let Some(year_idx) = tokens
        .iter()
        .enumerate()
        .skip(marker_idx + 1)
        .find_map(|(i, t)| RE_YEAR.is_match(t).then_some(i))
    else {
        return AREA_ERR.to_string();
    };

    tokens[marker_idx + 1..year_idx].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_order() {
        assert_eq!(
            area_from_file_name("an-tordu-logainmneacha-contae-an-longfoirt-2014-dreacht.pdf"),
            "contae an longfoirt"
        );
    }

    #[test]
    fn final_order() {
        assert_eq!(
            area_from_file_name("an-tordu-logainmneacha-ceantair-ghaeltachta-2004.pdf"),
            "ceantair ghaeltachta"
        );
        assert_eq!(
            area_from_file_name("an-tordu-logainmneacha-contae-bhaile-atha-cliath-2011.pdf"),
            "contae bhaile atha cliath"
        );
    }

    #[test]
    fn missing_marker_is_err() {
        assert_eq!(area_from_file_name("no-marker-here.pdf"), AREA_ERR);
    }

    #[test]
    fn missing_year_is_err() {
        assert_eq!(area_from_file_name("an-tordu-logainmneacha-contae-laoise.pdf"), "err");
    }

    #[test]
    fn year_before_marker_is_ignored() {
        assert_eq!(
            area_from_file_name("2010-logainmneacha-contae-laoise-2018.pdf"),
            "contae laoise"
        );
        assert_eq!(area_from_file_name("2010-logainmneacha-contae-laoise.pdf"), "err");
    }

    #[test]
    fn only_exact_four_digit_tokens_are_years() {
        assert_eq!(
            area_from_file_name("an-tordu-logainmneacha-oileain-123-20145-2019.pdf"),
            "oileain 123 20145"
        );
    }

    #[test]
    fn year_right_after_marker_gives_empty_area() {
        assert_eq!(area_from_file_name("an-tordu-logainmneacha-2019.pdf"), "");
    }

    #[test]
    fn custom_marker() {
        assert_eq!(
            area_from_file_name_with_marker("placenames-order-county-laois-2018.pdf", "order"),
            "county laois"
        );
    }
}
