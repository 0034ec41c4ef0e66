//! Record grammar and matcher.
//!
//! One line item on a statement reads, after normalization:
//!
//! ```text
//! 15/03/2024 CONSULTATION SPECIALISTE (ABC123) 50,00 70,00 70% 35,00 30%
//! ```
//!
//! Some document families wrap the date and both percentages in a delimiter
//! (`*15/03/2024* ... *70%* 35,00 *30%*`). Both families are described by a
//! single [`RecordGrammar`] parameterized by a [`Marker`].

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::rules::{AMOUNT_FIELD, ANY_MARKER, CODE_FIELD, DATE_FIELD, LABEL_FIELD, RATE_FIELD};
use crate::models::care::{GrammarVariant, RawRecordMatch};

/// Open/close marker groups around the date and both percentages.
const MARKER_PAIRS: [(&str, &str); 3] = [
    ("date_open", "date_close"),
    ("rate1_open", "rate1_close"),
    ("rate2_open", "rate2_close"),
];

/// Delimiter accepted around dates and percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marker {
    /// Plain variant only.
    None,
    /// Plain variant, or marked with this exact character.
    Literal(char),
    /// Plain variant, or marked with any single delimiter character.
    #[default]
    Any,
}

impl FromStr for Marker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "any" => return Ok(Marker::Any),
            "none" | "" => return Ok(Marker::None),
            _ => {}
        }

        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_alphanumeric() && !c.is_whitespace() && c != '(' && c != ')' => {
                Ok(Marker::Literal(c))
            }
            _ => Err(format!(
                "invalid marker {:?}: expected \"any\", \"none\" or one delimiter character",
                s
            )),
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::None => f.write_str("none"),
            Marker::Literal(c) => write!(f, "{}", c),
            Marker::Any => f.write_str("any"),
        }
    }
}

/// The positional grammar of one reimbursement line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordGrammar {
    marker: Marker,
}

impl RecordGrammar {
    pub fn new(marker: Marker) -> Self {
        Self { marker }
    }

    /// Whitespace-separated fields only.
    pub fn plain() -> Self {
        Self::new(Marker::None)
    }

    /// Plain, or marked with `marker`.
    pub fn marked(marker: char) -> Self {
        Self::new(Marker::Literal(marker))
    }

    pub fn marker(&self) -> Marker {
        self.marker
    }

    /// Regex source for this grammar.
    pub fn pattern(&self) -> String {
        let marker = match self.marker {
            Marker::None => None,
            Marker::Literal(c) => Some(regex::escape(&c.to_string())),
            Marker::Any => Some(ANY_MARKER.to_string()),
        };
        // Markers sit directly against the field they wrap.
        let optional = |name: &str| match &marker {
            Some(m) => format!(r"(?P<{name}>{m})?"),
            None => String::new(),
        };

        format!(
            concat!(
                r"{date_open}(?P<date>{date}){date_close}\s+",
                r"(?P<care_type>{label})\s*\((?P<care_code>{code})\)\s*",
                r"(?P<paid_amount>{amount})\s+",
                r"(?P<reimbursement_base>{amount})\s+",
                r"{rate1_open}(?P<complementary_amount>{rate}){rate1_close}\s+",
                r"(?P<reimbursed_amount>{amount})\s+",
                r"{rate2_open}(?P<complementary_rate>{rate}){rate2_close}",
            ),
            date_open = optional("date_open"),
            date_close = optional("date_close"),
            rate1_open = optional("rate1_open"),
            rate1_close = optional("rate1_close"),
            rate2_open = optional("rate2_open"),
            rate2_close = optional("rate2_close"),
            date = DATE_FIELD,
            label = LABEL_FIELD,
            code = CODE_FIELD,
            amount = AMOUNT_FIELD,
            rate = RATE_FIELD,
        )
    }
}

lazy_static! {
    static ref PLAIN_RECORD: Regex = Regex::new(&RecordGrammar::plain().pattern()).unwrap();
    static ref ANY_MARKED_RECORD: Regex =
        Regex::new(&RecordGrammar::new(Marker::Any).pattern()).unwrap();
}

/// Scans normalized text for occurrences of a [`RecordGrammar`].
#[derive(Debug, Clone)]
pub struct RecordMatcher {
    grammar: RecordGrammar,
    regex: Regex,
}

impl RecordMatcher {
    pub fn new(grammar: RecordGrammar) -> Self {
        let regex = match grammar.marker {
            Marker::None => PLAIN_RECORD.clone(),
            Marker::Any => ANY_MARKED_RECORD.clone(),
            // The marker is escaped, so the pattern always compiles.
            Marker::Literal(_) => Regex::new(&grammar.pattern()).expect("escaped record grammar"),
        };
        Self { grammar, regex }
    }

    pub fn grammar(&self) -> RecordGrammar {
        self.grammar
    }

    /// Lazily yield every non-overlapping occurrence, left to right.
    pub fn matches<'a>(&'a self, text: &'a str) -> impl Iterator<Item = RawRecordMatch> + 'a {
        self.regex
            .captures_iter(text)
            .enumerate()
            .map(|(index, caps)| {
                let raw = raw_match(index, &caps);
                trace!("Matched record {} at {:?} ({})", index, raw.span, raw.variant);
                raw
            })
    }

    /// Variant used by the first occurrence, if any.
    pub fn detect_variant(&self, text: &str) -> Option<GrammarVariant> {
        self.regex.captures(text).map(|caps| variant_of(&caps))
    }
}

impl Default for RecordMatcher {
    fn default() -> Self {
        Self::new(RecordGrammar::default())
    }
}

/// A record is marked only when the date and both percentages are wrapped
/// on both sides by the same character.
fn variant_of(caps: &Captures<'_>) -> GrammarVariant {
    let mut pairs = MARKER_PAIRS
        .iter()
        .map(|(open, close)| marker_pair(caps, open, close));

    match pairs.next().flatten() {
        Some(c) if pairs.all(|pair| pair == Some(c)) => GrammarVariant::Marked(c),
        _ => GrammarVariant::Plain,
    }
}

fn marker_pair(caps: &Captures<'_>, open: &str, close: &str) -> Option<char> {
    let open = caps.name(open)?.as_str().chars().next()?;
    let close = caps.name(close)?.as_str().chars().next()?;
    (open == close).then_some(open)
}

fn raw_match(index: usize, caps: &Captures<'_>) -> RawRecordMatch {
    let group = |name: &str| caps.name(name).map(|m| m.as_str().to_string()).unwrap_or_default();
    let variant = variant_of(caps);

    // Stray punctuation against a plain record stays outside its span
    let span = match variant {
        GrammarVariant::Marked(_) => caps.get(0).map(|m| (m.start(), m.end())),
        GrammarVariant::Plain => caps
            .name("date")
            .zip(caps.name("complementary_rate"))
            .map(|(first, last)| (first.start(), last.end())),
    }
    .unwrap_or_default();

    RawRecordMatch {
        index,
        span,
        variant,
        date: group("date"),
        care_type: group("care_type"),
        care_code: group("care_code"),
        paid_amount: group("paid_amount"),
        reimbursement_base: group("reimbursement_base"),
        complementary_amount: group("complementary_amount"),
        reimbursed_amount: group("reimbursed_amount"),
        complementary_rate: group("complementary_rate"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PLAIN: &str = "15/03/2024 CONSULTATION SPECIALISTE (ABC123) 50,00 70,00 70% 35,00 30%";
    const MARKED: &str = "*15/03/2024* CONSULTATION SPECIALISTE (ABC123) 50,00 70,00 *70%* 35,00 *30%*";

    #[test]
    fn test_plain_groups() {
        let matcher = RecordMatcher::default();
        let found: Vec<_> = matcher.matches(PLAIN).collect();

        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].groups(),
            [
                "15/03/2024",
                "CONSULTATION SPECIALISTE",
                "ABC123",
                "50,00",
                "70,00",
                "70%",
                "35,00",
                "30%",
            ]
        );
        assert_eq!(found[0].variant, GrammarVariant::Plain);
        assert_eq!(found[0].span, (0, PLAIN.len()));
    }

    #[test]
    fn test_marked_groups_are_stripped() {
        let matcher = RecordMatcher::default();
        let found: Vec<_> = matcher.matches(MARKED).collect();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, "15/03/2024");
        assert_eq!(found[0].complementary_amount, "70%");
        assert_eq!(found[0].complementary_rate, "30%");
        assert_eq!(found[0].variant, GrammarVariant::Marked('*'));
    }

    #[test]
    fn test_literal_marker() {
        let matcher = RecordMatcher::new(RecordGrammar::marked('|'));
        let text = "|15/03/2024| SOINS (X) 1,00 2,00 |60%| 3,00 |10%|";
        let found: Vec<_> = matcher.matches(text).collect();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].variant, GrammarVariant::Marked('|'));

        // Plain text still matches under a literal marker
        assert_eq!(matcher.matches(PLAIN).count(), 1);
    }

    #[test]
    fn test_plain_grammar_rejects_marked_rates() {
        let matcher = RecordMatcher::new(RecordGrammar::plain());
        let text = "15/03/2024 SOINS (X) 1,00 2,00 *60%* 3,00 *10%*";
        assert_eq!(matcher.matches(text).count(), 0);
    }

    #[test]
    fn test_date_with_internal_spaces() {
        let matcher = RecordMatcher::default();
        let text = "#15 / 03 /2024# PHARMACIE (PH4) 12,30 12,30 #65%# 8,00 #0%#";
        let found: Vec<_> = matcher.matches(text).collect();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, "15 / 03 /2024");
        assert_eq!(found[0].care_type, "PHARMACIE");
        assert_eq!(found[0].variant, GrammarVariant::Marked('#'));
    }

    #[test]
    fn test_matches_in_order_without_overlap() {
        let text = format!(
            "Releve {} puis 01/04/2024 RADIOLOGIE (R1) 80,00 60,00 70% 42,00 30% fin",
            MARKED
        );
        let matcher = RecordMatcher::default();
        let found: Vec<_> = matcher.matches(&text).collect();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].index, 0);
        assert_eq!(found[1].index, 1);
        assert_eq!(found[1].date, "01/04/2024");
        assert!(found[0].span.1 <= found[1].span.0);
    }

    #[test]
    fn test_markers_must_touch_their_field() {
        let matcher = RecordMatcher::default();
        let text = "02/01/2024 PHARMACIE (PH7) 12,40 12,40 65% 8,06 35% *10/01/2024* SOINS (S) 1,00 1,00 *70%* 1,00 *30%*";
        let found: Vec<_> = matcher.matches(text).collect();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].variant, GrammarVariant::Plain);
        assert_eq!(found[1].variant, GrammarVariant::Marked('*'));
    }

    #[test]
    fn test_trailing_punctuation_is_plain() {
        let matcher = RecordMatcher::default();
        let text = format!("{}, suite", PLAIN);
        let found: Vec<_> = matcher.matches(&text).collect();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].variant, GrammarVariant::Plain);
        assert_eq!(found[0].complementary_rate, "30%");
        assert_eq!(found[0].span, (0, PLAIN.len()));
    }

    #[test]
    fn test_date_prefix_is_plain() {
        let matcher = RecordMatcher::default();
        let text = format!("Date:{}", PLAIN);
        let found: Vec<_> = matcher.matches(&text).collect();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].variant, GrammarVariant::Plain);
        assert_eq!(found[0].date, "15/03/2024");
        assert_eq!(found[0].span, ("Date:".len(), text.len()));
    }

    #[test]
    fn test_mismatched_markers_are_plain() {
        let matcher = RecordMatcher::default();

        let text = "*15/03/2024# SOINS (S) 1,00 2,00 |70%* 3,00 -30%+";
        let found: Vec<_> = matcher.matches(text).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].variant, GrammarVariant::Plain);
        assert_eq!(found[0].date, "15/03/2024");

        // Date wrapped, percentages wrapped with another character
        let text = "*15/03/2024* SOINS (S) 1,00 2,00 #70%# 3,00 #30%#";
        assert_eq!(matcher.detect_variant(text), Some(GrammarVariant::Plain));

        // Date wrapped, percentages bare
        let text = "*15/03/2024* SOINS (S) 1,00 2,00 70% 3,00 30%";
        assert_eq!(matcher.detect_variant(text), Some(GrammarVariant::Plain));
    }

    #[test]
    fn test_spaced_markers_do_not_match() {
        let matcher = RecordMatcher::default();
        let text = "* 15/03/2024 * SOINS (S) 1,00 2,00 * 70% * 3,00 * 30% *";
        assert_eq!(matcher.matches(text).count(), 0);
    }

    #[test]
    fn test_no_matches() {
        let matcher = RecordMatcher::default();
        assert_eq!(matcher.matches("Aucun remboursement ce mois-ci.").count(), 0);
        assert_eq!(matcher.detect_variant("nothing here"), None);
    }

    #[test]
    fn test_detect_variant() {
        let matcher = RecordMatcher::default();
        assert_eq!(matcher.detect_variant(PLAIN), Some(GrammarVariant::Plain));
        assert_eq!(matcher.detect_variant(MARKED), Some(GrammarVariant::Marked('*')));
    }

    #[test]
    fn test_marker_from_str() {
        assert_eq!("any".parse::<Marker>().unwrap(), Marker::Any);
        assert_eq!("none".parse::<Marker>().unwrap(), Marker::None);
        assert_eq!("*".parse::<Marker>().unwrap(), Marker::Literal('*'));
        assert!("a".parse::<Marker>().is_err());
        assert!("(".parse::<Marker>().is_err());
        assert!("**".parse::<Marker>().is_err());
    }
}
