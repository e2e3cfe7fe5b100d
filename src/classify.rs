use tracing::debug;

use crate::grid::ColorClass;
use crate::models::CellObservation;
use crate::token::Token;

/// A paid session cell: its date token plus any free text riding on the
/// colored cell itself (kept as an annotation unless purely numeric).
#[derive(Debug, Clone)]
pub struct PaidCell {
    pub token: Token,
    pub note: Option<String>,
}

/// Output of classifying one client's scan window.
#[derive(Debug, Clone, Default)]
pub struct Classified {
    pub paid: Vec<PaidCell>,
    pub unpaid: Vec<Token>,
    /// Paid cells with no resolvable date: pre-purchased, not yet consumed.
    pub paid_remaining: u32,
    /// Dateless unpaid cells carry no information worth keeping; counted for
    /// the run summary only.
    pub dateless_unpaid: u32,
}

/// Partition a client's observation stream into categorized sessions.
///
/// The anchor is the first colored cell bearing a real date; everything
/// before it is unrelated noise above the true tracking start and is
/// discarded. A stream with no anchor classifies to all-zero.
pub fn classify(observations: &[CellObservation]) -> Classified {
    let mut result = Classified::default();

    let Some(anchor) = anchor_index(observations) else {
        debug!("no anchor found, zeroed record");
        return result;
    };

    for obs in &observations[anchor..] {
        let date = resolve_date(obs);
        match (obs.color, date) {
            (ColorClass::Paid, Some(token)) => {
                let note = obs
                    .text
                    .as_deref()
                    .filter(|t| !is_numeric_literal(t))
                    .map(str::to_string);
                result.paid.push(PaidCell {
                    token: token.clone(),
                    note,
                });
            }
            (ColorClass::Paid, None) => result.paid_remaining += 1,
            (ColorClass::Unpaid, Some(token)) => result.unpaid.push(token.clone()),
            (ColorClass::Unpaid, None) => {
                debug!(row = obs.row, column = obs.column, "dateless unpaid cell dropped");
                result.dateless_unpaid += 1;
            }
            (ColorClass::Neutral, _) => {}
        }
    }

    result
}

/// First observation that is colored and carries a parsed date (not merely
/// an opaque literal) in a neighboring cell.
fn anchor_index(observations: &[CellObservation]) -> Option<usize> {
    observations.iter().position(|obs| {
        obs.color != ColorClass::Neutral && resolve_date(obs).is_some_and(Token::is_date)
    })
}

/// The row below wins whenever it holds anything; only an empty below-cell
/// falls back to the row above.
fn resolve_date(obs: &CellObservation) -> Option<&Token> {
    obs.date_below.as_ref().or(obs.date_above.as_ref())
}

/// Purely numeric text ("30") is a count scribble, not an annotation.
fn is_numeric_literal(text: &str) -> bool {
    !text.trim().is_empty() && text.trim().parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{parse_cell, RawToken};

    fn obs(
        row: u32,
        color: ColorClass,
        text: Option<&str>,
        below: Option<&str>,
        above: Option<&str>,
    ) -> CellObservation {
        CellObservation {
            row,
            column: 4,
            color,
            text: text.map(str::to_string),
            date_below: below.and_then(parse_cell),
            date_above: above.and_then(parse_cell),
        }
    }

    fn date_token(day: u32, month: u32) -> Token {
        Token::Date(RawToken {
            day,
            month,
            year_hint: None,
        })
    }

    #[test]
    fn test_empty_stream_is_all_zero() {
        let c = classify(&[]);
        assert!(c.paid.is_empty());
        assert!(c.unpaid.is_empty());
        assert_eq!(c.paid_remaining, 0);
    }

    #[test]
    fn test_no_anchor_yields_zeroed_result() {
        // Colored cells but no resolvable date anywhere: never an error.
        let stream = vec![
            obs(3, ColorClass::Paid, None, None, None),
            obs(3, ColorClass::Unpaid, None, None, None),
        ];
        let c = classify(&stream);
        assert!(c.paid.is_empty());
        assert_eq!(c.paid_remaining, 0);
        assert_eq!(c.dateless_unpaid, 0);
    }

    #[test]
    fn test_cells_before_anchor_are_discarded() {
        let stream = vec![
            // Stray colored cell with no date: noise above the real start.
            obs(3, ColorClass::Paid, None, None, None),
            obs(5, ColorClass::Paid, None, Some("10.6"), None),
            obs(5, ColorClass::Paid, None, None, None),
        ];
        let c = classify(&stream);
        assert_eq!(c.paid.len(), 1);
        assert_eq!(c.paid[0].token, date_token(10, 6));
        // The dateless paid cell after the anchor counts as remaining; the
        // one before it does not.
        assert_eq!(c.paid_remaining, 1);
    }

    #[test]
    fn test_date_below_preferred_over_above() {
        let stream = vec![obs(
            5,
            ColorClass::Paid,
            None,
            Some("10.6"),
            Some("1.1"),
        )];
        let c = classify(&stream);
        assert_eq!(c.paid[0].token, date_token(10, 6));
    }

    #[test]
    fn test_date_above_used_when_below_empty() {
        let stream = vec![obs(5, ColorClass::Paid, None, None, Some("1.1"))];
        let c = classify(&stream);
        assert_eq!(c.paid[0].token, date_token(1, 1));
    }

    #[test]
    fn test_unpaid_with_date_and_without() {
        let stream = vec![
            obs(5, ColorClass::Paid, None, Some("10.6"), None),
            obs(5, ColorClass::Unpaid, None, Some("12.6"), None),
            obs(5, ColorClass::Unpaid, None, None, None),
        ];
        let c = classify(&stream);
        assert_eq!(c.unpaid, vec![date_token(12, 6)]);
        assert_eq!(c.dateless_unpaid, 1);
    }

    #[test]
    fn test_numeric_text_is_not_an_annotation() {
        let stream = vec![
            obs(5, ColorClass::Paid, Some("30"), Some("10.6"), None),
            obs(5, ColorClass::Paid, Some("check-in"), Some("11.6"), None),
        ];
        let c = classify(&stream);
        assert_eq!(c.paid[0].note, None);
        assert_eq!(c.paid[1].note, Some("check-in".to_string()));
    }

    #[test]
    fn test_opaque_date_cell_does_not_anchor_but_counts_after() {
        let stream = vec![
            // Garbage below-cell: not an anchor.
            obs(3, ColorClass::Paid, None, Some("???"), None),
            obs(5, ColorClass::Paid, None, Some("10.6"), None),
            // After the anchor, an opaque date still rides along verbatim.
            obs(7, ColorClass::Paid, None, Some("31.2"), None),
        ];
        let c = classify(&stream);
        assert_eq!(c.paid.len(), 2);
        assert_eq!(c.paid[0].token, date_token(10, 6));
        assert_eq!(c.paid[1].token, Token::Opaque("31.2".to_string()));
    }

    #[test]
    fn test_idempotent_over_same_stream() {
        let stream = vec![
            obs(5, ColorClass::Paid, Some("note"), Some("10.6"), None),
            obs(5, ColorClass::Unpaid, None, Some("12.6"), None),
            obs(6, ColorClass::Paid, None, None, None),
        ];
        let a = classify(&stream);
        let b = classify(&stream);
        assert_eq!(a.paid.len(), b.paid.len());
        assert_eq!(a.unpaid, b.unpaid);
        assert_eq!(a.paid_remaining, b.paid_remaining);
    }
}
