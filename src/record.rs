use chrono::NaiveDate;

use crate::classify::Classified;
use crate::infer::{assign_years, Resolved};
use crate::models::{Annotation, ClientRecord};
use crate::token::Token;

/// Pure aggregation: run year inference over the classified tokens, sort
/// ascending, and attach derived counters. No I/O.
pub fn build_record(
    name: &str,
    previous_completed: u32,
    classified: &Classified,
    reference: NaiveDate,
    recency_window_days: i64,
) -> ClientRecord {
    let paid_tokens: Vec<Token> = classified.paid.iter().map(|p| p.token.clone()).collect();
    let paid_resolved = assign_years(&paid_tokens, reference, recency_window_days);

    // Annotations ride on their paid session and keep its inferred date.
    let mut paid_with_notes: Vec<(Resolved, Option<&str>)> = paid_resolved
        .into_iter()
        .zip(classified.paid.iter().map(|p| p.note.as_deref()))
        .collect();
    paid_with_notes.sort_by_key(|(resolved, _)| resolved.sort_key());

    let annotations: Vec<Annotation> = paid_with_notes
        .iter()
        .filter_map(|(resolved, note)| {
            note.map(|text| Annotation {
                date: resolved.render(),
                text: text.to_string(),
            })
        })
        .collect();
    let paid_used: Vec<Resolved> = paid_with_notes
        .into_iter()
        .map(|(resolved, _)| resolved)
        .collect();

    let mut unpaid = assign_years(&classified.unpaid, reference, recency_window_days);
    unpaid.sort_by_key(Resolved::sort_key);

    ClientRecord {
        name: name.to_string(),
        previous_completed,
        paid_used,
        paid_remaining: classified.paid_remaining,
        unpaid,
        annotations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::PaidCell;
    use crate::token::{parse_cell, RawToken};

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 18).unwrap()
    }

    fn paid(raw: &str, note: Option<&str>) -> PaidCell {
        PaidCell {
            token: parse_cell(raw).unwrap(),
            note: note.map(str::to_string),
        }
    }

    fn rendered(resolved: &[Resolved]) -> Vec<String> {
        resolved.iter().map(Resolved::render).collect()
    }

    #[test]
    fn test_paid_sessions_sorted_ascending() {
        let classified = Classified {
            paid: vec![paid("20.12", None), paid("5.1", None), paid("10.1", None)],
            ..Default::default()
        };
        let record = build_record("Ana Pop", 0, &classified, reference(), 90);
        assert_eq!(
            rendered(&record.paid_used),
            ["20.12.2024", "05.01.2025", "10.01.2025"]
        );
    }

    #[test]
    fn test_annotation_keeps_inferred_date() {
        let classified = Classified {
            paid: vec![paid("10.1", Some("check-in")), paid("15.1", None)],
            ..Default::default()
        };
        let record = build_record("Ana Pop", 0, &classified, reference(), 90);
        assert_eq!(record.annotations.len(), 1);
        assert_eq!(record.annotations[0].date, "10.01.2024");
        assert_eq!(record.annotations[0].text, "check-in");
    }

    #[test]
    fn test_opaque_entries_sort_first() {
        let classified = Classified {
            paid: vec![
                paid("10.1", None),
                PaidCell {
                    token: Token::Opaque("31.2".to_string()),
                    note: None,
                },
            ],
            ..Default::default()
        };
        let record = build_record("Ana Pop", 0, &classified, reference(), 90);
        assert_eq!(rendered(&record.paid_used), ["31.2", "10.01.2024"]);
    }

    #[test]
    fn test_counters_derive_from_parts() {
        let classified = Classified {
            paid: vec![paid("10.1", None)],
            unpaid: vec![parse_cell("12.1").unwrap()],
            paid_remaining: 4,
            dateless_unpaid: 2,
        };
        let record = build_record("Ana Pop", 25, &classified, reference(), 90);
        assert_eq!(record.total_current(), 1 + 4 + 1);
        assert_eq!(record.total_all_time(), 25 + 6);
        // Dateless unpaid cells are not counted anywhere.
        assert_eq!(record.unpaid.len(), 1);
    }

    #[test]
    fn test_empty_classification_builds_zeroed_record() {
        let record = build_record("Ana Pop", 0, &Classified::default(), reference(), 90);
        assert!(record.paid_used.is_empty());
        assert!(record.unpaid.is_empty());
        assert_eq!(record.total_all_time(), 0);
    }

    #[test]
    fn test_unpaid_inference_is_independent_of_paid() {
        let classified = Classified {
            paid: vec![paid("10.1", None)],
            unpaid: vec![
                Token::Date(RawToken {
                    day: 20,
                    month: 12,
                    year_hint: None,
                }),
                Token::Date(RawToken {
                    day: 5,
                    month: 1,
                    year_hint: None,
                }),
            ],
            ..Default::default()
        };
        let record = build_record("Ana Pop", 0, &classified, reference(), 90);
        assert_eq!(rendered(&record.unpaid), ["20.12.2024", "05.01.2025"]);
    }
}
