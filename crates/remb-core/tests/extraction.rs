use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::str::FromStr;

use remb_core::statement::normalize;
use remb_core::{CareRecord, ExtractionPipeline, FormatHint, GrammarVariant, Outcome};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn consultation() -> CareRecord {
    CareRecord {
        care_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        care_type: "CONSULTATION SPECIALISTE".to_string(),
        care_code: "ABC123".to_string(),
        paid_amount: dec("50.00"),
        reimbursement_base: dec("70.00"),
        reimbursed_amount: dec("35.00"),
        complementary_rate: "30%".to_string(),
        complementary_amount: dec("70.00"),
    }
}

#[test]
fn test_reference_record() {
    let text = "15/03/2024 CONSULTATION SPECIALISTE (ABC123) 50,00 70,00 70% 35,00 30%";
    let extraction = ExtractionPipeline::new().extract(text);

    assert_eq!(extraction.records, vec![consultation()]);
    assert_eq!(extraction.failure_count(), 0);
}

#[test]
fn test_marked_variant_gives_same_record() {
    let text = "*15/03/2024* CONSULTATION SPECIALISTE (ABC123) 50,00 70,00 *70%* 35,00 *30%*";
    let extraction = ExtractionPipeline::new().extract(text);

    assert_eq!(extraction.records, vec![consultation()]);
    assert_eq!(extraction.variant, Some(GrammarVariant::Marked('*')));
}

#[test]
fn test_stray_punctuation_keeps_plain_variant() {
    let text = "Date:15/03/2024 CONSULTATION SPECIALISTE (ABC123) 50,00 70,00 70% 35,00 30%, suite";
    let extraction = ExtractionPipeline::new().extract(text);

    assert_eq!(extraction.records, vec![consultation()]);
    assert_eq!(extraction.variant, Some(GrammarVariant::Plain));
}

#[test]
fn test_reflowed_record_is_unchanged() {
    let reflowed = "15/03/2024\n  CONSULTATION\r\nSPECIALISTE   (ABC123)\n\n50,00\t70,00 70%\n35,00\n30%\n";
    let extraction = ExtractionPipeline::new().extract(reflowed);

    assert_eq!(extraction.records, vec![consultation()]);
}

#[test]
fn test_page_break_inside_marked_record() {
    let text = "Page 1/2\n*15/03/2024*\nCONSULTATION SPECIALISTE (ABC123) 50,00 70,00\x0c\nPage 2/2\n*70%* 35,00 *30%*";
    let extraction = ExtractionPipeline::new().extract(text);

    // The page header lands between two amount fields and breaks the record.
    assert_eq!(extraction.outcome(), Outcome::NoMatches);

    let text = "Page 1/2\n*15/03/2024*\nCONSULTATION SPECIALISTE (ABC123) 50,00 70,00\x0c\n*70%* 35,00 *30%*";
    assert_eq!(ExtractionPipeline::new().extract(text).records, vec![consultation()]);
}

#[test]
fn test_order_preserved() {
    let lines = [
        "02/01/2024 PHARMACIE (PH7) 12,40 12,40 65% 8,06 35%",
        "*10/01/2024* RADIOLOGIE (ZBQK002) 25,00 25,00 *70%* 17,50 *30%*",
        "28/02/2024 SOINS INFIRMIERS (AMI 1) 9,15 9,15 60% 5,49 40%",
    ];
    let text = lines.join("\n");
    let extraction = ExtractionPipeline::new().extract(&text);

    let codes: Vec<_> = extraction.records.iter().map(|r| r.care_code.as_str()).collect();
    assert_eq!(codes, vec!["PH7", "ZBQK002", "AMI 1"]);
    assert_eq!(extraction.records[2].paid_amount, dec("9.15"));
}

#[test]
fn test_invalid_date_then_valid_record() {
    let text = "31/02/2024 CONSULTATION (C) 25,00 25,00 70% 17,50 30% \
                15/03/2024 CONSULTATION SPECIALISTE (ABC123) 50,00 70,00 70% 35,00 30%";
    let extraction = ExtractionPipeline::new().extract(text);

    assert_eq!(extraction.records, vec![consultation()]);
    assert_eq!(extraction.failure_count(), 1);
    assert_eq!(extraction.failures[0].index, 0);
}

#[test]
fn test_text_without_records() {
    let extraction = ExtractionPipeline::new().extract("Votre relevé de remboursements\nTotal 0,00");

    assert!(extraction.records.is_empty());
    assert_eq!(extraction.failure_count(), 0);
    assert_eq!(extraction.outcome(), Outcome::NoMatches);
}

#[test]
fn test_accented_labels() {
    let text = "05/06/2024 RADIOLOGIE MÉDICALE (IMG) 40,00 40,00 70% 28,00 30%";
    let extraction = ExtractionPipeline::new().extract(text);

    assert_eq!(extraction.records[0].care_type, "RADIOLOGIE MÉDICALE");
}

#[test]
fn test_deterministic() {
    let text = "01/02/2024 KINE (K) 16,13 16,13 60% 9,68 40% 03/02/2024 KINE (K) 16,13 16,13 60% 9,68 40%";
    let pipeline = ExtractionPipeline::new();
    assert_eq!(pipeline.extract(text), pipeline.extract(text));
}

#[test]
fn test_normalize_idempotent_on_statement() {
    let text = "  Relevé\n\n 15/03/2024 \t CONSULTATION\r\n";
    let once = normalize(text).into_owned();
    assert_eq!(normalize(&once), once);
}

#[test]
fn test_latin1_bytes_are_undecodable() {
    // "Relevé" encoded as Latin-1
    let bytes = b"Relev\xe9 15/03/2024";
    assert!(ExtractionPipeline::new().extract_bytes(bytes, FormatHint::Auto).is_err());
}
