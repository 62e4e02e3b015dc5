//! Property-based tests for amount and date coercion.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::import::coerce::{excel_serial_to_date, parse_amount, parse_date};

/// Insert `sep` every three digits from the right.
fn group(digits: u64, sep: &str) -> String {
    let raw = digits.to_string();
    let mut out = String::new();
    for (i, c) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(c);
    }
    out
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    // 1900-03-01 .. 2199-12-31
    (693_655i32..803_169).prop_map(|days| NaiveDate::from_num_days_from_ce_opt(days).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Every common way of writing a two-decimal amount parses to the same value.
    #[test]
    fn prop_formatted_amounts_agree(units in 0u64..10_000_000_000, cents in 0u64..100, negative in any::<bool>()) {
        let expected = {
            let v = Decimal::from(units) + Decimal::new(i64::try_from(cents).unwrap(), 2);
            if negative { -v } else { v }
        };
        let sign = if negative { "-" } else { "" };

        let renderings = [
            format!("{sign}{units}.{cents:02}"),
            format!("{sign}{}.{cents:02}", group(units, ",")),
            format!("{sign}{},{cents:02}", group(units, ".")),
            format!("{sign}{},{cents:02}", group(units, " ")),
            format!("{sign}{},{cents:02}", group(units, "\u{a0}")),
            format!("₮ {sign}{}.{cents:02}", group(units, ",")),
        ];

        for text in renderings {
            prop_assert_eq!(parse_amount(&text), Some(expected), "input {:?}", text);
        }
    }

    /// Comma- or space-grouped integers are never mistaken for decimals.
    #[test]
    fn prop_grouped_integers(units in 1_000u64..10_000_000_000) {
        prop_assert_eq!(parse_amount(&group(units, ",")), Some(Decimal::from(units)));
        prop_assert_eq!(parse_amount(&group(units, " ")), Some(Decimal::from(units)));
        prop_assert_eq!(parse_amount(&format!("({})", group(units, ","))), Some(-Decimal::from(units)));
    }

    /// Parenthesised amounts are the negation of the bare amount.
    #[test]
    fn prop_parentheses_negate(units in 0u64..1_000_000_000) {
        let bare = parse_amount(&units.to_string());
        let wrapped = parse_amount(&format!("({units})"));
        prop_assert_eq!(wrapped, bare.map(|v| -v));
    }

    /// Unambiguous date layouts round-trip.
    #[test]
    fn prop_date_layouts_roundtrip(date in arb_date()) {
        for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%d.%m.%Y", "%Y-%m-%d %H:%M:%S"] {
            let text = date.and_hms_opt(9, 30, 0).unwrap().format(fmt).to_string();
            prop_assert_eq!(parse_date(&text), Some(date), "input {:?}", text);
        }
    }

    /// Excel serial numbers decode to the matching day after the 1900 leap bug.
    #[test]
    fn prop_excel_serial_roundtrip(date in arb_date()) {
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
        let serial = u64::try_from((date - epoch).num_days()).unwrap();
        prop_assert_eq!(excel_serial_to_date(serial), Some(date));
        prop_assert_eq!(parse_date(&serial.to_string()), Some(date));
    }
}
