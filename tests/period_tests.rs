// Manual period entry and range selection tests

use volstats::engine::{DisplayRange, Period, PeriodError, RangeName, YearMonth, YearWindow};

fn parse(input: &str) -> Result<Period, PeriodError> {
    Period::parse(input, &YearWindow::default())
}

#[test]
fn test_accepts_month_and_year() {
    assert_eq!(parse("2020-02"), Ok(Period::Month(YearMonth::new(2020, 2).unwrap())));
    assert_eq!(parse("2020-2"), Ok(Period::Month(YearMonth::new(2020, 2).unwrap())));
    assert_eq!(parse("2020"), Ok(Period::Year(2020)));
    assert_eq!(parse(" 2013 "), Ok(Period::Year(2013)));
    assert_eq!(parse("2050-12"), Ok(Period::Month(YearMonth::new(2050, 12).unwrap())));
}

#[test]
fn test_rejects_year_outside_window() {
    assert_eq!(
        parse("1999"),
        Err(PeriodError::YearOutOfRange {
            year: 1999,
            min: 2013,
            max: 2050
        })
    );
    assert!(matches!(parse("2051-01"), Err(PeriodError::YearOutOfRange { year: 2051, .. })));
}

#[test]
fn test_rejects_month_token_13() {
    assert_eq!(parse("2020-13"), Err(PeriodError::MonthOutOfRange(13)));
    assert_eq!(parse("2020-00"), Err(PeriodError::MonthOutOfRange(0)));
}

#[test]
fn test_rejects_malformed_tokens() {
    for input in ["", "abcd", "2020-", "-02", "20200", "2020-123", "2020/02", "2020-0x", "+2020"] {
        assert!(
            matches!(parse(input), Err(PeriodError::Malformed(_))),
            "{input:?} should be malformed"
        );
    }
}

#[test]
fn test_custom_year_window() {
    let window = YearWindow {
        min_year: 2000,
        max_year: 2010,
    };
    assert_eq!(Period::parse("2005", &window), Ok(Period::Year(2005)));
    assert!(Period::parse("2020", &window).is_err());
}

#[test]
fn test_captions() {
    assert_eq!(parse("2020-02").unwrap().caption(), "February 2020");
    assert_eq!(parse("2020").unwrap().caption(), "2020");
}

#[test]
fn test_range_from_parts() {
    let feb = parse("2020-02").unwrap();
    assert_eq!(DisplayRange::from_parts(None, None), Ok(DisplayRange::LastMinute));
    assert_eq!(
        DisplayRange::from_parts(Some(RangeName::Hour), None),
        Ok(DisplayRange::LastHour)
    );
    assert_eq!(
        DisplayRange::from_parts(Some(RangeName::Month), None),
        Ok(DisplayRange::Month(None))
    );
    assert_eq!(
        DisplayRange::from_parts(None, Some(feb)),
        Ok(DisplayRange::Month(YearMonth::new(2020, 2)))
    );
    assert_eq!(
        DisplayRange::from_parts(Some(RangeName::Year), Some(Period::Year(2019))),
        Ok(DisplayRange::Year(Some(2019)))
    );
    assert!(matches!(
        DisplayRange::from_parts(Some(RangeName::Year), Some(feb)),
        Err(PeriodError::RangeMismatch { range: "year", .. })
    ));
}

#[test]
fn test_range_names_deserialize() {
    let name: RangeName = serde_json::from_str("\"min\"").unwrap();
    assert_eq!(name, RangeName::Minute);
    let name: RangeName = serde_json::from_str("\"year\"").unwrap();
    assert_eq!(name, RangeName::Year);
}
