mod common;

use common::*;
use sorrel_runtime::date::{
    date_from_serial, format_serial, parse_date_literal, serial_from_ymd, serial_to_parts,
    LAST_DAY_FRACTION_LIMIT,
};
use sorrel_runtime::{consts, DateOrder, Engine, EngineConfig, LocaleConfig, MemberCache, Value};
use std::sync::Arc;

fn engine_with_order(order: DateOrder) -> Engine {
    let mut config = EngineConfig::default();
    config.locale.date_order = order;
    let mut en = Engine::new(Arc::new(MemberCache::new()), config);
    en.set_year_provider(|| 2015);
    en
}

fn parse(en: &Engine, text: &str) -> f64 {
    date_serial(&en.date(Value::Str(text.to_string())).expect(text))
}

fn locale() -> LocaleConfig {
    LocaleConfig::default()
}

#[test]
fn two_segments_follow_the_configured_preference() {
    let dm = engine_with_order(DateOrder::DayMonth);
    assert_eq!(parse(&dm, "2/10"), serial_from_ymd(2015, 10, 2));

    let md = engine_with_order(DateOrder::MonthDay);
    assert_eq!(parse(&md, "2/10"), serial_from_ymd(2015, 2, 10));
}

#[test]
fn unambiguous_day_wins_regardless_of_preference() {
    let md = engine_with_order(DateOrder::MonthDay);
    assert_eq!(parse(&md, "13/5"), serial_from_ymd(2015, 5, 13));
    assert_eq!(parse(&md, "5/13"), serial_from_ymd(2015, 5, 13));
}

#[test]
fn two_segments_with_year_default_to_first_of_month() {
    let md = engine_with_order(DateOrder::MonthDay);
    assert_eq!(parse(&md, "3/99"), serial_from_ymd(1999, 3, 1));
    assert_eq!(parse(&md, "3/40"), serial_from_ymd(1940, 3, 1));
    assert_eq!(parse(&md, "3/05"), serial_from_ymd(2015, 3, 5));
}

#[test]
fn numeric_triples_resolve_in_priority_order() {
    let md = engine_with_order(DateOrder::MonthDay);
    assert_eq!(parse(&md, "3/15/07"), serial_from_ymd(2007, 3, 15));
    assert_eq!(parse(&md, "13/5/2001"), serial_from_ymd(2001, 5, 13));
    // Year-first falls back to year-month-day.
    assert_eq!(parse(&md, "2015-03-17"), serial_from_ymd(2015, 3, 17));

    let dm = engine_with_order(DateOrder::DayMonth);
    assert_eq!(parse(&dm, "3/5/2001"), serial_from_ymd(2001, 5, 3));
}

#[test]
fn month_names_resolve_through_the_locale() {
    let md = engine_with_order(DateOrder::MonthDay);
    let expected = serial_from_ymd(2015, 2, 10);
    assert_eq!(parse(&md, "Feb 10, 2015"), expected);
    assert_eq!(parse(&md, "10 Feb 2015"), expected);
    assert_eq!(parse(&md, "2015 Feb 10"), expected);
    assert_eq!(parse(&md, "February 10, 2015"), expected);
    assert_eq!(parse(&md, "10-feb"), serial_from_ymd(2015, 2, 10));
    assert_eq!(parse(&md, "Feb 99"), serial_from_ymd(1999, 2, 1));
}

#[test]
fn day_must_fit_the_resolved_month() {
    let md = engine_with_order(DateOrder::MonthDay);
    let err = md.date(Value::Str("29 Feb".to_string())).unwrap_err();
    assert_eq!(err.number, consts::ERR_INVALID_CALL);

    // A leap-year provider makes the same literal valid.
    let mut leap = engine_with_order(DateOrder::MonthDay);
    leap.set_year_provider(|| 2016);
    assert_eq!(parse(&leap, "29 Feb"), serial_from_ymd(2016, 2, 29));

    let err = md.date(Value::Str("31/4/2000".to_string())).unwrap_err();
    assert_eq!(err.number, consts::ERR_INVALID_CALL);
}

#[test]
fn bare_segment_is_not_a_date() {
    let md = engine_with_order(DateOrder::MonthDay);
    for bad in ["5", "March", "", "  ", "5 PM"] {
        let err = md.date(Value::Str(bad.to_string())).unwrap_err();
        assert_eq!(err.number, consts::ERR_INVALID_CALL, "input {:?}", bad);
    }
}

#[test]
fn trailing_time_and_meridian_strip_off() {
    let md = engine_with_order(DateOrder::MonthDay);
    let base = serial_from_ymd(2000, 1, 2);
    let frac = (22.0 * 3600.0 + 30.0 * 60.0) / 86_400.0;
    assert_eq!(parse(&md, "1/2/2000 10:30 PM"), base + frac);
    assert_eq!(parse(&md, "1/2/2000 22:30"), base + frac);
    assert_eq!(
        parse(&md, "1/2/2000 12:00 AM"),
        base
    );

    // Time alone anchors to the epoch day.
    let t = parse(&md, "10:30:15");
    let p = serial_to_parts(t);
    assert_eq!((p.hour, p.minute, p.second), (10, 30, 15));
    assert_eq!((p.year, p.month, p.day), (1899, 12, 30));
}

#[test]
fn time_components_are_range_checked() {
    let md = engine_with_order(DateOrder::MonthDay);
    for bad in ["1/2/2000 24:00", "1/2/2000 10:60", "1/2/2000 13:00 PM", "1/2/2000 0:30 AM"] {
        let err = md.date(Value::Str(bad.to_string())).unwrap_err();
        assert_eq!(err.number, consts::ERR_INVALID_CALL, "input {:?}", bad);
    }
}

#[test]
fn serial_day_range_is_enforced() {
    assert!(date_from_serial(0.0).is_ok());
    assert!(date_from_serial(consts::MAX_DATE_SERIAL).is_ok());
    assert!(date_from_serial(consts::MIN_DATE_SERIAL).is_ok());

    let err = date_from_serial(consts::MAX_DATE_SERIAL + 1.0).unwrap_err();
    assert_eq!(err.number, consts::ERR_OVERFLOW);
    let err = date_from_serial(consts::MIN_DATE_SERIAL - 1.0).unwrap_err();
    assert_eq!(err.number, consts::ERR_OVERFLOW);
}

#[test]
fn last_day_truncates_subsecond_precision() {
    // One step below the threshold: parses, and the time collapses to
    // whole seconds by truncation rather than rounding.
    let serial = date_from_serial(consts::MAX_DATE_SERIAL + 0.999_999_9).expect("in range");
    assert_eq!(serial, consts::MAX_DATE_SERIAL + 86_399.0 / 86_400.0);
    let p = serial_to_parts(serial);
    assert_eq!((p.year, p.month, p.day), (9999, 12, 31));
    assert_eq!((p.hour, p.minute, p.second), (23, 59, 59));

    let err = date_from_serial(consts::MAX_DATE_SERIAL + LAST_DAY_FRACTION_LIMIT).unwrap_err();
    assert_eq!(err.number, consts::ERR_OVERFLOW);
}

#[test]
fn first_day_has_its_own_threshold() {
    assert!(date_from_serial(consts::MIN_DATE_SERIAL - 0.999_999_99).is_ok());
    let err = date_from_serial(consts::MIN_DATE_SERIAL - 0.999_999_999).unwrap_err();
    assert_eq!(err.number, consts::ERR_OVERFLOW);
}

#[test]
fn negative_serials_carry_time_as_fraction_magnitude() {
    let p = serial_to_parts(-1.5);
    assert_eq!((p.year, p.month, p.day), (1899, 12, 29));
    assert_eq!((p.hour, p.minute, p.second), (12, 0, 0));
}

#[test]
fn formatting_follows_locale_order() {
    let serial = serial_from_ymd(2015, 10, 2);
    assert_eq!(format_serial(serial, &locale()), "10/2/2015");

    let mut dm = locale();
    dm.date_order = DateOrder::DayMonth;
    assert_eq!(format_serial(serial, &dm), "2/10/2015");

    let with_time = serial + (5.0 * 3600.0 + 4.0 * 60.0 + 9.0) / 86_400.0;
    assert_eq!(format_serial(with_time, &locale()), "10/2/2015 5:04:09 AM");

    let evening = serial + (22.0 * 3600.0) / 86_400.0;
    assert_eq!(format_serial(evening, &locale()), "10/2/2015 10:00:00 PM");

    // Epoch-day serials render as time alone.
    assert_eq!(format_serial(0.5, &locale()), "12:00:00 PM");
}

#[test]
fn parse_date_literal_is_locale_driven() {
    // Direct parser access with a pinned year, no engine involved.
    let serial = parse_date_literal("2/10", &locale(), 2015).expect("parse");
    assert_eq!(serial, serial_from_ymd(2015, 2, 10));
}
