use sorrel_runtime::{DateOrder, EngineConfig, LocaleConfig};

#[test]
fn defaults_are_us_english() {
    let config = EngineConfig::default();
    assert_eq!(config.locale.date_order, DateOrder::MonthDay);
    assert_eq!(config.resolution_depth, 8);
    assert_eq!(config.locale.months.len(), 12);
}

#[test]
fn month_lookup_accepts_full_short_and_dotted_names() {
    let locale = LocaleConfig::default();
    assert_eq!(locale.month_number("February"), Some(2));
    assert_eq!(locale.month_number("feb"), Some(2));
    assert_eq!(locale.month_number("FEB"), Some(2));
    assert_eq!(locale.month_number("Sep."), Some(9));
    assert_eq!(locale.month_number("Sept"), None);
    assert_eq!(locale.month_number(""), None);
}

#[test]
fn config_round_trips_through_json() {
    let mut config = EngineConfig::default();
    config.locale.date_order = DateOrder::DayMonth;
    config.resolution_depth = 4;

    let text = serde_json::to_string(&config).expect("serialize");
    assert!(text.contains("day-month"));

    let back: EngineConfig = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(back.locale.date_order, DateOrder::DayMonth);
    assert_eq!(back.resolution_depth, 4);
}

#[test]
fn partial_json_fills_in_defaults() {
    let config: EngineConfig = serde_json::from_str("{}").expect("deserialize");
    assert_eq!(config.resolution_depth, 8);
    assert_eq!(config.locale.date_order, DateOrder::MonthDay);
}

#[test]
fn locale_tables_are_replaceable() {
    let mut locale = LocaleConfig::default();
    locale.months[1].full = "Februar".to_string();
    locale.months[1].short = "Feb".to_string();
    assert_eq!(locale.month_number("Februar"), Some(2));
    assert_eq!(locale.month_number("February"), None);
}
