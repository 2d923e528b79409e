mod common;

use assert_matches::assert_matches;

use covid_panel::domain::{RawRecord, Scope};
use covid_panel::error::PanelError;
use covid_panel::source::{
    DirectorySourceClient, SourceTable, TableLayout, load_bundle, load_metric, parse_wide_table,
};

use common::{CONFIRMED_GLOBAL, CONFIRMED_US, DEATHS_US, day, fixture};

fn value_of(records: &[RawRecord], region: &str, sub_region: &Scope, date_day: u32) -> f64 {
    records
        .iter()
        .find(|record| {
            record.region == region
                && &record.sub_region == sub_region
                && record.date == day(date_day)
        })
        .map(|record| record.value)
        .unwrap()
}

#[test]
fn melts_global_table() {
    let records = parse_wide_table("confirmed", TableLayout::Global, CONFIRMED_GLOBAL).unwrap();
    assert_eq!(records.len(), 5 * 3);
    assert_eq!(value_of(&records, "Italy", &Scope::All, 24), 12.0);
    assert_eq!(value_of(&records, "Korea, South", &Scope::All, 22), 1.0);
    assert_eq!(
        value_of(&records, "Australia", &Scope::named("Victoria"), 23),
        1.0
    );
}

#[test]
fn blank_province_becomes_all() {
    let records = parse_wide_table("confirmed", TableLayout::Global, CONFIRMED_GLOBAL).unwrap();
    assert!(
        records
            .iter()
            .filter(|record| record.region == "Italy")
            .all(|record| record.sub_region.is_all())
    );
}

#[test]
fn us_counties_are_summed_per_state() {
    let records = parse_wide_table("confirmed_us", TableLayout::Us, CONFIRMED_US).unwrap();
    assert_eq!(records.len(), 2 * 3);
    assert_eq!(value_of(&records, "US", &Scope::named("Ohio"), 22), 50.0);
    assert_eq!(value_of(&records, "US", &Scope::named("Ohio"), 24), 85.0);
    assert_eq!(
        value_of(&records, "US", &Scope::named("California"), 24),
        100.0
    );
}

#[test]
fn us_population_column_is_discarded() {
    let records = parse_wide_table("deaths_us", TableLayout::Us, DEATHS_US).unwrap();
    assert_eq!(records.len(), 2 * 3);
    assert_eq!(value_of(&records, "US", &Scope::named("Ohio"), 24), 4.0);
}

#[test]
fn malformed_date_header_fails() {
    let text = "Province/State,Country/Region,Lat,Long,1/22/20,Jan 23\n,Italy,0,0,1,2\n";
    let err = parse_wide_table("confirmed", TableLayout::Global, text).unwrap_err();
    assert_matches!(err, PanelError::MalformedDateHeader { header, .. } if header == "Jan 23");
}

#[test]
fn missing_region_column_fails() {
    let text = "Province/State,Lat,Long,1/22/20\n,0,0,1\n";
    let err = parse_wide_table("confirmed", TableLayout::Global, text).unwrap_err();
    assert_matches!(err, PanelError::MissingColumn { column, .. } if column == "Country/Region");
}

#[test]
fn ragged_row_fails() {
    let text = "Province/State,Country/Region,Lat,Long,1/22/20\n,Italy,0,0\n";
    let err = parse_wide_table("confirmed", TableLayout::Global, text).unwrap_err();
    assert_matches!(err, PanelError::RaggedRow { line: 2, found: 4, expected: 5, .. });
}

#[test]
fn non_numeric_value_fails() {
    let text = "Province/State,Country/Region,Lat,Long,1/22/20\n,Italy,0,0,many\n";
    let err = parse_wide_table("confirmed", TableLayout::Global, text).unwrap_err();
    assert_matches!(err, PanelError::InvalidValue { line: 2, .. });
}

#[test]
fn empty_value_counts_as_zero() {
    let text = "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20\n,Italy,0,0,,4\n";
    let records = parse_wide_table("recovered", TableLayout::Global, text).unwrap();
    assert_eq!(value_of(&records, "Italy", &Scope::All, 22), 0.0);
    assert_eq!(value_of(&records, "Italy", &Scope::All, 23), 4.0);
}

#[test]
fn table_without_dates_fails() {
    let text = "Province/State,Country/Region,Lat,Long\n,Italy,0,0\n";
    let err = parse_wide_table("confirmed", TableLayout::Global, text).unwrap_err();
    assert_matches!(err, PanelError::EmptyTable(_));
    assert_matches!(
        parse_wide_table("confirmed", TableLayout::Global, ""),
        Err(PanelError::EmptyTable(_))
    );
}

#[test]
fn directory_client_loads_tables() {
    let temp = tempfile::tempdir().unwrap();
    for table in SourceTable::ALL {
        std::fs::write(temp.path().join(table.file_name()), fixture(table)).unwrap();
    }
    let root = camino::Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let client = DirectorySourceClient::new(root);

    let deaths = load_metric(&client, SourceTable::DeathsGlobal).unwrap();
    assert_eq!(value_of(&deaths, "US", &Scope::All, 24), 6.0);

    let bundle = load_bundle(&client).unwrap();
    assert_eq!(bundle.global_recovered.len(), 15);
    assert_eq!(bundle.us_confirmed.len(), 6);
}

#[test]
fn directory_client_missing_file_fails() {
    let temp = tempfile::tempdir().unwrap();
    let root = camino::Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let client = DirectorySourceClient::new(root);
    let err = load_bundle(&client).unwrap_err();
    assert_matches!(err, PanelError::Filesystem(_));
}

#[test]
fn leading_byte_order_mark_is_ignored() {
    let text = format!("\u{feff}{CONFIRMED_GLOBAL}");
    let records = parse_wide_table("confirmed", TableLayout::Global, &text).unwrap();
    assert_eq!(records.len(), 5 * 3);
    assert_eq!(value_of(&records, "Italy", &Scope::All, 22), 5.0);
}
