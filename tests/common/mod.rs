#![allow(dead_code)]

use chrono::NaiveDate;

use covid_panel::domain::{Counts, PanelRow, Scope};
use covid_panel::source::SourceTable;

pub const CONFIRMED_GLOBAL: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,Italy,41.87,12.56,5,8,12
,\"Korea, South\",35.9,127.7,1,1,2
Victoria,Australia,-37.8,144.9,0,1,3
Queensland,Australia,-27.4,153.0,2,2,4
,US,40.0,-100.0,100,120,150
";

pub const DEATHS_GLOBAL: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,Italy,41.87,12.56,1,1,2
,\"Korea, South\",35.9,127.7,0,0,0
Victoria,Australia,-37.8,144.9,0,0,1
Queensland,Australia,-27.4,153.0,0,0,0
,US,40.0,-100.0,3,4,6
";

pub const RECOVERED_GLOBAL: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,Italy,41.87,12.56,0,1,1
,\"Korea, South\",35.9,127.7,0,1,1
Victoria,Australia,-37.8,144.9,0,0,0
Queensland,Australia,-27.4,153.0,1,1,1
,US,40.0,-100.0,0,0,0
";

pub const CONFIRMED_US: &str = "\
UID,iso2,iso3,code3,FIPS,Admin2,Province_State,Country_Region,Lat,Long_,Combined_Key,1/22/20,1/23/20,1/24/20
84039035,US,USA,840,39035,Cuyahoga,Ohio,US,41.4,-81.6,\"Cuyahoga, Ohio, US\",30,40,50
84039049,US,USA,840,39049,Franklin,Ohio,US,39.9,-82.9,\"Franklin, Ohio, US\",20,25,35
84006037,US,USA,840,6037,Los Angeles,California,US,34.3,-118.2,\"Los Angeles, California, US\",80,90,100
";

pub const DEATHS_US: &str = "\
UID,iso2,iso3,code3,FIPS,Admin2,Province_State,Country_Region,Lat,Long_,Combined_Key,Population,1/22/20,1/23/20,1/24/20
84039035,US,USA,840,39035,Cuyahoga,Ohio,US,41.4,-81.6,\"Cuyahoga, Ohio, US\",1235072,1,2,3
84039049,US,USA,840,39049,Franklin,Ohio,US,39.9,-82.9,\"Franklin, Ohio, US\",1316756,0,1,1
84006037,US,USA,840,6037,Los Angeles,California,US,34.3,-118.2,\"Los Angeles, California, US\",10039107,2,3,5
";

pub fn fixture(table: SourceTable) -> &'static str {
    match table {
        SourceTable::ConfirmedGlobal => CONFIRMED_GLOBAL,
        SourceTable::DeathsGlobal => DEATHS_GLOBAL,
        SourceTable::RecoveredGlobal => RECOVERED_GLOBAL,
        SourceTable::ConfirmedUs => CONFIRMED_US,
        SourceTable::DeathsUs => DEATHS_US,
    }
}

pub fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, n).unwrap()
}

pub fn row(
    region: &str,
    sub_region: Scope,
    date: NaiveDate,
    confirmed: f64,
    deaths: f64,
    recovered: f64,
) -> PanelRow {
    PanelRow {
        region: region.to_string(),
        sub_region,
        date,
        counts: Counts::new(confirmed, deaths, recovered),
    }
}
