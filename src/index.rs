use std::collections::BTreeSet;

use crate::domain::Scope;
use crate::merge::Panel;

pub fn list_regions(panel: &Panel) -> Vec<Scope> {
    let mut regions = panel
        .rows()
        .iter()
        .map(|row| Scope::named(row.region.as_str()))
        .collect::<BTreeSet<_>>();
    regions.insert(Scope::All);
    regions.into_iter().collect()
}

pub fn list_sub_regions(panel: &Panel, region: &Scope) -> Vec<Scope> {
    let mut sub_regions = BTreeSet::from([Scope::All]);
    if let Scope::Named(region) = region {
        sub_regions.extend(
            panel
                .rows()
                .iter()
                .filter(|row| &row.region == region)
                .map(|row| row.sub_region.clone()),
        );
    }
    sub_regions.into_iter().collect()
}
