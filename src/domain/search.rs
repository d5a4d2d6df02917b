use super::pool::Pool;

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Filters pools by free text and an optional country token.
///
/// Text matches title, organizer, manufacturer or description; the country
/// matches supplier or organizer location. Both are case-insensitive and a
/// blank value matches everything. Input order is preserved.
pub fn filter_pools<'a>(pools: &'a [Pool], query: &str, country: Option<&str>) -> Vec<&'a Pool> {
    let query = query.trim().to_lowercase();
    let country = country
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty());

    pools
        .iter()
        .filter(|pool| {
            query.is_empty()
                || [
                    &pool.title,
                    &pool.organizer,
                    &pool.manufacturer,
                    &pool.description,
                ]
                .iter()
                .any(|field| contains_ci(field, &query))
        })
        .filter(|pool| match &country {
            Some(country) => {
                contains_ci(&pool.supplier_location, country)
                    || contains_ci(&pool.organizer_location, country)
            }
            None => true,
        })
        .collect()
}
