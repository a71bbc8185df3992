use crate::domain::model::{Listing, PropertyType, TenantPreference};

/// Optional exact/range constraints applied on top of the free-text query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub property_type: Option<PropertyType>,
    pub tenant_preference: Option<TenantPreference>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl Criteria {
    pub fn matches(&self, listing: &Listing) -> bool {
        self.property_type
            .is_none_or(|wanted| listing.property_type == wanted)
            && self
                .tenant_preference
                .is_none_or(|wanted| listing.tenant_preference == wanted)
            && self.min_price.is_none_or(|min| listing.rent >= min)
            && self.max_price.is_none_or(|max| listing.rent <= max)
    }
}

/// Case-insensitive substring match over title, location and description.
pub fn matches_query(listing: &Listing, query: &str) -> bool {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return true;
    }

    [&listing.title, &listing.location, &listing.description]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Listings satisfying the query and every supplied criterion, in input order.
pub fn filter<'a>(listings: &'a [Listing], query: &str, criteria: &Criteria) -> Vec<&'a Listing> {
    listings
        .iter()
        .filter(|listing| matches_query(listing, query) && criteria.matches(listing))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AccountId, ListingId};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn listing(title: &str, location: &str, rent: f64, property_type: PropertyType) -> Listing {
        Listing {
            id: ListingId(Uuid::new_v4()),
            title: title.to_string(),
            description: String::new(),
            location: location.to_string(),
            rent,
            property_type,
            tenant_preference: TenantPreference::Family,
            contact_number: "9876543210".to_string(),
            images: vec![],
            owner_id: AccountId(Uuid::new_v4()),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        }
    }

    fn sample() -> Vec<Listing> {
        vec![
            listing("Sunny Flat", "Pune", 8000.0, PropertyType::OneBhk),
            listing("Shared Room", "Mumbai", 4000.0, PropertyType::Pg),
        ]
    }

    fn titles(found: &[&Listing]) -> Vec<String> {
        found.iter().map(|l| l.title.clone()).collect()
    }

    #[test]
    fn test_empty_query_and_criteria_is_identity() {
        let listings = sample();
        let found = filter(&listings, "", &Criteria::default());
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], &listings[0]);
        assert_eq!(found[1], &listings[1]);
    }

    #[test]
    fn test_query_matches_title_substring() {
        let listings = sample();
        let found = filter(&listings, "room", &Criteria::default());
        assert_eq!(titles(&found), vec!["Shared Room"]);
    }

    #[test]
    fn test_query_is_matched_as_typed() {
        let listings = sample();
        assert!(filter(&listings, "flat ", &Criteria::default()).is_empty());
        assert!(filter(&listings, " ", &Criteria::default()).is_empty());
        assert_eq!(
            titles(&filter(&listings, "y fl", &Criteria::default())),
            vec!["Sunny Flat"]
        );
    }

    #[test]
    fn test_query_matches_location_and_description() {
        let mut listings = sample();
        listings[0].description = "Near the IT park".to_string();

        assert_eq!(
            titles(&filter(&listings, "MUMBAI", &Criteria::default())),
            vec!["Shared Room"]
        );
        assert_eq!(
            titles(&filter(&listings, "it park", &Criteria::default())),
            vec!["Sunny Flat"]
        );
    }

    #[test]
    fn test_property_type_and_min_price() {
        let listings = sample();
        let criteria = Criteria {
            property_type: Some(PropertyType::OneBhk),
            min_price: Some(5000.0),
            ..Default::default()
        };
        assert_eq!(titles(&filter(&listings, "", &criteria)), vec!["Sunny Flat"]);
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let listings = sample();
        let at_min = Criteria {
            min_price: Some(8000.0),
            ..Default::default()
        };
        assert_eq!(titles(&filter(&listings, "", &at_min)), vec!["Sunny Flat"]);

        let at_max = Criteria {
            max_price: Some(4000.0),
            ..Default::default()
        };
        assert_eq!(titles(&filter(&listings, "", &at_max)), vec!["Shared Room"]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let listings = sample();
        let criteria = Criteria {
            property_type: Some(PropertyType::Pg),
            ..Default::default()
        };
        assert!(filter(&listings, "pune", &criteria).is_empty());
    }

    #[test]
    fn test_tenant_preference_exact_match() {
        let mut listings = sample();
        listings[1].tenant_preference = TenantPreference::Students;
        let criteria = Criteria {
            tenant_preference: Some(TenantPreference::Students),
            ..Default::default()
        };
        assert_eq!(titles(&filter(&listings, "", &criteria)), vec!["Shared Room"]);
    }

    #[test]
    fn test_filter_is_deterministic_and_order_preserving() {
        let listings = vec![
            listing("Room A", "Pune", 3000.0, PropertyType::Pg),
            listing("Flat B", "Pune", 9000.0, PropertyType::TwoBhk),
            listing("Room C", "Pune", 3500.0, PropertyType::Pg),
        ];
        let criteria = Criteria {
            max_price: Some(5000.0),
            ..Default::default()
        };
        let first = titles(&filter(&listings, "pune", &criteria));
        let second = titles(&filter(&listings, "pune", &criteria));
        assert_eq!(first, vec!["Room A", "Room C"]);
        assert_eq!(first, second);
    }
}
