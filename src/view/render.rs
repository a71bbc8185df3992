use crate::domain::model::{Account, Listing};
use crate::utils::error::{Result, RoomError};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

pub fn format_rent(rent: f64) -> String {
    if rent.fract() == 0.0 {
        format!("₹{:.0}/month", rent)
    } else {
        format!("₹{:.2}/month", rent)
    }
}

/// One-paragraph summary used in lists.
pub fn render_card(listing: &Listing) -> String {
    let mut card = String::new();
    let _ = writeln!(card, "{}  [{}]", listing.title, listing.id);
    let _ = writeln!(
        card,
        "  📍 {}  ·  {}  ·  {}",
        listing.location,
        format_rent(listing.rent),
        listing.property_type
    );
    let _ = write!(
        card,
        "  👥 {}  ·  {} image(s)",
        listing.tenant_preference,
        listing.images.len()
    );
    card
}

pub fn render_detail(listing: &Listing, viewer: Option<&Account>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", listing.title);
    let _ = writeln!(out, "{}", "=".repeat(listing.title.chars().count().max(3)));
    let _ = writeln!(out, "Location:          {}", listing.location);
    let _ = writeln!(out, "Rent:              {}", format_rent(listing.rent));
    let _ = writeln!(out, "Property type:     {}", listing.property_type);
    let _ = writeln!(out, "Tenant preference: {}", listing.tenant_preference);
    let _ = writeln!(out, "Contact:           {}", listing.contact_number);
    let _ = writeln!(
        out,
        "Listed:            {}",
        listing.created_at.format("%Y-%m-%d")
    );

    if !listing.description.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", listing.description);
    }

    if !listing.images.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Images:");
        for (index, url) in listing.images.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", index + 1, url);
        }
    }

    if viewer.is_some_and(|account| listing.is_owned_by(account.id)) {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "You own this listing: `roomfinder edit {0}` / `roomfinder delete {0}`",
            listing.id
        );
    }
    out.trim_end().to_string()
}

pub fn render_listings(listings: &[Listing], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(listings)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(listings)?),
        OutputFormat::Csv => render_csv(listings),
    }
}

fn render_table(listings: &[Listing]) -> String {
    if listings.is_empty() {
        return "No rooms found matching your criteria.".to_string();
    }

    let cards: Vec<String> = listings.iter().map(render_card).collect();
    format!("{}\n\n{} listing(s)", cards.join("\n\n"), listings.len())
}

fn render_csv(listings: &[Listing]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "title",
        "location",
        "rent",
        "property_type",
        "tenant_preference",
        "contact_number",
        "images",
        "owner_id",
        "created_at",
    ])?;

    for listing in listings {
        writer.write_record([
            listing.id.to_string(),
            listing.title.clone(),
            listing.location.clone(),
            listing.rent.to_string(),
            listing.property_type.to_string(),
            listing.tenant_preference.to_string(),
            listing.contact_number.clone(),
            listing.images.join(" "),
            listing.owner_id.to_string(),
            listing.created_at.to_rfc3339(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| RoomError::IoError(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| RoomError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AccountId, ListingId, PropertyType, TenantPreference};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn listing() -> Listing {
        Listing {
            id: ListingId(Uuid::nil()),
            title: "Sunny, Flat".to_string(),
            description: "Balcony".to_string(),
            location: "Pune".to_string(),
            rent: 8000.0,
            property_type: PropertyType::OneBhk,
            tenant_preference: TenantPreference::WorkingProfessional,
            contact_number: "9876543210".to_string(),
            images: vec!["https://cdn.example.com/a.png".to_string()],
            owner_id: AccountId(Uuid::nil()),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_format_rent() {
        assert_eq!(format_rent(8000.0), "₹8000/month");
        assert_eq!(format_rent(8000.5), "₹8000.50/month");
    }

    #[test]
    fn test_card_mentions_key_fields() {
        let card = render_card(&listing());
        assert!(card.contains("Sunny, Flat"));
        assert!(card.contains("Pune"));
        assert!(card.contains("1BHK"));
        assert!(card.contains("Working Professional"));
    }

    #[test]
    fn test_detail_shows_owner_actions_only_to_owner() {
        let listing = listing();
        let owner = Account {
            id: listing.owner_id,
            email: None,
        };
        let stranger = Account {
            id: AccountId(Uuid::new_v4()),
            email: None,
        };

        assert!(render_detail(&listing, Some(&owner)).contains("You own this listing"));
        assert!(!render_detail(&listing, Some(&stranger)).contains("You own this listing"));
        assert!(!render_detail(&listing, None).contains("You own this listing"));
    }

    #[test]
    fn test_csv_quotes_fields() {
        let output = render_listings(&[listing()], OutputFormat::Csv).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,title,location,rent,property_type,tenant_preference,contact_number,images,owner_id,created_at"
        );
        assert!(lines.next().unwrap().contains("\"Sunny, Flat\""));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(
            render_listings(&[], OutputFormat::Table).unwrap(),
            "No rooms found matching your criteria."
        );
    }

    #[test]
    fn test_json_is_array() {
        let output = render_listings(&[listing()], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["property_type"], "1BHK");
    }
}
