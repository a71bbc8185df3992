use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::error::{Result, RoomError};
use crate::utils::validation::{
    validate_contact_number, validate_image_urls, validate_rent, validate_required_text,
    Validate,
};

/// Server-assigned listing identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub Uuid);

/// Identity provider account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub Uuid);

macro_rules! uuid_newtype {
    ($name:ident, $field:literal) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = RoomError;

            fn from_str(s: &str) -> Result<Self> {
                Uuid::parse_str(s.trim())
                    .map($name)
                    .map_err(|_| RoomError::validation($field, format!("'{}' is not a valid id", s)))
            }
        }
    };
}

uuid_newtype!(ListingId, "id");
uuid_newtype!(AccountId, "owner_id");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "1BHK")]
    OneBhk,
    #[serde(rename = "2BHK")]
    TwoBhk,
    #[serde(rename = "3BHK")]
    ThreeBhk,
    #[serde(rename = "4BHK")]
    FourBhk,
    #[serde(rename = "PG")]
    Pg,
    Hostel,
    #[serde(rename = "Independent House")]
    IndependentHouse,
}

impl PropertyType {
    pub const ALL: [PropertyType; 7] = [
        PropertyType::OneBhk,
        PropertyType::TwoBhk,
        PropertyType::ThreeBhk,
        PropertyType::FourBhk,
        PropertyType::Pg,
        PropertyType::Hostel,
        PropertyType::IndependentHouse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::OneBhk => "1BHK",
            PropertyType::TwoBhk => "2BHK",
            PropertyType::ThreeBhk => "3BHK",
            PropertyType::FourBhk => "4BHK",
            PropertyType::Pg => "PG",
            PropertyType::Hostel => "Hostel",
            PropertyType::IndependentHouse => "Independent House",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenantPreference {
    Family,
    Bachelors,
    Girls,
    #[serde(rename = "Working Professional")]
    WorkingProfessional,
    Students,
}

impl TenantPreference {
    pub const ALL: [TenantPreference; 5] = [
        TenantPreference::Family,
        TenantPreference::Bachelors,
        TenantPreference::Girls,
        TenantPreference::WorkingProfessional,
        TenantPreference::Students,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TenantPreference::Family => "Family",
            TenantPreference::Bachelors => "Bachelors",
            TenantPreference::Girls => "Girls",
            TenantPreference::WorkingProfessional => "Working Professional",
            TenantPreference::Students => "Students",
        }
    }
}

macro_rules! fixed_set {
    ($name:ident, $field:literal) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = RoomError;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        RoomError::validation(
                            $field,
                            format!("'{}' is not one of: {}", s, allowed.join(", ")),
                        )
                    })
            }
        }
    };
}

fixed_set!(PropertyType, "property_type");
fixed_set!(TenantPreference, "tenant_preference");

/// Nullable columns come back as `null` rather than missing; treat both as empty.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A room offered for rent, as stored by the relational backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub location: String,
    pub rent: f64,
    pub property_type: PropertyType,
    pub tenant_preference: TenantPreference,
    pub contact_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    pub owner_id: AccountId,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    pub fn is_owned_by(&self, account: AccountId) -> bool {
        self.owner_id == account
    }
}

/// Fields supplied by the owner when creating a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub rent: f64,
    pub property_type: PropertyType,
    pub tenant_preference: TenantPreference,
    pub contact_number: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Validate for ListingDraft {
    fn validate(&self) -> Result<()> {
        validate_required_text("title", &self.title)?;
        validate_required_text("description", &self.description)?;
        validate_required_text("location", &self.location)?;
        validate_rent("rent", self.rent)?;
        validate_contact_number("contact_number", &self.contact_number)?;
        validate_image_urls("images", &self.images)?;
        Ok(())
    }
}

/// Row sent to the store on insert; `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewListing {
    #[serde(flatten)]
    pub draft: ListingDraft,
    pub owner_id: AccountId,
}

/// Partial update. `owner_id` exists only so that attempts to change it can be rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_preference: Option<TenantPreference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<AccountId>,
}

impl ListingPatch {
    pub fn images(images: Vec<String>) -> Self {
        Self {
            images: Some(images),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ListingPatch::default()
    }

    pub fn apply_to(&self, listing: &mut Listing) {
        if let Some(title) = &self.title {
            listing.title = title.clone();
        }
        if let Some(description) = &self.description {
            listing.description = description.clone();
        }
        if let Some(location) = &self.location {
            listing.location = location.clone();
        }
        if let Some(rent) = self.rent {
            listing.rent = rent;
        }
        if let Some(property_type) = self.property_type {
            listing.property_type = property_type;
        }
        if let Some(tenant_preference) = self.tenant_preference {
            listing.tenant_preference = tenant_preference;
        }
        if let Some(contact_number) = &self.contact_number {
            listing.contact_number = contact_number.clone();
        }
        if let Some(images) = &self.images {
            listing.images = images.clone();
        }
    }
}

impl Validate for ListingPatch {
    fn validate(&self) -> Result<()> {
        if self.owner_id.is_some() {
            return Err(RoomError::validation(
                "owner_id",
                "cannot be changed after creation",
            ));
        }
        if let Some(title) = &self.title {
            validate_required_text("title", title)?;
        }
        if let Some(description) = &self.description {
            validate_required_text("description", description)?;
        }
        if let Some(location) = &self.location {
            validate_required_text("location", location)?;
        }
        if let Some(rent) = self.rent {
            validate_rent("rent", rent)?;
        }
        if let Some(contact_number) = &self.contact_number {
            validate_contact_number("contact_number", contact_number)?;
        }
        if let Some(images) = &self.images {
            validate_image_urls("images", images)?;
        }
        Ok(())
    }
}

/// Server-side narrowing for `list`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    pub owner_id: Option<AccountId>,
    pub location: Option<String>,
    pub limit: Option<usize>,
}

impl ListingQuery {
    pub fn owned_by(owner_id: AccountId) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub account: Account,
}

impl Session {
    pub fn account_id(&self) -> AccountId {
        self.account.id
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("account", &self.account)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.trim().to_string(),
        }
    }
}

/// Result of a sign-up; providers that require email confirmation return no session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub account: Account,
    pub session: Option<Session>,
}

/// An image picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}
