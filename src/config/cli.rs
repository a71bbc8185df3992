use crate::core::filter::Criteria;
use crate::domain::model::{
    ListingDraft, ListingId, ListingPatch, ListingQuery, PropertyType, TenantPreference,
};
use crate::view::{OutputFormat, Route};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "roomfinder")]
#[command(about = "Find rooms for rent and manage your own listings")]
pub struct Cli {
    /// TOML config file; without it SUPABASE_URL / SUPABASE_ANON_KEY are read from the environment
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account
    Signup(CredentialArgs),
    /// Sign in and remember the session
    Login(CredentialArgs),
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Browse and filter all listings
    Search(SearchArgs),
    /// List your own listings
    Mine {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show one listing
    Show { id: ListingId },
    /// Create a listing, uploading the given images
    Add(AddArgs),
    /// Edit one of your listings
    Edit(EditArgs),
    /// Delete one of your listings
    Delete { id: ListingId },
}

impl Command {
    /// The page this command stands in for; used for the login guard.
    pub fn route(&self) -> Route {
        match self {
            Command::Signup(_) => Route::Signup,
            Command::Login(_) | Command::Logout | Command::Whoami => Route::Login,
            Command::Search(_) => Route::Home,
            Command::Mine { .. } | Command::Delete { .. } => Route::MyListings,
            Command::Show { id } => Route::RoomDetails(*id),
            Command::Add(_) => Route::AddRoom,
            Command::Edit(args) => Route::EditRoom(args.id),
        }
    }
}

#[derive(Debug, Args)]
pub struct CredentialArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Matches title, location or description
    #[arg(default_value = "")]
    pub query: String,
    #[arg(long)]
    pub property_type: Option<PropertyType>,
    #[arg(long)]
    pub tenant_preference: Option<TenantPreference>,
    #[arg(long)]
    pub min_rent: Option<f64>,
    #[arg(long)]
    pub max_rent: Option<f64>,
    /// Narrow on the server by location before filtering
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub limit: Option<usize>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl SearchArgs {
    pub fn criteria(&self) -> Criteria {
        Criteria {
            property_type: self.property_type,
            tenant_preference: self.tenant_preference,
            min_price: self.min_rent,
            max_price: self.max_rent,
        }
    }

    pub fn server_filter(&self) -> ListingQuery {
        ListingQuery {
            owner_id: None,
            location: self.location.clone(),
            limit: self.limit,
        }
    }
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub location: String,
    #[arg(long)]
    pub rent: f64,
    #[arg(long)]
    pub property_type: PropertyType,
    #[arg(long)]
    pub tenant_preference: TenantPreference,
    #[arg(long)]
    pub contact_number: String,
    /// Image file to upload; repeat for several
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,
}

impl AddArgs {
    pub fn draft(&self) -> ListingDraft {
        ListingDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            rent: self.rent,
            property_type: self.property_type,
            tenant_preference: self.tenant_preference,
            contact_number: self.contact_number.trim().to_string(),
            images: vec![],
        }
    }
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: ListingId,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub rent: Option<f64>,
    #[arg(long)]
    pub property_type: Option<PropertyType>,
    #[arg(long)]
    pub tenant_preference: Option<TenantPreference>,
    #[arg(long)]
    pub contact_number: Option<String>,
    /// New image file to append; repeat for several
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,
    /// Image URL to detach; repeat for several
    #[arg(long = "remove-image")]
    pub remove_images: Vec<String>,
}

impl EditArgs {
    pub fn patch(&self) -> ListingPatch {
        let trimmed = |value: &Option<String>| value.as_ref().map(|v| v.trim().to_string());
        ListingPatch {
            title: trimmed(&self.title),
            description: trimmed(&self.description),
            location: trimmed(&self.location),
            rent: self.rent,
            property_type: self.property_type,
            tenant_preference: self.tenant_preference,
            contact_number: trimmed(&self.contact_number),
            images: None,
            owner_id: None,
        }
    }
}
