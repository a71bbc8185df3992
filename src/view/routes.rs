use crate::domain::model::ListingId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    Home,
    MyListings,
    AddRoom,
    EditRoom(ListingId),
    RoomDetails(ListingId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

impl Route {
    /// Unknown paths and malformed ids fall back to the home page.
    pub fn resolve(path: &str) -> Route {
        let segments: Vec<&str> = path
            .split('?')
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            ["login"] => Route::Login,
            ["signup"] => Route::Signup,
            ["my-listings"] => Route::MyListings,
            ["add-room"] => Route::AddRoom,
            ["edit-room", id] => id.parse().map(Route::EditRoom).unwrap_or(Route::Home),
            ["rooms", id] => id.parse().map(Route::RoomDetails).unwrap_or(Route::Home),
            _ => Route::Home,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::Home => "/".to_string(),
            Route::MyListings => "/my-listings".to_string(),
            Route::AddRoom => "/add-room".to_string(),
            Route::EditRoom(id) => format!("/edit-room/{}", id),
            Route::RoomDetails(id) => format!("/rooms/{}", id),
        }
    }

    /// Room details are public; everything past the auth pages needs a session.
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Route::Home | Route::MyListings | Route::AddRoom | Route::EditRoom(_)
        )
    }
}

pub fn guard(route: Route, signed_in: bool) -> Navigation {
    if route.requires_auth() && !signed_in {
        tracing::debug!("{} requires a session, redirecting to /login", route.path());
        Navigation::Redirect(Route::Login)
    } else {
        Navigation::Render(route)
    }
}
