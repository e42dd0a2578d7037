//! A matched user and its location.

use serde::Serialize;

use crate::geo::Location;

/// A user name paired with the location it was seen at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    name: String,
    location: Location,
}

impl User {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Location {
        self.location
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.location)
    }
}
