//! `application/x-www-form-urlencoded` submissions.
//!
//! Bodies are decoded into ordered key/value pairs so multi-valued fields
//! such as `genres` keep every value in submission order.

use axum::{
    extract::{FromRequest, Request},
    Form,
};
use gigboard_db::catalog::artists::ArtistInput;
use gigboard_db::catalog::venues::VenueInput;

use crate::error::ApiError;

#[derive(Debug, Clone, Default)]
pub struct FormFields(Vec<(String, String)>);

impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        Ok(Self(pairs))
    }
}

impl From<Vec<(String, String)>> for FormFields {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

impl FormFields {
    /// First value submitted under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn required(&self, key: &str) -> Result<String, ApiError> {
        self.get(key)
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request(format!("missing form field: {key}")))
    }

    pub fn optional(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    /// Every value submitted under `key`, in order.
    pub fn all(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Checkbox semantics: absent is false.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "y" | "yes" | "on" | "true" | "1"
            )
        })
    }

    fn website(&self) -> Option<String> {
        self.optional("website_link").or_else(|| self.optional("website"))
    }

    pub fn venue_input(&self) -> Result<VenueInput, ApiError> {
        Ok(VenueInput {
            name: self.required("name")?,
            city: self.required("city")?,
            state: self.required("state")?,
            address: self.required("address")?,
            phone: self.optional("phone"),
            image_link: self.optional("image_link"),
            facebook_link: self.optional("facebook_link"),
            website: self.website(),
            seeking_talent: self.flag("seeking_talent"),
            seeking_description: self.optional("seeking_description"),
            genres: self.all("genres"),
        })
    }

    pub fn artist_input(&self) -> Result<ArtistInput, ApiError> {
        Ok(ArtistInput {
            name: self.required("name")?,
            city: self.required("city")?,
            state: self.required("state")?,
            phone: self.optional("phone"),
            image_link: self.optional("image_link"),
            facebook_link: self.optional("facebook_link"),
            website: self.website(),
            seeking_venue: self.flag("seeking_venue"),
            seeking_description: self.optional("seeking_description"),
            genres: self.all("genres"),
        })
    }
}
