use places::PlaceResult;
use serde::Serialize;

use crate::common::{Coordinates, ResourceKey};
use crate::domains::places::LookupError;

/// A resource shown in the directory, built from a places provider result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub key: ResourceKey,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub location: Coordinates,
    pub open_now: Option<bool>,
    pub opening_hours: Vec<String>,
    pub photo_reference: Option<String>,
    pub rating: Option<f32>,
    pub types: Vec<String>,
}

impl Resource {
    pub fn from_place(place: PlaceResult) -> Result<Self, LookupError> {
        let key = ResourceKey::parse(&place.place_id)
            .map_err(|e| LookupError::InvalidResource(format!("{}: {}", place.place_id, e)))?;
        let location = Coordinates::new(place.geometry.location.lat, place.geometry.location.lng)?;
        let address = place.address().unwrap_or_default().to_string();
        let phone = place.phone().map(String::from);
        let (open_now, opening_hours) = match place.opening_hours {
            Some(hours) => (hours.open_now, hours.weekday_text),
            None => (None, Vec::new()),
        };

        Ok(Self {
            key,
            name: place.name,
            address,
            phone,
            location,
            open_now,
            opening_hours,
            photo_reference: place.photos.into_iter().next().map(|p| p.photo_reference),
            rating: place.rating,
            types: place.types,
        })
    }

    /// Google Maps directions from `origin` to this resource.
    pub fn directions_url(&self, origin: Coordinates) -> String {
        places::directions_url(origin.into(), self.location.into())
    }

    pub fn distance_km(&self, from: &Coordinates) -> f64 {
        self.location.distance_km(from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::place;
    use places::{OpeningHours, Photo};

    #[test]
    fn test_from_place() {
        let mut p = place("ChIJ-police_1", "City Police Station", 19.07, 72.88);
        p.vicinity = Some("MG Road".to_string());
        p.formatted_phone_number = Some("022 2262 0111".to_string());
        p.opening_hours = Some(OpeningHours {
            open_now: Some(true),
            weekday_text: vec!["Monday: Open 24 hours".to_string()],
        });
        p.photos = vec![Photo {
            photo_reference: "photo-ref".to_string(),
            width: None,
            height: None,
        }];

        let resource = Resource::from_place(p).unwrap();
        assert_eq!(resource.key.as_str(), "ChIJ-police_1");
        assert_eq!(resource.address, "MG Road");
        assert_eq!(resource.phone.as_deref(), Some("022 2262 0111"));
        assert_eq!(resource.open_now, Some(true));
        assert_eq!(resource.opening_hours.len(), 1);
        assert_eq!(resource.photo_reference.as_deref(), Some("photo-ref"));
    }

    #[test]
    fn test_rejects_bad_place_id() {
        let p = place("not a key!", "Somewhere", 0.0, 0.0);
        assert!(matches!(
            Resource::from_place(p),
            Err(LookupError::InvalidResource(_))
        ));
    }

    #[test]
    fn test_directions_url() {
        let resource = Resource::from_place(place("p1", "Blood Bank", 12.5, 77.5)).unwrap();
        let url = resource.directions_url(Coordinates::new(12.0, 77.0).unwrap());
        assert!(url.ends_with("origin=12,77&destination=12.5,77.5"));
    }
}
