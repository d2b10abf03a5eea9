use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(PropertyId);
record_id!(PropertyTypeId);
record_id!(PropertyTagId);
record_id!(OfferId);
record_id!(
    /// Id of an external contact: offerers and buyers.
    PartnerId
);
record_id!(
    /// Id of an application user: salespersons.
    UserId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GardenOrientation {
    North,
    South,
    East,
    West,
}

impl fmt::Display for GardenOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::North => "North",
            Self::South => "South",
            Self::East => "East",
            Self::West => "West",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyState {
    #[default]
    New,
    OfferReceived,
    OfferAccepted,
    Sold,
    Canceled,
}

impl PropertyState {
    /// Sold and canceled properties never leave their state through an action.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Sold | Self::Canceled)
    }
}

impl fmt::Display for PropertyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::New => "New",
            Self::OfferReceived => "Offer Received",
            Self::OfferAccepted => "Offer Accepted",
            Self::Sold => "Sold",
            Self::Canceled => "Canceled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Accepted,
    Refused,
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("Accepted"),
            Self::Refused => f.write_str("Refused"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    pub description: Option<String>,
    pub postcode: Option<String>,
    pub date_availability: Option<NaiveDate>,
    pub expected_price: f64,
    /// Written only by the offer workflow.
    pub selling_price: f64,
    pub bedrooms: u32,
    pub living_area: u32,
    pub facades: u32,
    pub garage: bool,
    pub garden: bool,
    pub garden_area: u32,
    pub garden_orientation: Option<GardenOrientation>,
    /// Archived properties have `active == false`.
    pub active: bool,
    pub state: PropertyState,
    pub property_type_id: Option<PropertyTypeId>,
    pub tag_ids: BTreeSet<PropertyTagId>,
    pub buyer_id: Option<PartnerId>,
    pub salesperson_id: Option<UserId>,
    /// living_area + garden_area
    pub total_area: u64,
    /// Highest offer price, 0 without offers.
    pub best_price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyType {
    pub id: PropertyTypeId,
    pub name: String,
    /// Lower sequences sort first.
    pub sequence: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyTag {
    pub id: PropertyTagId,
    pub name: String,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub price: f64,
    /// `None` until the offer is accepted or refused.
    pub status: Option<OfferStatus>,
    pub partner_id: PartnerId,
    pub property_id: PropertyId,
    /// Days the offer stays open from its creation date.
    pub validity: u32,
    /// `None` while the offer has not been stored yet.
    pub create_date: Option<NaiveDateTime>,
    pub date_deadline: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub name: String,
}

/// Input of property creation. Unset fields take their defaults.
#[derive(Debug, Clone, Default)]
pub struct PropertyDraft {
    pub name: String,
    pub description: Option<String>,
    pub postcode: Option<String>,
    pub date_availability: Option<NaiveDate>,
    pub expected_price: f64,
    pub bedrooms: Option<u32>,
    pub living_area: u32,
    pub facades: u32,
    pub garage: bool,
    pub garden: bool,
    pub garden_area: u32,
    pub garden_orientation: Option<GardenOrientation>,
    pub property_type_id: Option<PropertyTypeId>,
    pub tag_ids: BTreeSet<PropertyTagId>,
    pub salesperson_id: Option<UserId>,
}

/// Programmatic write on a stored property. `None` leaves a field untouched;
/// nullable fields use a nested option to allow clearing them.
#[derive(Debug, Clone, Default)]
pub struct PropertyUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub postcode: Option<Option<String>>,
    pub date_availability: Option<Option<NaiveDate>>,
    pub expected_price: Option<f64>,
    pub bedrooms: Option<u32>,
    pub living_area: Option<u32>,
    pub facades: Option<u32>,
    pub garage: Option<bool>,
    pub garden: Option<bool>,
    pub garden_area: Option<u32>,
    pub garden_orientation: Option<Option<GardenOrientation>>,
    pub property_type_id: Option<Option<PropertyTypeId>>,
    pub tag_ids: Option<BTreeSet<PropertyTagId>>,
    pub salesperson_id: Option<Option<UserId>>,
}

impl PropertyUpdate {
    pub fn touches_prices(&self) -> bool {
        self.expected_price.is_some()
    }

    pub fn apply_to(self, property: &mut Property) {
        if let Some(name) = self.name {
            property.name = name;
        }
        if let Some(description) = self.description {
            property.description = description;
        }
        if let Some(postcode) = self.postcode {
            property.postcode = postcode;
        }
        if let Some(date) = self.date_availability {
            property.date_availability = date;
        }
        if let Some(price) = self.expected_price {
            property.expected_price = price;
        }
        if let Some(bedrooms) = self.bedrooms {
            property.bedrooms = bedrooms;
        }
        if let Some(area) = self.living_area {
            property.living_area = area;
        }
        if let Some(facades) = self.facades {
            property.facades = facades;
        }
        if let Some(garage) = self.garage {
            property.garage = garage;
        }
        if let Some(garden) = self.garden {
            property.garden = garden;
        }
        if let Some(area) = self.garden_area {
            property.garden_area = area;
        }
        if let Some(orientation) = self.garden_orientation {
            property.garden_orientation = orientation;
        }
        if let Some(type_id) = self.property_type_id {
            property.property_type_id = type_id;
        }
        if let Some(tags) = self.tag_ids {
            property.tag_ids = tags;
        }
        if let Some(salesperson) = self.salesperson_id {
            property.salesperson_id = salesperson;
        }
    }
}

#[derive(Debug, Clone)]
pub struct OfferDraft {
    pub property_id: PropertyId,
    pub partner_id: PartnerId,
    pub price: f64,
    /// Defaults to the configured validity.
    pub validity: Option<u32>,
}
