//! Property rules: derived fields, the garden assist, the selling price
//! check and the sold/canceled transitions.

use crate::config::RulesConfig;
use crate::domain::model::{
    Offer, OfferStatus, Property, PropertyDraft, PropertyId, PropertyState, UserId,
};
use crate::utils::error::{EstateError, Result};
use chrono::{Months, NaiveDate};

/// Widened so the sum of two `u32` areas always fits.
pub fn total_area(living_area: u32, garden_area: u32) -> u64 {
    u64::from(living_area) + u64::from(garden_area)
}

/// Highest offer price, or 0 when there is no offer.
pub fn best_price(offers: &[Offer]) -> f64 {
    offers.iter().map(|offer| offer.price).fold(0.0, f64::max)
}

/// Refreshes every derived field of `property` from its inputs.
pub fn recompute(property: &mut Property, offers: &[Offer]) {
    property.total_area = total_area(property.living_area, property.garden_area);
    property.best_price = best_price(offers);
    tracing::debug!(
        property = %property.id,
        total_area = property.total_area,
        best_price = property.best_price,
        "recomputed derived fields"
    );
}

pub fn default_availability(today: NaiveDate, delay_months: u32) -> Result<NaiveDate> {
    today
        .checked_add_months(Months::new(delay_months))
        .ok_or_else(|| EstateError::validation("The availability date is out of range"))
}

/// Builds a stored-shape property from a draft, applying every default.
pub fn new_property(
    draft: PropertyDraft,
    today: NaiveDate,
    actor: UserId,
    rules: &RulesConfig,
) -> Result<Property> {
    let date_availability = match draft.date_availability {
        Some(date) => date,
        None => default_availability(today, rules.availability_delay_months)?,
    };

    let mut property = Property {
        id: PropertyId(0),
        name: draft.name,
        description: draft.description,
        postcode: draft.postcode,
        date_availability: Some(date_availability),
        expected_price: draft.expected_price,
        selling_price: 0.0,
        bedrooms: draft.bedrooms.unwrap_or(rules.default_bedrooms),
        living_area: draft.living_area,
        facades: draft.facades,
        garage: draft.garage,
        garden: draft.garden,
        garden_area: draft.garden_area,
        garden_orientation: draft.garden_orientation,
        active: true,
        state: PropertyState::New,
        property_type_id: draft.property_type_id,
        tag_ids: draft.tag_ids,
        buyer_id: None,
        salesperson_id: Some(draft.salesperson_id.unwrap_or(actor)),
        total_area: 0,
        best_price: 0.0,
    };
    recompute(&mut property, &[]);
    Ok(property)
}

/// Interactive assist fired when the garden checkbox is edited. Programmatic
/// writes of `garden` never go through here.
pub fn onchange_garden(property: &mut Property, garden: bool, rules: &RulesConfig) {
    property.garden = garden;
    if garden {
        property.garden_area = rules.garden_default_area;
        property.garden_orientation = Some(rules.garden_default_orientation);
    } else {
        property.garden_area = 0;
        property.garden_orientation = None;
    }
    property.total_area = total_area(property.living_area, property.garden_area);
}

/// Fails when an offer is accepted and the selling price is below
/// `min_ratio` of the expected price.
pub fn check_selling_price(property: &Property, offers: &[Offer], min_ratio: f64) -> Result<()> {
    let floor = property.expected_price * min_ratio;
    let has_accepted = offers
        .iter()
        .any(|offer| offer.status == Some(OfferStatus::Accepted));

    if has_accepted && property.selling_price < floor {
        tracing::warn!(
            property = %property.id,
            selling_price = property.selling_price,
            floor,
            "selling price below the accepted floor"
        );
        return Err(EstateError::validation(format!(
            "The selling price cannot be lower than {}% of the expected price",
            (min_ratio * 100.0).round()
        )));
    }
    Ok(())
}

pub fn set_sold(property: &mut Property) -> Result<()> {
    match property.state {
        PropertyState::Canceled => Err(EstateError::user("Canceled properties cannot be sold!")),
        PropertyState::Sold => Err(EstateError::user("The property is already sold!")),
        PropertyState::New | PropertyState::OfferReceived | PropertyState::OfferAccepted => {
            property.state = PropertyState::Sold;
            Ok(())
        }
    }
}

pub fn set_canceled(property: &mut Property) -> Result<()> {
    match property.state {
        PropertyState::Sold => Err(EstateError::user("Sold properties cannot be canceled!")),
        PropertyState::Canceled => Err(EstateError::user("The property is already canceled!")),
        PropertyState::New | PropertyState::OfferReceived | PropertyState::OfferAccepted => {
            property.state = PropertyState::Canceled;
            Ok(())
        }
    }
}

/// Copy of `source` with the non-copyable fields back at their defaults.
/// Offers are not part of the copy, so the best price starts at 0.
pub fn copy_property(source: &Property, date_availability: NaiveDate) -> Property {
    let mut copy = source.clone();
    copy.id = PropertyId(0);
    copy.date_availability = Some(date_availability);
    copy.selling_price = 0.0;
    copy.state = PropertyState::New;
    copy.buyer_id = None;
    recompute(&mut copy, &[]);
    copy
}
