//! Offer deadline derivation and the accept/refuse workflow.
//!
//! The workflow functions take the property and the full list of its offers
//! (the triggering one included) and mutate them in place; persisting the
//! result is left to the caller.

use crate::config::RefusePolicy;
use crate::domain::model::{Offer, OfferId, OfferStatus, Property, PropertyState};
use crate::utils::error::{EstateError, Result};
use chrono::{Days, NaiveDate, NaiveDateTime};

/// Creation date plus `validity` days. Offers that have not been stored yet
/// count from `today`.
pub fn deadline(
    create_date: Option<NaiveDateTime>,
    validity: u32,
    today: NaiveDate,
) -> Result<NaiveDate> {
    let start = create_date.map_or(today, |created| created.date());
    start
        .checked_add_days(Days::new(u64::from(validity)))
        .ok_or_else(|| EstateError::validation("The offer deadline is out of range"))
}

/// Inverse of [`deadline`]: the absolute number of days between the
/// creation date and `new_deadline`.
pub fn validity_from_deadline(
    new_deadline: NaiveDate,
    create_date: Option<NaiveDateTime>,
    today: NaiveDate,
) -> Result<u32> {
    let start = create_date.map_or(today, |created| created.date());
    let days = (new_deadline - start).num_days().unsigned_abs();
    u32::try_from(days).map_err(|_| EstateError::validation("The offer validity is out of range"))
}

fn position(offers: &[Offer], offer_id: OfferId) -> Result<usize> {
    offers
        .iter()
        .position(|offer| offer.id == offer_id)
        .ok_or_else(|| EstateError::not_found("estate.property.offer", offer_id.0))
}

/// Marks the offer accepted and hands the property to its partner at the
/// offer price. Does not touch the other offers; see [`refuse_others`].
pub fn accept(property: &mut Property, offers: &mut [Offer], offer_id: OfferId) -> Result<()> {
    let index = position(offers, offer_id)?;
    let offer = &mut offers[index];
    offer.status = Some(OfferStatus::Accepted);

    property.buyer_id = Some(offer.partner_id);
    property.selling_price = offer.price;
    property.state = PropertyState::OfferAccepted;

    tracing::info!(
        offer = %offer.id,
        property = %property.id,
        price = offer.price,
        "offer accepted"
    );
    Ok(())
}

/// Every offer except `offer_id` becomes refused.
pub fn refuse_others(offers: &mut [Offer], offer_id: OfferId) {
    for offer in offers.iter_mut().filter(|offer| offer.id != offer_id) {
        offer.status = Some(OfferStatus::Refused);
    }
}

/// Marks the offer refused, clears the buyer and resets the selling price.
/// The property state is left as is.
pub fn refuse(property: &mut Property, offers: &mut [Offer], offer_id: OfferId) -> Result<()> {
    let index = position(offers, offer_id)?;
    offers[index].status = Some(OfferStatus::Refused);

    property.buyer_id = None;
    property.selling_price = 0.0;

    tracing::info!(offer = %offer_id, property = %property.id, "offer refused");
    Ok(())
}

/// Applies the refuse policy to the offers other than `offer_id`.
pub fn settle_others_after_refusal(offers: &mut [Offer], offer_id: OfferId, policy: RefusePolicy) {
    match policy {
        RefusePolicy::AcceptOthers => {
            for offer in offers.iter_mut().filter(|offer| offer.id != offer_id) {
                offer.status = Some(OfferStatus::Accepted);
            }
        }
        RefusePolicy::LeaveOthers => {}
    }
}
