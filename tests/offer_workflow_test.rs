use anyhow::Result;
use chrono::NaiveDate;
use estate_rules::domain::model::{
    OfferDraft, OfferId, OfferStatus, PartnerId, PropertyDraft, PropertyId, PropertyState,
    PropertyUpdate,
};
use estate_rules::{
    EstateError, EstateService, FixedClock, InMemoryStore, RefusePolicy, RulesConfig,
};

struct Listing {
    service: EstateService<InMemoryStore, FixedClock>,
    property: PropertyId,
    partners: Vec<PartnerId>,
    offers: Vec<OfferId>,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A property expected at 300 with offers of 500, 260 and 280.
fn listing(rules: RulesConfig) -> Result<Listing> {
    let mut service =
        EstateService::with_rules(InMemoryStore::new(), FixedClock::on(date(2024, 1, 1)), rules);
    let actor = service.create_user("agent", "Agent")?;
    let property = service.create_property(
        PropertyDraft {
            name: "Townhouse".to_string(),
            expected_price: 300.0,
            living_area: 90,
            ..PropertyDraft::default()
        },
        actor,
    )?;

    let mut partners = Vec::new();
    let mut offers = Vec::new();
    for (name, price) in [("Alice", 500.0), ("Bob", 260.0), ("Carol", 280.0)] {
        let partner = service.create_partner(name)?;
        partners.push(partner);
        offers.push(service.create_offer(OfferDraft {
            property_id: property,
            partner_id: partner,
            price,
            validity: None,
        })?);
    }

    Ok(Listing {
        service,
        property,
        partners,
        offers,
    })
}

#[test]
fn test_accept_offer_hands_property_to_partner() -> Result<()> {
    let mut l = listing(RulesConfig::default())?;
    l.service.accept_offer(&[l.offers[0]])?;

    let property = l.service.property(l.property)?;
    assert_eq!(property.buyer_id, Some(l.partners[0]));
    assert_eq!(property.selling_price, 500.0);
    assert_eq!(property.state, PropertyState::OfferAccepted);

    assert_eq!(l.service.offer(l.offers[0])?.status, Some(OfferStatus::Accepted));
    assert_eq!(l.service.offer(l.offers[1])?.status, Some(OfferStatus::Refused));
    assert_eq!(l.service.offer(l.offers[2])?.status, Some(OfferStatus::Refused));
    Ok(())
}

#[test]
fn test_accept_below_ninety_percent_is_rolled_back() -> Result<()> {
    let mut l = listing(RulesConfig::default())?;

    // 260 < 0.9 * 300
    let err = l.service.accept_offer(&[l.offers[1]]).unwrap_err();
    assert!(matches!(err, EstateError::ValidationError { .. }));

    let property = l.service.property(l.property)?;
    assert_eq!(property.state, PropertyState::New);
    assert_eq!(property.selling_price, 0.0);
    assert_eq!(property.buyer_id, None);
    assert!(l
        .service
        .offers(l.property)
        .iter()
        .all(|offer| offer.status.is_none()));
    Ok(())
}

#[test]
fn test_accept_at_ninety_percent_passes() -> Result<()> {
    let mut l = listing(RulesConfig::default())?;
    let partner = l.service.create_partner("Dave")?;
    let offer = l.service.create_offer(OfferDraft {
        property_id: l.property,
        partner_id: partner,
        price: 270.0,
        validity: None,
    })?;

    l.service.accept_offer(&[offer])?;
    assert_eq!(l.service.property(l.property)?.selling_price, 270.0);
    Ok(())
}

#[test]
fn test_raising_expected_price_after_acceptance_fails() -> Result<()> {
    let mut l = listing(RulesConfig::default())?;
    l.service.accept_offer(&[l.offers[2]])?;

    let err = l
        .service
        .write_property(
            l.property,
            PropertyUpdate {
                expected_price: Some(400.0),
                ..PropertyUpdate::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, EstateError::ValidationError { .. }));
    assert_eq!(l.service.property(l.property)?.expected_price, 300.0);
    Ok(())
}

#[test]
fn test_onchange_prices_checks_form() -> Result<()> {
    let mut l = listing(RulesConfig::default())?;
    l.service.accept_offer(&[l.offers[2]])?;

    let mut form = l.service.property(l.property)?;
    form.expected_price = 280.0;
    assert!(l.service.onchange_prices(&form).is_ok());
    form.expected_price = 350.0;
    assert!(l.service.onchange_prices(&form).is_err());
    Ok(())
}

#[test]
fn test_refuse_offer_accepts_the_others_by_default() -> Result<()> {
    let mut l = listing(RulesConfig::default())?;
    l.service.accept_offer(&[l.offers[0]])?;
    l.service.refuse_offer(&[l.offers[0]])?;

    let property = l.service.property(l.property)?;
    assert_eq!(property.buyer_id, None);
    assert_eq!(property.selling_price, 0.0);
    assert_eq!(property.state, PropertyState::OfferAccepted);

    assert_eq!(l.service.offer(l.offers[0])?.status, Some(OfferStatus::Refused));
    assert_eq!(l.service.offer(l.offers[1])?.status, Some(OfferStatus::Accepted));
    assert_eq!(l.service.offer(l.offers[2])?.status, Some(OfferStatus::Accepted));
    Ok(())
}

#[test]
fn test_refuse_offer_can_leave_the_others_alone() -> Result<()> {
    let rules = RulesConfig {
        refuse_policy: RefusePolicy::LeaveOthers,
        ..RulesConfig::default()
    };
    let mut l = listing(rules)?;
    l.service.refuse_offer(&[l.offers[1]])?;

    assert_eq!(l.service.offer(l.offers[1])?.status, Some(OfferStatus::Refused));
    assert_eq!(l.service.offer(l.offers[0])?.status, None);
    assert_eq!(l.service.offer(l.offers[2])?.status, None);
    Ok(())
}

#[test]
fn test_refusing_while_another_offer_is_accepted_fails() -> Result<()> {
    let rules = RulesConfig {
        refuse_policy: RefusePolicy::LeaveOthers,
        ..RulesConfig::default()
    };
    let mut l = listing(rules)?;
    l.service.accept_offer(&[l.offers[0]])?;

    // Offer 0 stays accepted while the selling price drops to 0.
    let err = l.service.refuse_offer(&[l.offers[2]]).unwrap_err();
    assert!(matches!(err, EstateError::ValidationError { .. }));
    assert_eq!(l.service.property(l.property)?.selling_price, 500.0);
    Ok(())
}

#[test]
fn test_offer_price_must_be_positive() -> Result<()> {
    let mut l = listing(RulesConfig::default())?;
    let err = l
        .service
        .create_offer(OfferDraft {
            property_id: l.property,
            partner_id: l.partners[0],
            price: 0.0,
            validity: None,
        })
        .unwrap_err();
    assert!(matches!(err, EstateError::ConstraintError { ref constraint, .. } if constraint == "check_price"));
    assert_eq!(l.service.offers(l.property).len(), 3);
    Ok(())
}

#[test]
fn test_offer_price_must_be_finite() -> Result<()> {
    let mut l = listing(RulesConfig::default())?;
    for price in [f64::INFINITY, f64::NAN] {
        let err = l
            .service
            .create_offer(OfferDraft {
                property_id: l.property,
                partner_id: l.partners[0],
                price,
                validity: None,
            })
            .unwrap_err();
        assert!(matches!(err, EstateError::ConstraintError { ref constraint, .. } if constraint == "check_price"));
    }
    assert_eq!(l.service.offers(l.property).len(), 3);
    Ok(())
}

#[test]
fn test_accept_offer_reopens_terminal_property() -> Result<()> {
    let mut l = listing(RulesConfig::default())?;
    l.service.set_sold(&[l.property])?;

    // Accepting does not look at the property state.
    l.service.accept_offer(&[l.offers[0]])?;
    let property = l.service.property(l.property)?;
    assert_eq!(property.state, PropertyState::OfferAccepted);
    assert_eq!(property.buyer_id, Some(l.partners[0]));
    assert_eq!(property.selling_price, 500.0);

    let mut l = listing(RulesConfig::default())?;
    l.service.set_canceled(&[l.property])?;
    l.service.accept_offer(&[l.offers[0]])?;
    assert_eq!(l.service.property(l.property)?.state, PropertyState::OfferAccepted);
    Ok(())
}

#[test]
fn test_deadline_derivation_and_inverse() -> Result<()> {
    let mut l = listing(RulesConfig::default())?;
    let offer = l.service.offer(l.offers[0])?;
    assert_eq!(offer.validity, 7);
    assert_eq!(offer.date_deadline, date(2024, 1, 8));

    l.service.set_offer_deadline(l.offers[0], date(2024, 1, 15))?;
    let offer = l.service.offer(l.offers[0])?;
    assert_eq!(offer.validity, 14);
    assert_eq!(offer.date_deadline, date(2024, 1, 15));

    l.service.set_offer_validity(l.offers[0], 30)?;
    assert_eq!(l.service.offer(l.offers[0])?.date_deadline, date(2024, 1, 31));
    Ok(())
}

#[test]
fn test_preview_deadline_counts_from_today() -> Result<()> {
    let l = listing(RulesConfig::default())?;
    assert_eq!(l.service.preview_deadline(None)?, date(2024, 1, 8));
    assert_eq!(l.service.preview_deadline(Some(3))?, date(2024, 1, 4));
    Ok(())
}

#[test]
fn test_accept_unknown_offer() -> Result<()> {
    let mut l = listing(RulesConfig::default())?;
    let err = l.service.accept_offer(&[OfferId(999)]).unwrap_err();
    assert!(matches!(err, EstateError::NotFoundError { id: 999, .. }));
    Ok(())
}
