use crate::config::RulesConfig;
use crate::core::{offer_rules, property_rules};
use crate::domain::model::{
    Offer, OfferDraft, OfferId, Partner, PartnerId, Property, PropertyDraft, PropertyId,
    PropertyTag, PropertyTagId, PropertyType, PropertyTypeId, PropertyUpdate, User, UserId,
};
use crate::domain::ports::{Clock, RecordStore};
use crate::utils::error::Result;
use chrono::NaiveDate;

/// Entry point of the property rules. Every mutating call runs in its own
/// store transaction and is rolled back as a whole when any step fails.
pub struct EstateService<S: RecordStore, C: Clock> {
    store: S,
    clock: C,
    rules: RulesConfig,
}

impl<S: RecordStore, C: Clock> EstateService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self::with_rules(store, clock, RulesConfig::default())
    }

    pub fn with_rules(store: S, clock: C, rules: RulesConfig) -> Self {
        Self {
            store,
            clock,
            rules,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn atomic<T>(
        &mut self,
        operation: &str,
        f: impl FnOnce(&mut S, &C, &RulesConfig) -> Result<T>,
    ) -> Result<T> {
        self.store.begin();
        match f(&mut self.store, &self.clock, &self.rules) {
            Ok(value) => {
                self.store.commit();
                Ok(value)
            }
            Err(e) => {
                self.store.rollback();
                tracing::warn!(operation, error = %e, "operation rolled back");
                Err(e)
            }
        }
    }

    pub fn create_user(&mut self, login: &str, name: &str) -> Result<UserId> {
        let user = User {
            id: UserId(0),
            login: login.to_string(),
            name: name.to_string(),
        };
        self.atomic("create_user", |store, _, _| store.insert_user(user))
    }

    pub fn create_partner(&mut self, name: &str) -> Result<PartnerId> {
        let partner = Partner {
            id: PartnerId(0),
            name: name.to_string(),
        };
        self.atomic("create_partner", |store, _, _| store.insert_partner(partner))
    }

    /// `sequence` defaults to 1.
    pub fn create_property_type(&mut self, name: &str, sequence: Option<i32>) -> Result<PropertyTypeId> {
        let property_type = PropertyType {
            id: PropertyTypeId(0),
            name: name.to_string(),
            sequence: sequence.unwrap_or(1),
        };
        self.atomic("create_property_type", |store, _, _| {
            store.insert_property_type(property_type)
        })
    }

    pub fn create_tag(&mut self, name: &str, color: u32) -> Result<PropertyTagId> {
        let tag = PropertyTag {
            id: PropertyTagId(0),
            name: name.to_string(),
            color,
        };
        self.atomic("create_tag", |store, _, _| store.insert_tag(tag))
    }

    /// Creates a property on behalf of `actor`, who becomes the salesperson
    /// unless the draft names one.
    pub fn create_property(&mut self, draft: PropertyDraft, actor: UserId) -> Result<PropertyId> {
        self.atomic("create_property", |store, clock, rules| {
            let property = property_rules::new_property(draft, clock.today(), actor, rules)?;
            let id = store.insert_property(property)?;
            tracing::info!(property = %id, "property created");
            Ok(id)
        })
    }

    /// Programmatic write: derived fields follow, the garden assist does not
    /// fire, and the selling price check runs when a price changes.
    pub fn write_property(&mut self, id: PropertyId, update: PropertyUpdate) -> Result<()> {
        self.atomic("write_property", |store, _, rules| {
            let mut property = store.property(id)?;
            let check_prices = update.touches_prices();
            update.apply_to(&mut property);

            let offers = store.offers_for(id);
            property_rules::recompute(&mut property, &offers);
            if check_prices {
                property_rules::check_selling_price(&property, &offers, rules.min_selling_ratio)?;
            }
            store.update_property(&property)
        })
    }

    /// Interactive garden toggle on an unsaved form. Nothing is stored.
    pub fn onchange_garden(&self, form: &mut Property, garden: bool) {
        property_rules::onchange_garden(form, garden, &self.rules);
    }

    /// Live price check of an unsaved form against the offers stored for it.
    pub fn onchange_prices(&self, form: &Property) -> Result<()> {
        let offers = self.store.offers_for(form.id);
        property_rules::check_selling_price(form, &offers, self.rules.min_selling_ratio)
    }

    pub fn set_sold(&mut self, ids: &[PropertyId]) -> Result<()> {
        self.atomic("set_sold", |store, _, _| {
            for id in ids {
                let mut property = store.property(*id)?;
                property_rules::set_sold(&mut property)?;
                store.update_property(&property)?;
                tracing::info!(property = %id, "property sold");
            }
            Ok(())
        })
    }

    pub fn set_canceled(&mut self, ids: &[PropertyId]) -> Result<()> {
        self.atomic("set_canceled", |store, _, _| {
            for id in ids {
                let mut property = store.property(*id)?;
                property_rules::set_canceled(&mut property)?;
                store.update_property(&property)?;
                tracing::info!(property = %id, "property canceled");
            }
            Ok(())
        })
    }

    pub fn archive(&mut self, ids: &[PropertyId]) -> Result<()> {
        self.set_active(ids, false)
    }

    pub fn unarchive(&mut self, ids: &[PropertyId]) -> Result<()> {
        self.set_active(ids, true)
    }

    fn set_active(&mut self, ids: &[PropertyId], active: bool) -> Result<()> {
        self.atomic("set_active", |store, _, _| {
            for id in ids {
                let mut property = store.property(*id)?;
                property.active = active;
                store.update_property(&property)?;
                tracing::debug!(property = %id, active, "active flag written");
            }
            Ok(())
        })
    }

    pub fn duplicate_property(&mut self, id: PropertyId) -> Result<PropertyId> {
        self.atomic("duplicate_property", |store, clock, rules| {
            let source = store.property(id)?;
            let availability =
                property_rules::default_availability(clock.today(), rules.availability_delay_months)?;
            let copy = property_rules::copy_property(&source, availability);
            let copy_id = store.insert_property(copy)?;
            tracing::info!(source = %id, copy = %copy_id, "property duplicated");
            Ok(copy_id)
        })
    }

    pub fn property(&self, id: PropertyId) -> Result<Property> {
        self.store.property(id)
    }

    pub fn properties(&self, include_archived: bool) -> Vec<Property> {
        self.store.properties(include_archived)
    }

    /// Active properties of the given type.
    pub fn properties_of_type(&self, type_id: PropertyTypeId) -> Vec<Property> {
        self.store
            .properties(false)
            .into_iter()
            .filter(|property| property.property_type_id == Some(type_id))
            .collect()
    }

    pub fn offer(&self, id: OfferId) -> Result<Offer> {
        self.store.offer(id)
    }

    pub fn offers(&self, property: PropertyId) -> Vec<Offer> {
        self.store.offers_for(property)
    }

    pub fn create_offer(&mut self, draft: OfferDraft) -> Result<OfferId> {
        self.atomic("create_offer", |store, clock, rules| {
            let validity = draft.validity.unwrap_or(rules.offer_validity_days);
            let create_date = clock.now();
            let offer = Offer {
                id: OfferId(0),
                price: draft.price,
                status: None,
                partner_id: draft.partner_id,
                property_id: draft.property_id,
                validity,
                create_date: Some(create_date),
                date_deadline: offer_rules::deadline(Some(create_date), validity, clock.today())?,
            };
            let id = store.insert_offer(offer)?;

            let mut property = store.property(draft.property_id)?;
            property_rules::recompute(&mut property, &store.offers_for(draft.property_id));
            store.update_property(&property)?;

            tracing::info!(offer = %id, property = %draft.property_id, price = draft.price, "offer created");
            Ok(id)
        })
    }

    /// Deadline an offer with `validity` days would get if it were created now.
    pub fn preview_deadline(&self, validity: Option<u32>) -> Result<NaiveDate> {
        let validity = validity.unwrap_or(self.rules.offer_validity_days);
        offer_rules::deadline(None, validity, self.clock.today())
    }

    pub fn set_offer_validity(&mut self, id: OfferId, validity: u32) -> Result<()> {
        self.atomic("set_offer_validity", |store, clock, _| {
            let mut offer = store.offer(id)?;
            offer.validity = validity;
            offer.date_deadline = offer_rules::deadline(offer.create_date, validity, clock.today())?;
            store.update_offer(&offer)
        })
    }

    /// Writes the deadline and back-computes the validity from it.
    pub fn set_offer_deadline(&mut self, id: OfferId, date_deadline: NaiveDate) -> Result<()> {
        self.atomic("set_offer_deadline", |store, clock, _| {
            let mut offer = store.offer(id)?;
            offer.validity =
                offer_rules::validity_from_deadline(date_deadline, offer.create_date, clock.today())?;
            offer.date_deadline = offer_rules::deadline(offer.create_date, offer.validity, clock.today())?;
            tracing::debug!(offer = %id, validity = offer.validity, "validity back-computed");
            store.update_offer(&offer)
        })
    }

    pub fn accept_offer(&mut self, ids: &[OfferId]) -> Result<()> {
        self.atomic("accept_offer", |store, _, rules| {
            for id in ids {
                let property_id = store.offer(*id)?.property_id;
                let mut property = store.property(property_id)?;
                let mut offers = store.offers_for(property_id);

                offer_rules::accept(&mut property, &mut offers, *id)?;
                property_rules::check_selling_price(&property, &offers, rules.min_selling_ratio)?;
                offer_rules::refuse_others(&mut offers, *id);

                persist(store, &mut property, &offers)?;
            }
            Ok(())
        })
    }

    pub fn refuse_offer(&mut self, ids: &[OfferId]) -> Result<()> {
        self.atomic("refuse_offer", |store, _, rules| {
            for id in ids {
                let property_id = store.offer(*id)?.property_id;
                let mut property = store.property(property_id)?;
                let mut offers = store.offers_for(property_id);

                offer_rules::refuse(&mut property, &mut offers, *id)?;
                property_rules::check_selling_price(&property, &offers, rules.min_selling_ratio)?;
                offer_rules::settle_others_after_refusal(&mut offers, *id, rules.refuse_policy);

                persist(store, &mut property, &offers)?;
            }
            Ok(())
        })
    }
}

fn persist<S: RecordStore>(store: &mut S, property: &mut Property, offers: &[Offer]) -> Result<()> {
    for offer in offers {
        store.update_offer(offer)?;
    }
    property_rules::recompute(property, offers);
    store.update_property(property)
}
