//! Dataset declared in the `[seed]` section of the configuration file.
//! Records refer to each other by name; loading goes through
//! [`EstateService`] so every default and rule applies.

use crate::core::service::EstateService;
use crate::domain::model::{
    GardenOrientation, OfferDraft, OfferId, OfferStatus, PartnerId, PropertyDraft, PropertyId,
    PropertyTagId, PropertyTypeId, UserId,
};
use crate::domain::ports::{Clock, RecordStore};
use crate::utils::error::{EstateError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_non_negative_price, validate_unique_names, Validate,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub users: Vec<SeedUser>,
    pub partners: Vec<SeedPartner>,
    pub types: Vec<SeedType>,
    pub tags: Vec<SeedTag>,
    pub properties: Vec<SeedProperty>,
    pub offers: Vec<SeedOffer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub login: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedPartner {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedType {
    pub name: String,
    pub sequence: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedTag {
    pub name: String,
    #[serde(default)]
    pub color: u32,
}

/// Terminal state reached through the sold/canceled actions after loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedState {
    Sold,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedProperty {
    pub name: String,
    pub description: Option<String>,
    pub postcode: Option<String>,
    pub date_availability: Option<NaiveDate>,
    pub expected_price: f64,
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub living_area: u32,
    #[serde(default)]
    pub facades: u32,
    #[serde(default)]
    pub garage: bool,
    #[serde(default)]
    pub garden: bool,
    #[serde(default)]
    pub garden_area: u32,
    pub garden_orientation: Option<GardenOrientation>,
    pub property_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Login of the salesperson; the loading user otherwise.
    pub salesperson: Option<String>,
    pub state: Option<SeedState>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedOffer {
    pub property: String,
    pub partner: String,
    pub price: f64,
    pub validity: Option<u32>,
    /// Accepted or refused through the offer workflow, in file order.
    pub status: Option<OfferStatus>,
}

/// Ids assigned while loading, by seed name.
#[derive(Debug, Clone, Default)]
pub struct SeedIndex {
    pub actor: Option<UserId>,
    pub users: HashMap<String, UserId>,
    pub partners: HashMap<String, PartnerId>,
    pub types: HashMap<String, PropertyTypeId>,
    pub tags: HashMap<String, PropertyTagId>,
    pub properties: HashMap<String, PropertyId>,
    pub offers: Vec<OfferId>,
}

fn resolve<T: Copy>(map: &HashMap<String, T>, field: &str, name: &str) -> Result<T> {
    map.get(name)
        .copied()
        .ok_or_else(|| EstateError::InvalidConfigValueError {
            field: field.to_string(),
            value: name.to_string(),
            reason: "No seed record with this name".to_string(),
        })
}

impl SeedData {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.partners.is_empty()
            && self.types.is_empty()
            && self.tags.is_empty()
            && self.properties.is_empty()
            && self.offers.is_empty()
    }

    /// Creates every seed record. The first seed user acts as the current
    /// user; an `admin` user is created when the seed declares none.
    pub fn load_into<S: RecordStore, C: Clock>(
        &self,
        service: &mut EstateService<S, C>,
    ) -> Result<SeedIndex> {
        let mut index = SeedIndex::default();

        for user in &self.users {
            let name = user.name.as_deref().unwrap_or(&user.login);
            let id = service.create_user(&user.login, name)?;
            index.users.insert(user.login.clone(), id);
            index.actor.get_or_insert(id);
        }
        let actor = match index.actor {
            Some(actor) => actor,
            None => {
                let admin = service.create_user("admin", "Administrator")?;
                index.actor = Some(admin);
                admin
            }
        };

        for partner in &self.partners {
            let id = service.create_partner(&partner.name)?;
            index.partners.insert(partner.name.clone(), id);
        }
        for property_type in &self.types {
            let id = service.create_property_type(&property_type.name, property_type.sequence)?;
            index.types.insert(property_type.name.clone(), id);
        }
        for tag in &self.tags {
            let id = service.create_tag(&tag.name, tag.color)?;
            index.tags.insert(tag.name.clone(), id);
        }

        for seed in &self.properties {
            let draft = Self::property_draft(seed, &index)?;
            let id = service.create_property(draft, actor)?;
            index.properties.insert(seed.name.clone(), id);
        }

        for seed in &self.offers {
            let id = service.create_offer(OfferDraft {
                property_id: resolve(&index.properties, "seed.offers.property", &seed.property)?,
                partner_id: resolve(&index.partners, "seed.offers.partner", &seed.partner)?,
                price: seed.price,
                validity: seed.validity,
            })?;
            index.offers.push(id);
        }
        for (seed, id) in self.offers.iter().zip(&index.offers) {
            match seed.status {
                Some(OfferStatus::Accepted) => service.accept_offer(&[*id])?,
                Some(OfferStatus::Refused) => service.refuse_offer(&[*id])?,
                None => {}
            }
        }

        for seed in &self.properties {
            let id = resolve(&index.properties, "seed.properties.name", &seed.name)?;
            match seed.state {
                Some(SeedState::Sold) => service.set_sold(&[id])?,
                Some(SeedState::Canceled) => service.set_canceled(&[id])?,
                None => {}
            }
            if !seed.active {
                service.archive(&[id])?;
            }
        }

        tracing::info!(
            properties = index.properties.len(),
            offers = index.offers.len(),
            "seed data loaded"
        );
        Ok(index)
    }

    fn property_draft(seed: &SeedProperty, index: &SeedIndex) -> Result<PropertyDraft> {
        let property_type_id = seed
            .property_type
            .as_deref()
            .map(|name| resolve(&index.types, "seed.properties.property_type", name))
            .transpose()?;
        let salesperson_id = seed
            .salesperson
            .as_deref()
            .map(|login| resolve(&index.users, "seed.properties.salesperson", login))
            .transpose()?;
        let tag_ids = seed
            .tags
            .iter()
            .map(|name| resolve(&index.tags, "seed.properties.tags", name))
            .collect::<Result<BTreeSet<_>>>()?;

        Ok(PropertyDraft {
            name: seed.name.clone(),
            description: seed.description.clone(),
            postcode: seed.postcode.clone(),
            date_availability: seed.date_availability,
            expected_price: seed.expected_price,
            bedrooms: seed.bedrooms,
            living_area: seed.living_area,
            facades: seed.facades,
            garage: seed.garage,
            garden: seed.garden,
            garden_area: seed.garden_area,
            garden_orientation: seed.garden_orientation,
            property_type_id,
            tag_ids,
            salesperson_id,
        })
    }
}

impl Validate for SeedData {
    fn validate(&self) -> Result<()> {
        for user in &self.users {
            validate_non_empty_string("seed.users.login", &user.login)?;
        }
        for partner in &self.partners {
            validate_non_empty_string("seed.partners.name", &partner.name)?;
        }
        validate_unique_names("seed.users.login", self.users.iter().map(|u| u.login.as_str()))?;
        validate_unique_names("seed.partners.name", self.partners.iter().map(|p| p.name.as_str()))?;
        validate_unique_names("seed.types.name", self.types.iter().map(|t| t.name.as_str()))?;
        validate_unique_names("seed.tags.name", self.tags.iter().map(|t| t.name.as_str()))?;
        validate_unique_names(
            "seed.properties.name",
            self.properties.iter().map(|p| p.name.as_str()),
        )?;

        for property in &self.properties {
            validate_non_empty_string("seed.properties.name", &property.name)?;
            validate_non_negative_price("seed.properties.expected_price", property.expected_price)?;
        }
        for offer in &self.offers {
            if !offer.price.is_finite() || offer.price <= 0.0 {
                return Err(EstateError::InvalidConfigValueError {
                    field: "seed.offers.price".to_string(),
                    value: offer.price.to_string(),
                    reason: "Offer price must be strictly positive".to_string(),
                });
            }
            if !self.properties.iter().any(|p| p.name == offer.property) {
                return Err(EstateError::InvalidConfigValueError {
                    field: "seed.offers.property".to_string(),
                    value: offer.property.clone(),
                    reason: "No seed property with this name".to_string(),
                });
            }
        }
        Ok(())
    }
}
