use crate::domain::model::{
    Offer, OfferId, Partner, PartnerId, Property, PropertyId, PropertyTag, PropertyTagId,
    PropertyType, PropertyTypeId, User, UserId,
};
use crate::domain::ports::RecordStore;
use crate::utils::error::{EstateError, Result};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
struct Tables {
    properties: BTreeMap<PropertyId, Property>,
    offers: BTreeMap<OfferId, Offer>,
    property_types: BTreeMap<PropertyTypeId, PropertyType>,
    tags: BTreeMap<PropertyTagId, PropertyTag>,
    partners: BTreeMap<PartnerId, Partner>,
    users: BTreeMap<UserId, User>,
    next_id: u64,
}

impl Tables {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local [`RecordStore`]. Each open transaction keeps a snapshot of
/// the tables taken at `begin`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Tables,
    savepoints: Vec<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_transaction(&self) -> bool {
        !self.savepoints.is_empty()
    }

    fn check_property(&self, property: &Property) -> Result<()> {
        if property.name.trim().is_empty() {
            return Err(EstateError::missing_field("estate.property", "name"));
        }
        if !property.expected_price.is_finite() || property.expected_price < 0.0 {
            return Err(EstateError::constraint(
                "check_expected_price",
                "The expected price must be strictly positive",
            ));
        }
        if !property.selling_price.is_finite() || property.selling_price < 0.0 {
            return Err(EstateError::constraint(
                "check_selling_price",
                "The selling price must be strictly positive",
            ));
        }
        if let Some(type_id) = property.property_type_id {
            self.property_type(type_id)?;
        }
        for tag_id in &property.tag_ids {
            self.tag(*tag_id)?;
        }
        if let Some(buyer) = property.buyer_id {
            self.partner(buyer)?;
        }
        if let Some(salesperson) = property.salesperson_id {
            self.user(salesperson)?;
        }
        Ok(())
    }

    fn check_offer(&self, offer: &Offer) -> Result<()> {
        if !offer.price.is_finite() || offer.price <= 0.0 {
            return Err(EstateError::constraint(
                "check_price",
                "The offer price must be strictly positive",
            ));
        }
        self.property(offer.property_id)?;
        self.partner(offer.partner_id)?;
        Ok(())
    }

    fn check_unique_name<'a>(
        mut names: impl Iterator<Item = &'a str>,
        name: &str,
        model: &str,
        message: &str,
    ) -> Result<()> {
        if name.trim().is_empty() {
            return Err(EstateError::missing_field(model, "name"));
        }
        if names.any(|existing| existing == name) {
            return Err(EstateError::constraint("name_unique", message));
        }
        Ok(())
    }
}

impl RecordStore for InMemoryStore {
    fn begin(&mut self) {
        self.savepoints.push(self.tables.clone());
    }

    fn commit(&mut self) {
        self.savepoints.pop();
    }

    fn rollback(&mut self) {
        if let Some(snapshot) = self.savepoints.pop() {
            self.tables = snapshot;
        }
    }

    fn insert_property(&mut self, mut property: Property) -> Result<PropertyId> {
        self.check_property(&property)?;
        property.id = PropertyId(self.tables.allocate());
        let id = property.id;
        self.tables.properties.insert(id, property);
        Ok(id)
    }

    fn property(&self, id: PropertyId) -> Result<Property> {
        self.tables
            .properties
            .get(&id)
            .cloned()
            .ok_or_else(|| EstateError::not_found("estate.property", id.0))
    }

    fn update_property(&mut self, property: &Property) -> Result<()> {
        self.property(property.id)?;
        self.check_property(property)?;
        self.tables.properties.insert(property.id, property.clone());
        Ok(())
    }

    fn properties(&self, include_archived: bool) -> Vec<Property> {
        self.tables
            .properties
            .values()
            .rev()
            .filter(|property| include_archived || property.active)
            .cloned()
            .collect()
    }

    fn insert_offer(&mut self, mut offer: Offer) -> Result<OfferId> {
        self.check_offer(&offer)?;
        offer.id = OfferId(self.tables.allocate());
        let id = offer.id;
        self.tables.offers.insert(id, offer);
        Ok(id)
    }

    fn offer(&self, id: OfferId) -> Result<Offer> {
        self.tables
            .offers
            .get(&id)
            .cloned()
            .ok_or_else(|| EstateError::not_found("estate.property.offer", id.0))
    }

    fn update_offer(&mut self, offer: &Offer) -> Result<()> {
        self.offer(offer.id)?;
        self.check_offer(offer)?;
        self.tables.offers.insert(offer.id, offer.clone());
        Ok(())
    }

    fn offers_for(&self, property: PropertyId) -> Vec<Offer> {
        let mut offers: Vec<Offer> = self
            .tables
            .offers
            .values()
            .filter(|offer| offer.property_id == property)
            .cloned()
            .collect();
        offers.sort_by(|a, b| b.price.total_cmp(&a.price));
        offers
    }

    fn insert_property_type(&mut self, mut property_type: PropertyType) -> Result<PropertyTypeId> {
        Self::check_unique_name(
            self.tables.property_types.values().map(|t| t.name.as_str()),
            &property_type.name,
            "estate.property.type",
            "The property type must be unique",
        )?;
        property_type.id = PropertyTypeId(self.tables.allocate());
        let id = property_type.id;
        self.tables.property_types.insert(id, property_type);
        Ok(id)
    }

    fn property_type(&self, id: PropertyTypeId) -> Result<PropertyType> {
        self.tables
            .property_types
            .get(&id)
            .cloned()
            .ok_or_else(|| EstateError::not_found("estate.property.type", id.0))
    }

    fn property_types(&self) -> Vec<PropertyType> {
        let mut types: Vec<PropertyType> = self.tables.property_types.values().cloned().collect();
        types.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.name.cmp(&b.name)));
        types
    }

    fn insert_tag(&mut self, mut tag: PropertyTag) -> Result<PropertyTagId> {
        Self::check_unique_name(
            self.tables.tags.values().map(|t| t.name.as_str()),
            &tag.name,
            "estate.property.tag",
            "The tag name must be unique",
        )?;
        tag.id = PropertyTagId(self.tables.allocate());
        let id = tag.id;
        self.tables.tags.insert(id, tag);
        Ok(id)
    }

    fn tag(&self, id: PropertyTagId) -> Result<PropertyTag> {
        self.tables
            .tags
            .get(&id)
            .cloned()
            .ok_or_else(|| EstateError::not_found("estate.property.tag", id.0))
    }

    fn tags(&self) -> Vec<PropertyTag> {
        let mut tags: Vec<PropertyTag> = self.tables.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }

    fn insert_partner(&mut self, mut partner: Partner) -> Result<PartnerId> {
        if partner.name.trim().is_empty() {
            return Err(EstateError::missing_field("res.partner", "name"));
        }
        partner.id = PartnerId(self.tables.allocate());
        let id = partner.id;
        self.tables.partners.insert(id, partner);
        Ok(id)
    }

    fn partner(&self, id: PartnerId) -> Result<Partner> {
        self.tables
            .partners
            .get(&id)
            .cloned()
            .ok_or_else(|| EstateError::not_found("res.partner", id.0))
    }

    fn insert_user(&mut self, mut user: User) -> Result<UserId> {
        if user.login.trim().is_empty() {
            return Err(EstateError::missing_field("res.users", "login"));
        }
        user.id = UserId(self.tables.allocate());
        let id = user.id;
        self.tables.users.insert(id, user);
        Ok(id)
    }

    fn user(&self, id: UserId) -> Result<User> {
        self.tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| EstateError::not_found("res.users", id.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> PropertyTag {
        PropertyTag {
            id: PropertyTagId(0),
            name: name.to_string(),
            color: 0,
        }
    }

    #[test]
    fn test_unique_tag_names() {
        let mut store = InMemoryStore::new();
        store.insert_tag(tag("cozy")).unwrap();
        let err = store.insert_tag(tag("cozy")).unwrap_err();
        assert!(matches!(err, EstateError::ConstraintError { ref constraint, .. } if constraint == "name_unique"));
    }

    #[test]
    fn test_rollback_restores_snapshot() {
        let mut store = InMemoryStore::new();
        store.insert_tag(tag("cozy")).unwrap();

        store.begin();
        store.insert_tag(tag("renovated")).unwrap();
        assert_eq!(store.tags().len(), 2);
        store.rollback();

        assert_eq!(store.tags().len(), 1);
        assert!(!store.in_transaction());
    }

    #[test]
    fn test_nested_savepoints() {
        let mut store = InMemoryStore::new();
        store.begin();
        store.insert_tag(tag("a")).unwrap();
        store.begin();
        store.insert_tag(tag("b")).unwrap();
        store.rollback();
        store.commit();

        let names: Vec<String> = store.tags().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["a".to_string()]);
    }

    #[test]
    fn test_type_ordering() {
        let mut store = InMemoryStore::new();
        for (name, sequence) in [("Villa", 2), ("House", 1), ("Apartment", 2)] {
            store
                .insert_property_type(PropertyType {
                    id: PropertyTypeId(0),
                    name: name.to_string(),
                    sequence,
                })
                .unwrap();
        }
        let names: Vec<String> = store.property_types().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["House", "Apartment", "Villa"]);
    }
}
