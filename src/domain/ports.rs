use crate::domain::model::{
    Offer, OfferId, Partner, PartnerId, Property, PropertyId, PropertyTag, PropertyTagId,
    PropertyType, PropertyTypeId, User, UserId,
};
use crate::utils::error::Result;
use chrono::{NaiveDate, NaiveDateTime};

/// Storage collaborator: typed records, check and unique constraints, and
/// transactions. Inserts ignore the `id` of the given record and return the
/// id the store assigned.
///
/// Transactions nest: every `begin` opens a savepoint that the matching
/// `commit` releases or `rollback` restores.
pub trait RecordStore {
    fn begin(&mut self);
    fn commit(&mut self);
    fn rollback(&mut self);

    fn insert_property(&mut self, property: Property) -> Result<PropertyId>;
    fn property(&self, id: PropertyId) -> Result<Property>;
    fn update_property(&mut self, property: &Property) -> Result<()>;
    /// Newest first. Archived properties only when `include_archived`.
    fn properties(&self, include_archived: bool) -> Vec<Property>;

    fn insert_offer(&mut self, offer: Offer) -> Result<OfferId>;
    fn offer(&self, id: OfferId) -> Result<Offer>;
    fn update_offer(&mut self, offer: &Offer) -> Result<()>;
    /// Highest price first.
    fn offers_for(&self, property: PropertyId) -> Vec<Offer>;

    fn insert_property_type(&mut self, property_type: PropertyType) -> Result<PropertyTypeId>;
    fn property_type(&self, id: PropertyTypeId) -> Result<PropertyType>;
    /// Ordered by sequence, then name.
    fn property_types(&self) -> Vec<PropertyType>;

    fn insert_tag(&mut self, tag: PropertyTag) -> Result<PropertyTagId>;
    fn tag(&self, id: PropertyTagId) -> Result<PropertyTag>;
    /// Ordered by name.
    fn tags(&self) -> Vec<PropertyTag>;

    fn insert_partner(&mut self, partner: Partner) -> Result<PartnerId>;
    fn partner(&self, id: PartnerId) -> Result<Partner>;

    fn insert_user(&mut self, user: User) -> Result<UserId>;
    fn user(&self, id: UserId) -> Result<User>;
}

pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}
