use anyhow::Result;
use chrono::NaiveDate;
use estate_rules::domain::model::{OfferStatus, PropertyState};
use estate_rules::domain::ports::RecordStore;
use estate_rules::utils::validation::Validate;
use estate_rules::{EstateConfig, EstateError, EstateService, FixedClock, InMemoryStore};
use tempfile::TempDir;

const DATASET: &str = r#"
[rules]
offer_validity_days = 10

[clock]
today = "2024-01-01"

[[seed.users]]
login = "mitchell"
name = "Mitchell Admin"

[[seed.partners]]
name = "Alice"

[[seed.partners]]
name = "Bob"

[[seed.types]]
name = "House"
sequence = 2

[[seed.types]]
name = "Apartment"

[[seed.tags]]
name = "cozy"
color = 3

[[seed.tags]]
name = "renovated"

[[seed.properties]]
name = "Big Villa"
postcode = "12345"
expected_price = 1600000.0
living_area = 250
garden = true
garden_area = 1000
garden_orientation = "south"
property_type = "House"
tags = ["cozy", "renovated"]

[[seed.properties]]
name = "Trailer home"
expected_price = 100000.0
living_area = 10
property_type = "Apartment"
state = "canceled"

[[seed.properties]]
name = "Old barn"
expected_price = 50000.0
active = false

[[seed.offers]]
property = "Big Villa"
partner = "Alice"
price = 1500000.0
status = "accepted"

[[seed.offers]]
property = "Big Villa"
partner = "Bob"
price = 1400000.0
validity = 14
"#;

fn write_config(dir: &TempDir, content: &str) -> Result<String> {
    let path = dir.path().join("estate.toml");
    std::fs::write(&path, content)?;
    Ok(path.to_string_lossy().into_owned())
}

#[test]
fn test_load_and_seed_dataset() -> Result<()> {
    let dir = TempDir::new()?;
    let config = EstateConfig::from_file(write_config(&dir, DATASET)?)?;
    config.validate()?;

    let today = config.clock.today.expect("clock pinned in dataset");
    let mut service =
        EstateService::with_rules(InMemoryStore::new(), FixedClock::on(today), config.rules.clone());
    let index = config.seed.load_into(&mut service)?;

    let villa = service.property(index.properties["Big Villa"])?;
    assert_eq!(villa.total_area, 1250);
    assert_eq!(villa.best_price, 1500000.0);
    assert_eq!(villa.selling_price, 1500000.0);
    assert_eq!(villa.state, PropertyState::OfferAccepted);
    assert_eq!(villa.buyer_id, Some(index.partners["Alice"]));
    assert_eq!(villa.salesperson_id, Some(index.users["mitchell"]));
    assert_eq!(villa.tag_ids.len(), 2);
    assert_eq!(villa.bedrooms, 2);

    let offers = service.offers(villa.id);
    assert_eq!(offers.len(), 2);
    assert_eq!(offers[0].status, Some(OfferStatus::Accepted));
    assert_eq!(offers[0].validity, 10);
    assert_eq!(offers[0].date_deadline, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
    assert_eq!(offers[1].status, Some(OfferStatus::Refused));
    assert_eq!(offers[1].date_deadline, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

    let trailer = service.property(index.properties["Trailer home"])?;
    assert_eq!(trailer.state, PropertyState::Canceled);

    assert_eq!(service.properties(false).len(), 2);
    assert_eq!(service.properties(true).len(), 3);

    let type_names: Vec<String> = service
        .store()
        .property_types()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(type_names, vec!["Apartment", "House"]);
    Ok(())
}

#[test]
fn test_seed_without_users_creates_admin() -> Result<()> {
    let config = EstateConfig::from_toml_str(
        r#"
[[seed.properties]]
name = "Shed"
expected_price = 1000.0
"#,
    )?;
    let mut service = EstateService::new(
        InMemoryStore::new(),
        FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
    );
    let index = config.seed.load_into(&mut service)?;

    let admin = index.actor.expect("admin user created");
    assert_eq!(service.store().user(admin)?.login, "admin");
    let shed = service.property(index.properties["Shed"])?;
    assert_eq!(shed.salesperson_id, Some(admin));
    assert_eq!(shed.date_availability, NaiveDate::from_ymd_opt(2024, 9, 1));
    Ok(())
}

#[test]
fn test_seed_validation_catches_bad_references() {
    let config = EstateConfig::from_toml_str(
        r#"
[[seed.properties]]
name = "Shed"
expected_price = 1000.0

[[seed.offers]]
property = "Castle"
partner = "Alice"
price = 10.0
"#,
    )
    .unwrap();

    let err = config.validate().unwrap_err();
    assert!(matches!(
        err,
        EstateError::InvalidConfigValueError { ref field, .. } if field == "seed.offers.property"
    ));
}

#[test]
fn test_seed_validation_catches_duplicate_tags() {
    let config = EstateConfig::from_toml_str(
        r#"
[[seed.tags]]
name = "cozy"

[[seed.tags]]
name = "cozy"
"#,
    )
    .unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_seed_with_unknown_partner_fails_to_load() {
    let config = EstateConfig::from_toml_str(
        r#"
[[seed.properties]]
name = "Shed"
expected_price = 1000.0

[[seed.offers]]
property = "Shed"
partner = "Nobody"
price = 900.0
"#,
    )
    .unwrap();
    let mut service = EstateService::new(
        InMemoryStore::new(),
        FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
    );
    assert!(config.seed.load_into(&mut service).is_err());
}

#[test]
fn test_missing_config_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = EstateConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, EstateError::IoError(_)));
}
