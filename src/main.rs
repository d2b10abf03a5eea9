use anyhow::Context;
use clap::Parser;
use estate_rules::config::cli::Command;
use estate_rules::domain::model::{Offer, OfferId, Property, PropertyId};
use estate_rules::domain::ports::{Clock, RecordStore};
use estate_rules::utils::error::ErrorSeverity;
use estate_rules::utils::{logger, validation::Validate};
use estate_rules::{
    CliConfig, EstateConfig, EstateError, EstateService, FixedClock, InMemoryStore, SystemClock,
};
use serde::Serialize;

#[derive(Serialize)]
struct ListingEntry {
    property: Property,
    offers: Vec<Offer>,
}

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Loading configuration from: {}", cli.config);
    let config = EstateConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load config file '{}'", cli.config))?;

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let outcome = match config.clock.today {
        Some(today) => run(&cli, &config, FixedClock::on(today)),
        None => run(&cli, &config, SystemClock),
    };

    if let Err(e) = outcome {
        tracing::error!(
            "Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn run<C: Clock>(cli: &CliConfig, config: &EstateConfig, clock: C) -> Result<(), EstateError> {
    let mut service = EstateService::with_rules(InMemoryStore::new(), clock, config.rules.clone());
    if config.seed.is_empty() {
        tracing::warn!("Configuration has no seed data; the listing will be empty");
    }
    config.seed.load_into(&mut service)?;

    match cli.command.clone().unwrap_or(Command::Summary) {
        Command::Summary => {}
        Command::Sell { property } => service.set_sold(&[PropertyId(property)])?,
        Command::Cancel { property } => service.set_canceled(&[PropertyId(property)])?,
        Command::Archive { property } => service.archive(&[PropertyId(property)])?,
        Command::Duplicate { property } => {
            let copy = service.duplicate_property(PropertyId(property))?;
            println!("Created property {}", copy);
        }
        Command::Accept { offer } => service.accept_offer(&[OfferId(offer)])?,
        Command::Refuse { offer } => service.refuse_offer(&[OfferId(offer)])?,
        Command::Deadline { offer, date } => service.set_offer_deadline(OfferId(offer), date)?,
    }

    print_listing(&service, cli)
}

fn print_listing<S: RecordStore, C: Clock>(
    service: &EstateService<S, C>,
    cli: &CliConfig,
) -> Result<(), EstateError> {
    let listing: Vec<ListingEntry> = service
        .properties(cli.all)
        .into_iter()
        .map(|property| {
            let offers = service.offers(property.id);
            ListingEntry { property, offers }
        })
        .collect();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    for entry in &listing {
        let property = &entry.property;
        let type_name = property
            .property_type_id
            .and_then(|id| service.store().property_type(id).ok())
            .map_or_else(|| "-".to_string(), |t| t.name);
        let tags: Vec<String> = property
            .tag_ids
            .iter()
            .filter_map(|id| service.store().tag(*id).ok())
            .map(|tag| tag.name)
            .collect();

        println!(
            "#{} {} [{}]{}",
            property.id,
            property.name,
            property.state,
            if property.active { "" } else { " (archived)" }
        );
        println!(
            "   type: {}  tags: {}  area: {} m² ({} living + {} garden)",
            type_name,
            if tags.is_empty() { "-".to_string() } else { tags.join(", ") },
            property.total_area,
            property.living_area,
            property.garden_area
        );
        println!(
            "   expected: {:.2}  best offer: {:.2}  selling: {:.2}",
            property.expected_price, property.best_price, property.selling_price
        );
        for offer in &entry.offers {
            let partner = service
                .store()
                .partner(offer.partner_id)
                .map(|p| p.name)
                .unwrap_or_else(|_| offer.partner_id.to_string());
            let status = offer.status.map_or_else(|| "-".to_string(), |s| s.to_string());
            println!(
                "   offer #{} {:.2} by {} [{}] until {} ({} days)",
                offer.id, offer.price, partner, status, offer.date_deadline, offer.validity
            );
        }
    }
    Ok(())
}
