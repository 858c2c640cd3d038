//! OTC Engine Binary
//!
//! Starts the engine with in-process adapters, seeds a demo market, and
//! walks one full negotiation through its payment sagas. The expiration
//! sweep keeps running until Ctrl-C.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin otc-engine
//! ```
//!
//! # Environment Variables
//!
//! - `SWEEP_INTERVAL_SECS`: Expiration sweep period (default: 3600)
//! - `SWEEP_ENABLED`: Set to `false` to disable the sweep (default: true)
//! - `RUST_LOG`: Log level (default: info)

use anyhow::Result;
use tokio::signal;

use otc_engine::config::EngineConfig;
use otc_engine::domain::negotiation::value_objects::OfferTerms;
use otc_engine::telemetry::init_tracing;
use otc_engine::{
    AccountKind, InMemoryContainer, Money, OptionFilter, PaymentId, PortfolioEntry,
    PortfolioRepository, SettlementDate, ShareCount, Symbol, UserId,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    tracing::info!("Starting OTC engine");

    let config = EngineConfig::from_env()?;
    let container = InMemoryContainer::in_memory();

    seed_demo_market(&container).await?;
    run_demo_negotiation(&container).await?;

    let sweep = container.expiration_sweep(config.sweep_interval);
    let sweep_handle = if config.sweep_enabled {
        Some(sweep.start())
    } else {
        tracing::info!("expiration sweep disabled");
        None
    };

    tracing::info!("OTC engine ready");
    signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");

    sweep.shutdown();
    if let Some(handle) = sweep_handle {
        handle.await?;
    }

    tracing::info!("OTC engine stopped");
    Ok(())
}

/// Seed two users with accounts, identities, and a seller-side holding.
async fn seed_demo_market(container: &InMemoryContainer) -> Result<()> {
    let buyer = UserId::new("demo-buyer");
    let seller = UserId::new("demo-seller");

    let banking = container.banking();
    banking.register_account(buyer.clone(), "RS35-0001", AccountKind::Personal);
    banking.register_account(seller.clone(), "RS35-0002", AccountKind::Personal);

    let identity = container.identity();
    identity.add_client(&buyer, "Bojana", "Kupac");
    identity.add_client(&seller, "Petar", "Prodavac");

    let mut entry = PortfolioEntry::new(
        seller,
        Symbol::new("AAPL"),
        ShareCount::new(100),
        Money::from_units(50),
    );
    entry.make_public(ShareCount::new(100))?;
    container.portfolios().save(&entry).await?;

    tracing::info!(entry_id = %entry.id(), "demo market seeded");
    Ok(())
}

/// Create, accept, settle, and exercise one offer end to end.
#[allow(clippy::expect_used)]
async fn run_demo_negotiation(container: &InMemoryContainer) -> Result<()> {
    let buyer = UserId::new("demo-buyer");
    let seller = UserId::new("demo-seller");

    let entry = container
        .portfolios()
        .find_by_user_and_symbol(&seller, &Symbol::new("AAPL"))
        .await?
        .expect("demo entry was just seeded");

    let negotiation = container.negotiation();
    let offer = negotiation
        .create_offer(
            entry.id(),
            buyer.clone(),
            OfferTerms {
                amount: ShareCount::new(50),
                price_per_share: Money::from_units(10),
                premium: Money::from_units(2),
                settlement_date: SettlementDate::days_from_today(30),
            },
        )
        .await?;

    negotiation.accept_offer(offer.id(), &seller).await?;

    // The mock gateway settles nothing by itself; play the bank and
    // confirm the premium.
    let dispatched = container.banking().executed();
    let premium = dispatched
        .last()
        .expect("accept dispatched the premium payment");
    container
        .saga()
        .mark_as_success(&PaymentId::new(premium.reference.clone()))
        .await?;

    let options = container
        .lifecycle()
        .list_options_for_user(&buyer, OptionFilter::Valid)
        .await?;
    let option = options.first().expect("premium settlement granted an option");
    tracing::info!(option_id = %option.id(), "demo option granted");

    container
        .lifecycle()
        .exercise_option(option.id(), &buyer)
        .await?;
    let strike_reference = container
        .banking()
        .executed()
        .last()
        .expect("exercise dispatched the strike payment")
        .reference
        .clone();
    container
        .saga()
        .mark_as_success(&PaymentId::new(strike_reference))
        .await?;

    let holding = container
        .portfolios()
        .find_by_user_and_symbol(&buyer, &Symbol::new("AAPL"))
        .await?
        .expect("exercise created the buyer's holding");
    tracing::info!(
        amount = holding.amount().get(),
        average_price = %holding.average_price(),
        "demo negotiation complete"
    );
    Ok(())
}
