//! End-to-end negotiation and payment-saga flows.
//!
//! Drives the engine through the in-memory container: user actions go
//! through the services, bank settlement callbacks through the saga
//! coordinator, exactly as a transport layer would.

use otc_engine::domain::negotiation::value_objects::OfferTerms;
use std::time::Duration;

use otc_engine::{
    AccountKind, EngineError, ErrorKind, InMemoryContainer, Money, OfferRepository, OfferStatus,
    OptionFilter, OptionId, OptionRepository, OptionStatus, OtcOffer, PaymentId, PortfolioEntry,
    PortfolioRepository, SettlementDate, ShareCount, Symbol, UserId,
};

fn buyer() -> UserId {
    UserId::new("buyer-1")
}

fn seller() -> UserId {
    UserId::new("seller-1")
}

fn symbol() -> Symbol {
    Symbol::new("AAPL")
}

fn terms() -> OfferTerms {
    OfferTerms {
        amount: ShareCount::new(50),
        price_per_share: Money::from_units(10),
        premium: Money::from_units(2),
        settlement_date: SettlementDate::days_from_today(30),
    }
}

/// Container with both parties banked and the seller holding 100 public
/// shares of AAPL at average price 50.
async fn engine() -> InMemoryContainer {
    let container = InMemoryContainer::in_memory();

    let banking = container.banking();
    banking.register_account(buyer(), "acct-buyer", AccountKind::Personal);
    banking.register_account(seller(), "acct-seller", AccountKind::Personal);

    container.identity().add_client(&buyer(), "Bo", "Buyer");
    container.identity().add_client(&seller(), "Sue", "Seller");

    let mut entry = PortfolioEntry::new(seller(), symbol(), ShareCount::new(100), Money::from_units(50));
    entry.make_public(ShareCount::new(100)).unwrap();
    container.portfolios().save(&entry).await.unwrap();

    container
}

async fn open_offer(container: &InMemoryContainer) -> OtcOffer {
    let entry = seller_entry(container).await;
    container
        .negotiation()
        .create_offer(entry.id(), buyer(), terms())
        .await
        .unwrap()
}

async fn seller_entry(container: &InMemoryContainer) -> PortfolioEntry {
    container
        .portfolios()
        .find_by_user_and_symbol(&seller(), &symbol())
        .await
        .unwrap()
        .unwrap()
}

/// The payment id of the most recently dispatched gateway instruction.
fn last_payment_id(container: &InMemoryContainer) -> PaymentId {
    let dispatched = container.banking().executed();
    PaymentId::new(dispatched.last().unwrap().reference.clone())
}

// =============================================================================
// Scenario A: accept + premium success grants the option
// =============================================================================

#[tokio::test]
async fn accept_with_premium_success_grants_option() {
    let container = engine().await;
    let offer = open_offer(&container).await;

    container
        .negotiation()
        .accept_offer(offer.id(), &seller())
        .await
        .unwrap();

    let entry = seller_entry(&container).await;
    assert_eq!(entry.reserved_amount(), ShareCount::new(50));
    assert_eq!(entry.public_amount(), ShareCount::new(50));

    // The premium went buyer -> seller.
    let dispatched = container.banking().executed();
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].amount, Money::from_units(2));
    assert_eq!(dispatched[0].sender.owner_id, buyer());
    assert_eq!(dispatched[0].receiver.owner_id, seller());

    container
        .saga()
        .mark_as_success(&last_payment_id(&container))
        .await
        .unwrap();

    let options = container
        .lifecycle()
        .list_options_for_user(&buyer(), OptionFilter::Valid)
        .await
        .unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].amount(), ShareCount::new(50));
    assert_eq!(options[0].strike_price(), Money::from_units(10));

    let offer = container
        .offers()
        .find_by_id(offer.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(offer.status(), OfferStatus::Accepted);
    assert_eq!(offer.option_id(), Some(options[0].id()));
}

// =============================================================================
// Scenario B: premium failure reopens the offer and releases shares
// =============================================================================

#[tokio::test]
async fn premium_failure_compensates_and_reopens_offer() {
    let container = engine().await;
    let offer = open_offer(&container).await;

    container
        .negotiation()
        .accept_offer(offer.id(), &seller())
        .await
        .unwrap();

    container
        .saga()
        .mark_as_fail(&last_payment_id(&container))
        .await
        .unwrap();

    let entry = seller_entry(&container).await;
    assert_eq!(entry.reserved_amount(), ShareCount::ZERO);
    assert_eq!(entry.public_amount(), ShareCount::new(100));

    let offer = container
        .offers()
        .find_by_id(offer.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(offer.status(), OfferStatus::Pending);
    // No option was ever granted.
    assert!(offer.option_id().is_none());
    assert!(container.options().is_empty());
}

#[tokio::test]
async fn synchronous_gateway_refusal_compensates_inline() {
    let container = engine().await;
    let offer = open_offer(&container).await;

    container.banking().refuse_payments(true);
    let result = container
        .negotiation()
        .accept_offer(offer.id(), &seller())
        .await;
    assert!(matches!(result, Err(e) if e.kind() == ErrorKind::ExecutionFailed));

    let entry = seller_entry(&container).await;
    assert_eq!(entry.reserved_amount(), ShareCount::ZERO);
    assert_eq!(entry.public_amount(), ShareCount::new(100));

    let offer = container
        .offers()
        .find_by_id(offer.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(offer.status(), OfferStatus::Pending);

    // Negotiation can resume after the refusal.
    container.banking().refuse_payments(false);
    container
        .negotiation()
        .accept_offer(offer.id(), &seller())
        .await
        .unwrap();
}

// =============================================================================
// Scenario C: exercise transfers holdings on settlement
// =============================================================================

/// Accept an offer and settle its premium; returns the granted option id.
async fn granted_option(container: &InMemoryContainer) -> OptionId {
    let offer = open_offer(container).await;
    container
        .negotiation()
        .accept_offer(offer.id(), &seller())
        .await
        .unwrap();
    container
        .saga()
        .mark_as_success(&last_payment_id(container))
        .await
        .unwrap();

    let options = container
        .lifecycle()
        .list_options_for_user(&buyer(), OptionFilter::Valid)
        .await
        .unwrap();
    options[0].id().clone()
}

#[tokio::test]
async fn exercise_with_settlement_transfers_holdings() {
    let container = engine().await;
    let option_id = granted_option(&container).await;

    container
        .lifecycle()
        .exercise_option(&option_id, &buyer())
        .await
        .unwrap();

    // strike 10 x 50 shares = 500, buyer -> seller.
    let dispatched = container.banking().executed();
    let strike = dispatched.last().unwrap();
    assert_eq!(strike.amount, Money::from_units(500));
    assert_eq!(strike.sender.owner_id, buyer());

    container
        .saga()
        .mark_as_success(&last_payment_id(&container))
        .await
        .unwrap();

    let option = container
        .options()
        .find_by_id(&option_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(option.status(), OptionStatus::Used);

    let offer = container
        .offers()
        .find_by_id(option.offer_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(offer.status(), OfferStatus::Exercised);

    let seller_holding = seller_entry(&container).await;
    assert_eq!(seller_holding.amount(), ShareCount::new(50));
    assert_eq!(seller_holding.reserved_amount(), ShareCount::ZERO);

    let buyer_holding = container
        .portfolios()
        .find_by_user_and_symbol(&buyer(), &symbol())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(buyer_holding.amount(), ShareCount::new(50));
    assert_eq!(buyer_holding.average_price(), Money::from_units(10));
}

#[tokio::test]
async fn exercise_failure_leaves_option_valid() {
    let container = engine().await;
    let option_id = granted_option(&container).await;

    container
        .lifecycle()
        .exercise_option(&option_id, &buyer())
        .await
        .unwrap();
    container
        .saga()
        .mark_as_fail(&last_payment_id(&container))
        .await
        .unwrap();

    let option = container
        .options()
        .find_by_id(&option_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(option.status(), OptionStatus::Valid);

    // The holder may retry.
    container
        .lifecycle()
        .exercise_option(&option_id, &buyer())
        .await
        .unwrap();
}

/// Both parties hold the symbol and each has sold the other an option;
/// settling both exercises concurrently must not wedge on the two
/// portfolio locks.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn swapped_role_settlements_both_complete() {
    let container = engine().await;

    let mut counter_entry = PortfolioEntry::new(
        buyer(),
        symbol(),
        ShareCount::new(100),
        Money::from_units(50),
    );
    counter_entry.make_public(ShareCount::new(100)).unwrap();
    container.portfolios().save(&counter_entry).await.unwrap();

    // seller -> buyer, then buyer -> seller on the same symbol.
    let option_ab = granted_option(&container).await;

    let offer_ba = container
        .negotiation()
        .create_offer(counter_entry.id(), seller(), terms())
        .await
        .unwrap();
    container
        .negotiation()
        .accept_offer(offer_ba.id(), &buyer())
        .await
        .unwrap();
    container
        .saga()
        .mark_as_success(&last_payment_id(&container))
        .await
        .unwrap();
    let option_ba = container
        .lifecycle()
        .list_options_for_user(&seller(), OptionFilter::Valid)
        .await
        .unwrap()
        .into_iter()
        .find(|o| o.buyer_id() == &seller())
        .unwrap()
        .id()
        .clone();

    container
        .lifecycle()
        .exercise_option(&option_ab, &buyer())
        .await
        .unwrap();
    let payment_ab = last_payment_id(&container);
    container
        .lifecycle()
        .exercise_option(&option_ba, &seller())
        .await
        .unwrap();
    let payment_ba = last_payment_id(&container);

    let task_ab = tokio::spawn({
        let saga = container.saga();
        async move { saga.mark_as_success(&payment_ab).await }
    });
    let task_ba = tokio::spawn({
        let saga = container.saga();
        async move { saga.mark_as_success(&payment_ba).await }
    });

    let (result_ab, result_ba) =
        tokio::time::timeout(Duration::from_secs(5), async { tokio::join!(task_ab, task_ba) })
            .await
            .expect("swapped-role settlements deadlocked");
    result_ab.unwrap().unwrap();
    result_ba.unwrap().unwrap();

    for option_id in [&option_ab, &option_ba] {
        let option = container
            .options()
            .find_by_id(option_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(option.status(), OptionStatus::Used);
    }

    // 100 - 50 sold + 50 bought on each side.
    for party in [buyer(), seller()] {
        let entry = container
            .portfolios()
            .find_by_user_and_symbol(&party, &symbol())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.amount(), ShareCount::new(100));
        assert_eq!(entry.reserved_amount(), ShareCount::ZERO);
    }
}

#[tokio::test]
async fn seller_cannot_exercise() {
    let container = engine().await;
    let option_id = granted_option(&container).await;

    let result = container
        .lifecycle()
        .exercise_option(&option_id, &seller())
        .await;
    assert!(matches!(result, Err(e) if e.kind() == ErrorKind::Unauthorized));
}

// =============================================================================
// Scenario D: a past settlement date blocks exercise before any payment
// =============================================================================

#[tokio::test]
async fn expired_settlement_date_blocks_exercise_without_payment() {
    let container = engine().await;

    // Grant an already-expired option directly; negotiation would not
    // produce one, but late exercise attempts against old contracts do.
    let option = otc_engine::OtcOption::grant(
        otc_engine::domain::option_contract::aggregate::GrantOptionCommand {
            offer_id: otc_engine::OfferId::generate(),
            seller_id: seller(),
            buyer_id: buyer(),
            symbol: symbol(),
            strike_price: Money::from_units(10),
            amount: ShareCount::new(50),
            premium: Money::from_units(2),
            settlement_date: SettlementDate::days_from_today(-1),
        },
    );
    container.options().save(&option).await.unwrap();

    let result = container
        .lifecycle()
        .exercise_option(option.id(), &buyer())
        .await;
    assert!(matches!(result, Err(e) if e.kind() == ErrorKind::Conflict));
    assert!(container.banking().executed().is_empty());
}

// =============================================================================
// Scenario E: turn rule
// =============================================================================

#[tokio::test]
async fn self_accept_is_unauthorized() {
    let container = engine().await;
    let offer = open_offer(&container).await;

    let result = container
        .negotiation()
        .accept_offer(offer.id(), &buyer())
        .await;
    assert!(matches!(result, Err(e) if e.kind() == ErrorKind::Unauthorized));

    // Nothing was reserved, no payment dispatched.
    let entry = seller_entry(&container).await;
    assert_eq!(entry.reserved_amount(), ShareCount::ZERO);
    assert!(container.banking().executed().is_empty());
}

#[tokio::test]
async fn counter_offer_swaps_turn_then_buyer_accepts() {
    let container = engine().await;
    let offer = open_offer(&container).await;

    let mut countered = terms();
    countered.premium = Money::from_units(3);
    container
        .negotiation()
        .update_offer(offer.id(), &seller(), countered)
        .await
        .unwrap();

    // Now it is the buyer's turn; the seller may no longer accept.
    let result = container
        .negotiation()
        .accept_offer(offer.id(), &seller())
        .await;
    assert!(matches!(result, Err(e) if e.kind() == ErrorKind::Unauthorized));

    container
        .negotiation()
        .accept_offer(offer.id(), &buyer())
        .await
        .unwrap();

    let premium = container.banking().executed();
    assert_eq!(premium[0].amount, Money::from_units(3));
}

// =============================================================================
// Round trip: accept-success then expiry restores the seller's holdings
// =============================================================================

#[tokio::test]
async fn accept_then_expire_restores_reservation() {
    let container = engine().await;
    let option_id = granted_option(&container).await;

    // Force the settlement date into the past and sweep.
    let option = container
        .options()
        .find_by_id(&option_id)
        .await
        .unwrap()
        .unwrap();
    let expired = otc_engine::OtcOption::grant(
        otc_engine::domain::option_contract::aggregate::GrantOptionCommand {
            offer_id: option.offer_id().clone(),
            seller_id: option.seller_id().clone(),
            buyer_id: option.buyer_id().clone(),
            symbol: option.symbol().clone(),
            strike_price: option.strike_price(),
            amount: option.amount(),
            premium: option.premium(),
            settlement_date: SettlementDate::days_from_today(-1),
        },
    );
    container.options().save(&expired).await.unwrap();

    let outcome = container.lifecycle().check_expirations().await.unwrap();
    assert_eq!(outcome.expired, 1);
    assert_eq!(outcome.failed, 0);

    let retired = container
        .options()
        .find_by_id(expired.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(retired.status(), OptionStatus::Expired);

    // Reservation released back to private holdings: amount restored,
    // public unchanged from its post-accept value.
    let entry = seller_entry(&container).await;
    assert_eq!(entry.reserved_amount(), ShareCount::ZERO);
    assert_eq!(entry.amount(), ShareCount::new(100));
    assert_eq!(entry.public_amount(), ShareCount::new(50));
}

// =============================================================================
// Idempotency under duplicate callbacks
// =============================================================================

#[tokio::test]
async fn duplicate_premium_callbacks_grant_one_option() {
    let container = engine().await;
    let offer = open_offer(&container).await;

    container
        .negotiation()
        .accept_offer(offer.id(), &seller())
        .await
        .unwrap();
    let payment_id = last_payment_id(&container);

    container.saga().mark_as_success(&payment_id).await.unwrap();
    container.saga().mark_as_success(&payment_id).await.unwrap();
    container.saga().mark_as_fail(&payment_id).await.unwrap();

    assert_eq!(container.options().len(), 1);
    let entry = seller_entry(&container).await;
    assert_eq!(entry.reserved_amount(), ShareCount::new(50));
}

// =============================================================================
// Rollback escalation
// =============================================================================

#[tokio::test]
async fn premium_settlement_with_broken_state_rolls_back_payment() {
    let container = engine().await;
    let offer = open_offer(&container).await;

    container
        .negotiation()
        .accept_offer(offer.id(), &seller())
        .await
        .unwrap();
    let payment_id = last_payment_id(&container);

    // Link a foreign option behind the saga's back so the grant must
    // fail after the premium settled.
    let mut stored = container
        .offers()
        .find_by_id(offer.id())
        .await
        .unwrap()
        .unwrap();
    stored.attach_option(OptionId::generate()).unwrap();
    container.offers().save(&stored).await.unwrap();

    let result = container.saga().mark_as_success(&payment_id).await;
    assert!(matches!(&result, Err(e) if e.kind() == ErrorKind::Conflict));

    // The settled premium was rejected at the gateway; no option exists.
    assert_eq!(container.banking().rejections().len(), 1);
    assert!(container.options().is_empty());
}

#[tokio::test]
async fn failed_premium_rollback_is_unrecoverable() {
    let container = engine().await;
    let offer = open_offer(&container).await;

    container
        .negotiation()
        .accept_offer(offer.id(), &seller())
        .await
        .unwrap();
    let payment_id = last_payment_id(&container);

    let mut stored = container
        .offers()
        .find_by_id(offer.id())
        .await
        .unwrap()
        .unwrap();
    stored.attach_option(OptionId::generate()).unwrap();
    container.offers().save(&stored).await.unwrap();

    container.banking().refuse_rejections(true);
    let result = container.saga().mark_as_success(&payment_id).await;
    assert!(matches!(&result, Err(e) if e.kind() == ErrorKind::Unrecoverable));
}

#[tokio::test]
async fn exercise_settlement_with_broken_state_rolls_back_payment() {
    let container = engine().await;
    let option_id = granted_option(&container).await;

    container
        .lifecycle()
        .exercise_option(&option_id, &buyer())
        .await
        .unwrap();
    let payment_id = last_payment_id(&container);

    // Corrupt domain state behind the saga's back: empty the seller's
    // reservation so the transfer must fail after settlement.
    let mut option = container
        .options()
        .find_by_id(&option_id)
        .await
        .unwrap()
        .unwrap();
    option.mark_used().unwrap();
    container.options().save(&option).await.unwrap();

    let result = container.saga().mark_as_success(&payment_id).await;
    assert!(matches!(&result, Err(e) if e.kind() == ErrorKind::Conflict));

    // The settled payment was rejected at the gateway.
    assert_eq!(container.banking().rejections().len(), 1);
}

#[tokio::test]
async fn failed_rollback_is_unrecoverable() {
    let container = engine().await;
    let option_id = granted_option(&container).await;

    container
        .lifecycle()
        .exercise_option(&option_id, &buyer())
        .await
        .unwrap();
    let payment_id = last_payment_id(&container);

    let mut option = container
        .options()
        .find_by_id(&option_id)
        .await
        .unwrap()
        .unwrap();
    option.mark_used().unwrap();
    container.options().save(&option).await.unwrap();

    container.banking().refuse_rejections(true);
    let result = container.saga().mark_as_success(&payment_id).await;
    assert!(matches!(&result, Err(e) if e.kind() == ErrorKind::Unrecoverable));
}

// =============================================================================
// Listings
// =============================================================================

#[tokio::test]
async fn active_offers_resolve_counterparty_names() {
    let container = engine().await;
    open_offer(&container).await;

    let for_seller = container
        .negotiation()
        .list_active_offers_for_user(&seller())
        .await
        .unwrap();
    assert_eq!(for_seller.len(), 1);
    assert_eq!(for_seller[0].counterparty_name, "Bo Buyer");
    assert!(for_seller[0].can_interact);

    let for_buyer = container
        .negotiation()
        .list_active_offers_for_user(&buyer())
        .await
        .unwrap();
    assert_eq!(for_buyer[0].counterparty_name, "Sue Seller");
    assert!(!for_buyer[0].can_interact);
}

#[tokio::test]
async fn unknown_counterparty_falls_back_to_placeholder() {
    let container = InMemoryContainer::in_memory();
    container
        .banking()
        .register_account(buyer(), "acct-buyer", AccountKind::Personal);
    container
        .banking()
        .register_account(seller(), "acct-seller", AccountKind::Personal);

    let mut entry = PortfolioEntry::new(seller(), symbol(), ShareCount::new(100), Money::from_units(50));
    entry.make_public(ShareCount::new(100)).unwrap();
    container.portfolios().save(&entry).await.unwrap();

    container
        .negotiation()
        .create_offer(entry.id(), buyer(), terms())
        .await
        .unwrap();

    let views = container
        .negotiation()
        .list_active_offers_for_user(&seller())
        .await
        .unwrap();
    assert_eq!(views[0].counterparty_name, "Unknown User");
}

// =============================================================================
// Insufficient holdings
// =============================================================================

#[tokio::test]
async fn offer_above_public_amount_is_rejected() {
    let container = engine().await;
    let entry = seller_entry(&container).await;

    let mut oversized = terms();
    oversized.amount = ShareCount::new(101);
    let result = container
        .negotiation()
        .create_offer(entry.id(), buyer(), oversized)
        .await;
    assert!(matches!(result, Err(e) if e.kind() == ErrorKind::Conflict));
}

#[tokio::test]
async fn accept_fails_when_public_shares_were_spent() {
    let container = engine().await;
    let first = open_offer(&container).await;

    let mut second_terms = terms();
    second_terms.amount = ShareCount::new(60);
    let entry = seller_entry(&container).await;
    let second = container
        .negotiation()
        .create_offer(entry.id(), UserId::new("buyer-2"), second_terms)
        .await
        .unwrap();
    container
        .banking()
        .register_account(UserId::new("buyer-2"), "acct-b2", AccountKind::Personal);

    // First accept reserves 50, leaving 50 public; the second offer
    // needs 60.
    container
        .negotiation()
        .accept_offer(first.id(), &seller())
        .await
        .unwrap();
    let result = container
        .negotiation()
        .accept_offer(second.id(), &seller())
        .await;
    assert!(matches!(result, Err(e) if e.kind() == ErrorKind::Conflict));
}

// =============================================================================
// Missing settlement account
// =============================================================================

#[tokio::test]
async fn accept_fails_fast_without_seller_account() {
    let container = InMemoryContainer::in_memory();
    container
        .banking()
        .register_account(buyer(), "acct-buyer", AccountKind::Personal);

    let mut entry = PortfolioEntry::new(seller(), symbol(), ShareCount::new(100), Money::from_units(50));
    entry.make_public(ShareCount::new(100)).unwrap();
    container.portfolios().save(&entry).await.unwrap();

    let offer = container
        .negotiation()
        .create_offer(entry.id(), buyer(), terms())
        .await
        .unwrap();

    let result = container
        .negotiation()
        .accept_offer(offer.id(), &seller())
        .await;
    assert!(matches!(result, Err(EngineError::AccountNotFound { .. })));

    // Nothing was reserved and no payment left the building.
    let entry = seller_entry(&container).await;
    assert_eq!(entry.reserved_amount(), ShareCount::ZERO);
    assert!(container.banking().executed().is_empty());
}

#[tokio::test]
async fn missing_accounts_diagnose_the_seller_first() {
    let container = InMemoryContainer::in_memory();

    let mut entry = PortfolioEntry::new(
        seller(),
        symbol(),
        ShareCount::new(100),
        Money::from_units(50),
    );
    entry.make_public(ShareCount::new(100)).unwrap();
    container.portfolios().save(&entry).await.unwrap();

    let offer = container
        .negotiation()
        .create_offer(entry.id(), buyer(), terms())
        .await
        .unwrap();

    // Neither party is banked; the seller's account is the one named.
    let result = container
        .negotiation()
        .accept_offer(offer.id(), &seller())
        .await;
    assert!(
        matches!(&result, Err(EngineError::AccountNotFound { user_id }) if user_id == "seller-1")
    );
}
