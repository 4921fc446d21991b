//! End-to-end walkthrough against the seed menu: price a crepe, submit the
//! ticket, then watch the kitchen coordinator take the order through its
//! lifecycle. Run with `RUST_LOG=debug` for the full trace.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use dulce_core::order::OrderMode;
use dulce_core::pricing::{evaluate, PricingDescriptor};
use dulce_core::selection::SelectionSet;
use dulce_core::ticket::{Ticket, TicketLineItem};
use dulce_core::MenuItem;
use dulce_orders::{lifecycle, OrdersConfig, SubmissionCoordinator};
use dulce_store::{sample_catalog, OrderStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let catalog = sample_catalog()?;
    let store = Arc::new(OrderStore::new());

    // ---- Register side: build a two-base crepe with an $8 topping --------

    let group = catalog
        .group("build_your_own_crepe")
        .ok_or("seed catalog is missing the crepe builder")?;
    let descriptor =
        PricingDescriptor::from_group(group).ok_or("crepe builder is not customizable")?;
    let rule = catalog.rule_for(group);

    let mut selection = SelectionSet::new();
    for id in ["nutella", "banana", "ice_cream"] {
        let modifier = catalog
            .modifier(id)
            .ok_or_else(|| format!("seed catalog is missing modifier '{id}'"))?;
        selection = selection.toggle(modifier, false);
    }

    let quote = evaluate(&descriptor, rule, &selection);
    info!(price = %quote.price, valid = quote.valid, reason = %quote.reason, "crepe quoted");

    let mut ticket = Ticket::new();
    ticket.push(TicketLineItem::custom(group, &selection, &quote)?);

    if let Some(MenuItem::Fixed(brownie)) = catalog.item("brownie") {
        ticket.push(TicketLineItem::fixed(brownie));
    }
    info!(lines = ticket.len(), total = %ticket.total(), "ticket built");

    // ---- Submit and drive the kitchen ------------------------------------

    let config = OrdersConfig {
        ready_autocomplete_delay: Duration::from_secs(2),
        archive_grace: Duration::from_secs(5),
        reconcile_interval: Duration::from_secs(1),
        ..OrdersConfig::default()
    };

    let (kitchen, join) = lifecycle::spawn(store.clone(), config.clone())?;
    let register = SubmissionCoordinator::new(store, &config);
    let order = register.submit(&mut ticket, OrderMode::TakeOut)?;
    info!(number = order.order_number, "order on the board");

    tokio::time::sleep(Duration::from_millis(100)).await;
    for number in kitchen.take_alerts().await? {
        info!(number, "ding! new order");
    }

    kitchen.start_preparing(&order.id).await?;
    kitchen.mark_ready(&order.id).await?;
    info!("order marked ready, waiting for auto-complete");

    tokio::time::sleep(config.ready_autocomplete_delay + Duration::from_secs(1)).await;
    let board = kitchen.snapshot().await?;
    info!(cards = board.cards.len(), connected = board.connected, "final board");

    kitchen.shutdown().await?;
    join.await?;
    Ok(())
}
