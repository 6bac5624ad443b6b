use std::sync::Arc;
use anyhow::Context;
use chrono::{Duration, Utc};
use tokio::task::JoinSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use aisle_core::{BookingLedger, FlightQuery};
use aisle_order::{refund_amount, BookingError, BookingOrchestrator};
use aisle_store::app_config::{Config, LedgerBackend};
use aisle_store::{InMemoryBookingLedger, RedisBookingLedger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aisle_sim=debug,aisle_order=debug,aisle_catalog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    let sim = &config.simulation;

    let ledger: Arc<dyn BookingLedger> = match config.ledger.backend {
        LedgerBackend::Memory => Arc::new(InMemoryBookingLedger::new()),
        LedgerBackend::Redis => Arc::new(
            RedisBookingLedger::open(&config.ledger.redis_url).context("Invalid Redis URL")?,
        ),
    };
    tracing::info!(backend = ?config.ledger.backend, "Ledger ready");

    let orchestrator = Arc::new(BookingOrchestrator::new(ledger));
    orchestrator.set_class_priority(config.booking.class_priority.iter().cloned());

    let departure = Utc::now() + Duration::days(sim.days_to_departure);
    let flight = orchestrator.register_flight(
        &sim.flight_id,
        &sim.origin,
        &sim.destination,
        &sim.aircraft,
        departure,
        departure + Duration::hours(sim.flight_hours),
    );
    for class in &sim.fare_classes {
        orchestrator
            .add_fare_class(&flight, &class.name, &class.layout(), class.base_fare)
            .with_context(|| format!("Fare class {} rejected", class.name))?;
    }

    let query = FlightQuery::new(&sim.origin, &sim.destination, departure.date_naive());
    tracing::info!(
        "Search {} -> {} on {} found {} flight(s)",
        sim.origin,
        sim.destination,
        departure.date_naive(),
        orchestrator.search_flights(&query).len()
    );

    // Everybody asks for the cheapest cabin so upgrades kick in once it fills
    let requested = flight.fare_classes().first().cloned().unwrap_or_default();
    let mut tasks = JoinSet::new();
    for n in 0..sim.passengers {
        let orchestrator = Arc::clone(&orchestrator);
        let flight_id = sim.flight_id.clone();
        let fare_class = requested.clone();
        tasks.spawn(async move {
            let passenger_id = format!("PAX{:03}", n);
            orchestrator
                .book_seat(&passenger_id, &flight_id, &fare_class, Utc::now())
                .await
        });
    }

    let mut booked = Vec::new();
    let mut sold_out = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined.context("Booking task panicked")? {
            Ok(record) => booked.push(record),
            Err(BookingError::NoSeatAvailable { .. }) => sold_out += 1,
            Err(err) => tracing::warn!(error = %err, "Booking failed"),
        }
    }
    tracing::info!(booked = booked.len(), sold_out, "Booking wave finished");

    if sim.cancel_every > 0 {
        let mut refunded = 0.0;
        for record in booked.iter().step_by(sim.cancel_every) {
            let refund = refund_amount(record);
            orchestrator
                .cancel_booking(record.booking_id, Utc::now())
                .await
                .with_context(|| format!("Cancelling {}", record.booking_id))?;
            refunded += refund;
        }
        tracing::info!(refunded, "Cancellations processed");
    }

    let history = orchestrator.bookings_for_flight(&sim.flight_id).await?;
    let revenue: f64 = history.iter().map(|record| record.price).sum();
    tracing::info!(records = history.len(), revenue, "Ledger totals");

    for summary in flight.inventory_summary() {
        tracing::info!(
            fare_class = %summary.fare_class,
            total = summary.total,
            available = summary.available,
            base_fare = summary.base_fare,
            "Inventory"
        );
    }

    Ok(())
}
