//! E-commerce Order Processing
//!
//! This example drives orders through placement, payment, packing and
//! shipping.
//!
//! Key concepts:
//! - Order states (New -> Placed -> Paid -> Packed -> Shipped)
//! - Exit validation rejecting empty orders
//! - Automatic transition from Paid to Packed
//! - Recovery from a declined card through an error transition
//! - Transactions demarcated through a unit of work
//!
//! Run with: cargo run --example order_processing
//! Set RUST_LOG=statework=debug to see guard evaluation.

use statework::builder::StateMachineBuilder;
use statework::core::{Action, ActionError, Context, LifecycleEvent, ValidationError};
use statework::transaction::{ManagedTransactions, UnitOfWork};
use statework::{event_enum, state_enum, StateMachine};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

state_enum! {
    enum OrderState {
        New,
        Placed,
        Paid,
        Packed,
        Shipped,
        PaymentFailed,
        Closed,
    }
}

event_enum! {
    enum OrderEvent {
        Place,
        Pay,
        Ship,
        Cancel,
    }
}

#[derive(Debug)]
struct Order {
    id: u64,
    state: OrderState,
    items: Vec<String>,
    card: String,
    shipping_address: Option<String>,
}

impl Order {
    fn new(id: u64, items: &[&str], card: &str) -> Self {
        Self {
            id,
            state: OrderState::New,
            items: items.iter().map(|item| item.to_string()).collect(),
            card: card.to_string(),
            shipping_address: Some("12 Harbour Road".to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("card {0} was declined")]
struct CardDeclined(String);

// Stand-in for a database transaction manager
#[derive(Default)]
struct Ledger {
    next: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
}

impl UnitOfWork for Ledger {
    type Transaction = u64;

    fn begin(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn commit(&self, transaction: u64) {
        self.committed.fetch_add(1, Ordering::SeqCst);
        println!("    [ledger] commit #{transaction}");
    }

    fn rollback(&self, transaction: u64) {
        self.rolled_back.fetch_add(1, Ordering::SeqCst);
        println!("    [ledger] rollback #{transaction}");
    }
}

type OrderContext<'a> = Context<'a, OrderState, OrderEvent, Order>;

fn not_empty() -> Action<OrderState, OrderEvent, Order> {
    Action::new(|ctx: &mut OrderContext<'_>| {
        if ctx.subject().items.is_empty() {
            return Err(ValidationError::new("EMPTY_ORDER")
                .with_message("an order needs at least one item")
                .into());
        }
        Ok(())
    })
}

fn charge_card() -> Action<OrderState, OrderEvent, Order> {
    Action::new(|ctx: &mut OrderContext<'_>| {
        let order = ctx.subject();
        if order.card.starts_with("0000") {
            return Err(ActionError::technical(CardDeclined(order.card.clone())));
        }
        println!("    charged card {} for order {}", order.card, order.id);
        Ok(())
    })
}

fn build_machine(
    ledger: Arc<ManagedTransactions<Ledger>>,
) -> Result<StateMachine<OrderState, OrderEvent, Order>, Box<dyn std::error::Error>> {
    let machine = StateMachineBuilder::new(OrderState::New, OrderState::Closed, |o: &Order| o.state)
        .transactions(ledger)
        .states(|s| {
            s.with_id(OrderState::Placed).exit_validator(not_empty()).add()?;
            s.with_id(OrderState::Paid).add()?;
            s.with_id(OrderState::Packed)
                .on_entry_fn(|ctx| {
                    println!("    packing {} item(s)", ctx.subject().items.len());
                    Ok(())
                })
                .add()?;
            s.with_id(OrderState::Shipped).add()?;
            s.with_id(OrderState::PaymentFailed).add()
        })?
        .transitions(|t| {
            t.from_initial()
                .to(OrderState::Placed)
                .on_event(OrderEvent::Place)
                .add()?;
            t.from([OrderState::Placed, OrderState::PaymentFailed])
                .to(OrderState::Paid)
                .on_event(OrderEvent::Pay)
                .action(charge_card())
                .add()?;
            t.from([OrderState::Placed])
                .to(OrderState::PaymentFailed)
                .on_error::<CardDeclined>()
                .add()?;
            t.from([OrderState::Paid]).to(OrderState::Packed).add()?;
            t.from([OrderState::Packed])
                .to(OrderState::Shipped)
                .on_event(OrderEvent::Ship)
                .when(|ctx| ctx.subject().shipping_address.is_some())
                .add()?;
            t.from_all()
                .excluding([OrderState::Shipped])
                .to_final()
                .on_event(OrderEvent::Cancel)
                .add()
        })?
        .lifecycle_actions(|l| {
            l.on(LifecycleEvent::SuccessfulStateChange)
                .execute_fn(|ctx| {
                    if let Some(change) = ctx.state_change().cloned() {
                        println!("    {:?} -> {:?}", change.from, change.to);
                        ctx.subject_mut().state = change.to;
                    }
                    Ok(())
                })
                .add()?;
            l.on(LifecycleEvent::ValidationError)
                .execute_fn(|ctx| {
                    if let Some(rejection) = ctx.validation_error() {
                        println!("    rejected: {rejection}");
                    }
                    Ok(())
                })
                .add()?;
            l.on(LifecycleEvent::UnknownEvent)
                .execute_fn(|ctx| {
                    if let Some(event) = ctx.unknown_event() {
                        println!("    {event:?} is not possible here");
                    }
                    Ok(())
                })
                .add()?;
            l.on(LifecycleEvent::ProcessingError)
                .execute_fn(|ctx| {
                    if let Some(error) = ctx.processing_error() {
                        println!("    unrecoverable in {:?}: {}", error.state, error.message);
                    }
                    Ok(())
                })
                .add()
        })?
        .build()?;
    Ok(machine)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("=== Order Processing ===\n");

    let ledger = Arc::new(ManagedTransactions::new(Ledger::default()));
    let machine = build_machine(Arc::clone(&ledger))?;

    println!("Order 1: happy path");
    let mut order = Order::new(1, &["book", "lamp"], "4111-1111");
    machine.send_event(&OrderEvent::Place, &mut order, None)?;
    machine.send_event(&OrderEvent::Pay, &mut order, None)?;
    machine.send_event(&OrderEvent::Ship, &mut order, None)?;
    println!("  final state: {:?}\n", order.state);

    println!("Order 2: empty order cannot be paid");
    let mut order = Order::new(2, &[], "4111-1111");
    machine.send_event(&OrderEvent::Place, &mut order, None)?;
    machine.send_event(&OrderEvent::Pay, &mut order, None)?;
    println!("  final state: {:?}\n", order.state);

    println!("Order 3: declined card, then a new card");
    let mut order = Order::new(3, &["chair"], "0000-0000");
    machine.send_event(&OrderEvent::Place, &mut order, None)?;
    machine.send_event(&OrderEvent::Pay, &mut order, None)?;
    order.card = "5500-0000".to_string();
    machine.send_event(&OrderEvent::Pay, &mut order, None)?;
    println!("  final state: {:?}\n", order.state);

    println!("Order 4: shipping is not an option before payment, cancel instead");
    let mut order = Order::new(4, &["desk"], "4111-1111");
    machine.send_event(&OrderEvent::Place, &mut order, None)?;
    machine.send_event_by_name("Ship", &mut order, None)?;
    machine.send_event(&OrderEvent::Cancel, &mut order, None)?;
    println!("  final state: {:?}\n", order.state);

    println!(
        "Possible events while packed: {:?}",
        machine.possible_events_for_state(&OrderState::Packed)
    );
    let ledger = ledger.unit_of_work();
    println!(
        "Ledger: {} commits, {} rollbacks",
        ledger.committed.load(Ordering::SeqCst),
        ledger.rolled_back.load(Ordering::SeqCst)
    );

    Ok(())
}
