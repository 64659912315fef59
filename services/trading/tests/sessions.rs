//! End-to-end trade session scenarios

use chrono::Utc;
use ledger::{Clock, Ledger};
use rust_decimal::Decimal;
use trading::TradeDesk;
use types::prelude::*;

struct World {
    desk: TradeDesk,
    ledger: Ledger,
    alice: PlayerId,
    bob: PlayerId,
    widget: ItemId,
    gadget: ItemId,
}

fn world() -> World {
    let ledger = Ledger::new();
    let clock = Clock::manual(Utc::now());
    let now = clock.now();
    let alice = ledger.register_player("alice", now).unwrap().player_id;
    let bob = ledger.register_player("bob", now).unwrap().player_id;
    let widget = ledger
        .register_item("Widget", true, true, Decimal::from(10), now)
        .item_id;
    let gadget = ledger
        .register_item("Gadget", true, true, Decimal::from(25), now)
        .item_id;
    let desk = TradeDesk::new(ledger.clone(), clock);
    World {
        desk,
        ledger,
        alice,
        bob,
        widget,
        gadget,
    }
}

impl World {
    fn held(&self, player: PlayerId, item: ItemId) -> u32 {
        self.ledger.read(|s| s.inventory_quantity(player, item))
    }
}

#[test]
fn accepted_trade_settles_both_directions() {
    let w = world();
    w.ledger.deposit(w.alice, w.widget, 5).unwrap();
    w.ledger.deposit(w.bob, w.gadget, 3).unwrap();

    let trade = w.desk.initiate_trade(w.alice, w.bob, None).unwrap();
    w.desk
        .add_item_to_trade(trade.trade_id, w.alice, w.widget, 4)
        .unwrap();
    w.desk
        .add_item_to_trade(trade.trade_id, w.bob, w.gadget, 3)
        .unwrap();

    let details = w.desk.accept_trade(trade.trade_id, w.bob).unwrap();
    assert_eq!(details.status, TradeStatus::Completed);
    assert!(details.completed_at.is_some());

    assert_eq!(w.held(w.alice, w.widget), 1);
    assert_eq!(w.held(w.bob, w.widget), 4);
    assert_eq!(w.held(w.alice, w.gadget), 3);
    // Bob's gadget holding drained to zero and was removed
    assert_eq!(w.held(w.bob, w.gadget), 0);
    assert!(w
        .ledger
        .read(|s| s.inventory_of(w.bob).iter().all(|h| h.item_id != w.gadget)));
}

#[test]
fn declined_trade_moves_nothing() {
    let w = world();
    w.ledger.deposit(w.alice, w.widget, 2).unwrap();

    let trade = w.desk.initiate_trade(w.alice, w.bob, None).unwrap();
    w.desk
        .add_item_to_trade(trade.trade_id, w.alice, w.widget, 2)
        .unwrap();

    let details = w.desk.decline_trade(trade.trade_id, w.bob).unwrap();
    assert_eq!(details.status, TradeStatus::Declined);

    // Inventories are untouched on either side
    assert_eq!(w.held(w.alice, w.widget), 2);
    assert_eq!(w.held(w.bob, w.widget), 0);
}

#[test]
fn acceptance_revalidates_holdings() {
    let w = world();
    let carol = w
        .ledger
        .register_player("carol", Utc::now())
        .unwrap()
        .player_id;
    w.ledger.deposit(w.alice, w.widget, 2).unwrap();

    let trade = w.desk.initiate_trade(w.alice, w.bob, None).unwrap();
    w.desk
        .add_item_to_trade(trade.trade_id, w.alice, w.widget, 2)
        .unwrap();

    // Alice spends the promised widgets elsewhere before bob accepts
    w.ledger
        .write(|s| s.transfer_items(w.alice, carol, w.widget, 2))
        .unwrap();

    let err = w.desk.accept_trade(trade.trade_id, w.bob).unwrap_err();
    assert_eq!(
        err,
        MarketError::InsufficientItems(InsufficientItems {
            item: "Widget".to_string(),
            needed: 2,
            available: 0,
        })
    );

    // The trade stays pending and nothing was transferred
    let details = w.desk.get_trade_details(trade.trade_id).unwrap();
    assert_eq!(details.status, TradeStatus::Pending);
    assert_eq!(w.held(w.bob, w.widget), 0);
}

#[test]
fn partial_shortfall_settles_nothing() {
    let w = world();
    let carol = w
        .ledger
        .register_player("carol", Utc::now())
        .unwrap()
        .player_id;
    w.ledger.deposit(w.alice, w.widget, 2).unwrap();
    w.ledger.deposit(w.bob, w.gadget, 3).unwrap();

    let trade = w.desk.initiate_trade(w.alice, w.bob, None).unwrap();
    w.desk
        .add_item_to_trade(trade.trade_id, w.alice, w.widget, 2)
        .unwrap();
    w.desk
        .add_item_to_trade(trade.trade_id, w.bob, w.gadget, 3)
        .unwrap();

    // Only alice's side goes short
    w.ledger
        .write(|s| s.transfer_items(w.alice, carol, w.widget, 1))
        .unwrap();

    assert!(w.desk.accept_trade(trade.trade_id, w.bob).is_err());

    // Bob's covered side did not move either
    assert_eq!(w.held(w.bob, w.gadget), 3);
    assert_eq!(w.held(w.alice, w.gadget), 0);
}

#[test]
fn settled_trades_reject_further_actions() {
    let w = world();
    w.ledger.deposit(w.alice, w.widget, 2).unwrap();

    let trade = w.desk.initiate_trade(w.alice, w.bob, None).unwrap();
    w.desk
        .add_item_to_trade(trade.trade_id, w.alice, w.widget, 2)
        .unwrap();
    w.desk.accept_trade(trade.trade_id, w.bob).unwrap();

    // Completed is terminal for every mutating action
    let err = w.desk.accept_trade(trade.trade_id, w.bob).unwrap_err();
    assert_eq!(err, MarketError::InvalidTrade(TradeError::NotPending));
    let err = w.desk.decline_trade(trade.trade_id, w.alice).unwrap_err();
    assert_eq!(err, MarketError::InvalidTrade(TradeError::NotPending));
    let err = w
        .desk
        .add_item_to_trade(trade.trade_id, w.alice, w.widget, 1)
        .unwrap_err();
    assert_eq!(err, MarketError::InvalidTrade(TradeError::NotPending));

    // Declined is terminal too
    let second = w.desk.initiate_trade(w.alice, w.bob, None).unwrap();
    w.desk.decline_trade(second.trade_id, w.alice).unwrap();
    let err = w.desk.accept_trade(second.trade_id, w.bob).unwrap_err();
    assert_eq!(err, MarketError::InvalidTrade(TradeError::NotPending));
}

#[test]
fn audit_trail_covers_session_lifecycle() {
    let w = world();
    w.ledger.deposit(w.alice, w.widget, 2).unwrap();

    let trade = w.desk.initiate_trade(w.alice, w.bob, None).unwrap();
    w.desk
        .add_item_to_trade(trade.trade_id, w.alice, w.widget, 2)
        .unwrap();
    w.desk.accept_trade(trade.trade_id, w.bob).unwrap();

    let log = w.ledger.audit_log();
    let actions: Vec<AuditAction> = log.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::TradeInitiated,
            AuditAction::ItemAddedToTrade,
            AuditAction::TradeAccepted,
        ]
    );
    assert!(log.iter().all(|e| e.trade_id == Some(trade.trade_id)));
    assert!(log[1].details.contains("2 Widget"));
}
