//! Auction lifecycle integration tests.
//!
//! Exercise the engine across whole auction rounds: listing, start gating,
//! price decay, partial fills, clearing, reciprocal auctions, and index
//! advancement over multiple rounds.

use std::sync::Arc;

use opendutch_auction::{AuctionEngine, AuctionState, CurrentPrice};
use opendutch_ledger::{ApprovalRegistry, TokenLedger};
use opendutch_types::{
    AccountId, AuctionIndex, Clock, ExchangeConfig, Fraction, OpendutchError, SimClock, Timestamp,
    TokenPair,
};

const T0: Timestamp = 1_700_000_000;
const ETHER: u128 = 1_000_000_000_000_000_000;

fn acct(n: u8) -> AccountId {
    AccountId::from_bytes([n; 16])
}

struct Harness {
    clock: SimClock,
    ledger: TokenLedger,
    approvals: ApprovalRegistry,
    engine: AuctionEngine,
}

impl Harness {
    fn new() -> Self {
        let clock = SimClock::new(T0);
        let owner = acct(0);
        let mut approvals = ApprovalRegistry::new(owner);
        for token in ["ETH", "GNO", "RDN"] {
            approvals.update_approval_of_token(owner, token, true).unwrap();
        }
        let config = ExchangeConfig {
            threshold_new_token_pair: 1_000,
            threshold_new_auction: 1_000,
            ..ExchangeConfig::default()
        };
        let engine = AuctionEngine::new(config, Arc::new(clock.clone()));
        Self {
            clock,
            ledger: TokenLedger::new(),
            approvals,
            engine,
        }
    }

    fn fund(&mut self, account: AccountId, token: &str, amount: u128) {
        self.ledger.deposit(account, token, amount).unwrap();
    }

    /// Jump to the exact scheduled start of the current auction.
    fn start_current_auction(&mut self, pair: &TokenPair) {
        let start = self
            .engine
            .auction_start(pair)
            .unwrap()
            .expect("auction must be scheduled");
        self.clock.set(start);
    }
}

fn eth_gno() -> TokenPair {
    TokenPair::new("ETH", "GNO")
}

#[test]
fn full_round_with_both_directions_funded() {
    let mut h = Harness::new();
    let seller = acct(1);
    let buyer1 = acct(2);
    let buyer2 = acct(3);
    h.fund(seller, "ETH", 100 * ETHER);
    h.fund(seller, "GNO", 100 * ETHER);
    h.fund(buyer1, "GNO", 1_000 * ETHER);
    h.fund(buyer2, "ETH", 1_000 * ETHER);

    // 10 ETH forward, 20 GNO reverse, seeded at 2 GNO per ETH
    h.engine
        .add_token_pair(
            &mut h.ledger,
            &h.approvals,
            seller,
            "ETH",
            "GNO",
            10 * ETHER,
            20 * ETHER,
            Fraction::new(2, 1),
        )
        .unwrap();
    let fwd = eth_gno();
    let rev = fwd.flipped();
    assert_eq!(
        h.engine.sell_volume_current(&fwd).unwrap(),
        9_950_000_000_000_000_000u128
    );
    assert_eq!(
        h.engine.sell_volume_current(&rev).unwrap(),
        19_900_000_000_000_000_000u128
    );

    // both directions run on the same schedule
    h.start_current_auction(&fwd);
    assert_eq!(
        h.engine.auction_state(&fwd, AuctionIndex::FIRST).unwrap(),
        AuctionState::Running
    );
    assert_eq!(
        h.engine.auction_state(&rev, AuctionIndex::FIRST).unwrap(),
        AuctionState::Running
    );
    // forward opens at 4:1, reverse at the inverse seed doubled: 1:1
    assert_eq!(
        h.engine.current_price(&fwd, AuctionIndex::FIRST).unwrap(),
        CurrentPrice::Running(Fraction::new(4, 1))
    );
    assert_eq!(
        h.engine.current_price(&rev, AuctionIndex::FIRST).unwrap(),
        CurrentPrice::Running(Fraction::new(1, 1))
    );

    // clear the forward direction: 9.95 ETH at 4:1 need 39.8 GNO
    let out = h
        .engine
        .post_buy_order(&mut h.ledger, buyer1, &fwd, AuctionIndex::FIRST, 50 * ETHER)
        .unwrap();
    assert_eq!(out.accepted, 39_800_000_000_000_000_000u128);
    assert!(out.cleared);

    // one side cleared, the index holds until the reciprocal clears
    assert_eq!(h.engine.auction_index(&fwd).unwrap(), AuctionIndex::FIRST);
    assert_eq!(
        h.engine.auction_state(&fwd, AuctionIndex::FIRST).unwrap(),
        AuctionState::Cleared
    );
    assert_eq!(
        h.engine.auction_state(&rev, AuctionIndex::FIRST).unwrap(),
        AuctionState::Running
    );

    // clear the reverse: 19.9 GNO at 1:1 need 19.9 ETH
    let out = h
        .engine
        .post_buy_order(&mut h.ledger, buyer2, &rev, AuctionIndex::FIRST, 30 * ETHER)
        .unwrap();
    assert_eq!(out.accepted, 19_900_000_000_000_000_000u128);
    assert!(out.cleared);

    assert_eq!(h.engine.auction_index(&fwd).unwrap(), AuctionIndex(2));
    assert_eq!(
        h.engine.closing_price(&fwd, AuctionIndex::FIRST).unwrap(),
        Some(Fraction::new(4, 1))
    );
    assert_eq!(
        h.engine.closing_price(&rev, AuctionIndex::FIRST).unwrap(),
        Some(Fraction::new(1, 1))
    );
}

#[test]
fn second_round_decays_from_first_closing_price() {
    let mut h = Harness::new();
    let seller = acct(1);
    let buyer = acct(2);
    h.fund(seller, "ETH", 1_000 * ETHER);
    h.fund(buyer, "GNO", 10_000 * ETHER);

    h.engine
        .add_token_pair(
            &mut h.ledger,
            &h.approvals,
            seller,
            "ETH",
            "GNO",
            100 * ETHER,
            0,
            Fraction::new(2, 1),
        )
        .unwrap();
    let pair = eth_gno();
    h.start_current_auction(&pair);

    // queue funding for round 2, then clear round 1 at the 4:1 opening
    h.engine
        .post_sell_order(&mut h.ledger, seller, &pair, AuctionIndex::SEED, 100 * ETHER)
        .unwrap();
    h.engine
        .post_buy_order(&mut h.ledger, buyer, &pair, AuctionIndex::FIRST, 398 * ETHER)
        .unwrap();
    assert_eq!(h.engine.auction_index(&pair).unwrap(), AuctionIndex(2));

    // round 2 opens at twice the 4:1 closing price of round 1
    h.start_current_auction(&pair);
    assert_eq!(
        h.engine.current_price(&pair, AuctionIndex(2)).unwrap(),
        CurrentPrice::Running(Fraction::new(8, 1))
    );
    // and still serves the frozen price for round 1
    assert_eq!(
        h.engine.current_price(&pair, AuctionIndex::FIRST).unwrap(),
        CurrentPrice::Cleared(Fraction::new(4, 1))
    );
}

#[test]
fn price_decay_waypoints() {
    let mut h = Harness::new();
    let seller = acct(1);
    h.fund(seller, "ETH", 1_000 * ETHER);
    h.engine
        .add_token_pair(
            &mut h.ledger,
            &h.approvals,
            seller,
            "ETH",
            "GNO",
            100 * ETHER,
            0,
            Fraction::new(2, 1),
        )
        .unwrap();
    let pair = eth_gno();
    h.start_current_auction(&pair);

    let waypoints: [(i64, Fraction); 4] = [
        (0, Fraction::new(4, 1)),
        (8_640, Fraction::new(3, 1)),
        (21_600, Fraction::new(2, 1)),
        (43_200, Fraction::new(1, 1)),
    ];
    let start = h.clock.now();
    for (elapsed, expected) in waypoints {
        h.clock.set(start + elapsed);
        assert_eq!(
            h.engine.current_price(&pair, AuctionIndex::FIRST).unwrap(),
            CurrentPrice::Running(expected),
            "at t+{elapsed}"
        );
    }
}

#[test]
fn unstarted_and_future_auctions_report_sentinels() {
    let mut h = Harness::new();
    let seller = acct(1);
    h.fund(seller, "ETH", 1_000 * ETHER);
    h.engine
        .add_token_pair(
            &mut h.ledger,
            &h.approvals,
            seller,
            "ETH",
            "GNO",
            100 * ETHER,
            0,
            Fraction::new(2, 1),
        )
        .unwrap();
    let pair = eth_gno();

    assert_eq!(
        h.engine.current_price(&pair, AuctionIndex::FIRST).unwrap(),
        CurrentPrice::NotStarted
    );
    assert_eq!(
        h.engine.current_price(&pair, AuctionIndex(2)).unwrap(),
        CurrentPrice::NotStarted
    );
    let err = h
        .engine
        .current_price(&pair, AuctionIndex(3))
        .unwrap_err();
    assert!(matches!(err, OpendutchError::AuctionNotFound { .. }));
    // the seed index carries the seeded price
    assert_eq!(
        h.engine.current_price(&pair, AuctionIndex::SEED).unwrap(),
        CurrentPrice::Cleared(Fraction::new(2, 1))
    );
}

#[test]
fn unknown_pair_is_rejected_everywhere() {
    let mut h = Harness::new();
    let nobody = acct(9);
    let pair = eth_gno();

    assert!(matches!(
        h.engine.auction_index(&pair).unwrap_err(),
        OpendutchError::PairNotListed(_)
    ));
    assert!(matches!(
        h.engine
            .post_sell_order(&mut h.ledger, nobody, &pair, AuctionIndex::SEED, ETHER)
            .unwrap_err(),
        OpendutchError::PairNotListed(_)
    ));
    assert!(matches!(
        h.engine
            .post_buy_order(&mut h.ledger, nobody, &pair, AuctionIndex::SEED, ETHER)
            .unwrap_err(),
        OpendutchError::PairNotListed(_)
    ));
}

#[test]
fn fee_and_ledger_supply_conservation() {
    let mut h = Harness::new();
    let seller = acct(1);
    let buyer = acct(2);
    h.fund(seller, "ETH", 1_000 * ETHER);
    h.fund(buyer, "GNO", 1_000 * ETHER);

    h.engine
        .add_token_pair(
            &mut h.ledger,
            &h.approvals,
            seller,
            "ETH",
            "GNO",
            100 * ETHER,
            0,
            Fraction::new(2, 1),
        )
        .unwrap();
    let pair = eth_gno();
    h.start_current_auction(&pair);
    h.engine
        .post_sell_order(&mut h.ledger, seller, &pair, AuctionIndex(2), 40 * ETHER)
        .unwrap();

    // ETH leaves the ledger only into sell volumes and fees
    let in_ledger = h.ledger.total_supply("ETH");
    let in_auctions = h.engine.sell_volume_current(&pair).unwrap()
        + h.engine.sell_volume_next(&pair).unwrap();
    let fees = h.engine.collected_fees("ETH");
    assert_eq!(in_ledger + in_auctions + fees, 1_000 * ETHER);
    assert_eq!(fees, 700_000_000_000_000_000u128); // 0.5% of 140
}
