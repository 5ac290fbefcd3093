use cosmwasm_std::MemoryStorage;
use perps_settlement_engine::prelude::*;
use proptest::prelude::*;

fn position(maker: u64, long: u64, short: u64) -> Position {
    Position {
        maker: UFixed6::from_raw(maker.into()),
        long: UFixed6::from_raw(long.into()),
        short: UFixed6::from_raw(short.into()),
    }
}

/// An order that only closes what the position holds.
fn order_within(position: &Position, opens: [u64; 3], closes: [u8; 3]) -> Order {
    let portion = |size: UFixed6, pct: u8| {
        size.checked_mul_div(
            UFixed6::from(u64::from(pct.min(100))),
            UFixed6::from(100u64),
        )
        .unwrap()
    };
    Order {
        orders: 1,
        maker_pos: UFixed6::from_raw(opens[0].into()),
        long_pos: UFixed6::from_raw(opens[1].into()),
        short_pos: UFixed6::from_raw(opens[2].into()),
        maker_neg: portion(position.maker, closes[0]),
        long_neg: portion(position.long, closes[1]),
        short_neg: portion(position.short, closes[2]),
        ..Order::default()
    }
}

fn reversed(order: &Order) -> Order {
    Order {
        maker_pos: order.maker_neg,
        maker_neg: order.maker_pos,
        long_pos: order.long_neg,
        long_neg: order.long_pos,
        short_pos: order.short_neg,
        short_neg: order.short_pos,
        ..*order
    }
}

fn syn_book(d: [u32; 4], scale: u64) -> SynBook {
    SynBook {
        d0: UFixed6::from_raw(d[0].into()),
        d1: UFixed6::from_raw(d[1].into()),
        d2: UFixed6::from_raw(d[2].into()),
        d3: UFixed6::from_raw(d[3].into()),
        scale: NonZero::new(UFixed6::from(scale)).unwrap(),
    }
}

fn oracle(timestamp: u64, price: u64) -> OracleVersion {
    OracleVersion {
        timestamp: Timestamp::from_seconds(timestamp),
        price: Fixed6::from(price),
        valid: true,
    }
}

fn run_market(orders: &[(u64, u64, u64)]) -> (Global, Position, Version) {
    let mut storage = MemoryStorage::new();
    let mut market = Market::new(&mut storage);
    market
        .instantiate(&SettlementConfig::default(), &oracle(1000, 100))
        .unwrap();
    for (idx, (maker, long, short)) in orders.iter().enumerate() {
        let id = u64::try_from(idx).unwrap() + 1;
        let order = Order {
            orders: 1,
            maker_pos: UFixed6::from_raw((*maker).into()),
            long_pos: UFixed6::from_raw((*long).into()),
            short_pos: UFixed6::from_raw((*short).into()),
            ..Order::default()
        };
        market
            .settle(&SettlementInput {
                order_id: id,
                order,
                oracle_version: oracle(1000 + id * 3600, 100 + id),
                receipt: OracleReceipt {
                    settlement_fee: UFixed6::from_raw(1000),
                },
                ..SettlementInput::default()
            })
            .unwrap();
    }
    (
        market.global().unwrap(),
        market.position().unwrap(),
        market.latest_version().unwrap().1,
    )
}

proptest! {
    #[test]
    fn exposure_is_bounded_and_balanced(
        maker in 0u64..1_000_000_000,
        long in 0u64..1_000_000_000,
        short in 0u64..1_000_000_000,
    ) {
        let position = position(maker, long, short);
        let exposure = position.exposure().unwrap();
        prop_assert!(exposure.maker.abs_unsigned() <= position.maker);
        prop_assert!(!exposure.long.is_negative());
        prop_assert!(exposure.long.abs_unsigned() <= position.long);
        prop_assert!(!exposure.short.is_strictly_positive());
        prop_assert!(exposure.short.abs_unsigned() <= position.short);
        let total = exposure
            .maker
            .checked_add(exposure.long)
            .unwrap()
            .checked_add(exposure.short)
            .unwrap();
        prop_assert_eq!(total, Fixed6::ZERO);
    }

    #[test]
    fn apply_then_reverse(
        sizes in prop::array::uniform3(0u64..1_000_000_000),
        opens in prop::array::uniform3(0u64..1_000_000_000),
        closes in prop::array::uniform3(0u8..=100),
    ) {
        let start = position(sizes[0], sizes[1], sizes[2]);
        let order = order_within(&start, opens, closes);
        let end = start.apply(&order).unwrap();
        prop_assert_eq!(end.apply(&reversed(&order)).unwrap(), start);
    }

    #[test]
    fn book_only_widens_and_spread_is_fully_received(
        sizes in prop::array::uniform3(0u64..100_000_000),
        opens in prop::array::uniform3(0u64..100_000_000),
        closes in prop::array::uniform3(0u8..=100),
        d in prop::array::uniform4(0u32..100_000),
        scale in 1u64..1000,
        price in 1u64..10_000,
    ) {
        let start = position(sizes[0], sizes[1], sizes[2]);
        let order = order_within(&start, opens, closes);
        let result = match_order(&start, &order, &syn_book(d, scale), Fixed6::from(price)).unwrap();

        prop_assert!(result.book.ask >= result.book.midpoint);
        prop_assert!(result.book.midpoint >= result.book.bid);
        for fill in result.fills() {
            let received = fill
                .maker
                .checked_add(fill.long)
                .unwrap()
                .checked_add(fill.short)
                .unwrap();
            prop_assert_eq!(received, fill.spread);
        }
        prop_assert_eq!(
            result.spread_pos.checked_add(result.spread_neg).unwrap(),
            result
                .fills()
                .into_iter()
                .fold(UFixed6::zero(), |total, fill| total.checked_add(fill.spread).unwrap())
        );
    }

    #[test]
    fn settlement_is_deterministic(
        orders in prop::collection::vec(
            (0u64..10_000_000, 0u64..10_000_000, 0u64..10_000_000),
            1..6,
        ),
    ) {
        prop_assert_eq!(run_market(&orders), run_market(&orders));
    }

    #[test]
    fn rejected_settlement_leaves_storage_untouched(
        maker in 0u64..10_000_000,
        long in 0u64..10_000_000,
        short in 0u64..10_000_000,
        over in 1u64..1000,
    ) {
        let mut storage = MemoryStorage::new();
        let mut market = Market::new(&mut storage);
        market
            .instantiate(&SettlementConfig::default(), &oracle(1000, 100))
            .unwrap();
        let order = Order {
            orders: 1,
            maker_pos: UFixed6::from_raw(maker.into()),
            long_pos: UFixed6::from_raw(long.into()),
            short_pos: UFixed6::from_raw(short.into()),
            ..Order::default()
        };
        market
            .settle(&SettlementInput {
                order_id: 1,
                order,
                oracle_version: oracle(4600, 101),
                ..SettlementInput::default()
            })
            .unwrap();
        let before = (
            market.global().unwrap(),
            market.position().unwrap(),
            market.latest_version().unwrap(),
        );

        // Closing more than is held
        let overclose = Order {
            orders: 1,
            short_neg: UFixed6::from_raw((short + over).into()),
            ..Order::default()
        };
        let err = market
            .settle(&SettlementInput {
                order_id: 2,
                order: overclose,
                oracle_version: oracle(8200, 102),
                ..SettlementInput::default()
            })
            .unwrap_err();
        prop_assert_eq!(
            PerpError::try_from_anyhow(&err).unwrap().get_error_id(),
            "invalid_order"
        );
        let after = (
            market.global().unwrap(),
            market.position().unwrap(),
            market.latest_version().unwrap(),
        );
        prop_assert_eq!(before, after);
    }
}
