//! Storage-backed settlement driver.
//!
//! Every record lives under a key from [shared::namespace]. A settlement
//! computes all of its new records first and writes them only once each one
//! has passed its storage range check, so a failed settlement leaves storage
//! exactly as it was.
use crate::prelude::*;
use cw_storage_plus::{Item, Map};
use msg::market::events::{CheckpointEvent, VersionAccumulatedEvent};
use shared::namespace;
use shared::storage::{latest_before_in_monotonic_map, latest_in_monotonic_map, MonotonicMap};

const GLOBAL: Item<Global> = Item::new(namespace::GLOBAL);
const POSITION: Item<Position> = Item::new(namespace::POSITION);
const CONFIG: Item<SettlementConfig> = Item::new(namespace::CONFIG);
const VERSIONS: MonotonicMap<Version> = Map::new(namespace::VERSIONS);
const ORACLE_VERSIONS: MonotonicMap<OracleVersion> = Map::new(namespace::ORACLE_VERSIONS);
const GUARANTEES: MonotonicMap<Guarantee> = Map::new(namespace::GUARANTEES);
const LOCAL_CHECKPOINTS: Map<&str, Checkpoint> = Map::new(namespace::LOCAL_CHECKPOINTS);

/// Everything needed to settle one aggregate order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettlementInput {
    /// Id of the order, one past the last settled id
    pub order_id: u64,
    /// Aggregate order of every account for the period
    pub order: Order,
    /// Aggregate guarantee of every account for the period
    pub guarantee: Guarantee,
    /// Oracle version closing the period
    pub oracle_version: OracleVersion,
    /// Fees charged by the oracle for `oracle_version`
    pub receipt: OracleReceipt,
}

/// A single market on top of some storage.
pub struct Market<'a> {
    storage: &'a mut dyn Storage,
}

impl<'a> Market<'a> {
    /// Wrap the given storage.
    pub fn new(storage: &'a mut dyn Storage) -> Self {
        Market { storage }
    }

    /// Set up an empty market whose first version is `oracle_version`.
    pub fn instantiate(
        &mut self,
        config: &SettlementConfig,
        oracle_version: &OracleVersion,
    ) -> Result<()> {
        if CONFIG.exists(self.storage) {
            bail!("Market is already instantiated");
        }
        config.market.validate()?;
        config.risk.validate()?;

        let version = Version {
            valid: oracle_version.valid,
            price: oracle_version.price,
            ..Version::default()
        };
        let global = Global {
            latest_price: oracle_version.price,
            ..Global::default()
        };
        version.check_storage_range()?;
        global.check_storage_range()?;

        let timestamp = oracle_version.timestamp.as_seconds();
        CONFIG.save(self.storage, config)?;
        GLOBAL.save(self.storage, &global)?;
        POSITION.save(self.storage, &Position::default())?;
        VERSIONS.save(self.storage, timestamp, &version)?;
        ORACLE_VERSIONS.save(self.storage, timestamp, oracle_version)?;
        debug_log!(DebugLog::Storage, "instantiated at {timestamp}");
        Ok(())
    }

    /// Parameters in effect
    pub fn config(&self) -> Result<SettlementConfig> {
        CONFIG
            .may_load(self.storage)?
            .ok_or_else(|| missing("market config"))
    }

    /// Market-wide accumulator state
    pub fn global(&self) -> Result<Global> {
        GLOBAL
            .may_load(self.storage)?
            .ok_or_else(|| missing("global state"))
    }

    /// Aggregate position as of the latest version
    pub fn position(&self) -> Result<Position> {
        POSITION
            .may_load(self.storage)?
            .ok_or_else(|| missing("market position"))
    }

    /// The version accumulated at exactly `timestamp`.
    pub fn version(&self, timestamp: Timestamp) -> Result<Version> {
        VERSIONS
            .may_load(self.storage, timestamp.as_seconds())?
            .ok_or_else(|| missing(&format!("version at {timestamp}")))
    }

    /// The most recent version and its timestamp.
    pub fn latest_version(&self) -> Result<(Timestamp, Version)> {
        latest_in_monotonic_map(self.storage, VERSIONS)?
            .map(|(timestamp, version)| (Timestamp::from_seconds(timestamp), version))
            .ok_or_else(|| missing("latest version"))
    }

    /// The aggregate guarantee settled with the given order id. Orders that
    /// carried no guarantee give an empty one.
    pub fn guarantee(&self, order_id: u64) -> Result<Guarantee> {
        Ok(GUARANTEES
            .may_load(self.storage, order_id)?
            .unwrap_or_default())
    }

    /// The account's checkpoint, if it was ever settled.
    pub fn checkpoint(&self, account: &str) -> Result<Option<Checkpoint>> {
        LOCAL_CHECKPOINTS
            .may_load(self.storage, account)
            .map_err(Into::into)
    }

    /// Settle the next aggregate order and store the resulting version.
    pub fn settle(&mut self, input: &SettlementInput) -> Result<VersionAccumulatedEvent> {
        let config = self.config()?;
        let mut global = self.global()?;
        let position = self.position()?;
        let (from_timestamp, from_version) = self.latest_version()?;
        let mut from_oracle_version = ORACLE_VERSIONS
            .may_load(self.storage, from_timestamp.as_seconds())?
            .ok_or_else(|| missing(&format!("oracle version at {from_timestamp}")))?;
        // An invalid version's price was never used, so the period starts
        // from the last valid one.
        if !from_oracle_version.valid {
            from_oracle_version.price = global.latest_price;
        }

        let to = &input.oracle_version;
        perp_ensure!(
            to.timestamp > from_timestamp,
            PerpError::OutOfOrder {
                what: "oracle version".to_owned(),
                latest: from_timestamp.to_string(),
                received: to.timestamp.to_string(),
            }
        );
        perp_ensure!(
            Some(input.order_id) == global.latest_id.checked_add(1),
            PerpError::OutOfOrder {
                what: "order id".to_owned(),
                latest: global.latest_id.to_string(),
                received: input.order_id.to_string(),
            }
        );
        global.current_id = global.current_id.max(input.order_id);

        let guarantee = input.guarantee.scoped(StorageScope::Global);
        let response = from_version.accumulate(&VersionAccumulationContext {
            global: &global,
            from_position: &position,
            order_id: input.order_id,
            order: &input.order,
            guarantee: &guarantee,
            from_oracle_version: &from_oracle_version,
            to_oracle_version: to,
            to_oracle_receipt: &input.receipt,
            market_parameter: &config.market,
            risk_parameter: &config.risk,
        })?;

        response.version.check_storage_range()?;
        response.global.check_storage_range()?;
        response.to_position.check_storage_range()?;
        guarantee.check_storage_range()?;

        let timestamp = to.timestamp.as_seconds();
        VERSIONS.save(self.storage, timestamp, &response.version)?;
        ORACLE_VERSIONS.save(self.storage, timestamp, to)?;
        GLOBAL.save(self.storage, &response.global)?;
        POSITION.save(self.storage, &response.to_position)?;
        if guarantee != Guarantee::default() {
            GUARANTEES.save(self.storage, input.order_id, &guarantee)?;
        }
        debug_log!(
            DebugLog::Storage,
            "settled order {} at {timestamp}: {:?}",
            input.order_id,
            response.to_position
        );

        Ok(VersionAccumulatedEvent {
            timestamp: to.timestamp,
            order_id: input.order_id,
            valid: to.valid,
            price: to.price,
            result: response.result,
        })
    }

    /// Settle one account's order against the version at `timestamp`.
    ///
    /// An account settling again after sitting out some versions first
    /// accrues its unchanged position up to the version before `timestamp`.
    /// The emitted collateral includes that accrual.
    pub fn settle_account(
        &mut self,
        account: &str,
        order: &Order,
        guarantee: &Guarantee,
        timestamp: Timestamp,
    ) -> Result<CheckpointEvent> {
        let to_version = self.version(timestamp)?;
        let (_, from_version) =
            latest_before_in_monotonic_map(self.storage, VERSIONS, timestamp.as_seconds())?
                .ok_or_else(|| missing(&format!("version before {timestamp}")))?;

        let (checkpoint, idle) = match self.checkpoint(account)? {
            None => (Checkpoint::default(), Fixed6::ZERO),
            Some(mut checkpoint) => {
                perp_ensure!(
                    timestamp > checkpoint.timestamp,
                    PerpError::OutOfOrder {
                        what: format!("checkpoint for {account}"),
                        latest: checkpoint.timestamp.to_string(),
                        received: timestamp.to_string(),
                    }
                );
                let settled = self.version(checkpoint.timestamp)?;
                let idle = Checkpoint::accrue_idle(&checkpoint.position, &settled, &from_version)?;
                checkpoint.collateral = checkpoint.collateral.checked_add(idle)?;
                (checkpoint, idle)
            }
        };

        let (checkpoint, mut result) =
            checkpoint.settle(order, guarantee, &from_version, &to_version, timestamp)?;
        result.collateral = result.collateral.checked_add(idle)?;

        checkpoint.check_storage_range()?;
        LOCAL_CHECKPOINTS.save(self.storage, account, &checkpoint)?;
        debug_log!(DebugLog::Storage, "checkpoint {account} at {timestamp}: {checkpoint:?}");

        Ok(CheckpointEvent {
            account: account.to_owned(),
            timestamp,
            result,
        })
    }
}

fn missing(name: &str) -> anyhow::Error {
    perp_anyhow!(PerpError::MissingState {
        name: name.to_owned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::MemoryStorage;

    fn ufx(s: &str) -> UFixed6 {
        s.parse().unwrap()
    }

    fn oracle(timestamp: u64, price: &str) -> OracleVersion {
        OracleVersion {
            timestamp: Timestamp::from_seconds(timestamp),
            price: price.parse().unwrap(),
            valid: true,
        }
    }

    fn error_id(err: &anyhow::Error) -> String {
        PerpError::try_from_anyhow(err)
            .unwrap()
            .get_error_id()
            .into_owned()
    }

    fn instantiated() -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        Market::new(&mut storage)
            .instantiate(&SettlementConfig::default(), &oracle(1000, "123"))
            .unwrap();
        storage
    }

    fn open_order() -> Order {
        Order {
            orders: 2,
            maker_pos: ufx("10"),
            long_pos: ufx("5"),
            ..Order::default()
        }
    }

    fn input(order_id: u64, timestamp: u64, order: Order) -> SettlementInput {
        SettlementInput {
            order_id,
            order,
            oracle_version: oracle(timestamp, "123"),
            receipt: OracleReceipt {
                settlement_fee: ufx("1"),
            },
            ..SettlementInput::default()
        }
    }

    #[test]
    fn instantiate_once() {
        let mut storage = instantiated();
        let mut market = Market::new(&mut storage);
        let (timestamp, version) = market.latest_version().unwrap();
        assert_eq!(timestamp, Timestamp::from_seconds(1000));
        assert!(version.valid);
        assert_eq!(market.global().unwrap().latest_price, "123".parse().unwrap());
        assert_eq!(market.position().unwrap(), Position::default());
        market
            .instantiate(&SettlementConfig::default(), &oracle(2000, "1"))
            .unwrap_err();
    }

    #[test]
    fn uninstantiated() {
        let mut storage = MemoryStorage::new();
        let mut market = Market::new(&mut storage);
        let err = market.settle(&input(1, 2000, Order::default())).unwrap_err();
        assert_eq!(error_id(&err), "missing_state");
    }

    #[test]
    fn settle_in_order() {
        let mut storage = instantiated();
        let mut market = Market::new(&mut storage);
        let event = market.settle(&input(1, 2000, open_order())).unwrap();
        assert_eq!(event.order_id, 1);
        assert_eq!(event.result.settlement_fee, ufx("1"));

        let position = market.position().unwrap();
        assert_eq!(position.maker, ufx("10"));
        assert_eq!(position.long, ufx("5"));
        let global = market.global().unwrap();
        assert_eq!(global.latest_id, 1);
        assert_eq!(global.current_id, 1);
        assert!(market.version(Timestamp::from_seconds(2000)).unwrap().valid);

        let err = market.settle(&input(1, 3000, Order::default())).unwrap_err();
        assert_eq!(error_id(&err), "out_of_order");
        let err = market.settle(&input(3, 3000, Order::default())).unwrap_err();
        assert_eq!(error_id(&err), "out_of_order");
        let err = market.settle(&input(2, 2000, Order::default())).unwrap_err();
        assert_eq!(error_id(&err), "out_of_order");
        assert_eq!(market.global().unwrap(), global);

        market.settle(&input(2, 3000, Order::default())).unwrap();
        assert_eq!(
            market.latest_version().unwrap().0,
            Timestamp::from_seconds(3000)
        );
    }

    #[test]
    fn invalid_version_does_not_move_the_starting_price() {
        let mut storage = instantiated();
        let mut market = Market::new(&mut storage);
        market.settle(&input(1, 2000, open_order())).unwrap();

        let invalid = SettlementInput {
            oracle_version: OracleVersion {
                valid: false,
                ..oracle(3000, "0")
            },
            ..input(2, 3000, Order::default())
        };
        let event = market.settle(&invalid).unwrap();
        assert!(!event.valid);
        assert_eq!(market.global().unwrap().latest_price, "123".parse().unwrap());

        let event = market.settle(&input(3, 4000, Order::default())).unwrap();
        assert_eq!(event.result.pnl_long, Fixed6::ZERO);
        assert_eq!(event.result.pnl_short, Fixed6::ZERO);
        assert_eq!(event.result.pnl_maker, Fixed6::ZERO);
    }

    #[test]
    fn failed_settlement_writes_nothing() {
        let mut storage = instantiated();
        let mut market = Market::new(&mut storage);
        market.settle(&input(1, 2000, open_order())).unwrap();
        let global = market.global().unwrap();
        let position = market.position().unwrap();

        // A price one past the storable range
        let oversized = SettlementInput {
            oracle_version: OracleVersion {
                price: Fixed6::from_raw(1 << 63),
                ..oracle(3000, "0")
            },
            ..input(2, 3000, Order::default())
        };
        let err = market.settle(&oversized).unwrap_err();
        assert_eq!(error_id(&err), "storage_range");
        assert_eq!(market.global().unwrap(), global);
        assert_eq!(market.position().unwrap(), position);
        assert_eq!(
            market.latest_version().unwrap().0,
            Timestamp::from_seconds(2000)
        );
        market
            .version(Timestamp::from_seconds(3000))
            .unwrap_err();

        let guaranteed = SettlementInput {
            guarantee: Guarantee {
                orders: 3,
                ..Guarantee::default()
            },
            ..input(2, 3000, Order::default())
        };
        let err = market.settle(&guaranteed).unwrap_err();
        assert_eq!(error_id(&err), "invalid_guarantee");
        assert_eq!(market.guarantee(2).unwrap(), Guarantee::default());
    }

    #[test]
    fn guarantees_are_stored_without_notional() {
        let mut storage = instantiated();
        let mut market = Market::new(&mut storage);
        let guarantee = Guarantee {
            orders: 1,
            long_pos: ufx("5"),
            notional: "615".parse().unwrap(),
            referral: ufx("0.1"),
            ..Guarantee::default()
        };
        market
            .settle(&SettlementInput {
                guarantee,
                ..input(1, 2000, open_order())
            })
            .unwrap();
        let stored = market.guarantee(1).unwrap();
        assert_eq!(stored.long_pos, ufx("5"));
        assert_eq!(stored.notional, Fixed6::ZERO);
        assert_eq!(stored.referral, UFixed6::zero());
    }

    #[test]
    fn account_settlement() {
        let mut storage = instantiated();
        let mut market = Market::new(&mut storage);
        let taker_order = Order {
            orders: 1,
            long_pos: ufx("5"),
            collateral: "1000".parse().unwrap(),
            ..Order::default()
        };
        market.settle(&input(1, 2000, open_order())).unwrap();
        market.settle(&input(2, 3000, Order::default())).unwrap();
        market.settle(&input(3, 4000, Order::default())).unwrap();

        let at = Timestamp::from_seconds;
        market
            .settle_account("taker", &taker_order, &Guarantee::default(), at(2000))
            .unwrap();
        let opened = market.checkpoint("taker").unwrap().unwrap();
        assert_eq!(opened.position.long, ufx("5"));
        assert_eq!(opened.timestamp, at(2000));

        // Skipping 3000 accrues the same value as settling through it
        let event = market
            .settle_account("taker", &Order::default(), &Guarantee::default(), at(4000))
            .unwrap();
        let accrued = Checkpoint::accrue_idle(
            &opened.position,
            &market.version(at(2000)).unwrap(),
            &market.version(at(4000)).unwrap(),
        )
        .unwrap();
        assert_eq!(event.result.collateral, accrued);
        let settled = market.checkpoint("taker").unwrap().unwrap();
        assert_eq!(
            settled.collateral,
            opened.collateral.checked_add(accrued).unwrap()
        );
        assert_eq!(settled.timestamp, at(4000));

        let err = market
            .settle_account("taker", &Order::default(), &Guarantee::default(), at(3000))
            .unwrap_err();
        assert_eq!(error_id(&err), "out_of_order");
        let err = market
            .settle_account("maker", &Order::default(), &Guarantee::default(), at(5000))
            .unwrap_err();
        assert_eq!(error_id(&err), "missing_state");
        assert_eq!(market.checkpoint("maker").unwrap(), None);
    }
}
