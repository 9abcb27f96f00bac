#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based state machine tests for the farm.
//!
//! Random sequences of ledger operations are replayed against the contract
//! and a plain model of everyone's stake.
//!
//! Invariants tested:
//! - Every position's stake matches the model after each step
//! - A pool's `total_staked` is always the sum of its positions
//! - Rewards paid plus rewards pending never exceed total emission
//! - Failed operations leave stakes untouched

use farm::decay::DecayParameters;
use farm::{ContractError, FarmContract, FarmContractClient};
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{vec, Address, Env};

const START: u64 = 1_000;
const USERS: usize = 3;
const POOLS: u32 = 2;
const BALANCE: i128 = 1_000_000;
const RATE: i128 = 1_000;

#[derive(Arbitrary, Clone, Debug)]
enum Op {
    Deposit {
        #[proptest(strategy = "0usize..USERS")]
        user: usize,
        #[proptest(strategy = "0u32..POOLS")]
        pool: u32,
        #[proptest(strategy = "0i128..200_000")]
        amount: i128,
    },
    Withdraw {
        #[proptest(strategy = "0usize..USERS")]
        user: usize,
        #[proptest(strategy = "0u32..POOLS")]
        pool: u32,
        #[proptest(strategy = "0i128..300_000")]
        amount: i128,
    },
    Harvest {
        #[proptest(strategy = "0usize..USERS")]
        user: usize,
        #[proptest(strategy = "0u32..POOLS")]
        pool: u32,
    },
    HarvestAll {
        #[proptest(strategy = "0usize..USERS")]
        user: usize,
    },
    EmergencyWithdraw {
        #[proptest(strategy = "0usize..USERS")]
        user: usize,
        #[proptest(strategy = "0u32..POOLS")]
        pool: u32,
    },
    SetWeight {
        #[proptest(strategy = "0u32..POOLS")]
        pool: u32,
        #[proptest(strategy = "0u64..10")]
        weight: u64,
    },
    Advance {
        #[proptest(strategy = "1u64..500")]
        seconds: u64,
    },
}

struct Harness {
    env: Env,
    client: FarmContractClient<'static>,
    owner: Address,
    reward_token: Address,
    users: std::vec::Vec<Address>,
    staked: [[i128; POOLS as usize]; USERS],
}

impl Harness {
    fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.ledger().set_timestamp(START);

        let reward_token = env
            .register_stellar_asset_contract_v2(Address::generate(&env))
            .address();
        let contract_id = env.register(FarmContract, ());
        let client = FarmContractClient::new(&env, &contract_id);
        let owner = Address::generate(&env);
        client.initialize(
            &owner,
            &reward_token,
            &DecayParameters {
                start_time: START,
                base_rate: RATE,
                decay_factor: 3,
                rate_precision: 4,
                decay_period: 300,
            },
        );
        StellarAssetClient::new(&env, &reward_token).mint(&contract_id, &(i64::MAX as i128));

        let users: std::vec::Vec<Address> = (0..USERS).map(|_| Address::generate(&env)).collect();
        for _ in 0..POOLS {
            let asset = env
                .register_stellar_asset_contract_v2(Address::generate(&env))
                .address();
            client.add_pool(&owner, &asset, &1);
            for user in users.iter() {
                StellarAssetClient::new(&env, &asset).mint(user, &BALANCE);
            }
        }

        Harness {
            env,
            client,
            owner,
            reward_token,
            users,
            staked: [[0; POOLS as usize]; USERS],
        }
    }

    fn apply(&mut self, op: &Op) {
        match *op {
            Op::Deposit { user, pool, amount } => {
                let owner = &self.users[user];
                if amount <= BALANCE - self.staked[user][pool as usize] {
                    self.client.deposit(owner, &pool, &amount);
                    self.staked[user][pool as usize] += amount;
                }
            }
            Op::Withdraw { user, pool, amount } => {
                let owner = &self.users[user];
                let result = self.client.try_withdraw(owner, &pool, &amount);
                if amount > self.staked[user][pool as usize] {
                    assert!(matches!(result, Err(Ok(ContractError::InsufficientStake))));
                } else {
                    assert!(result.is_ok());
                    self.staked[user][pool as usize] -= amount;
                }
            }
            Op::Harvest { user, pool } => {
                self.client.harvest(&self.users[user], &pool);
            }
            Op::HarvestAll { user } => {
                self.client.harvest_many(&self.users[user], &vec![&self.env, 0, 1]);
            }
            Op::EmergencyWithdraw { user, pool } => {
                let returned = self.client.emergency_withdraw(&self.users[user], &pool);
                assert_eq!(returned, self.staked[user][pool as usize]);
                self.staked[user][pool as usize] = 0;
            }
            Op::SetWeight { pool, weight } => {
                self.client.set_weight(&self.owner, &pool, &weight, &true);
            }
            Op::Advance { seconds } => {
                let now = self.env.ledger().timestamp();
                self.env.ledger().set_timestamp(now + seconds);
            }
        }
    }

    fn check(&self) {
        for pool in 0..POOLS {
            let mut sum = 0;
            for (i, user) in self.users.iter().enumerate() {
                let position = self.client.position(user, &pool);
                assert_eq!(position.staked, self.staked[i][pool as usize]);
                sum += position.staked;
            }
            assert_eq!(self.client.pool(&pool).total_staked, sum);
        }

        let token = TokenClient::new(&self.env, &self.reward_token);
        let distributed: i128 = self
            .users
            .iter()
            .map(|u| token.balance(u) + self.client.pending_all(u))
            .sum();
        let elapsed = self.env.ledger().timestamp() - START;
        assert!(distributed <= RATE * elapsed as i128);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any operation sequence keeps stakes consistent and never over-pays.
    #[test]
    fn prop_ledger_matches_model(ops in prop::collection::vec(any::<Op>(), 1..40)) {
        let mut harness = Harness::new();
        for op in ops.iter() {
            harness.apply(op);
            harness.check();
        }
    }
}
