#![no_main]

use arbitrary::Arbitrary;
use farm::decay::DecayParameters;
use farm::facets::{self, Facet};
use farm::router::{CutAction, RouteDiff};
use farm::{FarmContract, FarmContractClient};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::StellarAssetClient,
    vec, Address, Env, Symbol,
};

#[derive(Arbitrary, Debug)]
pub struct Schedule {
    base_rate: u32,
    decay_factor: u32,
    rate_precision: u32,
    decay_period: u16,
}

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    AddPool { weight: u32 },
    SetWeight {
        pool: u8,
        weight: u32,
        accrue_first: bool,
    },
    Deposit { pool: u8, amount: u64 },
    Withdraw { pool: u8, amount: u64 },
    Harvest { pool: u8 },
    EmergencyWithdraw { pool: u8 },
    Advance { seconds: u32 },
    Route {
        selector: u8,
        action: u8,
        facet: u8,
    },
}

fn selector(n: u8) -> Symbol {
    let all = [
        facets::DEPOSIT,
        facets::WITHDRAW,
        facets::HARVEST,
        facets::ADD_POOL,
        facets::PENDING,
        facets::FACETS,
        facets::CUT,
    ];
    all[n as usize % all.len()].clone()
}

fn facet(n: u8) -> Option<Facet> {
    match n % 6 {
        0 => Some(Facet::Cut),
        1 => Some(Facet::Loupe),
        2 => Some(Facet::Ownership),
        3 => Some(Facet::Farm),
        4 => Some(Facet::Halted),
        _ => None,
    }
}

fuzz_target!(|input: (Schedule, Vec<FuzzAction>)| {
    let (schedule, actions) = input;
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(1_000);

    let reward_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let contract_id = env.register(FarmContract, ());
    let client = FarmContractClient::new(&env, &contract_id);
    let owner = Address::generate(&env);

    let decay = DecayParameters {
        start_time: 1_000,
        base_rate: schedule.base_rate as i128,
        decay_factor: schedule.decay_factor as i128,
        rate_precision: schedule.rate_precision as i128,
        decay_period: schedule.decay_period as u64,
    };
    if client.try_initialize(&owner, &reward_token, &decay).is_err() {
        return;
    }
    StellarAssetClient::new(&env, &reward_token).mint(&contract_id, &i128::MAX);

    let user = Address::generate(&env);
    let mut assets = std::vec::Vec::new();

    // Every call goes through try_*: errors are fine, host panics are not.
    for action in actions.into_iter().take(64) {
        match action {
            FuzzAction::AddPool { weight } => {
                let asset = env
                    .register_stellar_asset_contract_v2(Address::generate(&env))
                    .address();
                StellarAssetClient::new(&env, &asset).mint(&user, &(u64::MAX as i128));
                if client.try_add_pool(&owner, &asset, &(weight as u64)).is_ok() {
                    assets.push(asset);
                }
            }
            FuzzAction::SetWeight {
                pool,
                weight,
                accrue_first,
            } => {
                let _ = client.try_set_weight(
                    &owner,
                    &(pool as u32),
                    &(weight as u64),
                    &accrue_first,
                );
            }
            FuzzAction::Deposit { pool, amount } => {
                let _ = client.try_deposit(&user, &(pool as u32), &(amount as i128));
            }
            FuzzAction::Withdraw { pool, amount } => {
                let _ = client.try_withdraw(&user, &(pool as u32), &(amount as i128));
            }
            FuzzAction::Harvest { pool } => {
                let _ = client.try_harvest(&user, &(pool as u32));
            }
            FuzzAction::EmergencyWithdraw { pool } => {
                let _ = client.try_emergency_withdraw(&user, &(pool as u32));
            }
            FuzzAction::Advance { seconds } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now.saturating_add(seconds as u64));
            }
            FuzzAction::Route {
                selector: s,
                action,
                facet: f,
            } => {
                let action = match action % 3 {
                    0 => CutAction::Add,
                    1 => CutAction::Replace,
                    _ => CutAction::Remove,
                };
                let diff = RouteDiff {
                    selector: selector(s),
                    action,
                    facet: facet(f),
                };
                let _ = client.try_cut(&owner, &vec![&env, diff], &None);
            }
        }
    }

    // The pool registry must stay self-consistent whatever happened above.
    if let Ok(Ok(count)) = client.try_pool_count() {
        assert_eq!(count as usize, assets.len());
    }
});
