extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Ledger as _},
    token::StellarAssetClient,
    vec, Address, Env, Symbol, Vec,
};

use crate::decay::DecayParameters;
use crate::facets::{self, Facet};
use crate::migrations::Initializer;
use crate::router::{CutAction, RouteDiff};
use crate::{ContractError, FarmContract, FarmContractClient};

const START: u64 = 1_000;

fn emission(base_rate: i128) -> DecayParameters {
    DecayParameters {
        start_time: START,
        base_rate,
        decay_factor: 1,
        rate_precision: 1,
        decay_period: 10,
    }
}

/// Initialised farm with one pool (weight 1) and a user holding 10_000 of
/// its deposit asset.
fn setup(
    decay: DecayParameters,
) -> (
    Env,
    FarmContractClient<'static>,
    Address, // owner
    Address, // user
) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START);

    let reward_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let asset = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let contract_id = env.register(FarmContract, ());
    let client = FarmContractClient::new(&env, &contract_id);

    let owner = Address::generate(&env);
    client.initialize(&owner, &reward_token, &decay);
    client.add_pool(&owner, &asset, &1);

    StellarAssetClient::new(&env, &reward_token).mint(&contract_id, &1_000_000_000);
    let user = Address::generate(&env);
    StellarAssetClient::new(&env, &asset).mint(&user, &10_000);

    (env, client, owner, user)
}

fn diff(selector: Symbol, action: CutAction, facet: Option<Facet>) -> RouteDiff {
    RouteDiff {
        selector,
        action,
        facet,
    }
}

fn assert_err<T: core::fmt::Debug, E: core::fmt::Debug>(
    result: Result<T, Result<ContractError, E>>,
    expected: ContractError,
) {
    match result {
        Err(Ok(e)) => assert_eq!(e, expected),
        other => unreachable!("Expected {:?}, got {:?}", expected, other),
    }
}

fn advance(env: &Env, seconds: u64) {
    let now = env.ledger().timestamp();
    env.ledger().set_timestamp(now + seconds);
}

// ── Loupe ─────────────────────────────────────────────────────────────────────

#[test]
fn test_genesis_routes() {
    let (env, client, _, _) = setup(emission(100));

    let groups = client.facets();
    assert_eq!(groups.len(), 4);
    let total: u32 = groups.iter().map(|g| g.selectors.len()).sum();
    assert_eq!(total, 1 + 3 + 5 + 20);

    assert_eq!(client.facet_selectors(&Facet::Cut), vec![&env, facets::CUT]);
    assert_eq!(client.facet_selectors(&Facet::Ownership).len(), 5);
    assert_eq!(client.facet_selectors(&Facet::Farm).len(), 20);
    assert_eq!(client.facet_selectors(&Facet::Halted).len(), 0);

    assert_eq!(client.facet_of(&facets::DEPOSIT), Some(Facet::Farm));
    assert_eq!(client.facet_of(&facets::FACETS), Some(Facet::Loupe));
    assert_eq!(client.facet_of(&symbol_short!("nope")), None);
}

// ── Route changes ─────────────────────────────────────────────────────────────

#[test]
fn test_halting_and_resuming_deposits() {
    let (env, client, owner, user) = setup(emission(100));
    client.deposit(&user, &0, &1_000);

    client.cut(
        &owner,
        &vec![&env, diff(facets::DEPOSIT, CutAction::Replace, Some(Facet::Halted))],
        &None,
    );
    assert_eq!(client.facet_of(&facets::DEPOSIT), Some(Facet::Halted));
    assert_err(client.try_deposit(&user, &0, &1), ContractError::Halted);

    // Other farm operations keep working while deposits are halted.
    advance(&env, 10);
    assert_eq!(client.pending_reward(&user, &0), 1_000);
    assert_eq!(client.withdraw(&user, &0, &500), 1_000);

    client.cut(
        &owner,
        &vec![&env, diff(facets::DEPOSIT, CutAction::Replace, Some(Facet::Farm))],
        &None,
    );
    client.deposit(&user, &0, &500);
    assert_eq!(client.position(&user, &0).staked, 1_000);
}

#[test]
fn test_removed_selector_is_not_found() {
    let (env, client, owner, user) = setup(emission(100));

    client.cut(
        &owner,
        &vec![&env, diff(facets::HARVEST, CutAction::Remove, None)],
        &None,
    );
    assert_eq!(client.facet_of(&facets::HARVEST), None);
    assert_err(client.try_harvest(&user, &0), ContractError::FunctionNotFound);

    client.cut(
        &owner,
        &vec![&env, diff(facets::HARVEST, CutAction::Add, Some(Facet::Farm))],
        &None,
    );
    assert_eq!(client.harvest(&user, &0), 0);
}

#[test]
fn test_conflicting_diffs_are_rejected() {
    let (env, client, owner, _) = setup(emission(100));

    let conflicts = [
        // Already routed.
        diff(facets::DEPOSIT, CutAction::Add, Some(Facet::Farm)),
        // Same facet as before.
        diff(facets::DEPOSIT, CutAction::Replace, Some(Facet::Farm)),
        // Halted only stands in for state-changing farm operations.
        diff(facets::PENDING, CutAction::Replace, Some(Facet::Halted)),
        // Cut cannot serve a loupe selector.
        diff(facets::FACETS, CutAction::Replace, Some(Facet::Cut)),
        // Unknown selector.
        diff(symbol_short!("bogus"), CutAction::Replace, Some(Facet::Farm)),
        // Remove takes no target.
        diff(facets::DEPOSIT, CutAction::Remove, Some(Facet::Farm)),
        // Missing target.
        diff(facets::DEPOSIT, CutAction::Replace, None),
    ];
    for conflict in conflicts.iter() {
        assert_err(
            client.try_cut(&owner, &vec![&env, conflict.clone()], &None),
            ContractError::RouteConflict,
        );
    }

    client.cut(
        &owner,
        &vec![&env, diff(facets::POOL, CutAction::Remove, None)],
        &None,
    );
    assert_err(
        client.try_cut(
            &owner,
            &vec![&env, diff(facets::POOL, CutAction::Remove, None)],
            &None,
        ),
        ContractError::RouteConflict,
    );
    assert_err(
        client.try_cut(
            &owner,
            &vec![&env, diff(facets::POOL, CutAction::Replace, Some(Facet::Farm))],
            &None,
        ),
        ContractError::RouteConflict,
    );
}

#[test]
fn test_failed_batch_changes_nothing() {
    let (env, client, owner, _) = setup(emission(100));
    let before = client.facets();

    let batch = vec![
        &env,
        diff(facets::PENDING, CutAction::Remove, None),
        diff(facets::DEPOSIT, CutAction::Replace, Some(Facet::Halted)),
        diff(facets::WITHDRAW, CutAction::Add, Some(Facet::Farm)),
    ];
    assert_err(client.try_cut(&owner, &batch, &None), ContractError::RouteConflict);

    assert_eq!(client.facets(), before);
    assert_eq!(client.facet_of(&facets::PENDING), Some(Facet::Farm));
    assert_eq!(client.facet_of(&facets::DEPOSIT), Some(Facet::Farm));
}

#[test]
fn test_empty_cut_is_rejected() {
    let (env, client, owner, _) = setup(emission(100));
    assert_err(
        client.try_cut(&owner, &Vec::new(&env), &None),
        ContractError::InvalidInput,
    );
}

#[test]
fn test_removing_cut_freezes_the_table() {
    let (env, client, owner, _) = setup(emission(100));

    client.cut(
        &owner,
        &vec![&env, diff(facets::CUT, CutAction::Remove, None)],
        &None,
    );
    assert_err(
        client.try_cut(
            &owner,
            &vec![&env, diff(facets::CUT, CutAction::Add, Some(Facet::Cut))],
            &None,
        ),
        ContractError::FunctionNotFound,
    );
}

// ── Initializers ──────────────────────────────────────────────────────────────

#[test]
fn test_failed_initializer_reverts_route_changes() {
    let (env, client, owner, _) = setup(emission(100));

    assert_err(
        client.try_cut(
            &owner,
            &vec![&env, diff(facets::DEPOSIT, CutAction::Replace, Some(Facet::Halted))],
            &Some(Initializer::BumpLayout(1)),
        ),
        ContractError::InvalidInput,
    );
    assert_eq!(client.facet_of(&facets::DEPOSIT), Some(Facet::Farm));
    assert_eq!(client.layout_version(), 1);
}

#[test]
fn test_bump_layout() {
    let (env, client, owner, _) = setup(emission(100));

    client.cut(&owner, &Vec::new(&env), &Some(Initializer::BumpLayout(2)));
    assert_eq!(client.layout_version(), 2);

    assert_err(
        client.try_cut(&owner, &Vec::new(&env), &Some(Initializer::BumpLayout(2))),
        ContractError::InvalidInput,
    );
}

#[test]
fn test_migrate_decay_settles_under_the_old_schedule() {
    let (env, client, owner, user) = setup(emission(100));
    client.deposit(&user, &0, &1_000);
    advance(&env, 10);

    client.cut(
        &owner,
        &Vec::new(&env),
        &Some(Initializer::MigrateDecay(emission(10))),
    );
    assert_eq!(client.decay_params(), emission(10));
    assert_eq!(client.current_rate(), 10);
    assert_eq!(client.pending_reward(&user, &0), 1_000);

    advance(&env, 10);
    assert_eq!(client.pending_reward(&user, &0), 1_000 + 100);
}

#[test]
fn test_migrate_decay_rejects_bad_parameters() {
    let (env, client, owner, _) = setup(emission(100));
    let mut bad = emission(10);
    bad.decay_period = 0;

    assert_err(
        client.try_cut(&owner, &Vec::new(&env), &Some(Initializer::MigrateDecay(bad))),
        ContractError::ConfigurationError,
    );
    assert_eq!(client.decay_params(), emission(100));
}

#[test]
fn test_set_start_time_before_emission() {
    let mut decay = emission(100);
    decay.start_time = START + 100;
    let (env, client, owner, user) = setup(decay);
    client.deposit(&user, &0, &1_000);

    client.cut(
        &owner,
        &Vec::new(&env),
        &Some(Initializer::SetStartTime(START + 50)),
    );
    assert_eq!(client.decay_params().start_time, START + 50);

    advance(&env, 60);
    assert_eq!(client.pending_reward(&user, &0), 1_000);

    // Emission has begun; the start can no longer move.
    assert_err(
        client.try_cut(
            &owner,
            &Vec::new(&env),
            &Some(Initializer::SetStartTime(START + 500)),
        ),
        ContractError::InvalidInput,
    );
}

#[test]
fn test_set_start_time_cannot_be_in_the_past() {
    let mut decay = emission(100);
    decay.start_time = START + 100;
    let (env, client, owner, _) = setup(decay);

    assert_err(
        client.try_cut(
            &owner,
            &Vec::new(&env),
            &Some(Initializer::SetStartTime(START - 1)),
        ),
        ContractError::InvalidInput,
    );
    assert_eq!(client.decay_params().start_time, START + 100);
}
