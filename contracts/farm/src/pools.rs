//! Pool registry and reward accrual.
//!
//! Every pool carries an accumulator of reward per staked unit, scaled by
//! [`ACC_PRECISION`]. The ledger calls [`accrue`] before it reads or writes a
//! pool's accumulator.

use common::fixed_point::mul_div_floor;
use soroban_sdk::{contracttype, Address, Env};

use crate::decay::DecaySchedule;
use crate::{events, storage, ContractError};

/// Scale of `acc_reward_per_share`.
pub const ACC_PRECISION: i128 = 1_000_000_000_000;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    pub id: u32,
    pub deposit_asset: Address,
    pub weight: u64,
    pub acc_reward_per_share: i128,
    pub last_accrual: u64,
    pub total_staked: i128,
}

pub fn load(env: &Env, pool_id: u32) -> Result<Pool, ContractError> {
    let key = storage::pool_key(pool_id);
    let pool: Pool = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(ContractError::PoolNotFound)?;
    env.storage()
        .persistent()
        .extend_ttl(&key, storage::TTL_THRESHOLD, storage::TTL_EXTEND_TO);
    Ok(pool)
}

pub fn save(env: &Env, pool: &Pool) {
    let key = storage::pool_key(pool.id);
    env.storage().persistent().set(&key, pool);
    env.storage()
        .persistent()
        .extend_ttl(&key, storage::TTL_THRESHOLD, storage::TTL_EXTEND_TO);
}

/// Registers a new pool and returns its id.
///
/// Existing pools are accrued first: the new weight dilutes their share from
/// this instant onward, not retroactively.
pub fn add(env: &Env, deposit_asset: &Address, weight: u64) -> Result<u32, ContractError> {
    // Rewards are paid from the contract's own reward-token balance.
    if *deposit_asset == storage::reward_token(env)? {
        return Err(ContractError::TokensIdentical);
    }
    let asset_key = storage::pool_by_asset_key(deposit_asset);
    if env.storage().persistent().has(&asset_key) {
        return Err(ContractError::DuplicatePool);
    }

    accrue_all(env)?;

    let total = storage::total_weight(env)
        .checked_add(weight)
        .ok_or(ContractError::ArithmeticFault)?;
    let pool_id = storage::pool_count(env);
    let next_count = pool_id.checked_add(1).ok_or(ContractError::ArithmeticFault)?;

    let pool = Pool {
        id: pool_id,
        deposit_asset: deposit_asset.clone(),
        weight,
        acc_reward_per_share: 0,
        last_accrual: env.ledger().timestamp(),
        total_staked: 0,
    };
    save(env, &pool);
    env.storage().persistent().set(&asset_key, &pool_id);
    storage::set_pool_count(env, next_count);
    storage::set_total_weight(env, total);

    events::publish_pool_added(env, pool_id, deposit_asset.clone(), weight, total);

    Ok(pool_id)
}

/// Changes a pool's weight. With `accrue_first`, every pool is brought up to
/// date under the old weights before the change.
pub fn set_weight(
    env: &Env,
    pool_id: u32,
    new_weight: u64,
    accrue_first: bool,
) -> Result<(), ContractError> {
    if accrue_first {
        accrue_all(env)?;
    }
    let mut pool = load(env, pool_id)?;
    let old_weight = pool.weight;

    let total = storage::total_weight(env)
        .checked_sub(old_weight)
        .and_then(|t| t.checked_add(new_weight))
        .ok_or(ContractError::ArithmeticFault)?;

    pool.weight = new_weight;
    save(env, &pool);
    storage::set_total_weight(env, total);

    events::publish_weight_set(env, pool_id, old_weight, new_weight, total, accrue_first);

    Ok(())
}

/// Returns `pool` advanced to `now` without touching storage.
pub fn advanced(
    pool: &Pool,
    schedule: &DecaySchedule,
    total_weight: u64,
    now: u64,
) -> Result<Pool, ContractError> {
    let mut next = pool.clone();
    if now <= pool.last_accrual {
        return Ok(next);
    }
    if total_weight > 0 && pool.weight > 0 && pool.total_staked > 0 {
        let emitted = schedule.integral(pool.last_accrual, now)?;
        let share = mul_div_floor(emitted, pool.weight as i128, total_weight as i128)
            .ok_or(ContractError::ArithmeticFault)?;
        let per_share = mul_div_floor(share, ACC_PRECISION, pool.total_staked)
            .ok_or(ContractError::ArithmeticFault)?;
        next.acc_reward_per_share = pool
            .acc_reward_per_share
            .checked_add(per_share)
            .ok_or(ContractError::ArithmeticFault)?;
    }
    next.last_accrual = now;
    Ok(next)
}

/// Brings `pool_id` up to the current ledger time and stores it.
///
/// Calling it again in the same ledger is a no-op.
pub fn accrue(env: &Env, pool_id: u32) -> Result<Pool, ContractError> {
    let pool = load(env, pool_id)?;
    let now = env.ledger().timestamp();
    if now <= pool.last_accrual {
        return Ok(pool);
    }
    let schedule = storage::decay_schedule(env)?;
    let next = advanced(&pool, &schedule, storage::total_weight(env), now)?;
    save(env, &next);
    Ok(next)
}

pub fn accrue_all(env: &Env) -> Result<(), ContractError> {
    for pool_id in 0..storage::pool_count(env) {
        accrue(env, pool_id)?;
    }
    Ok(())
}

/// Read-only view of a pool as if it had just been accrued.
pub fn preview(env: &Env, pool_id: u32) -> Result<Pool, ContractError> {
    let pool = load(env, pool_id)?;
    let schedule = storage::decay_schedule(env)?;
    advanced(
        &pool,
        &schedule,
        storage::total_weight(env),
        env.ledger().timestamp(),
    )
}
