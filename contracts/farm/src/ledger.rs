//! Per-depositor positions.
//!
//! Every operation follows the same order: accrue the pool, compute the
//! pending reward against the position's `reward_debt`, commit the new
//! position and pool totals, and only then move tokens. A token contract
//! that calls back into the farm therefore sees the settled position.

use common::fixed_point::mul_div_floor;
use soroban_sdk::{contracttype, token, Address, Env, Vec};

use crate::pools::{self, Pool, ACC_PRECISION};
use crate::{events, storage, ContractError};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    pub owner: Address,
    pub pool_id: u32,
    pub staked: i128,
    /// Pool accumulator at the last settlement.
    pub reward_debt: i128,
}

/// A position together with its pending reward, as returned by views.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionInfo {
    pub pool_id: u32,
    pub staked: i128,
    pub reward_debt: i128,
    pub pending: i128,
}

/// Receives settled rewards.
pub trait RewardSink {
    fn pay(&mut self, env: &Env, to: &Address, amount: i128);
}

/// Pays rewards out of the contract's reward-token balance.
pub struct TokenPayout {
    pub token: Address,
}

impl RewardSink for TokenPayout {
    fn pay(&mut self, env: &Env, to: &Address, amount: i128) {
        if amount > 0 {
            token::Client::new(env, &self.token).transfer(
                &env.current_contract_address(),
                to,
                &amount,
            );
        }
    }
}

pub fn load(env: &Env, owner: &Address, pool_id: u32) -> Position {
    let key = storage::position_key(pool_id, owner);
    match env.storage().persistent().get(&key) {
        Some(position) => {
            env.storage().persistent().extend_ttl(
                &key,
                storage::TTL_THRESHOLD,
                storage::TTL_EXTEND_TO,
            );
            position
        }
        None => Position {
            owner: owner.clone(),
            pool_id,
            staked: 0,
            reward_debt: 0,
        },
    }
}

fn save(env: &Env, position: &Position) {
    let key = storage::position_key(position.pool_id, &position.owner);
    env.storage().persistent().set(&key, position);
    env.storage()
        .persistent()
        .extend_ttl(&key, storage::TTL_THRESHOLD, storage::TTL_EXTEND_TO);
}

/// Reward earned by `position` up to accumulator value `acc`.
pub fn pending_at(position: &Position, acc: i128) -> Result<i128, ContractError> {
    if position.staked == 0 {
        return Ok(0);
    }
    let delta = acc
        .checked_sub(position.reward_debt)
        .filter(|d| *d >= 0)
        .ok_or(ContractError::ArithmeticFault)?;
    mul_div_floor(position.staked, delta, ACC_PRECISION).ok_or(ContractError::ArithmeticFault)
}

/// Settles and commits. Returns the reward owed; the caller pays it.
fn settle(
    env: &Env,
    pool: &mut Pool,
    position: &mut Position,
    stake_delta: i128,
) -> Result<i128, ContractError> {
    let pending = pending_at(position, pool.acc_reward_per_share)?;

    position.staked = position
        .staked
        .checked_add(stake_delta)
        .ok_or(ContractError::ArithmeticFault)?;
    pool.total_staked = pool
        .total_staked
        .checked_add(stake_delta)
        .ok_or(ContractError::ArithmeticFault)?;
    position.reward_debt = pool.acc_reward_per_share;

    save(env, position);
    pools::save(env, pool);
    Ok(pending)
}

pub fn deposit<S: RewardSink>(
    env: &Env,
    owner: &Address,
    pool_id: u32,
    amount: i128,
    sink: &mut S,
) -> Result<i128, ContractError> {
    if amount < 0 {
        return Err(ContractError::InvalidInput);
    }
    let mut pool = pools::accrue(env, pool_id)?;
    let mut position = load(env, owner, pool_id);

    let paid = settle(env, &mut pool, &mut position, amount)?;

    events::publish_deposited(env, owner.clone(), pool_id, amount, paid, position.staked);

    sink.pay(env, owner, paid);
    if amount > 0 {
        token::Client::new(env, &pool.deposit_asset).transfer(
            owner,
            &env.current_contract_address(),
            &amount,
        );
    }
    Ok(paid)
}

pub fn withdraw<S: RewardSink>(
    env: &Env,
    owner: &Address,
    pool_id: u32,
    amount: i128,
    sink: &mut S,
) -> Result<i128, ContractError> {
    if amount < 0 {
        return Err(ContractError::InvalidInput);
    }
    let mut pool = pools::accrue(env, pool_id)?;
    let mut position = load(env, owner, pool_id);
    if amount > position.staked {
        return Err(ContractError::InsufficientStake);
    }

    let paid = settle(env, &mut pool, &mut position, -amount)?;

    events::publish_withdrawn(env, owner.clone(), pool_id, amount, paid, position.staked);

    sink.pay(env, owner, paid);
    if amount > 0 {
        token::Client::new(env, &pool.deposit_asset).transfer(
            &env.current_contract_address(),
            owner,
            &amount,
        );
    }
    Ok(paid)
}

pub fn harvest<S: RewardSink>(
    env: &Env,
    owner: &Address,
    pool_id: u32,
    sink: &mut S,
) -> Result<i128, ContractError> {
    let mut pool = pools::accrue(env, pool_id)?;
    let mut position = load(env, owner, pool_id);

    let paid = settle(env, &mut pool, &mut position, 0)?;

    events::publish_harvested(env, owner.clone(), pool_id, paid);

    sink.pay(env, owner, paid);
    Ok(paid)
}

/// Returns the whole stake and forfeits any pending reward.
///
/// When accrual overflows, the pool is left at its last accrual and the
/// stake is returned anyway; the exit must not depend on reward math.
pub fn emergency_withdraw(env: &Env, owner: &Address, pool_id: u32) -> Result<i128, ContractError> {
    let mut pool = match pools::accrue(env, pool_id) {
        Ok(pool) => pool,
        Err(ContractError::ArithmeticFault) => pools::load(env, pool_id)?,
        Err(e) => return Err(e),
    };
    let mut position = load(env, owner, pool_id);
    let amount = position.staked;

    pool.total_staked = pool
        .total_staked
        .checked_sub(amount)
        .ok_or(ContractError::ArithmeticFault)?;
    position.staked = 0;
    position.reward_debt = pool.acc_reward_per_share;
    save(env, &position);
    pools::save(env, &pool);

    events::publish_emergency_withdrawn(env, owner.clone(), pool_id, amount);

    if amount > 0 {
        token::Client::new(env, &pool.deposit_asset).transfer(
            &env.current_contract_address(),
            owner,
            &amount,
        );
    }
    Ok(amount)
}

/// Pending reward as of the current ledger time, without writing state.
pub fn pending_reward(env: &Env, owner: &Address, pool_id: u32) -> Result<i128, ContractError> {
    let pool = pools::preview(env, pool_id)?;
    pending_at(&load(env, owner, pool_id), pool.acc_reward_per_share)
}

pub fn positions(env: &Env, owner: &Address) -> Result<Vec<PositionInfo>, ContractError> {
    let mut out = Vec::new(env);
    for pool_id in 0..storage::pool_count(env) {
        let pool = pools::preview(env, pool_id)?;
        let position = load(env, owner, pool_id);
        out.push_back(PositionInfo {
            pool_id,
            staked: position.staked,
            reward_debt: position.reward_debt,
            pending: pending_at(&position, pool.acc_reward_per_share)?,
        });
    }
    Ok(out)
}

pub fn pending_all(env: &Env, owner: &Address) -> Result<i128, ContractError> {
    let mut total: i128 = 0;
    for info in positions(env, owner)?.iter() {
        total = total
            .checked_add(info.pending)
            .ok_or(ContractError::ArithmeticFault)?;
    }
    Ok(total)
}
