//! One-time initializers that run inside a cut.

use soroban_sdk::{contracttype, Env};

use crate::decay::{DecayParameters, DecaySchedule};
use crate::{events, pools, storage, ContractError};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Initializer {
    /// Replace the decay schedule. Every pool is accrued under the old
    /// schedule first.
    MigrateDecay(DecayParameters),
    /// Move the emission start. Only allowed before emission has begun.
    SetStartTime(u64),
    /// Record that a new storage generation has been appended.
    BumpLayout(u32),
}

pub fn run(env: &Env, init: &Initializer) -> Result<(), ContractError> {
    match init {
        Initializer::MigrateDecay(params) => migrate_decay(env, params),
        Initializer::SetStartTime(start_time) => set_start_time(env, *start_time),
        Initializer::BumpLayout(version) => bump_layout(env, *version),
    }
}

fn migrate_decay(env: &Env, params: &DecayParameters) -> Result<(), ContractError> {
    DecaySchedule::new(params)?;
    let previous = storage::decay_params(env)?;

    pools::accrue_all(env)?;
    storage::set_decay_params(env, params);

    events::publish_decay_migrated(env, previous, params.clone());
    Ok(())
}

fn set_start_time(env: &Env, start_time: u64) -> Result<(), ContractError> {
    let mut params = storage::decay_params(env)?;
    let now = env.ledger().timestamp();
    if now >= params.start_time || start_time < now {
        return Err(ContractError::InvalidInput);
    }
    let previous = params.start_time;
    params.start_time = start_time;
    storage::set_decay_params(env, &params);

    events::publish_start_time_updated(env, previous, start_time);
    Ok(())
}

fn bump_layout(env: &Env, version: u32) -> Result<(), ContractError> {
    let previous = storage::layout_version(env);
    if version <= previous {
        return Err(ContractError::InvalidInput);
    }
    storage::set_layout_version(env, version);

    events::publish_layout_bumped(env, previous, version);
    Ok(())
}
