//! Persistent storage layout.
//!
//! Keys are append-only: an upgrade may introduce new keys (and bump
//! `LAYOUT`) but must never rename, drop or re-type an existing one.
//! Generation 1 keys are listed below in the order they were introduced.

use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::decay::{DecayParameters, DecaySchedule};
use crate::ContractError;

// ── Generation 1 ─────────────────────────────────────────────────────────────

pub const INITIALIZED: Symbol = symbol_short!("INIT");
pub const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");
pub const DECAY: Symbol = symbol_short!("DECAY");
pub const TOTAL_WEIGHT: Symbol = symbol_short!("TOT_WGHT");
pub const POOL_COUNT: Symbol = symbol_short!("POOL_CNT");
pub const ROUTES: Symbol = symbol_short!("ROUTES");
pub const LAYOUT: Symbol = symbol_short!("LAYOUT");

// Persistent entries use tuple keys: (prefix, ...)
pub const POOL: Symbol = symbol_short!("POOL");
pub const POOL_BY_ASSET: Symbol = symbol_short!("POOL_AST");
pub const POSITION: Symbol = symbol_short!("POS");

// `OWNER`, `ROLE` and `LOCKED` are owned by `common::access` and
// `common::reentrancy`; they belong to generation 1 as well.

pub const CURRENT_LAYOUT: u32 = 1;

pub const TTL_THRESHOLD: u32 = 5184000;
pub const TTL_EXTEND_TO: u32 = 10368000;

pub fn pool_key(pool_id: u32) -> (Symbol, u32) {
    (POOL, pool_id)
}

pub fn pool_by_asset_key(asset: &Address) -> (Symbol, Address) {
    (POOL_BY_ASSET, asset.clone())
}

pub fn position_key(pool_id: u32, owner: &Address) -> (Symbol, u32, Address) {
    (POSITION, pool_id, owner.clone())
}

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&INITIALIZED)
}

pub fn reward_token(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&REWARD_TOKEN)
        .ok_or(ContractError::NotInitialized)
}

pub fn set_reward_token(env: &Env, token: &Address) {
    env.storage().instance().set(&REWARD_TOKEN, token);
}

pub fn decay_params(env: &Env) -> Result<DecayParameters, ContractError> {
    env.storage()
        .instance()
        .get(&DECAY)
        .ok_or(ContractError::NotInitialized)
}

/// Loads the schedule. Parameters are validated before they are ever
/// stored, so a failure here means the contract is not initialised.
pub fn decay_schedule(env: &Env) -> Result<DecaySchedule, ContractError> {
    DecaySchedule::new(&decay_params(env)?)
}

pub fn set_decay_params(env: &Env, params: &DecayParameters) {
    env.storage().instance().set(&DECAY, params);
}

pub fn total_weight(env: &Env) -> u64 {
    env.storage().instance().get(&TOTAL_WEIGHT).unwrap_or(0)
}

pub fn set_total_weight(env: &Env, weight: u64) {
    env.storage().instance().set(&TOTAL_WEIGHT, &weight);
}

pub fn pool_count(env: &Env) -> u32 {
    env.storage().instance().get(&POOL_COUNT).unwrap_or(0)
}

pub fn set_pool_count(env: &Env, count: u32) {
    env.storage().instance().set(&POOL_COUNT, &count);
}

pub fn layout_version(env: &Env) -> u32 {
    env.storage().instance().get(&LAYOUT).unwrap_or(0)
}

pub fn set_layout_version(env: &Env, version: u32) {
    env.storage().instance().set(&LAYOUT, &version);
}
