#![allow(deprecated)] // events().publish migration tracked separately

use common::access::Role;
use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::decay::DecayParameters;
use crate::facets::Facet;
use crate::migrations::Initializer;
use crate::router::CutAction;

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the farm is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub owner: Address,
    pub reward_token: Address,
    pub decay: DecayParameters,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolAddedEvent {
    pub pool_id: u32,
    pub deposit_asset: Address,
    pub weight: u64,
    pub total_weight: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WeightSetEvent {
    pub pool_id: u32,
    pub old_weight: u64,
    pub new_weight: u64,
    pub total_weight: u64,
    pub accrued_first: bool,
    pub timestamp: u64,
}

/// Fired on deposit; `reward_paid` is what the settlement paid out.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositedEvent {
    pub owner: Address,
    pub pool_id: u32,
    pub amount: i128,
    pub reward_paid: i128,
    pub new_staked: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub owner: Address,
    pub pool_id: u32,
    pub amount: i128,
    pub reward_paid: i128,
    pub new_staked: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HarvestedEvent {
    pub owner: Address,
    pub pool_id: u32,
    pub reward_paid: i128,
    pub timestamp: u64,
}

/// Fired when a stake is pulled out without settling rewards.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawnEvent {
    pub owner: Address,
    pub pool_id: u32,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired once per route-table change.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteChangedEvent {
    pub selector: Symbol,
    pub action: CutAction,
    pub previous: Option<Facet>,
    pub current: Option<Facet>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CutAppliedEvent {
    pub changes: u32,
    pub initializer: Option<Initializer>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecayMigratedEvent {
    pub previous: DecayParameters,
    pub current: DecayParameters,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StartTimeUpdatedEvent {
    pub previous: u64,
    pub current: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LayoutBumpedEvent {
    pub previous: u32,
    pub current: u32,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnershipTransferredEvent {
    pub previous_owner: Address,
    pub new_owner: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleChangedEvent {
    pub account: Address,
    pub role: Option<Role>,
    pub changed_by: Address,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    owner: Address,
    reward_token: Address,
    decay: DecayParameters,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            owner,
            reward_token,
            decay,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_pool_added(
    env: &Env,
    pool_id: u32,
    deposit_asset: Address,
    weight: u64,
    total_weight: u64,
) {
    env.events().publish(
        (symbol_short!("POOL_ADD"), pool_id),
        PoolAddedEvent {
            pool_id,
            deposit_asset,
            weight,
            total_weight,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_weight_set(
    env: &Env,
    pool_id: u32,
    old_weight: u64,
    new_weight: u64,
    total_weight: u64,
    accrued_first: bool,
) {
    env.events().publish(
        (symbol_short!("WEIGHT"), pool_id),
        WeightSetEvent {
            pool_id,
            old_weight,
            new_weight,
            total_weight,
            accrued_first,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_deposited(
    env: &Env,
    owner: Address,
    pool_id: u32,
    amount: i128,
    reward_paid: i128,
    new_staked: i128,
) {
    env.events().publish(
        (symbol_short!("DEPOSIT"), owner.clone(), pool_id),
        DepositedEvent {
            owner,
            pool_id,
            amount,
            reward_paid,
            new_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawn(
    env: &Env,
    owner: Address,
    pool_id: u32,
    amount: i128,
    reward_paid: i128,
    new_staked: i128,
) {
    env.events().publish(
        (symbol_short!("WITHDRAWN"), owner.clone(), pool_id),
        WithdrawnEvent {
            owner,
            pool_id,
            amount,
            reward_paid,
            new_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_harvested(env: &Env, owner: Address, pool_id: u32, reward_paid: i128) {
    env.events().publish(
        (symbol_short!("HARVEST"), owner.clone(), pool_id),
        HarvestedEvent {
            owner,
            pool_id,
            reward_paid,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_emergency_withdrawn(env: &Env, owner: Address, pool_id: u32, amount: i128) {
    env.events().publish(
        (symbol_short!("EMERG_WD"), owner.clone(), pool_id),
        EmergencyWithdrawnEvent {
            owner,
            pool_id,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_route_changed(
    env: &Env,
    selector: Symbol,
    action: CutAction,
    previous: Option<Facet>,
    current: Option<Facet>,
) {
    env.events().publish(
        (symbol_short!("ROUTE"), selector.clone()),
        RouteChangedEvent {
            selector,
            action,
            previous,
            current,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_cut_applied(env: &Env, changes: u32, initializer: Option<Initializer>) {
    env.events().publish(
        (symbol_short!("CUT"),),
        CutAppliedEvent {
            changes,
            initializer,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_decay_migrated(env: &Env, previous: DecayParameters, current: DecayParameters) {
    env.events().publish(
        (symbol_short!("DECAY"),),
        DecayMigratedEvent {
            previous,
            current,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_start_time_updated(env: &Env, previous: u64, current: u64) {
    env.events().publish(
        (symbol_short!("START"),),
        StartTimeUpdatedEvent {
            previous,
            current,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_layout_bumped(env: &Env, previous: u32, current: u32) {
    env.events().publish(
        (symbol_short!("LAYOUT"),),
        LayoutBumpedEvent {
            previous,
            current,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_ownership_transferred(env: &Env, previous_owner: Address, new_owner: Address) {
    env.events().publish(
        (symbol_short!("OWNER"),),
        OwnershipTransferredEvent {
            previous_owner,
            new_owner,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_role_changed(env: &Env, account: Address, role: Option<Role>, changed_by: Address) {
    env.events().publish(
        (symbol_short!("ROLE"), account.clone()),
        RoleChangedEvent {
            account,
            role,
            changed_by,
            timestamp: env.ledger().timestamp(),
        },
    );
}
