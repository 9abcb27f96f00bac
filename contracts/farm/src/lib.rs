#![no_std]

pub mod decay;
pub mod events;
pub mod facets;
pub mod ledger;
pub mod migrations;
pub mod pools;
pub mod router;
pub mod storage;

use common::access::{self, Role};
use common::reentrancy;
use soroban_sdk::{contract, contractimpl, Address, Env, Symbol, Vec};

use decay::{DecayParameters, DecaySchedule};
use facets::{Facet, FarmFacet};
use ledger::{Position, PositionInfo};
use migrations::Initializer;
use pools::Pool;
use router::{FacetRoutes, RouteDiff};

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidInput = 4,
    InsufficientStake = 5,
    ConfigurationError = 6,
    RouteConflict = 7,
    FunctionNotFound = 8,
    PoolNotFound = 9,
    DuplicatePool = 10,
    ArithmeticFault = 11,
    Reentrant = 12,
    Halted = 13,
    TokensIdentical = 14,
}

// ── Contract ─────────────────────────────────────────────────────────────────

/// Every entry point except `initialize` is resolved through the route
/// table before it runs, so a cut can re-route or remove any of them.
#[contract]
pub struct FarmContract;

#[contractimpl]
impl FarmContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the farm.
    ///
    /// * `owner`        – holder of every privileged operation.
    /// * `reward_token` – SAC address of the emitted asset; the contract must
    ///                    be funded with it to pay rewards.
    /// * `decay`        – emission schedule; rejected with
    ///                    `ConfigurationError` before anything is stored.
    pub fn initialize(
        env: Env,
        owner: Address,
        reward_token: Address,
        decay: DecayParameters,
    ) -> Result<(), ContractError> {
        if storage::is_initialized(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        DecaySchedule::new(&decay)?;

        access::set_owner(&env, &owner);
        storage::set_reward_token(&env, &reward_token);
        storage::set_decay_params(&env, &decay);
        storage::set_total_weight(&env, 0);
        storage::set_pool_count(&env, 0);
        storage::set_layout_version(&env, storage::CURRENT_LAYOUT);
        router::install(&env, &facets::genesis_routes(&env));
        env.storage().instance().set(&storage::INITIALIZED, &true);
        storage::extend_instance_ttl(&env);

        events::publish_initialized(&env, owner, reward_token, decay);

        Ok(())
    }

    // ── Pool administration ─────────────────────────────────────────────────

    /// Register a staking pool for `deposit_asset`. Requires `PoolManager`.
    pub fn add_pool(
        env: Env,
        caller: Address,
        deposit_asset: Address,
        weight: u64,
    ) -> Result<u32, ContractError> {
        let facet = Self::farm(&env, &facets::ADD_POOL)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::PoolManager)?;
        facet.add_pool(&env, &deposit_asset, weight)
    }

    /// Change a pool's weight. Requires `PoolManager`.
    ///
    /// Pass `accrue_first = true` unless every pool was accrued in this
    /// ledger already; otherwise elapsed emission is split by the new
    /// weights.
    pub fn set_weight(
        env: Env,
        caller: Address,
        pool_id: u32,
        weight: u64,
        accrue_first: bool,
    ) -> Result<(), ContractError> {
        let facet = Self::farm(&env, &facets::SET_WEIGHT)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::PoolManager)?;
        facet.set_weight(&env, pool_id, weight, accrue_first)
    }

    pub fn accrue(env: Env, pool_id: u32) -> Result<Pool, ContractError> {
        Self::farm(&env, &facets::ACCRUE)?.accrue(&env, pool_id)
    }

    pub fn accrue_all(env: Env) -> Result<(), ContractError> {
        Self::farm(&env, &facets::ACCRUE_ALL)?.accrue_all(&env)
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Stake `amount` of the pool's deposit asset, paying out any pending
    /// reward first. Returns the reward paid.
    pub fn deposit(
        env: Env,
        owner: Address,
        pool_id: u32,
        amount: i128,
    ) -> Result<i128, ContractError> {
        let facet = Self::farm(&env, &facets::DEPOSIT)?;
        owner.require_auth();
        Self::guarded(&env, || facet.deposit(&env, &owner, pool_id, amount))
    }

    /// Unstake `amount`, paying out any pending reward. Returns the reward
    /// paid.
    pub fn withdraw(
        env: Env,
        owner: Address,
        pool_id: u32,
        amount: i128,
    ) -> Result<i128, ContractError> {
        let facet = Self::farm(&env, &facets::WITHDRAW)?;
        owner.require_auth();
        Self::guarded(&env, || facet.withdraw(&env, &owner, pool_id, amount))
    }

    pub fn harvest(env: Env, owner: Address, pool_id: u32) -> Result<i128, ContractError> {
        let facet = Self::farm(&env, &facets::HARVEST)?;
        owner.require_auth();
        Self::guarded(&env, || facet.harvest(&env, &owner, pool_id))
    }

    pub fn harvest_many(
        env: Env,
        owner: Address,
        pool_ids: Vec<u32>,
    ) -> Result<i128, ContractError> {
        let facet = Self::farm(&env, &facets::HARVEST_MANY)?;
        owner.require_auth();
        Self::guarded(&env, || facet.harvest_many(&env, &owner, &pool_ids))
    }

    /// Return the whole stake without settling. Pending reward is forfeited.
    pub fn emergency_withdraw(
        env: Env,
        owner: Address,
        pool_id: u32,
    ) -> Result<i128, ContractError> {
        let facet = Self::farm(&env, &facets::EMERGENCY_WITHDRAW)?;
        owner.require_auth();
        Self::guarded(&env, || facet.emergency_withdraw(&env, &owner, pool_id))
    }

    // ── Farm views ──────────────────────────────────────────────────────────

    /// Real-time pending reward; does not write state.
    pub fn pending_reward(env: Env, owner: Address, pool_id: u32) -> Result<i128, ContractError> {
        router::require(&env, &facets::PENDING, Facet::Farm)?;
        ledger::pending_reward(&env, &owner, pool_id)
    }

    pub fn pending_all(env: Env, owner: Address) -> Result<i128, ContractError> {
        router::require(&env, &facets::PENDING_ALL, Facet::Farm)?;
        ledger::pending_all(&env, &owner)
    }

    pub fn position(env: Env, owner: Address, pool_id: u32) -> Result<Position, ContractError> {
        router::require(&env, &facets::POSITION, Facet::Farm)?;
        pools::load(&env, pool_id)?;
        Ok(ledger::load(&env, &owner, pool_id))
    }

    pub fn positions(env: Env, owner: Address) -> Result<Vec<PositionInfo>, ContractError> {
        router::require(&env, &facets::POSITIONS, Facet::Farm)?;
        ledger::positions(&env, &owner)
    }

    /// Stored pool state, as of its last accrual.
    pub fn pool(env: Env, pool_id: u32) -> Result<Pool, ContractError> {
        router::require(&env, &facets::POOL, Facet::Farm)?;
        pools::load(&env, pool_id)
    }

    pub fn pool_count(env: Env) -> Result<u32, ContractError> {
        router::require(&env, &facets::POOL_COUNT, Facet::Farm)?;
        Ok(storage::pool_count(&env))
    }

    pub fn total_weight(env: Env) -> Result<u64, ContractError> {
        router::require(&env, &facets::TOTAL_WEIGHT, Facet::Farm)?;
        Ok(storage::total_weight(&env))
    }

    pub fn reward_token(env: Env) -> Result<Address, ContractError> {
        router::require(&env, &facets::REWARD_TOKEN, Facet::Farm)?;
        storage::reward_token(&env)
    }

    pub fn decay_params(env: Env) -> Result<DecayParameters, ContractError> {
        router::require(&env, &facets::DECAY_PARAMS, Facet::Farm)?;
        storage::decay_params(&env)
    }

    /// Emission rate at the current ledger time.
    pub fn current_rate(env: Env) -> Result<i128, ContractError> {
        router::require(&env, &facets::CURRENT_RATE, Facet::Farm)?;
        Ok(storage::decay_schedule(&env)?.rate_at(env.ledger().timestamp()))
    }

    pub fn layout_version(env: Env) -> Result<u32, ContractError> {
        router::require(&env, &facets::LAYOUT_VERSION, Facet::Farm)?;
        Ok(storage::layout_version(&env))
    }

    // ── Upgrades ────────────────────────────────────────────────────────────

    /// Apply a batch of route changes and an optional initializer as one
    /// unit. Owner only.
    pub fn cut(
        env: Env,
        caller: Address,
        diffs: Vec<RouteDiff>,
        init: Option<Initializer>,
    ) -> Result<(), ContractError> {
        router::require(&env, &facets::CUT, Facet::Cut)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::Owner)?;
        router::cut(&env, &diffs, &init)
    }

    pub fn facets(env: Env) -> Result<Vec<FacetRoutes>, ContractError> {
        router::require(&env, &facets::FACETS, Facet::Loupe)?;
        router::facets(&env)
    }

    pub fn facet_selectors(env: Env, facet: Facet) -> Result<Vec<Symbol>, ContractError> {
        router::require(&env, &facets::FACET_SELECTORS, Facet::Loupe)?;
        router::facet_selectors(&env, facet)
    }

    pub fn facet_of(env: Env, selector: Symbol) -> Result<Option<Facet>, ContractError> {
        router::require(&env, &facets::FACET_OF, Facet::Loupe)?;
        router::facet_of(&env, &selector)
    }

    // ── Ownership ───────────────────────────────────────────────────────────

    pub fn owner(env: Env) -> Result<Address, ContractError> {
        router::require(&env, &facets::OWNER, Facet::Ownership)?;
        access::owner(&env).ok_or(ContractError::NotInitialized)
    }

    /// Hand the owner role to `new_owner` in a single step.
    pub fn transfer_ownership(
        env: Env,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), ContractError> {
        router::require(&env, &facets::TRANSFER_OWNERSHIP, Facet::Ownership)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::Owner)?;

        let previous = access::set_owner(&env, &new_owner).ok_or(ContractError::NotInitialized)?;

        events::publish_ownership_transferred(&env, previous, new_owner);

        Ok(())
    }

    /// Grant `role` to `account`. Owner only; `Role::Owner` is not grantable.
    pub fn grant_role(
        env: Env,
        caller: Address,
        account: Address,
        role: Role,
    ) -> Result<(), ContractError> {
        router::require(&env, &facets::GRANT_ROLE, Facet::Ownership)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::Owner)?;
        if !access::grant(&env, &account, role) {
            return Err(ContractError::InvalidInput);
        }
        events::publish_role_changed(&env, account, Some(role), caller);
        Ok(())
    }

    pub fn revoke_role(env: Env, caller: Address, account: Address) -> Result<(), ContractError> {
        router::require(&env, &facets::REVOKE_ROLE, Facet::Ownership)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::Owner)?;
        if !access::revoke(&env, &account) {
            return Err(ContractError::InvalidInput);
        }
        events::publish_role_changed(&env, account, None, caller);
        Ok(())
    }

    pub fn role_of(env: Env, account: Address) -> Result<Option<Role>, ContractError> {
        router::require(&env, &facets::ROLE_OF, Facet::Ownership)?;
        Ok(access::role_of(&env, &account))
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Resolve a farm selector to the implementation currently bound to it.
    fn farm(env: &Env, selector: &Symbol) -> Result<&'static dyn FarmFacet, ContractError> {
        router::resolve(env, selector)?
            .farm()
            .ok_or(ContractError::FunctionNotFound)
    }

    fn require_role(env: &Env, caller: &Address, role: Role) -> Result<(), ContractError> {
        if !access::has_role(env, caller, role) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    /// Run `f` holding the reentrancy lock.
    fn guarded<T>(
        env: &Env,
        f: impl FnOnce() -> Result<T, ContractError>,
    ) -> Result<T, ContractError> {
        if !reentrancy::enter(env) {
            return Err(ContractError::Reentrant);
        }
        let out = f();
        reentrancy::exit(env);
        out
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────




#[cfg(test)]
mod test_router;
