//! Facets: the swappable implementations that selectors route to.
//!
//! A facet is a closed set of variants rather than an arbitrary code
//! address; each variant declares which selectors it implements, and the
//! router refuses to bind a selector to a facet that does not.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, Vec};

use crate::ledger::{self, TokenPayout};
use crate::{pools, storage, ContractError};

// ── Selectors ────────────────────────────────────────────────────────────────

pub const CUT: Symbol = symbol_short!("cut");

pub const FACETS: Symbol = symbol_short!("facets");
pub const FACET_SELECTORS: Symbol = symbol_short!("facet_sel");
pub const FACET_OF: Symbol = symbol_short!("facet_of");

pub const OWNER: Symbol = symbol_short!("owner");
pub const TRANSFER_OWNERSHIP: Symbol = symbol_short!("xfer_own");
pub const GRANT_ROLE: Symbol = symbol_short!("grant");
pub const REVOKE_ROLE: Symbol = symbol_short!("revoke");
pub const ROLE_OF: Symbol = symbol_short!("role_of");

pub const ADD_POOL: Symbol = symbol_short!("add_pool");
pub const SET_WEIGHT: Symbol = symbol_short!("set_wght");
pub const ACCRUE: Symbol = symbol_short!("accrue");
pub const ACCRUE_ALL: Symbol = symbol_short!("accr_all");
pub const DEPOSIT: Symbol = symbol_short!("deposit");
pub const WITHDRAW: Symbol = symbol_short!("withdraw");
pub const HARVEST: Symbol = symbol_short!("harvest");
pub const HARVEST_MANY: Symbol = symbol_short!("harv_many");
pub const EMERGENCY_WITHDRAW: Symbol = symbol_short!("emerg_wd");

pub const PENDING: Symbol = symbol_short!("pending");
pub const PENDING_ALL: Symbol = symbol_short!("pend_all");
pub const POSITION: Symbol = symbol_short!("position");
pub const POSITIONS: Symbol = symbol_short!("positions");
pub const POOL: Symbol = symbol_short!("pool");
pub const POOL_COUNT: Symbol = symbol_short!("pool_cnt");
pub const TOTAL_WEIGHT: Symbol = symbol_short!("tot_wght");
pub const REWARD_TOKEN: Symbol = symbol_short!("rwd_token");
pub const DECAY_PARAMS: Symbol = symbol_short!("decay");
pub const CURRENT_RATE: Symbol = symbol_short!("curr_rate");
pub const LAYOUT_VERSION: Symbol = symbol_short!("layout");

const CUT_SELECTORS: [Symbol; 1] = [CUT];

const LOUPE_SELECTORS: [Symbol; 3] = [FACETS, FACET_SELECTORS, FACET_OF];

const OWNERSHIP_SELECTORS: [Symbol; 5] =
    [OWNER, TRANSFER_OWNERSHIP, GRANT_ROLE, REVOKE_ROLE, ROLE_OF];

/// Farm operations that mutate state; both farm facets implement these.
const FARM_MUTATING_SELECTORS: [Symbol; 9] = [
    ADD_POOL,
    SET_WEIGHT,
    ACCRUE,
    ACCRUE_ALL,
    DEPOSIT,
    WITHDRAW,
    HARVEST,
    HARVEST_MANY,
    EMERGENCY_WITHDRAW,
];

const FARM_VIEW_SELECTORS: [Symbol; 11] = [
    PENDING,
    PENDING_ALL,
    POSITION,
    POSITIONS,
    POOL,
    POOL_COUNT,
    TOTAL_WEIGHT,
    REWARD_TOKEN,
    DECAY_PARAMS,
    CURRENT_RATE,
    LAYOUT_VERSION,
];

// ── Facet ────────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Facet {
    /// Route table maintenance.
    Cut = 1,
    /// Route table introspection.
    Loupe = 2,
    /// Owner and role management.
    Ownership = 3,
    /// Pool registry, accrual and ledger.
    Farm = 4,
    /// Stand-in for farm operations that have been switched off.
    Halted = 5,
}

impl Facet {
    pub fn supports(&self, selector: &Symbol) -> bool {
        match self {
            Facet::Cut => CUT_SELECTORS.contains(selector),
            Facet::Loupe => LOUPE_SELECTORS.contains(selector),
            Facet::Ownership => OWNERSHIP_SELECTORS.contains(selector),
            Facet::Farm => {
                FARM_MUTATING_SELECTORS.contains(selector) || FARM_VIEW_SELECTORS.contains(selector)
            }
            Facet::Halted => FARM_MUTATING_SELECTORS.contains(selector),
        }
    }

    /// The farm implementation behind this facet, if it is one.
    pub fn farm(&self) -> Option<&'static dyn FarmFacet> {
        match self {
            Facet::Farm => Some(&ACTIVE),
            Facet::Halted => Some(&HALTED),
            _ => None,
        }
    }
}

/// Route table installed by `initialize`.
pub fn genesis_routes(env: &Env) -> Vec<(Symbol, Facet)> {
    let mut routes = Vec::new(env);
    for s in CUT_SELECTORS.iter() {
        routes.push_back((s.clone(), Facet::Cut));
    }
    for s in LOUPE_SELECTORS.iter() {
        routes.push_back((s.clone(), Facet::Loupe));
    }
    for s in OWNERSHIP_SELECTORS.iter() {
        routes.push_back((s.clone(), Facet::Ownership));
    }
    for s in FARM_MUTATING_SELECTORS.iter().chain(FARM_VIEW_SELECTORS.iter()) {
        routes.push_back((s.clone(), Facet::Farm));
    }
    routes
}

// ── Farm implementations ─────────────────────────────────────────────────────

/// State-changing farm operations. Authorization has already been checked
/// by the entry point when these run.
pub trait FarmFacet {
    fn add_pool(
        &self,
        env: &Env,
        deposit_asset: &Address,
        weight: u64,
    ) -> Result<u32, ContractError>;
    fn set_weight(
        &self,
        env: &Env,
        pool_id: u32,
        weight: u64,
        accrue_first: bool,
    ) -> Result<(), ContractError>;
    fn accrue(&self, env: &Env, pool_id: u32) -> Result<pools::Pool, ContractError>;
    fn accrue_all(&self, env: &Env) -> Result<(), ContractError>;
    fn deposit(
        &self,
        env: &Env,
        owner: &Address,
        pool_id: u32,
        amount: i128,
    ) -> Result<i128, ContractError>;
    fn withdraw(
        &self,
        env: &Env,
        owner: &Address,
        pool_id: u32,
        amount: i128,
    ) -> Result<i128, ContractError>;
    fn harvest(&self, env: &Env, owner: &Address, pool_id: u32) -> Result<i128, ContractError>;
    fn harvest_many(
        &self,
        env: &Env,
        owner: &Address,
        pool_ids: &Vec<u32>,
    ) -> Result<i128, ContractError>;
    fn emergency_withdraw(
        &self,
        env: &Env,
        owner: &Address,
        pool_id: u32,
    ) -> Result<i128, ContractError>;
}

pub struct ActiveFarm;
pub struct HaltedFarm;

static ACTIVE: ActiveFarm = ActiveFarm;
static HALTED: HaltedFarm = HaltedFarm;

fn payout(env: &Env) -> Result<TokenPayout, ContractError> {
    Ok(TokenPayout {
        token: storage::reward_token(env)?,
    })
}

impl FarmFacet for ActiveFarm {
    fn add_pool(
        &self,
        env: &Env,
        deposit_asset: &Address,
        weight: u64,
    ) -> Result<u32, ContractError> {
        pools::add(env, deposit_asset, weight)
    }

    fn set_weight(
        &self,
        env: &Env,
        pool_id: u32,
        weight: u64,
        accrue_first: bool,
    ) -> Result<(), ContractError> {
        pools::set_weight(env, pool_id, weight, accrue_first)
    }

    fn accrue(&self, env: &Env, pool_id: u32) -> Result<pools::Pool, ContractError> {
        pools::accrue(env, pool_id)
    }

    fn accrue_all(&self, env: &Env) -> Result<(), ContractError> {
        pools::accrue_all(env)
    }

    fn deposit(
        &self,
        env: &Env,
        owner: &Address,
        pool_id: u32,
        amount: i128,
    ) -> Result<i128, ContractError> {
        ledger::deposit(env, owner, pool_id, amount, &mut payout(env)?)
    }

    fn withdraw(
        &self,
        env: &Env,
        owner: &Address,
        pool_id: u32,
        amount: i128,
    ) -> Result<i128, ContractError> {
        ledger::withdraw(env, owner, pool_id, amount, &mut payout(env)?)
    }

    fn harvest(&self, env: &Env, owner: &Address, pool_id: u32) -> Result<i128, ContractError> {
        ledger::harvest(env, owner, pool_id, &mut payout(env)?)
    }

    fn harvest_many(
        &self,
        env: &Env,
        owner: &Address,
        pool_ids: &Vec<u32>,
    ) -> Result<i128, ContractError> {
        let mut sink = payout(env)?;
        let mut total: i128 = 0;
        for pool_id in pool_ids.iter() {
            let paid = ledger::harvest(env, owner, pool_id, &mut sink)?;
            total = total.checked_add(paid).ok_or(ContractError::ArithmeticFault)?;
        }
        Ok(total)
    }

    fn emergency_withdraw(
        &self,
        env: &Env,
        owner: &Address,
        pool_id: u32,
    ) -> Result<i128, ContractError> {
        ledger::emergency_withdraw(env, owner, pool_id)
    }
}

impl FarmFacet for HaltedFarm {
    fn add_pool(
        &self,
        _env: &Env,
        _deposit_asset: &Address,
        _weight: u64,
    ) -> Result<u32, ContractError> {
        Err(ContractError::Halted)
    }

    fn set_weight(
        &self,
        _env: &Env,
        _pool_id: u32,
        _weight: u64,
        _accrue_first: bool,
    ) -> Result<(), ContractError> {
        Err(ContractError::Halted)
    }

    fn accrue(&self, _env: &Env, _pool_id: u32) -> Result<pools::Pool, ContractError> {
        Err(ContractError::Halted)
    }

    fn accrue_all(&self, _env: &Env) -> Result<(), ContractError> {
        Err(ContractError::Halted)
    }

    fn deposit(
        &self,
        _env: &Env,
        _owner: &Address,
        _pool_id: u32,
        _amount: i128,
    ) -> Result<i128, ContractError> {
        Err(ContractError::Halted)
    }

    fn withdraw(
        &self,
        _env: &Env,
        _owner: &Address,
        _pool_id: u32,
        _amount: i128,
    ) -> Result<i128, ContractError> {
        Err(ContractError::Halted)
    }

    fn harvest(&self, _env: &Env, _owner: &Address, _pool_id: u32) -> Result<i128, ContractError> {
        Err(ContractError::Halted)
    }

    fn harvest_many(
        &self,
        _env: &Env,
        _owner: &Address,
        _pool_ids: &Vec<u32>,
    ) -> Result<i128, ContractError> {
        Err(ContractError::Halted)
    }

    fn emergency_withdraw(
        &self,
        _env: &Env,
        _owner: &Address,
        _pool_id: u32,
    ) -> Result<i128, ContractError> {
        Err(ContractError::Halted)
    }
}
