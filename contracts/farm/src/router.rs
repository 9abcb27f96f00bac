//! Selector → facet route table and the cut protocol that edits it.

use soroban_sdk::{contracttype, Env, Map, Symbol, Vec};

use crate::facets::Facet;
use crate::migrations::{self, Initializer};
use crate::{events, storage, ContractError};

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum CutAction {
    Add = 0,
    Replace = 1,
    Remove = 2,
}

/// One requested change to the route table.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteDiff {
    pub selector: Symbol,
    pub action: CutAction,
    /// Target facet; must be `None` for `Remove`.
    pub facet: Option<Facet>,
}

/// Loupe view: a facet and every selector currently routed to it.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FacetRoutes {
    pub facet: Facet,
    pub selectors: Vec<Symbol>,
}

pub fn table(env: &Env) -> Result<Map<Symbol, Facet>, ContractError> {
    env.storage()
        .instance()
        .get(&storage::ROUTES)
        .ok_or(ContractError::NotInitialized)
}

fn save_table(env: &Env, table: &Map<Symbol, Facet>) {
    env.storage().instance().set(&storage::ROUTES, table);
}

pub fn install(env: &Env, routes: &Vec<(Symbol, Facet)>) {
    let mut table = Map::new(env);
    for (selector, facet) in routes.iter() {
        table.set(selector, facet);
    }
    save_table(env, &table);
}

/// Facet currently bound to `selector`. Every routed call passes through
/// here, so this is also where the instance TTL is kept alive.
pub fn resolve(env: &Env, selector: &Symbol) -> Result<Facet, ContractError> {
    let facet = table(env)?
        .get(selector.clone())
        .ok_or(ContractError::FunctionNotFound)?;
    storage::extend_instance_ttl(env);
    Ok(facet)
}

/// Resolves `selector` and requires it to be served by `expected`.
pub fn require(env: &Env, selector: &Symbol, expected: Facet) -> Result<(), ContractError> {
    if resolve(env, selector)? != expected {
        return Err(ContractError::FunctionNotFound);
    }
    Ok(())
}

/// Checks one diff against `table` and applies it there. Returns the facet
/// the selector was bound to before.
fn apply_diff(
    table: &mut Map<Symbol, Facet>,
    diff: &RouteDiff,
) -> Result<Option<Facet>, ContractError> {
    let current = table.get(diff.selector.clone());
    match diff.action {
        CutAction::Add => {
            let facet = diff.facet.ok_or(ContractError::RouteConflict)?;
            if current.is_some() || !facet.supports(&diff.selector) {
                return Err(ContractError::RouteConflict);
            }
            table.set(diff.selector.clone(), facet);
        }
        CutAction::Replace => {
            let facet = diff.facet.ok_or(ContractError::RouteConflict)?;
            match current {
                Some(old) if old != facet && facet.supports(&diff.selector) => {
                    table.set(diff.selector.clone(), facet);
                }
                _ => return Err(ContractError::RouteConflict),
            }
        }
        CutAction::Remove => {
            if current.is_none() || diff.facet.is_some() {
                return Err(ContractError::RouteConflict);
            }
            table.remove(diff.selector.clone());
        }
    }
    Ok(current)
}

/// Applies `diffs` as one unit, then runs `init` if given.
///
/// Every diff is validated against a working copy first; the stored table
/// is only written once the whole batch has been accepted.
pub fn cut(
    env: &Env,
    diffs: &Vec<RouteDiff>,
    init: &Option<Initializer>,
) -> Result<(), ContractError> {
    if diffs.is_empty() && init.is_none() {
        return Err(ContractError::InvalidInput);
    }

    let mut working = table(env)?;
    let mut previous = Vec::new(env);
    for diff in diffs.iter() {
        previous.push_back(apply_diff(&mut working, &diff)?);
    }
    save_table(env, &working);

    for (diff, before) in diffs.iter().zip(previous.iter()) {
        events::publish_route_changed(env, diff.selector, diff.action, before, diff.facet);
    }

    if let Some(initializer) = init {
        migrations::run(env, initializer)?;
    }

    events::publish_cut_applied(env, diffs.len(), init.clone());
    Ok(())
}

// ── Loupe ────────────────────────────────────────────────────────────────────

pub fn facets(env: &Env) -> Result<Vec<FacetRoutes>, ContractError> {
    let mut grouped: Map<Facet, Vec<Symbol>> = Map::new(env);
    for (selector, facet) in table(env)?.iter() {
        let mut selectors = grouped.get(facet).unwrap_or(Vec::new(env));
        selectors.push_back(selector);
        grouped.set(facet, selectors);
    }

    let mut out = Vec::new(env);
    for (facet, selectors) in grouped.iter() {
        out.push_back(FacetRoutes { facet, selectors });
    }
    Ok(out)
}

pub fn facet_selectors(env: &Env, facet: Facet) -> Result<Vec<Symbol>, ContractError> {
    let mut out = Vec::new(env);
    for (selector, bound) in table(env)?.iter() {
        if bound == facet {
            out.push_back(selector);
        }
    }
    Ok(out)
}

pub fn facet_of(env: &Env, selector: &Symbol) -> Result<Option<Facet>, ContractError> {
    Ok(table(env)?.get(selector.clone()))
}
