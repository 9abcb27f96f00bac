//! Call-scoped reentrancy lock.
//!
//! The flag lives in instance storage, so a failed invocation rolls it back
//! together with everything else the call wrote.

use soroban_sdk::{symbol_short, Env, Symbol};

const LOCKED: Symbol = symbol_short!("LOCKED");

pub fn is_locked(env: &Env) -> bool {
    env.storage().instance().get(&LOCKED).unwrap_or(false)
}

/// Takes the lock. Returns `false` if it is already held.
pub fn enter(env: &Env) -> bool {
    if is_locked(env) {
        return false;
    }
    env.storage().instance().set(&LOCKED, &true);
    true
}

pub fn exit(env: &Env) {
    env.storage().instance().set(&LOCKED, &false);
}
