use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

// ── Storage Keys ─────────────────────────────────────────────────────────────

const OWNER: Symbol = symbol_short!("OWNER");
const ROLE_PREFIX: Symbol = symbol_short!("ROLE");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

// ── Role Enum ────────────────────────────────────────────────────────────────

/// Privilege levels understood by the access gate.
///
/// - `PoolManager` – may create pools and change pool weights.
/// - `Owner`       – may do everything, including routing upgrades, decay
///                   migrations and role management. Only the stored owner
///                   holds it; it cannot be granted.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Role {
    PoolManager = 1,
    Owner = 2,
}

impl Role {
    pub fn rank(&self) -> u32 {
        *self as u32
    }

    /// Returns true if this role is at least as privileged as `required`.
    pub fn covers(&self, required: Role) -> bool {
        self.rank() >= required.rank()
    }
}

fn role_key(who: &Address) -> (Symbol, Address) {
    (ROLE_PREFIX, who.clone())
}

// ── Owner ────────────────────────────────────────────────────────────────────

pub fn owner(env: &Env) -> Option<Address> {
    env.storage().instance().get(&OWNER)
}

/// Replaces the owner. Callers must verify authorization beforehand.
///
/// Returns the previous owner, if one was set.
pub fn set_owner(env: &Env, new_owner: &Address) -> Option<Address> {
    let previous = owner(env);
    env.storage().instance().set(&OWNER, new_owner);
    previous
}

pub fn is_owner(env: &Env, who: &Address) -> bool {
    owner(env).map_or(false, |o| o == *who)
}

// ── Roles ────────────────────────────────────────────────────────────────────

/// Effective role of `who`: the owner always resolves to `Role::Owner`.
pub fn role_of(env: &Env, who: &Address) -> Option<Role> {
    if is_owner(env, who) {
        return Some(Role::Owner);
    }
    let key = role_key(who);
    let role: Option<Role> = env.storage().persistent().get(&key);
    if role.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    role
}

/// Returns `true` if `who` holds at least `required`.
pub fn has_role(env: &Env, who: &Address, required: Role) -> bool {
    role_of(env, who).map_or(false, |r| r.covers(required))
}

/// Stores `role` for `who`. `Role::Owner` is not grantable.
///
/// Returns `false` without writing anything if the grant is not allowed.
pub fn grant(env: &Env, who: &Address, role: Role) -> bool {
    if role == Role::Owner {
        return false;
    }
    let key = role_key(who);
    env.storage().persistent().set(&key, &role);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    true
}

/// Removes any stored role for `who`. Returns `true` if one existed.
pub fn revoke(env: &Env, who: &Address) -> bool {
    let key = role_key(who);
    if !env.storage().persistent().has(&key) {
        return false;
    }
    env.storage().persistent().remove(&key);
    true
}
