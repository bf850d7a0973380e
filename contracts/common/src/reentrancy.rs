//! Re-entrancy lock backed by instance storage.
//!
//! A state-mutating entry point calls [`enter`] before touching any state and
//! [`exit`] once its effects and interactions are complete. If the entry point
//! fails, the host rolls the lock write back together with everything else.

use soroban_sdk::{symbol_short, Env, Symbol};

const LOCKED: Symbol = symbol_short!("LOCKED");

/// Takes the lock. Returns `false` if it is already held.
pub fn enter(env: &Env) -> bool {
    if is_locked(env) {
        return false;
    }
    env.storage().instance().set(&LOCKED, &true);
    true
}

pub fn exit(env: &Env) {
    env.storage().instance().remove(&LOCKED);
}

pub fn is_locked(env: &Env) -> bool {
    env.storage().instance().get(&LOCKED).unwrap_or(false)
}
