use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

// ── Storage Keys ─────────────────────────────────────────────────────────────

const ADMIN_TIER_PREFIX: Symbol = symbol_short!("ADM_TIER");
const OWNER: Symbol = symbol_short!("OWNER");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

// ── Admin Tier Enum ──────────────────────────────────────────────────────────

/// Three-tier admin hierarchy for a staking pool.
///
/// - `Operator` – may pause and unpause inflows.
/// - `Manager`  – may change pool configuration (release policy, reward
///                tokens, router, slippage) and trigger sweeps.
/// - `Owner`    – everything above, plus granting and revoking tiers.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum AdminTier {
    Operator = 1,
    Manager = 2,
    Owner = 3,
}

impl AdminTier {
    pub fn rank(&self) -> u32 {
        match self {
            AdminTier::Operator => 1,
            AdminTier::Manager => 2,
            AdminTier::Owner => 3,
        }
    }

    /// Returns true if this tier is at least as high as `min_tier`.
    pub fn has_at_least(&self, min_tier: &AdminTier) -> bool {
        self.rank() >= min_tier.rank()
    }
}

fn tier_key(admin: &Address) -> (Symbol, Address) {
    (ADMIN_TIER_PREFIX, admin.clone())
}

fn extend_ttl(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Core Functions ───────────────────────────────────────────────────────────

/// Assigns `tier` to `admin`. Callers must verify authorization beforehand.
pub fn set_tier(env: &Env, admin: &Address, tier: AdminTier) {
    let key = tier_key(admin);
    env.storage().persistent().set(&key, &tier);
    extend_ttl(env, &key);
}

pub fn get_tier(env: &Env, admin: &Address) -> Option<AdminTier> {
    let key = tier_key(admin);
    let tier: Option<AdminTier> = env.storage().persistent().get(&key);
    if tier.is_some() {
        extend_ttl(env, &key);
    }
    tier
}

pub fn clear_tier(env: &Env, admin: &Address) {
    env.storage().persistent().remove(&tier_key(admin));
}

/// Returns `true` when `caller` holds at least `min_tier`.
pub fn has_tier(env: &Env, caller: &Address, min_tier: &AdminTier) -> bool {
    get_tier(env, caller)
        .map(|tier| tier.has_at_least(min_tier))
        .unwrap_or(false)
}

/// Records the bootstrap owner and grants it the `Owner` tier.
pub fn bootstrap_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&OWNER, owner);
    set_tier(env, owner, AdminTier::Owner);
}

pub fn bootstrap_owner_address(env: &Env) -> Option<Address> {
    env.storage().instance().get(&OWNER)
}

// ── Promote / Demote ─────────────────────────────────────────────────────────

/// Grants `tier` to `target`. Returns `false` if `caller` is not an `Owner`.
///
/// `caller` must already have passed `require_auth()`.
pub fn promote(env: &Env, caller: &Address, target: &Address, tier: AdminTier) -> bool {
    if !has_tier(env, caller, &AdminTier::Owner) {
        return false;
    }
    set_tier(env, target, tier);
    true
}

/// Removes any tier held by `target`. Returns `false` if `caller` is not an
/// `Owner`, or if the demotion would remove the bootstrap owner.
pub fn demote(env: &Env, caller: &Address, target: &Address) -> bool {
    if !has_tier(env, caller, &AdminTier::Owner) {
        return false;
    }
    if bootstrap_owner_address(env).as_ref() == Some(target) {
        return false;
    }
    clear_tier(env, target);
    true
}
