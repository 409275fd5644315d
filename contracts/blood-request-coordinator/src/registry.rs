// registry.rs - Account records the lifecycle depends on
// Role, verification and blocking gates; donor eligibility for matching.

use crate::error::ContractError;
use crate::geo;
use crate::storage;
use crate::types::{BloodGroup, Rank, Role, UserProfile, SECONDS_PER_DAY};
use soroban_sdk::{Address, Env};

pub fn register(
    env: &Env,
    address: &Address,
    role: Role,
    blood_group: Option<BloodGroup>,
    latitude_e6: i64,
    longitude_e6: i64,
) -> Result<UserProfile, ContractError> {
    if storage::get_user(env, address).is_some() {
        return Err(ContractError::AlreadyRegistered);
    }
    if role == Role::Admin {
        return Err(ContractError::InvalidRole);
    }
    if role == Role::Donor && blood_group.is_none() {
        return Err(ContractError::MissingBloodGroup);
    }
    let location = geo::point(latitude_e6, longitude_e6)?;

    let profile = UserProfile {
        address: address.clone(),
        role,
        blood_group,
        location,
        is_available: role == Role::Donor,
        // Hospitals wait for the admin; everyone else is verified on sign-up
        is_verified: role != Role::Hospital,
        is_blocked: false,
        last_donation_at: None,
        impact_points: 0,
        rank: Rank::Novice,
        registered_at: env.ledger().timestamp(),
    };

    storage::set_user(env, &profile);
    if let (Role::Donor, Some(group)) = (role, blood_group) {
        storage::index_donor(env, group, address, &location);
    }

    Ok(profile)
}

pub fn require_user(env: &Env, address: &Address) -> Result<UserProfile, ContractError> {
    storage::get_user(env, address).ok_or(ContractError::UserNotFound)
}

/// Unblocked account holding `role`
pub fn require_role(env: &Env, address: &Address, role: Role) -> Result<UserProfile, ContractError> {
    let profile = require_user(env, address)?;
    if profile.role != role {
        return Err(ContractError::RoleNotPermitted);
    }
    if profile.is_blocked {
        return Err(ContractError::AccountBlocked);
    }
    Ok(profile)
}

/// Verified, unblocked hospital
pub fn require_hospital(env: &Env, address: &Address) -> Result<UserProfile, ContractError> {
    let profile = require_role(env, address, Role::Hospital)?;
    if !profile.is_verified {
        return Err(ContractError::HospitalNotVerified);
    }
    Ok(profile)
}

/// Cooldown is satisfied once `cooldown_days` full days have elapsed
pub fn cooldown_elapsed(last_donation_at: Option<u64>, now: u64, cooldown_days: u32) -> bool {
    match last_donation_at {
        None => true,
        Some(last) => now >= last.saturating_add(cooldown_days as u64 * SECONDS_PER_DAY),
    }
}

pub fn is_eligible_donor(profile: &UserProfile, now: u64, cooldown_days: u32) -> bool {
    profile.role == Role::Donor
        && profile.is_verified
        && !profile.is_blocked
        && profile.is_available
        && cooldown_elapsed(profile.last_donation_at, now, cooldown_days)
}

pub fn set_location(
    env: &Env,
    address: &Address,
    latitude_e6: i64,
    longitude_e6: i64,
) -> Result<UserProfile, ContractError> {
    let mut profile = require_user(env, address)?;
    let location = geo::point(latitude_e6, longitude_e6)?;

    if let (Role::Donor, Some(group)) = (profile.role, profile.blood_group) {
        storage::unindex_donor(env, group, address, &profile.location);
        storage::index_donor(env, group, address, &location);
    }

    profile.location = location;
    storage::set_user(env, &profile);
    Ok(profile)
}

pub fn set_availability(
    env: &Env,
    donor: &Address,
    available: bool,
) -> Result<UserProfile, ContractError> {
    let mut profile = require_role(env, donor, Role::Donor)?;
    profile.is_available = available;
    storage::set_user(env, &profile);
    Ok(profile)
}

pub fn set_verified(env: &Env, address: &Address, verified: bool) -> Result<UserProfile, ContractError> {
    let mut profile = require_user(env, address)?;
    profile.is_verified = verified;
    storage::set_user(env, &profile);
    Ok(profile)
}

pub fn set_blocked(env: &Env, address: &Address, blocked: bool) -> Result<UserProfile, ContractError> {
    let mut profile = require_user(env, address)?;
    profile.is_blocked = blocked;
    storage::set_user(env, &profile);
    Ok(profile)
}

/// Stamp a completed donation on the donor's profile
pub fn credit_donation(env: &Env, donor: &mut UserProfile, impact_award: u32) {
    donor.last_donation_at = Some(env.ledger().timestamp());
    donor.is_available = false;
    donor.impact_points = donor.impact_points.saturating_add(impact_award);
    donor.rank = Rank::for_points(donor.impact_points);
    storage::set_user(env, donor);
}
