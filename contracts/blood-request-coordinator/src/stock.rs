// stock.rs - Per-hospital blood unit ledger
// Counters change only through `adjust`, which never leaves a negative value.

use crate::error::ContractError;
use crate::events;
use crate::registry;
use crate::storage;
use crate::types::{BloodGroup, StockReport};
use soroban_sdk::{Address, Env};

/// Apply a signed delta to one counter of a verified hospital.
///
/// The read-modify-write runs inside a single contract invocation, so
/// concurrent adjustments of the same hospital are serialized on its
/// `Stock` ledger entry.
pub fn adjust(
    env: &Env,
    hospital: &Address,
    blood_group: BloodGroup,
    delta: i64,
) -> Result<u32, ContractError> {
    registry::require_hospital(env, hospital)?;

    let current = storage::get_stock(env, hospital);
    let updated = current.with_delta(blood_group, delta)?;
    storage::set_stock(env, hospital, &updated);

    let units = updated.units(blood_group);
    events::emit_stock_adjusted(env, hospital, blood_group, delta, units);
    Ok(units)
}

/// Reserve `units` for an approval
pub fn reserve(
    env: &Env,
    hospital: &Address,
    blood_group: BloodGroup,
    units: u32,
) -> Result<u32, ContractError> {
    adjust(env, hospital, blood_group, -(units as i64))
}

pub fn read(env: &Env, hospital: &Address) -> Result<StockReport, ContractError> {
    registry::require_hospital(env, hospital)?;
    let threshold = storage::get_config(env)?.low_stock_threshold;

    let stock = storage::get_stock(env, hospital);
    let low_stock = stock.below(env, threshold);
    Ok(StockReport {
        hospital: hospital.clone(),
        stock,
        low_stock,
        threshold,
    })
}
