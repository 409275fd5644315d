// matching.rs - Proximity discovery of donors and open requests
// Results are nearest first; candidates come only from the grid cells the
// search circle covers.

use crate::error::ContractError;
use crate::geo;
use crate::notifications;
use crate::registry;
use crate::storage;
use crate::types::{
    BloodGroup, BloodRequest, Config, DonorEntry, GeoPoint, JobTarget, NotificationKind,
    RequestStatus, UserProfile,
};
use soroban_sdk::{log, Env, Vec};

/// First index whose key is greater than `key`; equal keys keep arrival order
fn insertion_index(keys: &Vec<i128>, key: i128) -> u32 {
    let mut index = 0;
    for existing in keys.iter() {
        if existing > key {
            break;
        }
        index += 1;
    }
    index
}

/// Like `insertion_index`, but equal keys put the higher (newer) id first
fn request_insertion_index(keys: &Vec<i128>, ids: &Vec<u64>, key: i128, id: u64) -> u32 {
    let mut index = 0;
    while index < keys.len() {
        let existing = keys.get_unchecked(index);
        if existing > key || (existing == key && ids.get_unchecked(index) < id) {
            break;
        }
        index += 1;
    }
    index
}

/// Index entries of `blood_group` inside the cells covering the circle.
/// These are the only donor records a proximity query touches.
pub fn donor_candidates(
    env: &Env,
    center: &GeoPoint,
    radius_km: u32,
    blood_group: BloodGroup,
) -> Vec<DonorEntry> {
    let mut candidates = Vec::new(env);
    for cell in geo::covering_cells(env, center, radius_km).iter() {
        candidates.append(&storage::get_donor_cell(env, blood_group, cell));
    }
    candidates
}

/// Eligible donors of `blood_group` within `radius_km` of `center`
pub fn nearby_donors(
    env: &Env,
    config: &Config,
    center: &GeoPoint,
    radius_km: u32,
    blood_group: BloodGroup,
) -> Vec<UserProfile> {
    let limit = geo::radius_limit(radius_km);
    let now = env.ledger().timestamp();

    let mut keys: Vec<i128> = Vec::new(env);
    let mut donors: Vec<UserProfile> = Vec::new(env);

    for entry in donor_candidates(env, center, radius_km, blood_group).iter() {
        // Distance first: profiles are read only for donors inside the circle
        let Some(key) = geo::within(center, &entry.location, limit) else {
            continue;
        };
        let Some(profile) = storage::get_user(env, &entry.address) else {
            continue;
        };
        if !registry::is_eligible_donor(&profile, now, config.donation_cooldown_days) {
            continue;
        }
        let index = insertion_index(&keys, key);
        keys.insert(index, key);
        donors.insert(index, profile);
    }

    donors
}

/// Pending or approved requests within `radius_km`, nearest first and
/// newest first among equally distant ones
pub fn nearby_requests(
    env: &Env,
    center: &GeoPoint,
    radius_km: u32,
    blood_group: Option<BloodGroup>,
) -> Vec<BloodRequest> {
    let limit = geo::radius_limit(radius_km);

    let mut keys: Vec<i128> = Vec::new(env);
    let mut ids: Vec<u64> = Vec::new(env);
    let mut requests: Vec<BloodRequest> = Vec::new(env);

    for cell in geo::covering_cells(env, center, radius_km).iter() {
        for id in storage::get_request_cell(env, cell).iter() {
            let Some(request) = storage::get_request(env, id) else {
                continue;
            };
            if !request.status.is_active() {
                continue;
            }
            if let Some(group) = blood_group {
                if request.blood_group != group {
                    continue;
                }
            }
            if let Some(key) = geo::within(center, &request.location, limit) {
                let index = request_insertion_index(&keys, &ids, key, request.id);
                keys.insert(index, key);
                ids.insert(index, request.id);
                requests.insert(index, request);
            }
        }
    }

    requests
}

pub fn find_nearby_donors(
    env: &Env,
    latitude_e6: i64,
    longitude_e6: i64,
    radius_km: u32,
    blood_group: BloodGroup,
) -> Result<Vec<UserProfile>, ContractError> {
    let config = storage::get_config(env)?;
    let center = geo::point(latitude_e6, longitude_e6)?;
    geo::validate_radius(radius_km)?;

    Ok(nearby_donors(env, &config, &center, radius_km, blood_group))
}

pub fn find_nearby_requests(
    env: &Env,
    latitude_e6: i64,
    longitude_e6: i64,
    radius_km: u32,
    blood_group: Option<BloodGroup>,
) -> Result<Vec<BloodRequest>, ContractError> {
    let center = geo::point(latitude_e6, longitude_e6)?;
    geo::validate_radius(radius_km)?;

    Ok(nearby_requests(env, &center, radius_km, blood_group))
}

/// Queue an urgent notification for every eligible donor inside the fixed
/// urgent radius, appending the new job ids to `outbox`. Runs from the
/// dispatcher; a request that is no longer pending alerts nobody.
/// Returns how many donors were alerted.
pub fn notify_urgent_nearby(
    env: &Env,
    config: &Config,
    request_id: u64,
    outbox: &mut Vec<u64>,
) -> u32 {
    let Some(request) = storage::get_request(env, request_id) else {
        log!(env, "urgent broadcast for missing request {}", request_id);
        return 0;
    };
    if request.status != RequestStatus::Pending {
        log!(env, "request {} already handled, skipping broadcast", request.id);
        return 0;
    }

    let donors = nearby_donors(
        env,
        config,
        &request.location,
        config.urgent_radius_km,
        request.blood_group,
    );

    if donors.is_empty() {
        log!(env, "no eligible donors near request {}", request.id);
        return 0;
    }

    for donor in donors.iter() {
        let job = notifications::queue(
            env,
            JobTarget::Recipient(donor.address),
            NotificationKind::UrgentNearby,
            Some(request.id),
        );
        outbox.push_back(job);
    }
    donors.len()
}
