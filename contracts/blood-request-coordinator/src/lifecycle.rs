// lifecycle.rs - Blood request state machine
//
//   PENDING  -> APPROVED (donor accepts / hospital reserves stock)
//   PENDING  -> REJECTED (hospital or admin) | CANCELLED (patient)
//   APPROVED -> COMPLETED (donor, patient or hospital)
//   APPROVED -> PENDING (patient releases the assigned donor)
//
// Every operation runs in one contract invocation; an `Err` return discards
// all writes made before it, including stock reservations.

use crate::error::ContractError;
use crate::events;
use crate::geo;
use crate::notifications;
use crate::registry;
use crate::stock;
use crate::storage;
use crate::types::{
    BloodGroup, BloodRequest, Config, Donation, NotificationKind, RequestStatus, Role,
    UrgencyLevel,
};
use soroban_sdk::{Address, Env};

pub const MAX_UNITS_PER_REQUEST: u32 = 50;

pub fn load(env: &Env, request_id: u64) -> Result<BloodRequest, ContractError> {
    storage::get_request(env, request_id).ok_or(ContractError::RequestNotFound)
}

/// Error reported when a request is not in the state `next` requires
fn invalid_transition(next: RequestStatus) -> ContractError {
    match next {
        RequestStatus::Completed | RequestStatus::Pending => ContractError::RequestNotApproved,
        _ => ContractError::RequestAlreadyProcessed,
    }
}

/// Move `request` to `next`, persist it and maintain the open/active indexes
fn transition(
    env: &Env,
    request: &mut BloodRequest,
    next: RequestStatus,
    processed_by: Option<Address>,
) -> Result<RequestStatus, ContractError> {
    if !request.status.can_transition_to(next) {
        return Err(invalid_transition(next));
    }

    let old_status = request.status;
    request.status = next;
    request.processed_by = processed_by;
    request.updated_at = env.ledger().timestamp();

    if next.is_terminal() {
        storage::unindex_request(env, request);
        if storage::get_active_request(env, &request.patient) == Some(request.id) {
            storage::clear_active_request(env, &request.patient);
        }
    }

    storage::set_request(env, request);
    events::emit_status_changed(env, request, old_status);
    Ok(old_status)
}

/// True when `requester` still owns a PENDING or APPROVED request
fn has_active_request(env: &Env, requester: &Address) -> bool {
    storage::get_active_request(env, requester)
        .and_then(|id| storage::get_request(env, id))
        .map(|request| request.status.is_active())
        .unwrap_or(false)
}

/// True when `donor` is the assignee of another APPROVED request
fn has_active_assignment(env: &Env, donor: &Address) -> bool {
    storage::get_donor_assignment(env, donor)
        .and_then(|id| storage::get_request(env, id))
        .map(|request| {
            request.status == RequestStatus::Approved
                && request.processed_by.as_ref() == Some(donor)
        })
        .unwrap_or(false)
}

fn is_donor(env: &Env, address: &Address) -> bool {
    storage::get_user(env, address)
        .map(|profile| profile.role == Role::Donor)
        .unwrap_or(false)
}

pub fn create_request(
    env: &Env,
    requester: &Address,
    blood_group: BloodGroup,
    units: u32,
    latitude_e6: i64,
    longitude_e6: i64,
    urgency: UrgencyLevel,
) -> Result<BloodRequest, ContractError> {
    storage::get_config(env)?;

    let location = geo::point(latitude_e6, longitude_e6)?;
    if units == 0 || units > MAX_UNITS_PER_REQUEST {
        return Err(ContractError::InvalidUnits);
    }

    let profile = registry::require_user(env, requester)?;
    if !matches!(profile.role, Role::Patient | Role::Hospital) {
        return Err(ContractError::RoleNotPermitted);
    }
    if profile.is_blocked {
        return Err(ContractError::AccountBlocked);
    }
    if has_active_request(env, requester) {
        return Err(ContractError::ActiveRequestExists);
    }

    let now = env.ledger().timestamp();
    let request = BloodRequest {
        id: storage::next_request_id(env),
        patient: requester.clone(),
        blood_group,
        units,
        urgency,
        status: RequestStatus::Pending,
        location,
        processed_by: None,
        created_at: now,
        updated_at: now,
    };

    storage::set_request(env, &request);
    storage::index_request(env, &request);
    storage::add_patient_request(env, requester, request.id);
    storage::set_active_request(env, requester, request.id);

    // Side effects only after the record is in place
    events::emit_request_created(env, &request);
    notifications::enqueue(
        env,
        requester,
        NotificationKind::RequestCreated,
        Some(request.id),
    );
    notifications::enqueue_urgent_broadcast(env, request.id);

    Ok(request)
}

pub fn accept_by_donor(
    env: &Env,
    request_id: u64,
    donor: &Address,
) -> Result<BloodRequest, ContractError> {
    let config = storage::get_config(env)?;
    let mut request = load(env, request_id)?;
    if request.status != RequestStatus::Pending {
        return Err(ContractError::RequestAlreadyProcessed);
    }

    let profile = registry::require_role(env, donor, Role::Donor)?;
    let now = env.ledger().timestamp();
    if profile.blood_group != Some(request.blood_group)
        || !registry::is_eligible_donor(&profile, now, config.donation_cooldown_days)
    {
        return Err(ContractError::DonorNotEligible);
    }
    if has_active_assignment(env, donor) {
        return Err(ContractError::DonorHasActiveAssignment);
    }

    transition(env, &mut request, RequestStatus::Approved, Some(donor.clone()))?;
    storage::set_donor_assignment(env, donor, request.id);

    notifications::enqueue(
        env,
        &request.patient,
        NotificationKind::RequestAccepted,
        Some(request.id),
    );
    Ok(request)
}

/// Reserve stock and assign the hospital; only a pending request takes stock
pub fn approve_by_hospital(
    env: &Env,
    request_id: u64,
    hospital: &Address,
) -> Result<BloodRequest, ContractError> {
    let mut request = load(env, request_id)?;
    if request.status != RequestStatus::Pending {
        return Err(ContractError::RequestAlreadyProcessed);
    }

    stock::reserve(env, hospital, request.blood_group, request.units)?;
    transition(
        env,
        &mut request,
        RequestStatus::Approved,
        Some(hospital.clone()),
    )?;

    notifications::enqueue(
        env,
        &request.patient,
        NotificationKind::RequestApproved,
        Some(request.id),
    );
    Ok(request)
}

pub fn reject_by_hospital(
    env: &Env,
    request_id: u64,
    hospital: &Address,
) -> Result<BloodRequest, ContractError> {
    registry::require_hospital(env, hospital)?;
    reject(env, request_id, hospital)
}

pub fn reject_by_admin(env: &Env, request_id: u64) -> Result<BloodRequest, ContractError> {
    let admin = storage::get_config(env)?.admin;
    reject(env, request_id, &admin)
}

fn reject(env: &Env, request_id: u64, rejecter: &Address) -> Result<BloodRequest, ContractError> {
    let mut request = load(env, request_id)?;

    transition(
        env,
        &mut request,
        RequestStatus::Rejected,
        Some(rejecter.clone()),
    )?;

    notifications::enqueue(
        env,
        &request.patient,
        NotificationKind::RequestRejected,
        Some(request.id),
    );
    Ok(request)
}

pub fn cancel(env: &Env, request_id: u64, patient: &Address) -> Result<BloodRequest, ContractError> {
    let mut request = load(env, request_id)?;
    if request.patient != *patient {
        return Err(ContractError::NotRequestOwner);
    }

    transition(env, &mut request, RequestStatus::Cancelled, None)?;
    Ok(request)
}

/// Patient releases the donor assigned to their request; no stock moves
/// because donor assignments never reserve any.
pub fn reject_donor_by_patient(
    env: &Env,
    request_id: u64,
    patient: &Address,
) -> Result<BloodRequest, ContractError> {
    let mut request = load(env, request_id)?;
    if request.patient != *patient {
        return Err(ContractError::NotRequestOwner);
    }
    if request.status != RequestStatus::Approved {
        return Err(ContractError::RequestNotApproved);
    }
    let donor = match &request.processed_by {
        Some(assignee) if is_donor(env, assignee) => assignee.clone(),
        _ => return Err(ContractError::NoDonorAssigned),
    };

    transition(env, &mut request, RequestStatus::Pending, None)?;
    storage::clear_donor_assignment(env, &donor);

    notifications::enqueue(
        env,
        &donor,
        NotificationKind::DonorRejected,
        Some(request.id),
    );
    Ok(request)
}

/// Completion by the assigned party or the patient
pub fn complete(env: &Env, request_id: u64, caller: &Address) -> Result<BloodRequest, ContractError> {
    let config = storage::get_config(env)?;
    let mut request = load(env, request_id)?;

    let is_patient = request.patient == *caller;
    let is_assignee = request.processed_by.as_ref() == Some(caller);
    if !is_patient && !is_assignee {
        return Err(ContractError::NotAssignedParty);
    }

    let assignee = request.processed_by.clone();
    transition(env, &mut request, RequestStatus::Completed, assignee.clone())?;

    let donor = assignee.unwrap_or_else(|| caller.clone());
    record_donation(env, &config, &request, &donor);

    let counterparty = if is_patient { &donor } else { &request.patient };
    notifications::enqueue(
        env,
        counterparty,
        NotificationKind::RequestCompleted,
        Some(request.id),
    );
    Ok(request)
}

/// Hospital closes an approved request it reserved stock for
pub fn fulfill_by_hospital(
    env: &Env,
    request_id: u64,
    hospital: &Address,
) -> Result<BloodRequest, ContractError> {
    let config = storage::get_config(env)?;
    registry::require_hospital(env, hospital)?;
    let mut request = load(env, request_id)?;

    if request.status != RequestStatus::Approved {
        return Err(ContractError::RequestNotApproved);
    }
    if request.processed_by.as_ref() != Some(hospital) {
        return Err(ContractError::NotAssignedParty);
    }

    transition(
        env,
        &mut request,
        RequestStatus::Completed,
        Some(hospital.clone()),
    )?;
    record_donation(env, &config, &request, hospital);

    notifications::enqueue(
        env,
        &request.patient,
        NotificationKind::RequestCompleted,
        Some(request.id),
    );
    Ok(request)
}

/// Write the donation audit record and credit the donor when it is one
fn record_donation(env: &Env, config: &Config, request: &BloodRequest, donor: &Address) -> Donation {
    let donation = Donation {
        id: storage::next_donation_id(env),
        donor: donor.clone(),
        patient: request.patient.clone(),
        request_id: request.id,
        blood_group: request.blood_group,
        units: request.units,
        donated_at: env.ledger().timestamp(),
    };
    storage::add_donation(env, &donation);

    if let Some(mut profile) = storage::get_user(env, donor) {
        if profile.role == Role::Donor {
            registry::credit_donation(env, &mut profile, config.impact_award);
            storage::clear_donor_assignment(env, donor);
        }
    }

    events::emit_donation_recorded(env, &donation);
    donation
}
