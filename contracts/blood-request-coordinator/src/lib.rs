#![no_std]

mod error;
mod events;
mod geo;
mod lifecycle;
mod matching;
mod notifications;
mod registry;
mod stock;
mod storage;
mod types;

pub use crate::error::{ContractError, ErrorKind};
pub use crate::lifecycle::MAX_UNITS_PER_REQUEST;
pub use crate::notifications::MAX_DISPATCH_ATTEMPTS;
pub use crate::types::*;

use soroban_sdk::{contract, contractimpl, Address, Env, Vec};

pub const DEFAULT_URGENT_RADIUS_KM: u32 = 5;
pub const DEFAULT_DONATION_COOLDOWN_DAYS: u32 = 90;
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;
pub const DEFAULT_IMPACT_AWARD: u32 = 10;

#[contract]
pub struct BloodRequestCoordinator;

#[contractimpl]
impl BloodRequestCoordinator {
    /// Initialize the coordinator
    ///
    /// # Arguments
    /// * `admin` - Account that verifies hospitals and may reject requests
    /// * `notification_gateway` - Contract receiving queued notifications
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract has already been initialized
    pub fn initialize(
        env: Env,
        admin: Address,
        notification_gateway: Address,
    ) -> Result<(), ContractError> {
        admin.require_auth();

        if storage::is_initialized(&env) {
            return Err(ContractError::AlreadyInitialized);
        }

        storage::set_config(
            &env,
            &Config {
                admin,
                notification_gateway,
                urgent_radius_km: DEFAULT_URGENT_RADIUS_KM,
                donation_cooldown_days: DEFAULT_DONATION_COOLDOWN_DAYS,
                low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
                impact_award: DEFAULT_IMPACT_AWARD,
            },
        );

        Ok(())
    }

    /// Replace the tunable parameters (admin only)
    ///
    /// # Errors
    /// - `InvalidConfig`: Zero radius/cooldown or a radius above the search limit
    pub fn update_config(
        env: Env,
        notification_gateway: Address,
        urgent_radius_km: u32,
        donation_cooldown_days: u32,
        low_stock_threshold: u32,
        impact_award: u32,
    ) -> Result<Config, ContractError> {
        let mut config = storage::get_config(&env)?;
        config.admin.require_auth();

        if geo::validate_radius(urgent_radius_km).is_err() || donation_cooldown_days == 0 {
            return Err(ContractError::InvalidConfig);
        }

        config.notification_gateway = notification_gateway;
        config.urgent_radius_km = urgent_radius_km;
        config.donation_cooldown_days = donation_cooldown_days;
        config.low_stock_threshold = low_stock_threshold;
        config.impact_award = impact_award;
        storage::set_config(&env, &config);

        Ok(config)
    }

    pub fn get_config(env: Env) -> Result<Config, ContractError> {
        storage::get_config(&env)
    }

    // ========== Accounts ==========

    /// Register a donor, patient or hospital at a location
    ///
    /// # Errors
    /// - `AlreadyRegistered`: Address already has a profile
    /// - `InvalidRole`: Admin accounts cannot self-register
    /// - `MissingBloodGroup`: Donors must declare a blood group
    /// - `InvalidCoordinates`: Latitude/longitude out of range
    pub fn register_user(
        env: Env,
        user: Address,
        role: Role,
        blood_group: Option<BloodGroup>,
        latitude_e6: i64,
        longitude_e6: i64,
    ) -> Result<UserProfile, ContractError> {
        user.require_auth();
        storage::get_config(&env)?;

        registry::register(&env, &user, role, blood_group, latitude_e6, longitude_e6)
    }

    pub fn update_location(
        env: Env,
        user: Address,
        latitude_e6: i64,
        longitude_e6: i64,
    ) -> Result<UserProfile, ContractError> {
        user.require_auth();
        registry::set_location(&env, &user, latitude_e6, longitude_e6)
    }

    pub fn set_availability(
        env: Env,
        donor: Address,
        available: bool,
    ) -> Result<UserProfile, ContractError> {
        donor.require_auth();
        registry::set_availability(&env, &donor, available)
    }

    /// Verify or un-verify an account (admin only)
    pub fn set_verified(
        env: Env,
        user: Address,
        verified: bool,
    ) -> Result<UserProfile, ContractError> {
        storage::get_config(&env)?.admin.require_auth();
        registry::set_verified(&env, &user, verified)
    }

    /// Block or unblock an account (admin only)
    pub fn set_blocked(env: Env, user: Address, blocked: bool) -> Result<UserProfile, ContractError> {
        storage::get_config(&env)?.admin.require_auth();
        registry::set_blocked(&env, &user, blocked)
    }

    pub fn get_user(env: Env, user: Address) -> Result<UserProfile, ContractError> {
        registry::require_user(&env, &user)
    }

    // ========== Request lifecycle ==========

    /// Raise an emergency blood request
    ///
    /// # Arguments
    /// * `requester` - Patient or hospital raising the request
    /// * `blood_group` - Blood group needed
    /// * `units` - Units needed (1-50)
    /// * `latitude_e6`, `longitude_e6` - Location in micro-degrees
    /// * `urgency` - Informational priority
    ///
    /// # Errors
    /// - `InvalidCoordinates`, `InvalidUnits`: Malformed input
    /// - `UserNotFound`: Requester is not registered
    /// - `RoleNotPermitted`: Requester is not a patient or hospital
    /// - `AccountBlocked`: Requester is blocked
    /// - `ActiveRequestExists`: Requester already has a pending or approved request
    ///
    /// # Events
    /// Emits `new_emergency` to the broadcast room, queues a notification for
    /// the requester and an urgent broadcast that `dispatch_notifications`
    /// expands for eligible donors inside the urgent radius
    pub fn create_request(
        env: Env,
        requester: Address,
        blood_group: BloodGroup,
        units: u32,
        latitude_e6: i64,
        longitude_e6: i64,
        urgency: UrgencyLevel,
    ) -> Result<BloodRequest, ContractError> {
        requester.require_auth();
        lifecycle::create_request(
            &env,
            &requester,
            blood_group,
            units,
            latitude_e6,
            longitude_e6,
            urgency,
        )
    }

    /// Donor pledges to serve a pending request
    ///
    /// # Errors
    /// - `RequestNotFound`, `UserNotFound`
    /// - `DonorNotEligible`: Wrong blood group, unavailable or in cooldown
    /// - `DonorHasActiveAssignment`: Donor already serves another approved request
    /// - `RequestAlreadyProcessed`: Request is no longer pending
    pub fn accept_by_donor(
        env: Env,
        request_id: u64,
        donor: Address,
    ) -> Result<BloodRequest, ContractError> {
        donor.require_auth();
        lifecycle::accept_by_donor(&env, request_id, &donor)
    }

    /// Hospital reserves stock for a pending request and takes it over
    ///
    /// # Errors
    /// - `HospitalNotVerified`, `AccountBlocked`, `RoleNotPermitted`
    /// - `InsufficientStock`: Not enough units of the requested group
    /// - `RequestAlreadyProcessed`: Request is no longer pending (no stock is taken)
    pub fn approve_by_hospital(
        env: Env,
        request_id: u64,
        hospital: Address,
    ) -> Result<BloodRequest, ContractError> {
        hospital.require_auth();
        lifecycle::approve_by_hospital(&env, request_id, &hospital)
    }

    pub fn reject_by_hospital(
        env: Env,
        request_id: u64,
        hospital: Address,
    ) -> Result<BloodRequest, ContractError> {
        hospital.require_auth();
        lifecycle::reject_by_hospital(&env, request_id, &hospital)
    }

    pub fn reject_by_admin(env: Env, request_id: u64) -> Result<BloodRequest, ContractError> {
        storage::get_config(&env)?.admin.require_auth();
        lifecycle::reject_by_admin(&env, request_id)
    }

    /// Patient withdraws their own pending request
    pub fn cancel_request(
        env: Env,
        request_id: u64,
        patient: Address,
    ) -> Result<BloodRequest, ContractError> {
        patient.require_auth();
        lifecycle::cancel(&env, request_id, &patient)
    }

    /// Patient releases the donor assigned to their request, reopening it
    ///
    /// # Errors
    /// - `NotRequestOwner`: Caller does not own the request
    /// - `RequestNotApproved`: Request has no live assignment
    /// - `NoDonorAssigned`: Request was approved by a hospital, not a donor
    pub fn reject_donor_by_patient(
        env: Env,
        request_id: u64,
        patient: Address,
    ) -> Result<BloodRequest, ContractError> {
        patient.require_auth();
        lifecycle::reject_donor_by_patient(&env, request_id, &patient)
    }

    /// Mark an approved request completed (assigned party or patient)
    ///
    /// # Errors
    /// - `NotAssignedParty`: Caller is neither the assignee nor the patient
    /// - `RequestNotApproved`: Request is not approved (e.g. already completed)
    pub fn complete_request(
        env: Env,
        request_id: u64,
        caller: Address,
    ) -> Result<BloodRequest, ContractError> {
        caller.require_auth();
        lifecycle::complete(&env, request_id, &caller)
    }

    /// Hospital completes a request it approved with its own stock
    ///
    /// # Errors
    /// - `HospitalNotVerified`, `AccountBlocked`, `RoleNotPermitted`
    /// - `RequestNotApproved`: Request is not approved
    /// - `NotAssignedParty`: Request was approved by a donor or another hospital
    pub fn fulfill_by_hospital(
        env: Env,
        request_id: u64,
        hospital: Address,
    ) -> Result<BloodRequest, ContractError> {
        hospital.require_auth();
        lifecycle::fulfill_by_hospital(&env, request_id, &hospital)
    }

    pub fn get_request(env: Env, request_id: u64) -> Result<BloodRequest, ContractError> {
        lifecycle::load(&env, request_id)
    }

    pub fn get_active_request(env: Env, patient: Address) -> Option<BloodRequest> {
        storage::get_active_request(&env, &patient)
            .and_then(|id| storage::get_request(&env, id))
            .filter(|request| request.status.is_active())
    }

    pub fn get_patient_requests(env: Env, patient: Address) -> Vec<u64> {
        storage::get_patient_requests(&env, &patient)
    }

    pub fn get_assigned_request(env: Env, donor: Address) -> Option<BloodRequest> {
        storage::get_donor_assignment(&env, &donor)
            .and_then(|id| storage::get_request(&env, id))
            .filter(|request| request.status == RequestStatus::Approved)
    }

    // ========== Matching ==========

    /// Eligible donors of a blood group around a point, nearest first
    ///
    /// # Errors
    /// - `InvalidCoordinates`, `InvalidRadius`
    pub fn find_nearby_donors(
        env: Env,
        latitude_e6: i64,
        longitude_e6: i64,
        radius_km: u32,
        blood_group: BloodGroup,
    ) -> Result<Vec<UserProfile>, ContractError> {
        matching::find_nearby_donors(&env, latitude_e6, longitude_e6, radius_km, blood_group)
    }

    /// Pending or approved requests around a point, nearest first
    pub fn find_nearby_requests(
        env: Env,
        latitude_e6: i64,
        longitude_e6: i64,
        radius_km: u32,
        blood_group: Option<BloodGroup>,
    ) -> Result<Vec<BloodRequest>, ContractError> {
        matching::find_nearby_requests(&env, latitude_e6, longitude_e6, radius_km, blood_group)
    }

    // ========== Stock ledger ==========

    /// Apply a signed delta to one of the hospital's counters
    ///
    /// # Returns
    /// The counter's new value
    ///
    /// # Errors
    /// - `HospitalNotVerified`, `AccountBlocked`, `RoleNotPermitted`, `UserNotFound`
    /// - `InsufficientStock`: Negative delta larger than the counter
    /// - `InvalidStockAdjustment`: Counter would overflow
    pub fn adjust_stock(
        env: Env,
        hospital: Address,
        blood_group: BloodGroup,
        delta: i64,
    ) -> Result<u32, ContractError> {
        hospital.require_auth();
        storage::get_config(&env)?;
        stock::adjust(&env, &hospital, blood_group, delta)
    }

    /// All counters plus the groups under the low-stock threshold
    pub fn read_stock(env: Env, hospital: Address) -> Result<StockReport, ContractError> {
        hospital.require_auth();
        stock::read(&env, &hospital)
    }

    // ========== Donations ==========

    pub fn get_donation(env: Env, donation_id: u64) -> Result<Donation, ContractError> {
        storage::get_donation(&env, donation_id).ok_or(ContractError::DonationNotFound)
    }

    pub fn get_donor_donations(env: Env, donor: Address) -> Vec<u64> {
        storage::get_donor_donations(&env, &donor)
    }

    pub fn get_patient_donations(env: Env, patient: Address) -> Vec<u64> {
        storage::get_patient_donations(&env, &patient)
    }

    // ========== Notifications ==========

    /// Deliver queued notifications to the gateway; callable by any keeper
    pub fn dispatch_notifications(env: Env, max_jobs: u32) -> Result<DispatchReport, ContractError> {
        notifications::dispatch(&env, max_jobs)
    }

    pub fn pending_notifications(env: Env) -> u32 {
        notifications::pending(&env)
    }
}

#[cfg(test)]
mod test;
#[cfg(test)]
mod tests; // scenario suites: lifecycle, stock, matching, notifications
