use crate::error::ContractError;
use crate::geo;
use crate::types::{
    BloodGroup, BloodRequest, BloodStock, Config, DataKey, Donation, DonorEntry, GeoPoint,
    NotificationJob, UserProfile,
};
use soroban_sdk::{Address, Env, Vec};

// ========== Config ==========

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn get_config(env: &Env) -> Result<Config, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(ContractError::NotInitialized)
}

pub fn set_config(env: &Env, config: &Config) {
    env.storage().instance().set(&DataKey::Config, config);
}

fn next_id(env: &Env, key: DataKey) -> u64 {
    let current: u64 = env.storage().instance().get(&key).unwrap_or(0);
    let next = current + 1;
    env.storage().instance().set(&key, &next);
    next
}

pub fn next_request_id(env: &Env) -> u64 {
    next_id(env, DataKey::RequestCounter)
}

pub fn next_donation_id(env: &Env) -> u64 {
    next_id(env, DataKey::DonationCounter)
}

pub fn next_job_id(env: &Env) -> u64 {
    next_id(env, DataKey::JobCounter)
}

fn get_list<T>(env: &Env, key: &DataKey) -> Vec<T>
where
    T: soroban_sdk::IntoVal<Env, soroban_sdk::Val> + soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().get(key).unwrap_or(Vec::new(env))
}

// ========== Users ==========

pub fn get_user(env: &Env, address: &Address) -> Option<UserProfile> {
    env.storage()
        .persistent()
        .get(&DataKey::User(address.clone()))
}

pub fn set_user(env: &Env, profile: &UserProfile) {
    env.storage()
        .persistent()
        .set(&DataKey::User(profile.address.clone()), profile);
}

/// Write a cell list back, dropping the entry once it is empty
fn set_or_remove_list<T>(env: &Env, key: &DataKey, list: &Vec<T>)
where
    T: soroban_sdk::IntoVal<Env, soroban_sdk::Val> + soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    if list.is_empty() {
        env.storage().persistent().remove(key);
    } else {
        env.storage().persistent().set(key, list);
    }
}

// ========== Donor grid ==========

pub fn get_donor_cell(env: &Env, blood_group: BloodGroup, cell: (i32, i32)) -> Vec<DonorEntry> {
    get_list(env, &DataKey::DonorCell(blood_group, cell.0, cell.1))
}

pub fn index_donor(env: &Env, blood_group: BloodGroup, address: &Address, location: &GeoPoint) {
    let (row, col) = geo::cell_of(location);
    let key = DataKey::DonorCell(blood_group, row, col);
    let mut entries: Vec<DonorEntry> = get_list(env, &key);
    entries.push_back(DonorEntry {
        address: address.clone(),
        location: *location,
    });
    env.storage().persistent().set(&key, &entries);
}

pub fn unindex_donor(env: &Env, blood_group: BloodGroup, address: &Address, location: &GeoPoint) {
    let (row, col) = geo::cell_of(location);
    let key = DataKey::DonorCell(blood_group, row, col);
    let mut entries: Vec<DonorEntry> = get_list(env, &key);
    for index in 0..entries.len() {
        if entries.get_unchecked(index).address == *address {
            entries.remove(index);
            set_or_remove_list(env, &key, &entries);
            return;
        }
    }
}

// ========== Requests ==========

pub fn get_request(env: &Env, id: u64) -> Option<BloodRequest> {
    env.storage().persistent().get(&DataKey::Request(id))
}

pub fn set_request(env: &Env, request: &BloodRequest) {
    env.storage()
        .persistent()
        .set(&DataKey::Request(request.id), request);
}

/// Open request ids in one grid cell, oldest first
pub fn get_request_cell(env: &Env, cell: (i32, i32)) -> Vec<u64> {
    get_list(env, &DataKey::RequestCell(cell.0, cell.1))
}

pub fn index_request(env: &Env, request: &BloodRequest) {
    let (row, col) = geo::cell_of(&request.location);
    let key = DataKey::RequestCell(row, col);
    let mut ids: Vec<u64> = get_list(env, &key);
    ids.push_back(request.id);
    env.storage().persistent().set(&key, &ids);
}

pub fn unindex_request(env: &Env, request: &BloodRequest) {
    let (row, col) = geo::cell_of(&request.location);
    let key = DataKey::RequestCell(row, col);
    let mut ids: Vec<u64> = get_list(env, &key);
    if let Some(index) = ids.first_index_of(request.id) {
        ids.remove(index);
        set_or_remove_list(env, &key, &ids);
    }
}

pub fn get_patient_requests(env: &Env, patient: &Address) -> Vec<u64> {
    get_list(env, &DataKey::PatientRequests(patient.clone()))
}

pub fn add_patient_request(env: &Env, patient: &Address, id: u64) {
    let mut ids = get_patient_requests(env, patient);
    ids.push_back(id);
    env.storage()
        .persistent()
        .set(&DataKey::PatientRequests(patient.clone()), &ids);
}

pub fn get_active_request(env: &Env, patient: &Address) -> Option<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::ActiveRequest(patient.clone()))
}

pub fn set_active_request(env: &Env, patient: &Address, id: u64) {
    env.storage()
        .persistent()
        .set(&DataKey::ActiveRequest(patient.clone()), &id);
}

pub fn clear_active_request(env: &Env, patient: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::ActiveRequest(patient.clone()));
}

pub fn get_donor_assignment(env: &Env, donor: &Address) -> Option<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::DonorAssignment(donor.clone()))
}

pub fn set_donor_assignment(env: &Env, donor: &Address, id: u64) {
    env.storage()
        .persistent()
        .set(&DataKey::DonorAssignment(donor.clone()), &id);
}

pub fn clear_donor_assignment(env: &Env, donor: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::DonorAssignment(donor.clone()));
}

// ========== Stock ==========

pub fn get_stock(env: &Env, hospital: &Address) -> BloodStock {
    env.storage()
        .persistent()
        .get(&DataKey::Stock(hospital.clone()))
        .unwrap_or_default()
}

pub fn set_stock(env: &Env, hospital: &Address, stock: &BloodStock) {
    env.storage()
        .persistent()
        .set(&DataKey::Stock(hospital.clone()), stock);
}

// ========== Donations ==========

pub fn get_donation(env: &Env, id: u64) -> Option<Donation> {
    env.storage().persistent().get(&DataKey::Donation(id))
}

pub fn add_donation(env: &Env, donation: &Donation) {
    env.storage()
        .persistent()
        .set(&DataKey::Donation(donation.id), donation);

    let donor_key = DataKey::DonorDonations(donation.donor.clone());
    let mut by_donor: Vec<u64> = get_list(env, &donor_key);
    by_donor.push_back(donation.id);
    env.storage().persistent().set(&donor_key, &by_donor);

    let patient_key = DataKey::PatientDonations(donation.patient.clone());
    let mut by_patient: Vec<u64> = get_list(env, &patient_key);
    by_patient.push_back(donation.id);
    env.storage().persistent().set(&patient_key, &by_patient);
}

pub fn get_donor_donations(env: &Env, donor: &Address) -> Vec<u64> {
    get_list(env, &DataKey::DonorDonations(donor.clone()))
}

pub fn get_patient_donations(env: &Env, patient: &Address) -> Vec<u64> {
    get_list(env, &DataKey::PatientDonations(patient.clone()))
}

// ========== Notification outbox ==========

pub fn get_job(env: &Env, id: u64) -> Option<NotificationJob> {
    env.storage().persistent().get(&DataKey::Job(id))
}

pub fn set_job(env: &Env, job: &NotificationJob) {
    env.storage().persistent().set(&DataKey::Job(job.id), job);
}

pub fn remove_job(env: &Env, id: u64) {
    env.storage().persistent().remove(&DataKey::Job(id));
}

pub fn get_outbox(env: &Env) -> Vec<u64> {
    get_list(env, &DataKey::Outbox)
}

pub fn set_outbox(env: &Env, outbox: &Vec<u64>) {
    env.storage().persistent().set(&DataKey::Outbox, outbox);
}
