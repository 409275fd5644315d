use crate::tests::utils::*;
use crate::{BloodGroup, ContractError, RequestStatus, UrgencyLevel};
use soroban_sdk::testutils::Address as _;
use soroban_sdk::Address;

#[test]
fn test_initialize_twice_fails() {
    let ctx = setup();
    let gateway = Address::generate(&ctx.env);

    let result = ctx.client.try_initialize(&ctx.admin, &gateway);
    assert_eq!(result, Err(Ok(ContractError::AlreadyInitialized)));
}

#[test]
fn test_create_request_round_trip() {
    let ctx = setup();
    let patient = register_patient(&ctx);

    let created = ctx.client.create_request(
        &patient,
        &BloodGroup::ONegative,
        &2,
        &30_700_000,
        &76_750_000,
        &UrgencyLevel::High,
    );

    let stored = ctx.client.get_request(&created.id);
    assert_eq!(stored, created);
    assert_eq!(stored.status, RequestStatus::Pending);
    assert_eq!(stored.blood_group, BloodGroup::ONegative);
    assert_eq!(stored.units, 2);
    assert_eq!(stored.processed_by, None);
    assert_eq!(stored.location.coordinates(), (76_750_000, 30_700_000));
    assert_eq!(ctx.client.get_patient_requests(&patient).len(), 1);
}

#[test]
fn test_one_active_request_per_requester() {
    let ctx = setup();
    let patient = register_patient(&ctx);

    let first = create_request(&ctx, &patient, BloodGroup::APositive, 1);
    let second = ctx.client.try_create_request(
        &patient,
        &BloodGroup::BPositive,
        &1,
        &CENTER_LAT,
        &CENTER_LON,
        &UrgencyLevel::Low,
    );
    assert_eq!(second, Err(Ok(ContractError::ActiveRequestExists)));

    // Repeated attempts never produce a second live request
    for _ in 0..3 {
        let _ = ctx.client.try_create_request(
            &patient,
            &BloodGroup::APositive,
            &1,
            &CENTER_LAT,
            &CENTER_LON,
            &UrgencyLevel::High,
        );
    }
    assert_eq!(ctx.client.get_patient_requests(&patient).len(), 1);

    ctx.client.cancel_request(&first.id, &patient);
    assert_eq!(ctx.client.get_active_request(&patient), None);

    let third = create_request(&ctx, &patient, BloodGroup::APositive, 1);
    assert_eq!(ctx.client.get_active_request(&patient), Some(third));
}

#[test]
fn test_urgent_request_alerts_each_nearby_donor_once() {
    let ctx = setup();
    let near = register_donor_at(&ctx, BloodGroup::ONegative, north_km(2));
    let far = register_donor_at(&ctx, BloodGroup::ONegative, north_km(8));
    let other_group = register_donor_at(&ctx, BloodGroup::APositive, north_km(1));
    let patient = register_patient(&ctx);

    create_request(&ctx, &patient, BloodGroup::ONegative, 2);
    ctx.client.dispatch_notifications(&50);

    assert_eq!(notifications_of(&ctx, &near, "urgent_nearby"), 1);
    assert_eq!(notifications_of(&ctx, &far, "urgent_nearby"), 0);
    assert_eq!(notifications_of(&ctx, &other_group, "urgent_nearby"), 0);
    assert_eq!(notifications_of(&ctx, &patient, "request_created"), 1);
}

#[test]
fn test_approve_with_insufficient_stock_fails() {
    let ctx = setup();
    let hospital = stocked_hospital(&ctx, BloodGroup::APositive, 3);
    let patient = register_patient(&ctx);
    let request = create_request(&ctx, &patient, BloodGroup::APositive, 5);

    let result = ctx.client.try_approve_by_hospital(&request.id, &hospital);
    assert_eq!(result, Err(Ok(ContractError::InsufficientStock)));

    assert_eq!(ctx.client.read_stock(&hospital).stock.a_pos, 3);
    assert_eq!(
        ctx.client.get_request(&request.id).status,
        RequestStatus::Pending
    );
}

#[test]
fn test_approving_handled_request_leaves_stock_untouched() {
    let ctx = setup();
    let hospital = stocked_hospital(&ctx, BloodGroup::APositive, 10);
    let donor = register_donor(&ctx, BloodGroup::APositive);
    let patient = register_patient(&ctx);
    let request = create_request(&ctx, &patient, BloodGroup::APositive, 2);

    ctx.client.accept_by_donor(&request.id, &donor);

    let result = ctx.client.try_approve_by_hospital(&request.id, &hospital);
    assert_eq!(result, Err(Ok(ContractError::RequestAlreadyProcessed)));
    assert_eq!(ctx.client.read_stock(&hospital).stock.a_pos, 10);

    let stored = ctx.client.get_request(&request.id);
    assert_eq!(stored.status, RequestStatus::Approved);
    assert_eq!(stored.processed_by, Some(donor));
}

#[test]
fn test_approving_handled_request_without_stock() {
    let ctx = setup();
    let hospital = register_hospital(&ctx);
    let donor = register_donor(&ctx, BloodGroup::AbNegative);
    let patient = register_patient(&ctx);
    let request = create_request(&ctx, &patient, BloodGroup::AbNegative, 4);

    ctx.client.accept_by_donor(&request.id, &donor);

    // The request state decides the outcome, not the empty inventory
    let result = ctx.client.try_approve_by_hospital(&request.id, &hospital);
    assert_eq!(result, Err(Ok(ContractError::RequestAlreadyProcessed)));
    assert_eq!(ctx.client.read_stock(&hospital).stock.ab_neg, 0);
}

#[test]
fn test_ineligible_donor_on_handled_request() {
    let ctx = setup();
    let donor = register_donor(&ctx, BloodGroup::OPositive);
    let wrong_group = register_donor(&ctx, BloodGroup::BNegative);
    let patient = register_patient(&ctx);
    let request = create_request(&ctx, &patient, BloodGroup::OPositive, 1);

    ctx.client.accept_by_donor(&request.id, &donor);

    let result = ctx.client.try_accept_by_donor(&request.id, &wrong_group);
    assert_eq!(result, Err(Ok(ContractError::RequestAlreadyProcessed)));

    // Still reported as ineligible while the request is open
    let other_patient = register_patient(&ctx);
    let open = create_request(&ctx, &other_patient, BloodGroup::OPositive, 1);
    let result = ctx.client.try_accept_by_donor(&open.id, &wrong_group);
    assert_eq!(result, Err(Ok(ContractError::DonorNotEligible)));
}

#[test]
fn test_complete_twice_fails() {
    let ctx = setup();
    let donor = register_donor(&ctx, BloodGroup::BNegative);
    let patient = register_patient(&ctx);
    let request = create_request(&ctx, &patient, BloodGroup::BNegative, 1);

    ctx.client.accept_by_donor(&request.id, &donor);
    let completed = ctx.client.complete_request(&request.id, &donor);
    assert_eq!(completed.status, RequestStatus::Completed);

    let again = ctx.client.try_complete_request(&request.id, &donor);
    assert_eq!(again, Err(Ok(ContractError::RequestNotApproved)));

    assert_eq!(ctx.client.get_donor_donations(&donor).len(), 1);
    assert_eq!(ctx.client.get_patient_donations(&patient).len(), 1);
}

#[test]
fn test_patient_rejects_assigned_donor() {
    let ctx = setup();
    let donor = register_donor(&ctx, BloodGroup::OPositive);
    let patient = register_patient(&ctx);
    let request = create_request(&ctx, &patient, BloodGroup::OPositive, 1);

    let accepted = ctx.client.accept_by_donor(&request.id, &donor);
    assert_eq!(accepted.status, RequestStatus::Approved);
    assert_eq!(accepted.processed_by, Some(donor.clone()));

    let reopened = ctx.client.reject_donor_by_patient(&request.id, &patient);
    assert_eq!(reopened.status, RequestStatus::Pending);
    assert_eq!(reopened.processed_by, None);
    assert_eq!(ctx.client.get_assigned_request(&donor), None);

    ctx.client.dispatch_notifications(&50);
    assert_eq!(notifications_of(&ctx, &donor, "donor_rejected"), 1);
    assert_eq!(notifications_of(&ctx, &patient, "request_accepted"), 1);
}

#[test]
fn test_donor_cooldown_boundary() {
    let ctx = setup();
    let donor = register_donor(&ctx, BloodGroup::AbPositive);
    let first_patient = register_patient(&ctx);
    let request = create_request(&ctx, &first_patient, BloodGroup::AbPositive, 1);
    ctx.client.accept_by_donor(&request.id, &donor);
    ctx.client.complete_request(&request.id, &donor);

    advance_days(&ctx.env, 89);
    ctx.client.set_availability(&donor, &true);

    let nearby = ctx.client.find_nearby_donors(
        &CENTER_LAT,
        &CENTER_LON,
        &10,
        &BloodGroup::AbPositive,
    );
    assert_eq!(nearby.len(), 0);

    let second_patient = register_patient(&ctx);
    let second = create_request(&ctx, &second_patient, BloodGroup::AbPositive, 1);
    let early = ctx.client.try_accept_by_donor(&second.id, &donor);
    assert_eq!(early, Err(Ok(ContractError::DonorNotEligible)));

    advance_days(&ctx.env, 1);
    let nearby = ctx.client.find_nearby_donors(
        &CENTER_LAT,
        &CENTER_LON,
        &10,
        &BloodGroup::AbPositive,
    );
    assert_eq!(nearby.len(), 1);
    assert_eq!(nearby.get(0).unwrap().address, donor);

    let accepted = ctx.client.accept_by_donor(&second.id, &donor);
    assert_eq!(accepted.processed_by, Some(donor));
}

#[test]
#[should_panic(expected = "Error(Contract, #11)")]
fn test_create_request_zero_units_panics() {
    let ctx = setup();
    let patient = register_patient(&ctx);
    create_request(&ctx, &patient, BloodGroup::APositive, 0);
}

#[test]
#[should_panic(expected = "Error(Contract, #10)")]
fn test_create_request_invalid_latitude_panics() {
    let ctx = setup();
    let patient = register_patient(&ctx);
    ctx.client.create_request(
        &patient,
        &BloodGroup::APositive,
        &1,
        &91_000_000,
        &CENTER_LON,
        &UrgencyLevel::Medium,
    );
}
