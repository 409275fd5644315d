use crate::types::{
    BloodGroup, BloodRequest, Donation, DonationRecordedEvent, JobTarget, LiveRoom,
    NotificationDroppedEvent, NotificationJob, NotificationQueuedEvent, RequestCreatedEvent,
    RequestStatus, RequestStatusChangedEvent, StockAdjustedEvent,
};
use soroban_sdk::{Address, Env, IntoVal, Symbol, Val};

/// Best-effort live broadcast to listeners of `room`
///
/// Topics are `(event, room)`; there is no delivery guarantee and nothing
/// is persisted.
pub fn publish<D>(env: &Env, room: LiveRoom, event: &str, payload: D)
where
    D: IntoVal<Env, Val>,
{
    env.events().publish((Symbol::new(env, event), room), payload);
}

/// Emit `new_emergency` to every listener
pub fn emit_request_created(env: &Env, request: &BloodRequest) {
    let event = RequestCreatedEvent {
        request_id: request.id,
        patient: request.patient.clone(),
        blood_group: request.blood_group,
        units: request.units,
        urgency: request.urgency,
        location: request.location,
        created_at: request.created_at,
    };

    publish(env, LiveRoom::Broadcast, "new_emergency", event);
}

/// Emit `status_changed` to the request owner and, when set, the assignee
pub fn emit_status_changed(env: &Env, request: &BloodRequest, old_status: RequestStatus) {
    let event = RequestStatusChangedEvent {
        request_id: request.id,
        old_status,
        new_status: request.status,
        processed_by: request.processed_by.clone(),
        changed_at: env.ledger().timestamp(),
    };

    if let Some(assignee) = &request.processed_by {
        publish(
            env,
            LiveRoom::User(assignee.clone()),
            "status_changed",
            event.clone(),
        );
    }
    publish(
        env,
        LiveRoom::User(request.patient.clone()),
        "status_changed",
        event,
    );
}

pub fn emit_stock_adjusted(
    env: &Env,
    hospital: &Address,
    blood_group: BloodGroup,
    delta: i64,
    units: u32,
) {
    let event = StockAdjustedEvent {
        hospital: hospital.clone(),
        blood_group,
        delta,
        units,
        adjusted_at: env.ledger().timestamp(),
    };

    publish(env, LiveRoom::User(hospital.clone()), "stock_adjusted", event);
}

pub fn emit_donation_recorded(env: &Env, donation: &Donation) {
    let event = DonationRecordedEvent {
        donation_id: donation.id,
        request_id: donation.request_id,
        donor: donation.donor.clone(),
        patient: donation.patient.clone(),
        donated_at: donation.donated_at,
    };

    publish(
        env,
        LiveRoom::User(donation.donor.clone()),
        "donation_recorded",
        event,
    );
}

/// Emit `notification_queued` to the recipient; broadcast jobs have no
/// single recipient and go to every listener
pub fn emit_notification_queued(env: &Env, job: &NotificationJob) {
    let event = NotificationQueuedEvent {
        job_id: job.id,
        target: job.target.clone(),
        kind: job.kind,
        related_id: job.related_id,
    };

    let room = match &job.target {
        JobTarget::Recipient(recipient) => LiveRoom::User(recipient.clone()),
        JobTarget::NearbyDonors => LiveRoom::Broadcast,
    };
    publish(env, room, "notification_queued", event);
}

pub fn emit_notification_dropped(env: &Env, job: &NotificationJob) {
    let event = NotificationDroppedEvent {
        job_id: job.id,
        target: job.target.clone(),
        kind: job.kind,
        attempts: job.attempts,
    };

    publish(
        env,
        LiveRoom::Broadcast,
        "notification_dropped",
        event,
    );
}
