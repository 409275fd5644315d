// notifications.rs - Outbox for gateway notifications
// Lifecycle operations only enqueue; `dispatch` drains the queue in a later
// invocation, so neither a failing gateway nor the donor search for urgent
// alerts runs inside the operation that queued.

use crate::error::ContractError;
use crate::events;
use crate::matching;
use crate::storage;
use crate::types::{DispatchReport, JobTarget, NotificationJob, NotificationKind};
use soroban_sdk::{contractclient, log, Address, Env, String, Symbol, Vec};

/// Gateway gives up on a job after this many failed deliveries
pub const MAX_DISPATCH_ATTEMPTS: u32 = 3;

/// Interface of the external notification gateway
#[allow(dead_code)]
#[contractclient(name = "NotifierClient")]
pub trait Notifier {
    fn notify(
        env: Env,
        publisher: Address,
        recipient: Address,
        kind: Symbol,
        title: String,
        message: String,
        related_id: Option<u64>,
    ) -> u64;
}

fn content(env: &Env, kind: NotificationKind) -> (String, String) {
    let (title, message) = match kind {
        NotificationKind::RequestCreated => (
            "Blood request created",
            "Your emergency request is live. Nearby donors and hospitals have been alerted.",
        ),
        NotificationKind::UrgentNearby => (
            "Urgent blood needed nearby",
            "A patient within your area needs your blood group. Open the app to respond.",
        ),
        NotificationKind::RequestAccepted => (
            "Donor found",
            "A donor has accepted your blood request and is on the way.",
        ),
        NotificationKind::RequestApproved => (
            "Request approved",
            "A hospital has reserved blood units for your request.",
        ),
        NotificationKind::RequestRejected => (
            "Request rejected",
            "Your blood request could not be served. You may raise a new one.",
        ),
        NotificationKind::DonorRejected => (
            "Assignment withdrawn",
            "The patient has released you from their blood request.",
        ),
        NotificationKind::RequestCompleted => (
            "Request completed",
            "The blood request has been completed. Thank you for saving a life.",
        ),
    };
    (String::from_str(env, title), String::from_str(env, message))
}

/// Store a job without scheduling it; returns the job id for the caller to
/// place in an outbox
pub fn queue(
    env: &Env,
    target: JobTarget,
    kind: NotificationKind,
    related_id: Option<u64>,
) -> u64 {
    let (title, message) = content(env, kind);
    let job = NotificationJob {
        id: storage::next_job_id(env),
        target,
        kind,
        title,
        message,
        related_id,
        attempts: 0,
        queued_at: env.ledger().timestamp(),
    };

    storage::set_job(env, &job);
    events::emit_notification_queued(env, &job);
    job.id
}

fn schedule(env: &Env, job_id: u64) {
    let mut outbox = storage::get_outbox(env);
    outbox.push_back(job_id);
    storage::set_outbox(env, &outbox);
}

/// Queue a notification for later delivery
pub fn enqueue(env: &Env, recipient: &Address, kind: NotificationKind, related_id: Option<u64>) {
    let job_id = queue(
        env,
        JobTarget::Recipient(recipient.clone()),
        kind,
        related_id,
    );
    schedule(env, job_id);
}

/// Queue the urgent alert for donors around `request_id`; the donor search
/// runs when the dispatcher reaches the job
pub fn enqueue_urgent_broadcast(env: &Env, request_id: u64) {
    let job_id = queue(
        env,
        JobTarget::NearbyDonors,
        NotificationKind::UrgentNearby,
        Some(request_id),
    );
    schedule(env, job_id);
}

/// Deliver up to `max_jobs` queued notifications through the gateway.
///
/// Broadcast jobs are expanded in place: the per-donor jobs they produce join
/// the back of the queue. Failed deliveries go to the back of the queue until
/// they reach `MAX_DISPATCH_ATTEMPTS`, then they are dropped and logged.
pub fn dispatch(env: &Env, max_jobs: u32) -> Result<DispatchReport, ContractError> {
    let config = storage::get_config(env)?;
    let gateway = NotifierClient::new(env, &config.notification_gateway);
    let publisher = env.current_contract_address();

    let mut outbox = storage::get_outbox(env);
    let mut retry = Vec::new(env);
    let mut report = DispatchReport::default();
    let mut processed = 0u32;

    while processed < max_jobs {
        let Some(job_id) = outbox.pop_front() else {
            break;
        };
        processed += 1;

        let Some(mut job) = storage::get_job(env, job_id) else {
            continue;
        };

        let recipient = match job.target.clone() {
            JobTarget::Recipient(recipient) => recipient,
            JobTarget::NearbyDonors => {
                storage::remove_job(env, job_id);
                report.broadcasts += 1;
                match job.related_id {
                    Some(request_id) => {
                        let alerted =
                            matching::notify_urgent_nearby(env, &config, request_id, &mut outbox);
                        log!(env, "broadcast {} alerted {} donors", job_id, alerted);
                    }
                    None => log!(env, "broadcast {} has no request", job_id),
                }
                continue;
            }
        };

        let outcome = gateway.try_notify(
            &publisher,
            &recipient,
            &job.kind.as_symbol(env),
            &job.title,
            &job.message,
            &job.related_id,
        );

        if let Ok(Ok(_)) = outcome {
            storage::remove_job(env, job_id);
            report.delivered += 1;
            continue;
        }

        job.attempts += 1;
        if job.attempts >= MAX_DISPATCH_ATTEMPTS {
            log!(
                env,
                "dropping notification {} after {} attempts",
                job_id,
                job.attempts
            );
            storage::remove_job(env, job_id);
            events::emit_notification_dropped(env, &job);
            report.dropped += 1;
        } else {
            log!(
                env,
                "gateway rejected notification {} (attempt {})",
                job_id,
                job.attempts
            );
            storage::set_job(env, &job);
            retry.push_back(job_id);
            report.retried += 1;
        }
    }

    outbox.append(&retry);
    report.remaining = outbox.len();
    storage::set_outbox(env, &outbox);

    Ok(report)
}

pub fn pending(env: &Env) -> u32 {
    storage::get_outbox(env).len()
}
