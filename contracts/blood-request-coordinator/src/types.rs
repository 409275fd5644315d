use soroban_sdk::{contracttype, Address, Env, String, Symbol, Vec};

use crate::error::ContractError;

pub const SECONDS_PER_DAY: u64 = 86_400;

/// The eight ABO/Rh blood groups
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BloodGroup {
    APositive,
    ANegative,
    BPositive,
    BNegative,
    AbPositive,
    AbNegative,
    OPositive,
    ONegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
    ];
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Role {
    Admin,
    Donor,
    Patient,
    Hospital,
}

/// Informational priority tag; matching does not weigh it
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl RequestStatus {
    /// PENDING -> APPROVED | REJECTED | CANCELLED
    /// APPROVED -> COMPLETED | PENDING (assigned donor revoked)
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
                | (RequestStatus::Pending, RequestStatus::Cancelled)
                | (RequestStatus::Approved, RequestStatus::Completed)
                | (RequestStatus::Approved, RequestStatus::Pending)
        )
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Approved)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Rank {
    Novice,
    LifeSaver,
    Hero,
}

impl Rank {
    pub fn for_points(impact_points: u32) -> Rank {
        if impact_points > 150 {
            Rank::Hero
        } else if impact_points > 50 {
            Rank::LifeSaver
        } else {
            Rank::Novice
        }
    }
}

/// A point in micro-degrees (degrees * 1_000_000)
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GeoPoint {
    pub longitude_e6: i64,
    pub latitude_e6: i64,
}

impl GeoPoint {
    /// `(longitude, latitude)`, longitude first
    pub fn coordinates(&self) -> (i64, i64) {
        (self.longitude_e6, self.latitude_e6)
    }
}

/// Donor slot in a grid cell; the location is copied so distance filtering
/// needs no profile read
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DonorEntry {
    pub address: Address,
    pub location: GeoPoint,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserProfile {
    pub address: Address,
    pub role: Role,
    pub blood_group: Option<BloodGroup>,
    pub location: GeoPoint,
    pub is_available: bool,
    pub is_verified: bool,
    pub is_blocked: bool,
    pub last_donation_at: Option<u64>,
    pub impact_points: u32,
    pub rank: Rank,
    pub registered_at: u64,
}

/// Per-hospital blood unit counters, one per group
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BloodStock {
    pub a_pos: u32,
    pub a_neg: u32,
    pub b_pos: u32,
    pub b_neg: u32,
    pub ab_pos: u32,
    pub ab_neg: u32,
    pub o_pos: u32,
    pub o_neg: u32,
}

impl BloodStock {
    pub fn units(&self, group: BloodGroup) -> u32 {
        match group {
            BloodGroup::APositive => self.a_pos,
            BloodGroup::ANegative => self.a_neg,
            BloodGroup::BPositive => self.b_pos,
            BloodGroup::BNegative => self.b_neg,
            BloodGroup::AbPositive => self.ab_pos,
            BloodGroup::AbNegative => self.ab_neg,
            BloodGroup::OPositive => self.o_pos,
            BloodGroup::ONegative => self.o_neg,
        }
    }

    /// Returns the counters with `delta` applied to one group.
    /// The result never holds a negative or overflowing counter.
    pub fn with_delta(&self, group: BloodGroup, delta: i64) -> Result<BloodStock, ContractError> {
        let next = (self.units(group) as i64)
            .checked_add(delta)
            .ok_or(ContractError::InvalidStockAdjustment)?;
        if next < 0 {
            return Err(if delta < 0 {
                ContractError::InsufficientStock
            } else {
                ContractError::InvalidStockAdjustment
            });
        }
        if next > u32::MAX as i64 {
            return Err(ContractError::InvalidStockAdjustment);
        }

        let mut updated = self.clone();
        let slot = match group {
            BloodGroup::APositive => &mut updated.a_pos,
            BloodGroup::ANegative => &mut updated.a_neg,
            BloodGroup::BPositive => &mut updated.b_pos,
            BloodGroup::BNegative => &mut updated.b_neg,
            BloodGroup::AbPositive => &mut updated.ab_pos,
            BloodGroup::AbNegative => &mut updated.ab_neg,
            BloodGroup::OPositive => &mut updated.o_pos,
            BloodGroup::ONegative => &mut updated.o_neg,
        };
        *slot = next as u32;
        Ok(updated)
    }

    pub fn below(&self, env: &Env, threshold: u32) -> Vec<BloodGroup> {
        let mut low = Vec::new(env);
        for group in BloodGroup::ALL {
            if self.units(group) < threshold {
                low.push_back(group);
            }
        }
        low
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StockReport {
    pub hospital: Address,
    pub stock: BloodStock,
    pub low_stock: Vec<BloodGroup>,
    pub threshold: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BloodRequest {
    pub id: u64,
    pub patient: Address,
    pub blood_group: BloodGroup,
    pub units: u32,
    pub urgency: UrgencyLevel,
    pub status: RequestStatus,
    pub location: GeoPoint,
    pub processed_by: Option<Address>,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Audit record written once per completed or fulfilled request
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Donation {
    pub id: u64,
    pub donor: Address,
    pub patient: Address,
    pub request_id: u64,
    pub blood_group: BloodGroup,
    pub units: u32,
    pub donated_at: u64,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NotificationKind {
    RequestCreated,
    UrgentNearby,
    RequestAccepted,
    RequestApproved,
    RequestRejected,
    DonorRejected,
    RequestCompleted,
}

impl NotificationKind {
    pub fn as_symbol(&self, env: &Env) -> Symbol {
        let name = match self {
            NotificationKind::RequestCreated => "request_created",
            NotificationKind::UrgentNearby => "urgent_nearby",
            NotificationKind::RequestAccepted => "request_accepted",
            NotificationKind::RequestApproved => "request_approved",
            NotificationKind::RequestRejected => "request_rejected",
            NotificationKind::DonorRejected => "donor_rejected",
            NotificationKind::RequestCompleted => "request_completed",
        };
        Symbol::new(env, name)
    }
}

/// Who a queued notification goes to
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum JobTarget {
    Recipient(Address),
    /// Expanded by the dispatcher into one job per eligible donor near the
    /// related request
    NearbyDonors,
}

/// A queued notification waiting for the dispatcher
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NotificationJob {
    pub id: u64,
    pub target: JobTarget,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub related_id: Option<u64>,
    pub attempts: u32,
    pub queued_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DispatchReport {
    pub delivered: u32,
    pub broadcasts: u32,
    pub retried: u32,
    pub dropped: u32,
    pub remaining: u32,
}

/// Room a live event is addressed to
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LiveRoom {
    Broadcast,
    User(Address),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub admin: Address,
    pub notification_gateway: Address,
    pub urgent_radius_km: u32,
    pub donation_cooldown_days: u32,
    pub low_stock_threshold: u32,
    pub impact_award: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Config,
    RequestCounter,
    DonationCounter,
    JobCounter,
    User(Address),
    /// Donors of one blood group in a grid cell `(row, col)`
    DonorCell(BloodGroup, i32, i32),
    Request(u64),
    /// Pending/approved request ids in a grid cell `(row, col)`
    RequestCell(i32, i32),
    PatientRequests(Address),
    ActiveRequest(Address),
    DonorAssignment(Address),
    Stock(Address),
    Donation(u64),
    DonorDonations(Address),
    PatientDonations(Address),
    Job(u64),
    Outbox,
}

// ========== Events ==========

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestCreatedEvent {
    pub request_id: u64,
    pub patient: Address,
    pub blood_group: BloodGroup,
    pub units: u32,
    pub urgency: UrgencyLevel,
    pub location: GeoPoint,
    pub created_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestStatusChangedEvent {
    pub request_id: u64,
    pub old_status: RequestStatus,
    pub new_status: RequestStatus,
    pub processed_by: Option<Address>,
    pub changed_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StockAdjustedEvent {
    pub hospital: Address,
    pub blood_group: BloodGroup,
    pub delta: i64,
    pub units: u32,
    pub adjusted_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DonationRecordedEvent {
    pub donation_id: u64,
    pub request_id: u64,
    pub donor: Address,
    pub patient: Address,
    pub donated_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NotificationQueuedEvent {
    pub job_id: u64,
    pub target: JobTarget,
    pub kind: NotificationKind,
    pub related_id: Option<u64>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NotificationDroppedEvent {
    pub job_id: u64,
    pub target: JobTarget,
    pub kind: NotificationKind,
    pub attempts: u32,
}
