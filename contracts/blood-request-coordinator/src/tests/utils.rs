use crate::{
    BloodGroup, BloodRequest, BloodRequestCoordinator, BloodRequestCoordinatorClient, Role,
    UrgencyLevel,
};
use notification_gateway::{NotificationGateway, NotificationGatewayClient};
use soroban_sdk::{
    contract, contractimpl,
    testutils::{Address as _, Ledger},
    Address, Env, String, Symbol,
};

pub const START: u64 = 1_700_000_000;
pub const DAY: u64 = 86_400;

/// Reference point (30.70N, 76.75E)
pub const CENTER_LAT: i64 = 30_700_000;
pub const CENTER_LON: i64 = 76_750_000;

/// Micro-degrees of latitude per kilometer on the mean sphere
pub const LAT_E6_PER_KM: i64 = 8_993;

pub struct TestContext {
    pub env: Env,
    pub admin: Address,
    pub contract_id: Address,
    pub client: BloodRequestCoordinatorClient<'static>,
    pub gateway: NotificationGatewayClient<'static>,
}

/// Coordinator wired to a real gateway that accepts it as publisher
pub fn setup() -> TestContext {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START);

    let admin = Address::generate(&env);

    let gateway_id = env.register(NotificationGateway, ());
    let gateway = NotificationGatewayClient::new(&env, &gateway_id);
    gateway.initialize(&admin);

    let contract_id = env.register(BloodRequestCoordinator, ());
    let client = BloodRequestCoordinatorClient::new(&env, &contract_id);
    client.initialize(&admin, &gateway_id);
    gateway.register_publisher(&contract_id);

    TestContext {
        env,
        admin,
        contract_id,
        client,
        gateway,
    }
}

/// Coordinator wired to a gateway that always fails
pub fn setup_with_failing_gateway() -> TestContext {
    let ctx = setup();
    let failing_id = ctx.env.register(FailingGateway, ());
    let config = ctx.client.get_config();
    ctx.client.update_config(
        &failing_id,
        &config.urgent_radius_km,
        &config.donation_cooldown_days,
        &config.low_stock_threshold,
        &config.impact_award,
    );
    ctx
}

/// Latitude `km` kilometers north of the reference point
pub fn north_km(km: i64) -> i64 {
    CENTER_LAT + km * LAT_E6_PER_KM
}

pub fn advance_days(env: &Env, days: u64) {
    let now = env.ledger().timestamp();
    env.ledger().set_timestamp(now + days * DAY);
}

pub fn register_donor_at(ctx: &TestContext, group: BloodGroup, latitude_e6: i64) -> Address {
    let donor = Address::generate(&ctx.env);
    ctx.client
        .register_user(&donor, &Role::Donor, &Some(group), &latitude_e6, &CENTER_LON);
    donor
}

pub fn register_donor(ctx: &TestContext, group: BloodGroup) -> Address {
    register_donor_at(ctx, group, north_km(1))
}

pub fn register_patient(ctx: &TestContext) -> Address {
    let patient = Address::generate(&ctx.env);
    ctx.client
        .register_user(&patient, &Role::Patient, &None, &CENTER_LAT, &CENTER_LON);
    patient
}

pub fn register_hospital(ctx: &TestContext) -> Address {
    let hospital = Address::generate(&ctx.env);
    ctx.client
        .register_user(&hospital, &Role::Hospital, &None, &north_km(3), &CENTER_LON);
    ctx.client.set_verified(&hospital, &true);
    hospital
}

pub fn stocked_hospital(ctx: &TestContext, group: BloodGroup, units: i64) -> Address {
    let hospital = register_hospital(ctx);
    ctx.client.adjust_stock(&hospital, &group, &units);
    hospital
}

pub fn create_request(
    ctx: &TestContext,
    patient: &Address,
    group: BloodGroup,
    units: u32,
) -> BloodRequest {
    ctx.client.create_request(
        patient,
        &group,
        &units,
        &CENTER_LAT,
        &CENTER_LON,
        &UrgencyLevel::High,
    )
}

/// Notifications of `kind` the gateway holds for `recipient`
pub fn notifications_of(ctx: &TestContext, recipient: &Address, kind: &str) -> u32 {
    let kind = Symbol::new(&ctx.env, kind);
    let mut count = 0;
    for notification in ctx.gateway.get_notifications(recipient).iter() {
        if notification.kind == kind {
            count += 1;
        }
    }
    count
}

#[contract]
pub struct FailingGateway;

#[contractimpl]
impl FailingGateway {
    pub fn notify(
        _env: Env,
        _publisher: Address,
        _recipient: Address,
        _kind: Symbol,
        _title: String,
        _message: String,
        _related_id: Option<u64>,
    ) -> u64 {
        panic!("gateway offline")
    }
}
