use crate::{DataKey, Notification};
use soroban_sdk::{Address, Env, Vec};

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

pub fn get_admin(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::Admin)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
}

pub fn is_publisher(env: &Env, publisher: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Publisher(publisher.clone()))
        .unwrap_or(false)
}

pub fn set_publisher(env: &Env, publisher: &Address, allowed: bool) {
    env.storage()
        .persistent()
        .set(&DataKey::Publisher(publisher.clone()), &allowed);
}

pub fn next_notification_id(env: &Env) -> u64 {
    let current: u64 = env
        .storage()
        .instance()
        .get(&DataKey::NotificationCounter)
        .unwrap_or(0);
    let next = current + 1;
    env.storage()
        .instance()
        .set(&DataKey::NotificationCounter, &next);
    next
}

pub fn get_notification(env: &Env, id: u64) -> Option<Notification> {
    env.storage().persistent().get(&DataKey::Notification(id))
}

pub fn set_notification(env: &Env, notification: &Notification) {
    env.storage()
        .persistent()
        .set(&DataKey::Notification(notification.id), notification);
}

pub fn get_inbox(env: &Env, recipient: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::Inbox(recipient.clone()))
        .unwrap_or(Vec::new(env))
}

pub fn add_to_inbox(env: &Env, recipient: &Address, id: u64) {
    let mut inbox = get_inbox(env, recipient);
    inbox.push_back(id);
    env.storage()
        .persistent()
        .set(&DataKey::Inbox(recipient.clone()), &inbox);
}
