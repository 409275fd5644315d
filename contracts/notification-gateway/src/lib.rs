#![no_std]

mod error;
mod storage;

pub use crate::error::ContractError;

use soroban_sdk::{contract, contractimpl, contracttype, Address, Env, String, Symbol, Vec};

pub const MAX_TITLE_LEN: u32 = 100;
pub const MAX_MESSAGE_LEN: u32 = 500;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Admin,
    NotificationCounter,
    Publisher(Address),
    Notification(u64),
    Inbox(Address),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub recipient: Address,
    pub publisher: Address,
    pub kind: Symbol,
    pub title: String,
    pub message: String,
    pub related_id: Option<u64>,
    pub created_at: u64,
    pub read: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NotificationDeliveredEvent {
    pub notification_id: u64,
    pub kind: Symbol,
    pub related_id: Option<u64>,
    pub delivered_at: u64,
}

#[contract]
pub struct NotificationGateway;

#[contractimpl]
impl NotificationGateway {
    /// Initialize the gateway
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract has already been initialized
    pub fn initialize(env: Env, admin: Address) -> Result<(), ContractError> {
        admin.require_auth();

        if storage::is_initialized(&env) {
            return Err(ContractError::AlreadyInitialized);
        }

        storage::set_admin(&env, &admin);
        Ok(())
    }

    /// Allow a contract (or account) to publish notifications
    pub fn register_publisher(env: Env, publisher: Address) -> Result<(), ContractError> {
        let admin = storage::get_admin(&env).ok_or(ContractError::NotInitialized)?;
        admin.require_auth();

        storage::set_publisher(&env, &publisher, true);
        Ok(())
    }

    /// Stop accepting notifications from a publisher
    pub fn revoke_publisher(env: Env, publisher: Address) -> Result<(), ContractError> {
        let admin = storage::get_admin(&env).ok_or(ContractError::NotInitialized)?;
        admin.require_auth();

        storage::set_publisher(&env, &publisher, false);
        Ok(())
    }

    /// Persist a notification in the recipient's inbox and announce it
    ///
    /// # Returns
    /// Id of the stored notification
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NotAuthorizedPublisher`: Publisher was never registered or was revoked
    /// - `EmptyTitle`, `TitleTooLong`, `MessageTooLong`: Malformed content
    ///
    /// # Events
    /// Emits `notification` on the recipient's topic
    pub fn notify(
        env: Env,
        publisher: Address,
        recipient: Address,
        kind: Symbol,
        title: String,
        message: String,
        related_id: Option<u64>,
    ) -> Result<u64, ContractError> {
        publisher.require_auth();

        if !storage::is_initialized(&env) {
            return Err(ContractError::NotInitialized);
        }
        if !storage::is_publisher(&env, &publisher) {
            return Err(ContractError::NotAuthorizedPublisher);
        }

        if title.is_empty() {
            return Err(ContractError::EmptyTitle);
        }
        if title.len() > MAX_TITLE_LEN {
            return Err(ContractError::TitleTooLong);
        }
        if message.len() > MAX_MESSAGE_LEN {
            return Err(ContractError::MessageTooLong);
        }

        let id = storage::next_notification_id(&env);
        let created_at = env.ledger().timestamp();
        let notification = Notification {
            id,
            recipient: recipient.clone(),
            publisher,
            kind: kind.clone(),
            title,
            message,
            related_id,
            created_at,
            read: false,
        };

        storage::set_notification(&env, &notification);
        storage::add_to_inbox(&env, &recipient, id);

        env.events().publish(
            (Symbol::new(&env, "notification"), recipient),
            NotificationDeliveredEvent {
                notification_id: id,
                kind,
                related_id,
                delivered_at: created_at,
            },
        );

        Ok(id)
    }

    /// All notifications for a recipient, oldest first
    pub fn get_notifications(env: Env, recipient: Address) -> Vec<Notification> {
        let mut notifications = Vec::new(&env);
        for id in storage::get_inbox(&env, &recipient).iter() {
            if let Some(notification) = storage::get_notification(&env, id) {
                notifications.push_back(notification);
            }
        }
        notifications
    }

    pub fn unread_count(env: Env, recipient: Address) -> u32 {
        let mut unread = 0u32;
        for id in storage::get_inbox(&env, &recipient).iter() {
            if let Some(notification) = storage::get_notification(&env, id) {
                if !notification.read {
                    unread += 1;
                }
            }
        }
        unread
    }

    /// Mark one of the recipient's notifications as read
    ///
    /// # Errors
    /// - `NotificationNotFound`: No notification with this id
    /// - `Unauthorized`: Notification belongs to someone else
    pub fn mark_read(
        env: Env,
        recipient: Address,
        notification_id: u64,
    ) -> Result<(), ContractError> {
        recipient.require_auth();

        let mut notification = storage::get_notification(&env, notification_id)
            .ok_or(ContractError::NotificationNotFound)?;
        if notification.recipient != recipient {
            return Err(ContractError::Unauthorized);
        }

        notification.read = true;
        storage::set_notification(&env, &notification);
        Ok(())
    }

    pub fn is_publisher(env: Env, publisher: Address) -> bool {
        storage::is_publisher(&env, &publisher)
    }
}
