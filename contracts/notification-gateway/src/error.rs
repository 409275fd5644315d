use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    // General errors (1-9)
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,

    // Validation errors (10-19)
    EmptyTitle = 10,
    TitleTooLong = 11,
    MessageTooLong = 12,

    // Lookup errors (20-29)
    NotificationNotFound = 20,

    // Publisher errors (40-49)
    NotAuthorizedPublisher = 40,
}
