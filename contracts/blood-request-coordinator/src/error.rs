use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    // General errors (1-9)
    AlreadyInitialized = 1,
    NotInitialized = 2,

    // Validation errors (10-19)
    InvalidCoordinates = 10,
    InvalidUnits = 11,
    InvalidRadius = 12,
    MissingBloodGroup = 13,
    InvalidRole = 14,
    InvalidStockAdjustment = 15,
    InvalidConfig = 16,

    // Lookup errors (20-29)
    RequestNotFound = 20,
    UserNotFound = 21,
    DonationNotFound = 22,

    // State conflicts (30-39)
    AlreadyRegistered = 30,
    ActiveRequestExists = 31,
    RequestAlreadyProcessed = 32,
    DonorHasActiveAssignment = 33,
    InsufficientStock = 34,
    RequestNotApproved = 35,
    DonorNotEligible = 36,
    NoDonorAssigned = 37,

    // Permission errors (41-49)
    RoleNotPermitted = 41,
    HospitalNotVerified = 42,
    AccountBlocked = 43,
    NotRequestOwner = 44,
    NotAssignedParty = 45,
}

/// Client-facing classification of a `ContractError`
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Authorization,
    Configuration,
}

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match *self as u32 {
            1..=9 => ErrorKind::Configuration,
            10..=19 => ErrorKind::Validation,
            20..=29 => ErrorKind::NotFound,
            30..=39 => ErrorKind::Conflict,
            _ => ErrorKind::Authorization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ContractError::InvalidCoordinates.kind(), ErrorKind::Validation);
        assert_eq!(ContractError::RequestNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(ContractError::InsufficientStock.kind(), ErrorKind::Conflict);
        assert_eq!(ContractError::RequestNotApproved.kind(), ErrorKind::Conflict);
        assert_eq!(ContractError::HospitalNotVerified.kind(), ErrorKind::Authorization);
        assert_eq!(ContractError::NotInitialized.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_permission_codes() {
        // Caller authentication is `require_auth`; no contract code stands in for it
        assert_eq!(ContractError::RoleNotPermitted as u32, 41);
        assert_eq!(ContractError::RoleNotPermitted.kind(), ErrorKind::Authorization);
        assert_eq!(ContractError::NotAssignedParty as u32, 45);
        assert_eq!(ContractError::NotAssignedParty.kind(), ErrorKind::Authorization);
    }
}
