use thiserror::Error;

/// Rejections shown to the caller as-is. Anything else that fails a
/// request is treated as an internal error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("You are not logged in")]
    NotLoggedIn,
    #[error("Login has expired")]
    LoginExpired,
    #[error("Wrong username or password")]
    BadCredentials,
    #[error("Surname and room must not be empty")]
    MissingIdentity,
    #[error("You already have a booking. Only one booking per user.")]
    AlreadyBooked,
    #[error("Slot is taken, does not exist, or the machine is disabled.")]
    SlotUnavailable,
    #[error("Machine is disabled, the slot cannot be edited.")]
    MachineDisabled,
    #[error("Wrong format, expected: Surname Room")]
    BadOccupant,
    #[error("No such slot")]
    NoSuchSlot,
    #[error("No such day")]
    NoSuchDay,
    #[error("No such machine")]
    NoSuchMachine,
    #[error("No such time slot")]
    NoSuchTimeSlot,
    #[error("Day already exists")]
    DuplicateDay,
    #[error("Time slot already exists")]
    DuplicateTimeSlot,
    #[error("Name must not be empty")]
    EmptyName,
}
