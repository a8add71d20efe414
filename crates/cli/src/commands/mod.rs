pub mod edit;
pub mod inspect;
pub mod list;
pub mod verify;
