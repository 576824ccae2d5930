pub mod forms;
pub mod links;
pub mod signed;
pub mod submit;
pub mod timeouts;
pub mod verify;
