pub mod repositories;
pub mod webex;
