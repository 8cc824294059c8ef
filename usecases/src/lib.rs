pub mod messages;
pub mod purge;
pub mod tokens;

#[cfg(test)]
mod fakes;
