pub mod intake;
pub mod rules;
