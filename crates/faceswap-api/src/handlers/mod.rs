pub mod health;
pub mod swap;
