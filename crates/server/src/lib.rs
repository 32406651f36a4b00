pub mod bootstrap;
pub mod health;
pub mod quotes;
