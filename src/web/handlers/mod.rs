pub mod bundles;
pub mod health;
pub mod objects;
