pub mod application;
pub mod authz;
pub mod codes;
pub mod errors;
pub mod events;
pub mod fields;
pub mod gate;
pub mod model;
pub mod share;
