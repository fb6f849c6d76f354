pub mod avatar;
pub mod models;
pub mod slots;
pub mod validation;
