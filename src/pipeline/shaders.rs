pub mod forward;
pub mod shadow;
