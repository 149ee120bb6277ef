pub mod assignment;
pub mod commission;
pub mod status;
