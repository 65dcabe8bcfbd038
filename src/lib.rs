pub mod asc2eph_errors;
pub mod ascii;
pub mod binary;
pub mod constants;
pub mod context;
pub mod convert;
pub mod layout;
