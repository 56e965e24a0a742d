pub mod aeff;
pub mod par;
