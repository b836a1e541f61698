//! Collection of APs (applications) stored in the card

pub mod jpn;

pub use self::jpn::JpnAp;
