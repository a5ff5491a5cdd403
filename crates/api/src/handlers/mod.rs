pub mod bids;
pub mod locations;
pub mod requests;
pub mod search;
