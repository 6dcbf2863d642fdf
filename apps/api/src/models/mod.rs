pub mod activity;
pub mod lead;
