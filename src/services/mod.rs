// Service module exports

pub mod countdown;
pub mod drop_import;
