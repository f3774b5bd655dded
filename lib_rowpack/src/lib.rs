pub mod alignment;
pub mod buckets;
pub mod error;
pub mod grouping;
pub mod options;
pub mod packer;
pub mod pairing;
