use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "The interval list is empty. At least one query interval is required to establish the addressable span."
    )]
    EmptyIntervalList,
}
