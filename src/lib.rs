pub mod aggregate;
pub mod dataset;
pub mod fetch;
pub mod filter;
pub mod geo;
pub mod live;
pub mod output;
pub mod safety;
