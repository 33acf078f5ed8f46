pub mod core;
pub mod csv_history;
pub mod mock;
pub mod twelve_data;

pub use csv_history::CsvHistoryProvider;
pub use mock::{MockMarketDataProvider, SyntheticPattern};
pub use twelve_data::TwelveDataProvider;
