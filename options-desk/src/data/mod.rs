pub mod loader;
pub mod types;

pub use loader::{load_chain_csv, load_prices_csv, load_trades_csv, LoaderError};
pub use types::{
    ChainRow, GreeksResult, OptionSnapshot, OptionType, PricePoint, PriceSeries, Signal,
    SignalPoint, SignalSeries, TradeIdea, CALENDAR_DAYS_PER_YEAR, TRADING_DAYS_PER_YEAR,
};
