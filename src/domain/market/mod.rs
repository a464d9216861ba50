pub mod snapshot;
pub mod timeframe;

pub use snapshot::{
    Fundamentals, InsiderTransaction, MarketData, OptionType, OptionsFlowEntry, PoliticalTrade,
    PriceBar, StockSnapshot, TradeDirection, VolumeBar,
};
pub use timeframe::{MAX_HORIZON_DAYS, Timeframe};
