//! Domain value objects for NoteMatch.

pub mod anchor;
pub mod candle;
pub mod event;
pub mod labels;

pub use anchor::AnchorPattern;
pub use candle::{Candle, MarketObservation};
pub use event::{pnl_percent, BacktestEvent, Outcome};
pub use labels::{MacdCross, RsiZone, Side, Timeframe, TrendLabel};
