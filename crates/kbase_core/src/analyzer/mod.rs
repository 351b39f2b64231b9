//! Text style-metrics analyzer for `.txt`/`.md` files.
//!
//! Metrics are punctuation based; there is no language model behind them.

pub mod style;
