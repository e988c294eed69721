// Engine configuration: analysis settings and the requested date window.
pub mod date_window;
pub mod settings;

pub use date_window::DateWindow;
pub use settings::{AnalyzerSettings, ChartSettings, DataSettings, IndicatorSettings, PatternSettings};
