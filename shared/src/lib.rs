pub mod models;
pub mod utils;

pub use models::{
    AnnotatedSeries, Bar, Column, DateRange, DerivedColumn, Report, Series, SeriesError,
    SignalColumn,
};
