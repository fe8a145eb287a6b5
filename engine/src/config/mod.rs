// Engine configuration: country settings and fee schedule import
pub mod fees_csv;
pub mod settings;

pub use fees_csv::FeeScheduleCsv;
pub use settings::{CountrySettings, EngineSettings};
