pub mod models;
pub mod utils;

// Plain data models exchanged between the calculation engine and the dashboard.
// No behavior beyond small structural helpers lives here.
