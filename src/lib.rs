pub mod comparison;
pub mod data_fetch;
pub mod form_trends;
pub mod http_client;
pub mod insights;
pub mod match_state;
pub mod model_store;
pub mod prediction_api;
pub mod reference_tables;
pub mod state;
pub mod wagon_wheel;
