pub mod app;
pub mod confirm;
pub mod errors;
pub mod format;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use app::router;
pub use format::{format_number, parse_number, sanitize_decimal, sanitize_integer};
pub use ledger::{ensure_day, today_key};
pub use state::AppState;
pub use stats::{goal_ratio, sum_entries};
pub use storage::{resolve_data_dir, Store};
