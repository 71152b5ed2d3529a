//! Utility modules supporting terminal output.
//!
//! - [`terminal_width`] / [`is_terminal`]: cached terminal capabilities
//! - [`truncate_with_ellipsis`] / [`truncate_at_word`]: width-aware truncation
//! - [`calculate_dynamic_column_widths`]: share terminal width between columns
//!
//! ```rust
//! use multinetics_search::utils::{display_width, truncate_at_word};
//!
//! let title = truncate_at_word("Deep Learning for Networks", 16);
//! assert_eq!(title, "Deep Learning...");
//! assert!(display_width(&title) <= 16);
//! ```

mod display;

pub use display::{
    calculate_dynamic_column_widths, display_width, format_score, is_terminal,
    result_table_columns, terminal_info, terminal_width, truncate_at_word,
    truncate_with_ellipsis, ColumnConfig, Terminal, DEFAULT_WIDTH,
};
