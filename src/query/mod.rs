// Filter/aggregate engine over the clean record set

pub mod aggregate;
pub mod filter;
pub mod view;

pub use aggregate::{aggregate, region_code, Aggregates, ValueCount};
pub use filter::{contactable, filter, FilterSpec, YearRange};
pub use view::{DirectoryRow, DirectoryView, FilterOptions, InsightsView};
