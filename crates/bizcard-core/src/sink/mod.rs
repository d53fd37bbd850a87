//! Output sinks: CSV export and the remote table.

pub mod csv;
pub mod table;

pub use csv::{read_csv, report_file_name, write_csv};
pub use table::{CardStore, StoredRow, SupabaseTable, insert_in_batches};
