pub mod csv_loader;

pub use csv_loader::{detect_columns, load_records_from_csv, read_records, ColumnMap};
