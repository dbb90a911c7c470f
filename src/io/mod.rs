//! Tabular I/O: CSV point tables, reference tables, and the output table.

mod csv;

pub use csv::{
    ReferenceRow, read_points, read_reference, read_resolved, write_output, write_reference,
};
