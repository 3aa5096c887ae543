//! Full-backup snapshot file.
//!
//! A snapshot is one JSON document holding every record, movement, bill and
//! actor. This module owns the wire shapes and the file I/O; converting to
//! and from the live system happens in the application layer.

pub mod dto;
pub mod file;

pub use dto::{
    BillDto, BillItemDto, BillProductDto, CustomerDto, LocationDto, MovementDto, PaymentDto,
    ProductDto, RecordDto, Snapshot, StateDto, StockDto, SupplierDto,
};
pub use file::{
    SnapshotError, from_json, read_json, read_snapshot, to_json, write_json, write_snapshot,
};
