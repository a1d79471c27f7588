//! Field type contracts consumed read-only by the layout core.

pub mod field_types;
