//! Generated protobuf modules for the telemetry transports.
//!
//! The code is checked in so the crate builds without `protoc`; the source
//! `.proto` definitions live under `proto/` at the repository root.

#![allow(clippy::all, missing_docs)]

pub mod gnmi {
    include!("gnmi.rs");
    include!("gnmi.tonic.rs");
}

pub mod telemetry {
    include!("telemetry.rs");
}

pub mod mdt_dialout {
    include!("mdt_dialout.rs");
    include!("mdt_dialout.tonic.rs");
}

pub mod ems {
    include!("ems.rs");
    include!("ems.tonic.rs");
}
