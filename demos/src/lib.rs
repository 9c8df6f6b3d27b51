//! Properties generated from the sources in `partial/`.
//!
//! Each module includes the merged file that `build.rs` writes for its source.
//! Generated code must build without warnings.

#![deny(warnings)]

pub mod markers {
    include!(concat!(env!("OUT_DIR"), "/lazyprop.markers.g.rs"));
}

pub mod person {
    include!(concat!(env!("OUT_DIR"), "/person.rs"));
}

pub mod calc {
    include!(concat!(env!("OUT_DIR"), "/calc.rs"));
}

pub mod report {
    include!(concat!(env!("OUT_DIR"), "/report.rs"));
}

pub mod flaky {
    include!(concat!(env!("OUT_DIR"), "/flaky.rs"));
}

pub mod wrapper {
    include!(concat!(env!("OUT_DIR"), "/wrapper.rs"));
}
