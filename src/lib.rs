pub use gradlet_internal::*;
