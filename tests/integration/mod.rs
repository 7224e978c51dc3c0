pub mod session_test;
pub mod transport_test;
