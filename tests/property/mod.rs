pub mod diff_proptest;
