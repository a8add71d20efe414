pub mod concurrency_tests;
pub mod storage_tests;
