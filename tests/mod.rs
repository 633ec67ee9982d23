mod cache_store_mock;
mod smoke_tests;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - smoke_tests: Basic functionality tests to ensure nothing is broken
// - feed_source_mock: Mock transports driving the fetch and fallback policy, the commands and watch mode
// - cache_store_mock: Mock storage, including failing storage
