//! End-to-end tests against a mocked CAS server

mod rest_auth_tests;
