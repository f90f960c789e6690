//! Integration tests driving the full router against in-memory stores.

mod helpers;

mod admin_test;
mod auth_test;
mod cache_test;
mod token_test;
mod user_test;
