mod account_tests;
mod test_utils;
