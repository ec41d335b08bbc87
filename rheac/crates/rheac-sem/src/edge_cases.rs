//! Edge case tests for rheac-sem
