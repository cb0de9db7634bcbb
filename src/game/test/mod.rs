//! Tests for the scorekeeping game core, grouped by concern.

#![cfg(test)]
