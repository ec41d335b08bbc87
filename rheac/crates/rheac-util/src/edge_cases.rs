//! Edge case tests for rheac-util

#[cfg(test)]
mod tests {
    use crate::{symbol_hash, Diagnostic, Handler, SourcePosition};

    /// EDGE CASE: Positions render without normalizing odd values
    #[test]
    fn test_edge_zero_position_display() {
        let pos = SourcePosition::new("", 0, 0, 0);
        assert_eq!(pos.to_string(), ":0:0");
    }

    /// EDGE CASE: Byte offsets do not appear in the display form
    #[test]
    fn test_edge_byte_offset_not_displayed() {
        let pos = SourcePosition::new("t", 1, 1, 9999);
        assert_eq!(pos.to_string(), "t:1:1");
    }

    /// EDGE CASE: Draining an already-empty handler is a no-op
    #[test]
    fn test_edge_handler_double_drain() {
        let handler = Handler::new();
        handler.warning("once", SourcePosition::dummy());

        assert_eq!(handler.take().len(), 1);
        assert!(handler.take().is_empty());
        assert!(!handler.has_errors());
    }

    /// EDGE CASE: Errors and warnings are counted together but judged apart
    #[test]
    fn test_edge_handler_mixed_levels() {
        let handler = Handler::new();
        handler.warning("w", SourcePosition::dummy());
        handler.error("e", SourcePosition::dummy());
        handler.warning("w2", SourcePosition::dummy());

        assert_eq!(handler.count(), 3);
        assert!(handler.has_errors());
    }

    /// EDGE CASE: Diagnostic display keeps the message verbatim
    #[test]
    fn test_edge_diagnostic_message_verbatim() {
        let d = Diagnostic::warning("`x` shadows `x`", SourcePosition::new("t", 1, 1, 0));
        assert_eq!(d.to_string(), "t:1:1: warning: `x` shadows `x`");
    }

    /// EDGE CASE: The symbol hash is byte-wise, so non-ASCII names work
    #[test]
    fn test_edge_symbol_hash_non_ascii() {
        assert_eq!(symbol_hash("héllo"), symbol_hash("héllo"));
        assert_ne!(symbol_hash("héllo"), symbol_hash("hello"));
    }

    /// EDGE CASE: Hash distinguishes prefixes and case
    #[test]
    fn test_edge_symbol_hash_near_collisions() {
        assert_ne!(symbol_hash("foo"), symbol_hash("foo "));
        assert_ne!(symbol_hash("foo"), symbol_hash("Foo"));
        assert_ne!(symbol_hash("ab"), symbol_hash("ba"));
    }
}
