use proptest::prelude::*;

use qdag::job::identity::content_identifier;

/// Insert the given whitespace runs between the characters of `s`.
fn intersperse_whitespace(s: &str, ws: &[String]) -> String {
    let mut out = String::new();
    let mut ws_iter = ws.iter().cycle();
    for ch in s.chars() {
        out.push(ch);
        if let Some(run) = ws_iter.next() {
            out.push_str(run);
        }
    }
    out
}

proptest! {
    /// The content identifier is invariant under arbitrary whitespace
    /// insertion anywhere in the command.
    #[test]
    fn identifier_ignores_inserted_whitespace(
        command in "[a-zA-Z0-9_./ -]{1,60}",
        ws in prop::collection::vec(prop::sample::select(vec![
            "".to_string(),
            " ".to_string(),
            "\t".to_string(),
            "\n".to_string(),
            "  \t".to_string(),
        ]), 1..8),
    ) {
        let mangled = intersperse_whitespace(&command, &ws);
        prop_assert_eq!(content_identifier(&command), content_identifier(&mangled));
    }

    /// Commands differing in non-whitespace content hash differently.
    #[test]
    fn identifier_separates_different_commands(
        command in "[a-z]{1,30}",
        suffix in "[a-z]{1,5}",
    ) {
        let other = format!("{command}{suffix}");
        prop_assert_ne!(content_identifier(&command), content_identifier(&other));
    }
}
