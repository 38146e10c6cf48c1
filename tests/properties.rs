//! Property tests for the parser, hash, and overlap invariants.

use git_hunk::core::{
    build_patch, hunk_sha, parse_diff, ranges_overlap, DiffMode, LineSpec, MatchedHunk,
};
use proptest::prelude::*;

/// Build a single-file diff whose body is the given prefixed lines.
fn synthetic_diff(old_count: usize, new_count: usize, body: &str) -> String {
    format!(
        "diff --git a/t.txt b/t.txt\n\
         --- a/t.txt\n\
         +++ b/t.txt\n\
         @@ -1,{} +1,{} @@\n{}",
        old_count, new_count, body
    )
}

proptest! {
    #[test]
    fn hash_is_deterministic_and_well_formed(
        path in "[a-z0-9/._-]{1,24}",
        line in 0u32..1_000_000,
        body in "[ -~]{0,120}",
    ) {
        let first = hunk_sha(&path, line, &body);
        let second = hunk_sha(&path, line, &body);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), 40);
        prop_assert!(first.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    }

    #[test]
    fn overlap_is_symmetric(
        s1 in 1u32..1000,
        c1 in 0u32..60,
        s2 in 1u32..1000,
        c2 in 0u32..60,
    ) {
        prop_assert_eq!(
            ranges_overlap(s1, c1, s2, c2),
            ranges_overlap(s2, c2, s1, c1)
        );
    }

    #[test]
    fn overlap_treats_zero_count_as_one(
        s1 in 1u32..1000,
        s2 in 1u32..1000,
        c2 in 0u32..60,
    ) {
        prop_assert_eq!(
            ranges_overlap(s1, 0, s2, c2),
            ranges_overlap(s1, 1, s2, c2)
        );
    }

    #[test]
    fn parsing_twice_yields_identical_hunks(
        adds in proptest::collection::vec("[a-zA-Z0-9 ]{0,30}", 1..8),
    ) {
        let body: String = adds.iter().map(|l| format!("+{}\n", l)).collect();
        let text = synthetic_diff(0, adds.len(), &body);
        let first: Vec<String> = parse_diff(&text, DiffMode::WorktreeRelative)
            .iter()
            .map(|h| format!("{:?}", h))
            .collect();
        let second: Vec<String> = parse_diff(&text, DiffMode::WorktreeRelative)
            .iter()
            .map(|h| format!("{:?}", h))
            .collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn full_line_spec_is_byte_equivalent_to_whole_hunk(
        rems in 0usize..5,
        adds in 1usize..5,
    ) {
        let mut body = String::from(" before\n");
        for i in 0..rems {
            body.push_str(&format!("-removed {}\n", i));
        }
        for i in 0..adds {
            body.push_str(&format!("+added {}\n", i));
        }
        body.push_str(" after\n");
        let text = synthetic_diff(rems + 2, adds + 2, &body);
        let hunks = parse_diff(&text, DiffMode::WorktreeRelative);
        prop_assert_eq!(hunks.len(), 1);

        let whole = build_patch(&[MatchedHunk { hunk: &hunks[0], spec: None }]).unwrap();
        let spec = LineSpec::parse(&format!("1-{}", rems + adds)).unwrap();
        let full = build_patch(&[MatchedHunk { hunk: &hunks[0], spec: Some(spec) }]).unwrap();
        prop_assert_eq!(whole, full);
    }

    #[test]
    fn sub_hunk_counts_match_emitted_body(
        rems in 1usize..5,
        adds in 1usize..5,
        keep in 1u32..9,
    ) {
        let mut body = String::from(" before\n");
        for i in 0..rems {
            body.push_str(&format!("-removed {}\n", i));
        }
        for i in 0..adds {
            body.push_str(&format!("+added {}\n", i));
        }
        body.push_str(" after\n");
        let text = synthetic_diff(rems + 2, adds + 2, &body);
        let hunks = parse_diff(&text, DiffMode::WorktreeRelative);
        let total = (rems + adds) as u32;
        let keep = keep.min(total);
        let spec = LineSpec::parse(&keep.to_string()).unwrap();
        let patch = String::from_utf8(
            build_patch(&[MatchedHunk { hunk: &hunks[0], spec: Some(spec) }]).unwrap(),
        )
        .unwrap();

        let header = patch.lines().find(|l| l.starts_with("@@")).unwrap();
        let emitted: Vec<&str> = patch
            .lines()
            .skip_while(|l| !l.starts_with("@@"))
            .skip(1)
            .collect();
        let old = emitted.iter().filter(|l| !l.starts_with('+')).count();
        let new = emitted.iter().filter(|l| !l.starts_with('-')).count();
        let expected_prefix = format!("@@ -1,{} +1,{} @@", old, new);
        prop_assert!(header.starts_with(&expected_prefix));
    }
}
