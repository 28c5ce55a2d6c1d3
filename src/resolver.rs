//! Turns `target color` argument pairs into a per-slot color map.

use std::collections::BTreeMap;

use tracing::debug;

use crate::color::Color;
use crate::error::{LightError, Result};
use crate::registry::{self, PhysicalIndex};

/// Pseudo-target that fills every key no other assignment touched.
pub const BASE_TARGET: &str = "base";

/// Final color per slot for one run.
pub type ResolvedMapping = BTreeMap<PhysicalIndex, Color>;

/// Resolve assignments in argument order with last-write-wins.
///
/// Nothing is returned unless every pair parses and resolves, so a bad token
/// anywhere means no frame is ever built.
pub fn resolve_all<S: AsRef<str>>(args: &[S]) -> Result<ResolvedMapping> {
    if args.len() % 2 != 0 {
        let dangling: &str = args[args.len() - 1].as_ref();
        return Err(LightError::MalformedArguments(format!(
            "'{dangling}' has no color; arguments must come in target/color pairs"
        )));
    }

    let mut mapping = ResolvedMapping::new();
    let mut base: Option<Color> = None;

    for pair in args.chunks_exact(2) {
        let target: &str = pair[0].as_ref();
        let token: &str = pair[1].as_ref();
        let color: Color = token.parse()?;

        if target.eq_ignore_ascii_case(BASE_TARGET) {
            debug!(%color, "base color");
            base = Some(color);
            continue;
        }

        let indices = registry::resolve(target)?;
        debug!(name = target, %color, keys = indices.len(), "assign");
        for index in indices {
            mapping.insert(index, color);
        }
    }

    if let Some(color) = base {
        for index in registry::all_indices() {
            mapping.entry(index).or_insert(color);
        }
    }

    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(name: &str) -> PhysicalIndex {
        registry::find_key(name).unwrap().index
    }

    fn color(token: &str) -> Color {
        token.parse().unwrap()
    }

    #[test]
    fn empty_input_is_empty_mapping() {
        let args: [&str; 0] = [];
        assert!(resolve_all(&args).unwrap().is_empty());
    }

    #[test]
    fn single_key() {
        let mapping = resolve_all(&["home", "000000FF"]).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping[&index("home")], color("000000FF"));
    }

    #[test]
    fn later_key_overrides_group() {
        let mapping = resolve_all(&["all", "11111111", "home", "22222222"]).unwrap();
        assert_eq!(mapping.len(), registry::KEYS.len());
        for (slot, c) in &mapping {
            if *slot == index("home") {
                assert_eq!(*c, color("22222222"));
            } else {
                assert_eq!(*c, color("11111111"));
            }
        }
    }

    #[test]
    fn later_group_overrides_key() {
        let mapping = resolve_all(&["home", "22222222", "all", "11111111"]).unwrap();
        assert!(mapping.values().all(|c| *c == color("11111111")));
    }

    #[test]
    fn reference_scenario() {
        let mapping = resolve_all(&[
            "all", "FFFA710F", "pkeys", "FFBF0FFA", "home", "FFBF0FFA",
        ])
        .unwrap();

        let highlighted: Vec<PhysicalIndex> = ["p1", "p2", "p3", "p4", "p5", "home"]
            .iter()
            .map(|n| index(n))
            .collect();
        assert_eq!(mapping.len(), registry::KEYS.len());
        for (slot, c) in &mapping {
            let expected = if highlighted.contains(slot) {
                "FFBF0FFA"
            } else {
                "FFFA710F"
            };
            assert_eq!(*c, color(expected), "slot {slot}");
        }
    }

    #[test]
    fn odd_argument_count_is_malformed() {
        assert!(matches!(
            resolve_all(&["home"]),
            Err(LightError::MalformedArguments(_))
        ));
        assert!(matches!(
            resolve_all(&["home", "000000FF", "end"]),
            Err(LightError::MalformedArguments(_))
        ));
    }

    #[test]
    fn odd_count_wins_over_bad_tokens() {
        assert!(matches!(
            resolve_all(&["foo", "zz", "bar"]),
            Err(LightError::MalformedArguments(_))
        ));
    }

    #[test]
    fn unknown_target_aborts() {
        assert_eq!(
            resolve_all(&["foo", "000000FF"]).unwrap_err(),
            LightError::UnknownTarget("foo".into())
        );
        assert_eq!(
            resolve_all(&["home", "000000FF", "foo", "000000FF"]).unwrap_err(),
            LightError::UnknownTarget("foo".into())
        );
    }

    #[test]
    fn invalid_color_aborts() {
        assert_eq!(
            resolve_all(&["home", "00FF"]).unwrap_err(),
            LightError::InvalidColor("00FF".into())
        );
    }

    #[test]
    fn color_is_checked_before_target() {
        assert_eq!(
            resolve_all(&["foo", "nothex!!"]).unwrap_err(),
            LightError::InvalidColor("nothex!!".into())
        );
    }

    #[test]
    fn base_fills_only_untouched_keys() {
        let mapping = resolve_all(&["home", "22222222", "base", "11111111"]).unwrap();
        assert_eq!(mapping.len(), registry::KEYS.len());
        assert_eq!(mapping[&index("home")], color("22222222"));
        assert_eq!(mapping[&index("esc")], color("11111111"));

        let mapping = resolve_all(&["base", "11111111", "home", "22222222"]).unwrap();
        assert_eq!(mapping[&index("home")], color("22222222"));
    }

    #[test]
    fn last_base_wins() {
        let mapping = resolve_all(&["BASE", "11111111", "base", "33333333"]).unwrap();
        assert!(mapping.values().all(|c| *c == color("33333333")));
    }
}
